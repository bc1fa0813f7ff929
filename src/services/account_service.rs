use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::account::{user_name, Account, NewAccount, ProfileChanges, PublicProfile, RecoveryEntry};
use crate::models::enums::{AccountStatus, Enumeration, Role};
use crate::utils::token::new_object_id;

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, user_name, email, password_hash, recovery_email, \
     dob, phone, role, status, verified, otp, otp_expires_at, created_at, updated_at";

#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// Any account other than `exclude` already using the email or phone.
    pub async fn contact_taken(&self, email: &str, phone: &str, exclude: Option<&str>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE (email = $1 OR phone = $2) AND ($3::TEXT IS NULL OR id <> $3))",
        )
        .bind(email)
        .bind(phone)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, new: NewAccount) -> Result<Account> {
        let sql = format!(
            "INSERT INTO accounts (id, first_name, last_name, user_name, email, password_hash, recovery_email, dob, phone, role, status, verified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(new_object_id())
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(user_name(&new.first_name, &new.last_name))
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.recovery_email)
            .bind(new.dob)
            .bind(&new.phone)
            .bind(new.role.as_str())
            .bind(AccountStatus::Offline.as_str())
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(account_id = %account.id, role = %account.role, "account created");
        Ok(account)
    }

    /// Login accepts the primary email, the recovery email or the phone number.
    pub async fn find_for_login(
        &self,
        email: Option<&str>,
        recovery_email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Account>> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE email = $1 OR recovery_email = $2 OR phone = $3 \
             ORDER BY (email = $1) DESC NULLS LAST LIMIT 1",
            ACCOUNT_COLUMNS
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .bind(recovery_email)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn find_by_email_with_status(&self, email: &str, status: AccountStatus) -> Result<Option<Account>> {
        let sql = format!(
            "SELECT {} FROM accounts WHERE email = $1 AND status = $2",
            ACCOUNT_COLUMNS
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn set_status(&self, id: &str, status: AccountStatus) -> Result<()> {
        sqlx::query("UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn mark_verified(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE accounts SET verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_profile(&self, id: &str, changes: ProfileChanges) -> Result<Account> {
        let sql = format!(
            "UPDATE accounts SET first_name = $2, last_name = $3, user_name = $4, email = $5, recovery_email = $6, \
             phone = $7, dob = $8, verified = $9, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(user_name(&changes.first_name, &changes.last_name))
            .bind(&changes.email)
            .bind(&changes.recovery_email)
            .bind(&changes.phone)
            .bind(changes.dob)
            .bind(changes.verified)
            .fetch_one(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn set_password(&self, id: &str, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE accounts SET password_hash = $2, otp = NULL, otp_expires_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn store_otp(&self, id: &str, otp: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE accounts SET otp = $2, otp_expires_at = $3, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(otp)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn public_profile(&self, id: &str) -> Result<Option<PublicProfile>> {
        let profile = sqlx::query_as::<_, PublicProfile>(
            "SELECT id, user_name, email, dob, phone, verified, status FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn by_recovery_email(&self, recovery_email: &str) -> Result<Vec<RecoveryEntry>> {
        let entries = sqlx::query_as::<_, RecoveryEntry>(
            "SELECT user_name, email FROM accounts WHERE recovery_email = $1 ORDER BY created_at",
        )
        .bind(recovery_email)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Independent statements; a failure part-way leaves the later rows behind.
    pub async fn delete_with_dependents(&self, account: &Account) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(&account.id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM candidacies WHERE account_id = $1")
            .bind(&account.id)
            .execute(&self.pool)
            .await?;
        match account.role {
            Role::CompanyHr | Role::Admin => {
                sqlx::query("DELETE FROM organizations WHERE owner_id = $1")
                    .bind(&account.id)
                    .execute(&self.pool)
                    .await?;
            }
            Role::User => {}
        }
        sqlx::query("DELETE FROM listings WHERE added_by = $1")
            .bind(&account.id)
            .execute(&self.pool)
            .await?;
        tracing::info!(account_id = %account.id, "account deleted");
        Ok(())
    }
}
