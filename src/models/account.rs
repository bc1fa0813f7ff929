use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::enums::{AccountStatus, Role};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub recovery_email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub phone: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    pub verified: bool,
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields shown to anyone who looks an account up by id.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub phone: String,
    pub verified: bool,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryEntry {
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub recovery_email: Option<String>,
    pub password_hash: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub recovery_email: Option<String>,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub verified: bool,
}

pub fn user_name(first_name: &str, last_name: &str) -> String {
    format!("{}_{}", first_name, last_name)
}
