use sqlx::PgPool;

use crate::error::Result;
use crate::models::organization::{Organization, OrganizationDraft};
use crate::utils::token::new_object_id;

const ORGANIZATION_COLUMNS: &str = "id, name, description, industry, address, number_of_employees, email, \
     owner_id, verified, created_at, updated_at";

#[derive(Clone)]
pub struct OrganizationService {
    pool: PgPool,
}

impl OrganizationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Organization>> {
        let sql = format!(
            "SELECT {} FROM organizations WHERE owner_id = $1 ORDER BY created_at LIMIT 1",
            ORGANIZATION_COLUMNS
        );
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(organization)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Organization>> {
        let sql = format!("SELECT {} FROM organizations WHERE id = $1", ORGANIZATION_COLUMNS);
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(organization)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Organization>> {
        let sql = format!("SELECT {} FROM organizations WHERE name = $1", ORGANIZATION_COLUMNS);
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(organization)
    }

    pub async fn name_or_email_taken(&self, name: &str, email: &str, exclude: Option<&str>) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM organizations WHERE (name = $1 OR email = $2) AND ($3::TEXT IS NULL OR id <> $3))",
        )
        .bind(name)
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, owner_id: &str, draft: OrganizationDraft) -> Result<Organization> {
        let sql = format!(
            "INSERT INTO organizations (id, name, description, industry, address, number_of_employees, email, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            ORGANIZATION_COLUMNS
        );
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(new_object_id())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.industry)
            .bind(&draft.address)
            .bind(draft.number_of_employees)
            .bind(&draft.email)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(organization_id = %organization.id, owner_id, "organization created");
        Ok(organization)
    }

    pub async fn update(&self, id: &str, draft: OrganizationDraft, verified: bool) -> Result<Organization> {
        let sql = format!(
            "UPDATE organizations SET name = $2, description = $3, industry = $4, address = $5, \
             number_of_employees = $6, email = $7, verified = $8, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ORGANIZATION_COLUMNS
        );
        let organization = sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.industry)
            .bind(&draft.address)
            .bind(draft.number_of_employees)
            .bind(&draft.email)
            .bind(verified)
            .fetch_one(&self.pool)
            .await?;
        Ok(organization)
    }

    pub async fn mark_verified(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE organizations SET verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Organization, then the candidacies of its listings, then the listings.
    pub async fn delete_with_dependents(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "DELETE FROM candidacies WHERE listing_id IN (SELECT id FROM listings WHERE organization_id = $1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        sqlx::query("DELETE FROM listings WHERE organization_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(organization_id = %id, "organization deleted");
        Ok(())
    }
}
