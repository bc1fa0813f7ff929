use serde_json::Value;
use sqlx::{PgPool, Row};

use crate::database::catalog::LISTINGS;
use crate::database::filter::QueryDescriptor;
use crate::database::list_query::ListQuery;
use crate::error::Result;
use crate::models::enums::Enumeration;
use crate::models::listing::{Listing, ListingDraft, ListingPatch, ListingWithCreator};
use crate::utils::token::new_object_id;

const LISTING_COLUMNS: &str = "id, job_title, job_location, working_time, seniority_level, job_description, \
     technical_skills, soft_skills, added_by, organization_id, created_at, updated_at";

#[derive(Clone)]
pub struct ListingService {
    pool: PgPool,
}

impl ListingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Listing>> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    pub async fn title_taken(&self, job_title: &str, added_by: &str) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM listings WHERE job_title = $1 AND added_by = $2)",
        )
        .bind(job_title)
        .bind(added_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, added_by: &str, organization_id: &str, draft: ListingDraft) -> Result<Listing> {
        let sql = format!(
            "INSERT INTO listings (id, job_title, job_location, working_time, seniority_level, job_description, \
             technical_skills, soft_skills, added_by, organization_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            LISTING_COLUMNS
        );
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(new_object_id())
            .bind(&draft.job_title)
            .bind(draft.job_location.as_str())
            .bind(draft.working_time.as_str())
            .bind(draft.seniority_level.as_str())
            .bind(&draft.job_description)
            .bind(&draft.technical_skills)
            .bind(&draft.soft_skills)
            .bind(added_by)
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(listing_id = %listing.id, added_by, "listing created");
        Ok(listing)
    }

    /// Only the creator's listing is touched; `None` when no such listing exists.
    pub async fn update(&self, id: &str, added_by: &str, patch: ListingPatch) -> Result<Option<Listing>> {
        let sql = format!(
            "UPDATE listings SET \
                job_title = COALESCE($3, job_title), \
                job_location = COALESCE($4, job_location), \
                working_time = COALESCE($5, working_time), \
                seniority_level = COALESCE($6, seniority_level), \
                job_description = COALESCE($7, job_description), \
                technical_skills = COALESCE($8, technical_skills), \
                soft_skills = COALESCE($9, soft_skills), \
                updated_at = NOW() \
             WHERE id = $1 AND added_by = $2 RETURNING {}",
            LISTING_COLUMNS
        );
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .bind(added_by)
            .bind(&patch.job_title)
            .bind(patch.job_location.map(|v| v.as_str()))
            .bind(patch.working_time.map(|v| v.as_str()))
            .bind(patch.seniority_level.map(|v| v.as_str()))
            .bind(&patch.job_description)
            .bind(&patch.technical_skills)
            .bind(&patch.soft_skills)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    /// Removes the creator's listing and then, separately, its candidacies.
    pub async fn delete(&self, id: &str, added_by: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1 AND added_by = $2")
            .bind(id)
            .bind(added_by)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        sqlx::query("DELETE FROM candidacies WHERE listing_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(listing_id = %id, "listing deleted");
        Ok(true)
    }

    pub async fn list(&self, descriptor: &QueryDescriptor) -> Result<Vec<Value>> {
        let query = ListQuery::new(&LISTINGS, descriptor)
            .paginate()
            .sort()?
            .select()?
            .filter()?;
        let mut builder = query.build();
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("doc").map_err(Into::into))
            .collect()
    }

    pub async fn by_organization(&self, organization_id: &str) -> Result<Vec<ListingWithCreator>> {
        let listings = sqlx::query_as::<_, ListingWithCreator>(
            "SELECT l.id, l.job_title, l.job_location, l.working_time, l.seniority_level, l.job_description, \
                    l.technical_skills, l.soft_skills, l.added_by, l.organization_id, l.created_at, l.updated_at, \
                    a.user_name AS creator_user_name \
             FROM listings l LEFT JOIN accounts a ON a.id = l.added_by \
             WHERE l.organization_id = $1 ORDER BY l.created_at DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }
}
