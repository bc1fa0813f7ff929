use sqlx::PgPool;

use crate::error::Result;
use crate::models::candidacy::{ApplicantRow, Candidacy, CandidacyDraft};
use crate::utils::token::new_object_id;

const CANDIDACY_COLUMNS: &str =
    "id, listing_id, account_id, tech_skills, soft_skills, resume_url, resume_public_id, created_at, updated_at";

#[derive(Clone)]
pub struct CandidacyService {
    pool: PgPool,
}

impl CandidacyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, listing_id: &str, account_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM candidacies WHERE listing_id = $1 AND account_id = $2)",
        )
        .bind(listing_id)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn create(&self, draft: CandidacyDraft) -> Result<Candidacy> {
        let sql = format!(
            "INSERT INTO candidacies (id, listing_id, account_id, tech_skills, soft_skills, resume_url, resume_public_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            CANDIDACY_COLUMNS
        );
        let candidacy = sqlx::query_as::<_, Candidacy>(&sql)
            .bind(new_object_id())
            .bind(&draft.listing_id)
            .bind(&draft.account_id)
            .bind(&draft.tech_skills)
            .bind(&draft.soft_skills)
            .bind(&draft.resume.secure_url)
            .bind(&draft.resume.public_id)
            .fetch_one(&self.pool)
            .await?;
        tracing::info!(candidacy_id = %candidacy.id, listing_id = %candidacy.listing_id, "candidacy stored");
        Ok(candidacy)
    }

    pub async fn applicants(&self, listing_id: &str) -> Result<Vec<ApplicantRow>> {
        let rows = sqlx::query_as::<_, ApplicantRow>(
            "SELECT c.id, c.listing_id, c.account_id, c.tech_skills, c.soft_skills, c.resume_url, \
                    c.resume_public_id, c.created_at, c.updated_at, \
                    a.user_name AS applicant_user_name, a.email AS applicant_email, a.phone AS applicant_phone, \
                    a.first_name AS applicant_first_name, a.last_name AS applicant_last_name \
             FROM candidacies c JOIN accounts a ON a.id = c.account_id \
             WHERE c.listing_id = $1 ORDER BY c.created_at",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
