use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Candidacy {
    pub id: String,
    #[serde(rename = "jobId")]
    pub listing_id: String,
    #[serde(rename = "userId")]
    pub account_id: String,
    #[serde(rename = "userTechSkills")]
    pub tech_skills: Vec<String>,
    #[serde(rename = "userSoftSkills")]
    pub soft_skills: Vec<String>,
    #[serde(skip)]
    pub resume_url: String,
    #[serde(skip)]
    pub resume_public_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference to the submitted resume in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub secure_url: String,
    pub public_id: String,
}

impl Candidacy {
    pub fn resume(&self) -> StoredFile {
        StoredFile {
            secure_url: self.resume_url.clone(),
            public_id: self.resume_public_id.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidacyDraft {
    pub listing_id: String,
    pub account_id: String,
    pub tech_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub resume: StoredFile,
}

/// One row of the applicant view: candidacy joined with the applying account.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicantRow {
    #[sqlx(flatten)]
    pub candidacy: Candidacy,
    pub applicant_user_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub applicant_first_name: String,
    pub applicant_last_name: String,
}
