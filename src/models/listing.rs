use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::enums::{JobLocation, SeniorityLevel, WorkingTime};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub job_title: String,
    #[sqlx(try_from = "String")]
    pub job_location: JobLocation,
    #[sqlx(try_from = "String")]
    pub working_time: WorkingTime,
    #[sqlx(try_from = "String")]
    pub seniority_level: SeniorityLevel,
    pub job_description: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub added_by: String,
    #[serde(rename = "company")]
    pub organization_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub job_title: String,
    pub job_location: JobLocation,
    pub working_time: WorkingTime,
    pub seniority_level: SeniorityLevel,
    pub job_description: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
    pub job_title: Option<String>,
    pub job_location: Option<JobLocation>,
    pub working_time: Option<WorkingTime>,
    pub seniority_level: Option<SeniorityLevel>,
    pub job_description: Option<String>,
    pub technical_skills: Option<Vec<String>>,
    pub soft_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ListingWithCreator {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub listing: Listing,
    pub creator_user_name: Option<String>,
}
