use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: String,
    pub address: Option<String>,
    pub number_of_employees: Option<i32>,
    pub email: String,
    pub owner_id: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrganizationDraft {
    pub name: String,
    pub description: Option<String>,
    pub industry: String,
    pub address: Option<String>,
    pub number_of_employees: Option<i32>,
    pub email: String,
}
