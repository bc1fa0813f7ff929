use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::present;
use crate::error::{Error, Result};
use crate::models::candidacy::{ApplicantRow, Candidacy, StoredFile};
use crate::models::enums::Enumeration;
use crate::models::listing::{ListingDraft, ListingPatch};
use crate::utils::validation::{self, lower_optional_string, trim_optional_string, SkillsField};

fn parse_enum<E: Enumeration>(field: &str, value: Option<String>) -> Result<Option<E>> {
    value
        .map(|raw| E::lookup(&raw).map_err(|e| Error::Validation(vec![format!("{} {}", field, e)])))
        .transpose()
}

fn parse_skills(value: Option<SkillsField>) -> Result<Option<Vec<String>>> {
    value.map(SkillsField::into_list).transpose()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddJobPayload {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"), custom(function = "validation::name"))]
    pub job_title: Option<String>,
    #[validate(required(message = "is required"), custom(function = "validation::job_location"))]
    pub job_location: Option<String>,
    #[validate(required(message = "is required"), custom(function = "validation::working_time"))]
    pub working_time: Option<String>,
    #[validate(required(message = "is required"), custom(function = "validation::seniority_level"))]
    pub seniority_level: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(required(message = "is required"), custom(function = "validation::name"))]
    pub job_description: Option<String>,
    #[validate(required(message = "is required"), custom(function = "validation::skills"))]
    pub technical_skills: Option<SkillsField>,
    #[validate(custom(function = "validation::skills"))]
    pub soft_skills: Option<SkillsField>,
}

impl AddJobPayload {
    pub fn into_draft(self) -> Result<ListingDraft> {
        Ok(ListingDraft {
            job_title: present(self.job_title, "jobTitle")?,
            job_location: present(parse_enum("jobLocation", self.job_location)?, "jobLocation")?,
            working_time: present(parse_enum("workingTime", self.working_time)?, "workingTime")?,
            seniority_level: present(
                parse_enum("seniorityLevel", self.seniority_level)?,
                "seniorityLevel",
            )?,
            job_description: present(self.job_description, "jobDescription")?,
            technical_skills: present(parse_skills(self.technical_skills)?, "technicalSkills")?,
            soft_skills: parse_skills(self.soft_skills)?.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobPayload {
    #[validate(required(message = "is required"), custom(function = "validation::object_id"))]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(custom(function = "validation::name"))]
    pub job_title: Option<String>,
    #[validate(custom(function = "validation::job_location"))]
    pub job_location: Option<String>,
    #[validate(custom(function = "validation::working_time"))]
    pub working_time: Option<String>,
    #[validate(custom(function = "validation::seniority_level"))]
    pub seniority_level: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::name"))]
    pub job_description: Option<String>,
    #[validate(custom(function = "validation::skills"))]
    pub technical_skills: Option<SkillsField>,
    #[validate(custom(function = "validation::skills"))]
    pub soft_skills: Option<SkillsField>,
}

impl UpdateJobPayload {
    pub fn into_parts(self) -> Result<(String, ListingPatch)> {
        let patch = ListingPatch {
            job_title: self.job_title,
            job_location: parse_enum("jobLocation", self.job_location)?,
            working_time: parse_enum("workingTime", self.working_time)?,
            seniority_level: parse_enum("seniorityLevel", self.seniority_level)?,
            job_description: self.job_description,
            technical_skills: parse_skills(self.technical_skills)?,
            soft_skills: parse_skills(self.soft_skills)?,
        };
        Ok((present(self.job_id, "jobId")?, patch))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobIdParams {
    #[validate(required(message = "is required"), custom(function = "validation::object_id"))]
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ByCompanyQuery {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"))]
    pub company_name: Option<String>,
}

/// Text parts of the multipart application form plus the path's `jobId`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPayload {
    #[validate(required(message = "is required"), custom(function = "validation::object_id"))]
    pub job_id: Option<String>,
    #[validate(required(message = "is required"), custom(function = "validation::skills"))]
    pub user_tech_skills: Option<SkillsField>,
    #[validate(required(message = "is required"), custom(function = "validation::skills"))]
    pub user_soft_skills: Option<SkillsField>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidacyResponse {
    #[serde(flatten)]
    pub candidacy: Candidacy,
    pub user_resume: StoredFile,
}

impl From<Candidacy> for CandidacyResponse {
    fn from(candidacy: Candidacy) -> Self {
        Self {
            user_resume: candidacy.resume(),
            candidacy,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    pub user_name: String,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantResponse {
    #[serde(flatten)]
    pub candidacy: CandidacyResponse,
    pub applicant: ApplicantSummary,
}

impl From<ApplicantRow> for ApplicantResponse {
    fn from(row: ApplicantRow) -> Self {
        Self {
            candidacy: CandidacyResponse::from(row.candidacy),
            applicant: ApplicantSummary {
                user_name: row.applicant_user_name,
                email: row.applicant_email,
                phone: row.applicant_phone,
                first_name: row.applicant_first_name,
                last_name: row.applicant_last_name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::validate::{validate_sources, Sources};
    use crate::models::enums::{JobLocation, SeniorityLevel};
    use serde_json::json;
    use std::collections::HashMap;

    fn body(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn missing_technical_skills_is_reported() {
        let err = validate_sources::<AddJobPayload>(Sources {
            body: body(json!({
                "jobTitle": "Backend Engineer",
                "jobLocation": "remotely",
                "workingTime": "full-time",
                "seniorityLevel": "Senior",
                "jobDescription": "Build services"
            })),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            Error::Validation(messages) => assert_eq!(messages, vec!["technicalSkills is required"]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn valid_job_becomes_a_draft() {
        let payload = validate_sources::<AddJobPayload>(Sources {
            body: body(json!({
                "jobTitle": "Backend Engineer",
                "jobLocation": "hybrid",
                "workingTime": "part-time",
                "seniorityLevel": "Team-Lead",
                "jobDescription": "Build services",
                "technicalSkills": "[\"rust\",\"sql\"]"
            })),
            ..Default::default()
        })
        .unwrap();
        let draft = payload.into_draft().unwrap();
        assert_eq!(draft.job_title, "backend engineer");
        assert_eq!(draft.job_location, JobLocation::Hybrid);
        assert_eq!(draft.seniority_level, SeniorityLevel::TeamLead);
        assert_eq!(draft.technical_skills, vec!["rust", "sql"]);
        assert!(draft.soft_skills.is_empty());
    }

    #[test]
    fn application_form_rejects_undecodable_skills() {
        let err = validate_sources::<ApplyPayload>(Sources {
            body: body(json!({"userTechSkills": "not-json", "userSoftSkills": "[\"teamwork\"]"})),
            path: HashMap::from([("jobId".to_string(), "65a1f0c2b4d3e5f6a7b8c9d0".to_string())]),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].starts_with("userTechSkills "));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn update_keeps_absent_fields_unset() {
        let payload = validate_sources::<UpdateJobPayload>(Sources {
            body: body(json!({"workingTime": "full-time"})),
            path: HashMap::from([("jobId".to_string(), "65a1f0c2b4d3e5f6a7b8c9d0".to_string())]),
            ..Default::default()
        })
        .unwrap();
        let (id, patch) = payload.into_parts().unwrap();
        assert_eq!(id, "65a1f0c2b4d3e5f6a7b8c9d0");
        assert!(patch.job_title.is_none());
        assert!(patch.working_time.is_some());
    }
}
