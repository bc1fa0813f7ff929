//! Reusable field rules. Every endpoint schema in `dto` is assembled from these.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidationError;

use crate::error::{Error, Result};
use crate::models::enums::{Enumeration, JobLocation, Role, SeniorityLevel, WorkingTime};

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(00201|\+201|01)[0-2,5][0-9]{8}$").expect("phone pattern compiles")
});

static DOB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0?[1-9]|1[012])-(0?[1-9]|[12][0-9]|3[01])$").expect("dob pattern compiles")
});

static OBJECT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("object id pattern compiles"));

fn violation(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn name(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(violation("name", "must not be empty"));
    }
    Ok(())
}

pub fn phone(value: &str) -> std::result::Result<(), ValidationError> {
    if PHONE.is_match(value) {
        Ok(())
    } else {
        Err(violation("phone", "must be a valid phone number"))
    }
}

/// At least 8 ASCII letters or digits, with one upper, one lower and one digit.
pub fn password(value: &str) -> std::result::Result<(), ValidationError> {
    let long_enough = value.len() >= 8;
    let alphanumeric = value.chars().all(|c| c.is_ascii_alphanumeric());
    let upper = value.chars().any(|c| c.is_ascii_uppercase());
    let lower = value.chars().any(|c| c.is_ascii_lowercase());
    let digit = value.chars().any(|c| c.is_ascii_digit());

    if long_enough && alphanumeric && upper && lower && digit {
        Ok(())
    } else {
        Err(violation(
            "password",
            "must be at least 8 letters or digits with an uppercase letter, a lowercase letter and a digit",
        ))
    }
}

pub fn dob(value: &str) -> std::result::Result<(), ValidationError> {
    if DOB.is_match(value) && crate::utils::time::parse_dob(value).is_some() {
        Ok(())
    } else {
        Err(violation("dob", "must be a date formatted as YYYY-MM-DD"))
    }
}

pub fn object_id(value: &str) -> std::result::Result<(), ValidationError> {
    if OBJECT_ID.is_match(value) {
        Ok(())
    } else {
        Err(violation("objectId", "must be a 24 character hex identifier"))
    }
}

fn member_of<E: Enumeration>(value: &str) -> std::result::Result<(), ValidationError> {
    E::lookup(value)
        .map(|_| ())
        .map_err(|e| violation("enumeration", format!("must be one of {}", e.allowed)))
}

pub fn role(value: &str) -> std::result::Result<(), ValidationError> {
    member_of::<Role>(value)
}

pub fn job_location(value: &str) -> std::result::Result<(), ValidationError> {
    member_of::<JobLocation>(value)
}

pub fn working_time(value: &str) -> std::result::Result<(), ValidationError> {
    member_of::<WorkingTime>(value)
}

pub fn seniority_level(value: &str) -> std::result::Result<(), ValidationError> {
    member_of::<SeniorityLevel>(value)
}

/// Skills arrive either as a JSON array or, from multipart forms, as a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SkillsField {
    List(Vec<String>),
    Encoded(String),
}

impl SkillsField {
    fn decode(&self) -> std::result::Result<Vec<String>, ValidationError> {
        match self {
            SkillsField::List(items) => Ok(items.clone()),
            SkillsField::Encoded(raw) => serde_json::from_str::<Vec<String>>(raw)
                .map_err(|_| violation("skills", "must be an array of strings or a JSON-encoded array of strings")),
        }
    }

    pub fn into_list(self) -> Result<Vec<String>> {
        self.decode().map_err(|e| {
            Error::Validation(vec![e
                .message
                .map(|m| m.into_owned())
                .unwrap_or_else(|| e.code.into_owned())])
        })
    }
}

pub fn skills(value: &SkillsField) -> std::result::Result<(), ValidationError> {
    value.decode().map(|_| ())
}

pub fn trim_optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Lower-cased and trimmed; used for emails and the fields stored case-insensitively.
pub fn lower_optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(trim_optional_string(deserializer)?.map(|s| s.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_needs_upper_lower_and_digit() {
        assert!(password("Abcdef12").is_ok());
        assert!(password("abcdefgh").is_err());
        assert!(password("ABCDEFG1").is_err());
        assert!(password("Abc12").is_err());
        assert!(password("Abcdef12!").is_err());
    }

    #[test]
    fn phone_follows_regional_format() {
        assert!(phone("01012345678").is_ok());
        assert!(phone("+201512345678").is_ok());
        assert!(phone("00201212345678").is_ok());
        assert!(phone("01312345678").is_err());
        assert!(phone("0101234567").is_err());
    }

    #[test]
    fn dob_rejects_impossible_dates() {
        assert!(dob("1999-12-31").is_ok());
        assert!(dob("1999-1-5").is_ok());
        assert!(dob("1999-13-01").is_err());
        assert!(dob("1999-02-30").is_err());
        assert!(dob("31-12-1999").is_err());
    }

    #[test]
    fn object_id_is_exactly_24_hex() {
        assert!(object_id("65a1f0c2b4d3e5f6a7b8c9d0").is_ok());
        assert!(object_id("65a1f0c2b4d3e5f6a7b8c9d").is_err());
        assert!(object_id("65a1f0c2b4d3e5f6a7b8c9dz").is_err());
    }

    #[test]
    fn enumerations_name_allowed_values() {
        assert!(job_location("hybrid").is_ok());
        let err = seniority_level("Intern").unwrap_err();
        assert!(err.message.unwrap().contains("Junior"));
    }

    #[test]
    fn skills_accept_encoded_lists() {
        let encoded: SkillsField = serde_json::from_str(r#""[\"go\",\"rust\"]""#).unwrap();
        assert!(skills(&encoded).is_ok());
        assert_eq!(encoded.into_list().unwrap(), vec!["go", "rust"]);

        let literal: SkillsField = serde_json::from_str(r#"["sql"]"#).unwrap();
        assert_eq!(literal.into_list().unwrap(), vec!["sql"]);
    }

    #[test]
    fn skills_reject_malformed_encodings() {
        assert!(skills(&SkillsField::Encoded("not-json".into())).is_err());
        assert!(skills(&SkillsField::Encoded("{\"a\":1}".into())).is_err());
        assert!(matches!(
            SkillsField::Encoded("[1,2]".into()).into_list(),
            Err(Error::Validation(_))
        ));
    }
}
