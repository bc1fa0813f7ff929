use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::enums::{Enumeration, Role};
use crate::utils::validation::{self, lower_optional_string, trim_optional_string};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(required(message = "is required"), custom(function = "validation::name"))]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(required(message = "is required"), custom(function = "validation::name"))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"), email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(email(message = "must be a valid email"))]
    pub recovery_email: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(required(message = "is required"), custom(function = "validation::phone"))]
    pub phone: Option<String>,
    #[validate(required(message = "is required"), custom(function = "validation::password"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::dob"))]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "self_assignable_role"))]
    pub role: Option<String>,
}

fn self_assignable_role(value: &str) -> Result<(), ValidationError> {
    validation::role(value)?;
    match Role::lookup(value) {
        Ok(Role::User) | Ok(Role::CompanyHr) => Ok(()),
        Ok(Role::Admin) | Err(_) => {
            let mut error = ValidationError::new("role");
            error.message = Some("cannot be assigned at sign-up".into());
            Err(error)
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "login_identity", skip_on_field_errors = false))]
pub struct LoginPayload {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(email(message = "must be a valid email"))]
    pub recovery_email: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::phone"))]
    pub phone: Option<String>,
    #[validate(required(message = "is required"))]
    pub password: Option<String>,
}

fn login_identity(payload: &LoginPayload) -> Result<(), ValidationError> {
    if payload.email.is_none() && payload.phone.is_none() {
        let mut error = ValidationError::new("identity");
        error.message = Some("phone is required when email is absent".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgetPasswordPayload {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"), email(message = "must be a valid email"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    #[validate(required(message = "is required"), custom(function = "validation::password"))]
    pub new_password: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(required(message = "is required"), length(equal = 6, message = "must be 6 characters"))]
    pub otp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::middleware::validate::{validate_sources, Sources};
    use serde_json::{json, Value};

    fn sources(value: Value) -> Sources {
        Sources {
            body: value.as_object().cloned().unwrap_or_default(),
            ..Default::default()
        }
    }

    fn violations<T: serde::de::DeserializeOwned + Validate + std::fmt::Debug>(value: Value) -> Vec<String> {
        match validate_sources::<T>(sources(value)) {
            Err(Error::Validation(messages)) => messages,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn signup_reports_every_missing_field() {
        let messages = violations::<SignupPayload>(json!({"firstName": "  "}));
        for field in ["email", "firstName", "lastName", "password", "phone"] {
            assert!(
                messages.contains(&format!("{} is required", field)),
                "missing {} in {:?}",
                field,
                messages
            );
        }
    }

    #[test]
    fn wrong_typed_name_does_not_hide_other_violations() {
        let messages = violations::<SignupPayload>(json!({"firstName": 5, "password": "short"}));
        assert!(messages.contains(&"firstName has an invalid type".to_string()));
        for field in ["email", "lastName", "phone"] {
            assert!(messages.contains(&format!("{} is required", field)), "{:?}", messages);
        }
        assert!(messages.iter().any(|m| m.starts_with("password must")));
        assert!(!messages.contains(&"firstName is required".to_string()));
    }

    #[test]
    fn signup_normalizes_and_accepts() {
        let payload = validate_sources::<SignupPayload>(sources(json!({
            "firstName": " Ada ",
            "lastName": "Lovelace",
            "email": " Ada@Example.COM ",
            "phone": "01012345678",
            "password": "Abcdef12",
            "dob": "1990-12-10",
            "role": "companyHR"
        })))
        .unwrap();
        assert_eq!(payload.first_name.as_deref(), Some("Ada"));
        assert_eq!(payload.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn admin_role_cannot_be_self_assigned() {
        let messages = violations::<SignupPayload>(json!({
            "firstName": "a", "lastName": "b", "email": "a@b.io",
            "phone": "01012345678", "password": "Abcdef12", "role": "admin"
        }));
        assert_eq!(messages, vec!["role cannot be assigned at sign-up"]);
    }

    #[test]
    fn login_needs_email_or_phone() {
        let messages = violations::<LoginPayload>(json!({}));
        assert!(messages.contains(&"password is required".to_string()));
        assert!(messages.contains(&"phone is required when email is absent".to_string()));
    }

    #[test]
    fn reset_requires_six_character_otp() {
        let messages = violations::<ResetPasswordPayload>(json!({"newPassword": "Abcdef12", "otp": "123"}));
        assert_eq!(messages, vec!["otp must be 6 characters"]);
    }
}
