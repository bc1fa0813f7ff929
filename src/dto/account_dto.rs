use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{self, lower_optional_string, trim_optional_string};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::name"))]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::name"))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(email(message = "must be a valid email"))]
    pub recovery_email: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::phone"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(custom(function = "validation::dob"))]
    pub dob: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(required(message = "is required"))]
    pub old_password: Option<String>,
    #[validate(required(message = "is required"), custom(function = "validation::password"))]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserIdParams {
    #[validate(required(message = "is required"), custom(function = "validation::object_id"))]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryPayload {
    #[serde(default, deserialize_with = "lower_optional_string")]
    #[validate(required(message = "is required"), email(message = "must be a valid email"))]
    pub recovery_email: Option<String>,
}
