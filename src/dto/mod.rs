pub mod account_dto;
pub mod auth_dto;
pub mod listing_dto;
pub mod organization_dto;

use serde::Serialize;

use crate::error::{Error, Result};

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            token: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            token: None,
        }
    }

    pub fn token(message: impl Into<String>, token: String) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            token: Some(token),
        }
    }
}

/// A required field after validation; absence here means a schema is missing its `required` rule.
pub fn present<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::Validation(vec![format!("{} is required", field)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_empty_parts() {
        let body = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "message": "done"}));

        let body = serde_json::to_value(ApiResponse::data(vec![1, 2]).with_message("ok")).unwrap();
        assert_eq!(body["data"], serde_json::json!([1, 2]));
    }
}
