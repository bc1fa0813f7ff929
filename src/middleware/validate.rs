use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use crate::error::{Error, Result};

/// The three places a request can carry input, kept apart until [`Sources::merge`].
#[derive(Debug, Default, Clone)]
pub struct Sources {
    pub body: Map<String, Value>,
    pub path: HashMap<String, String>,
    pub query: Vec<(String, String)>,
}

impl Sources {
    /// Body first, then path parameters, then query parameters. A later source
    /// replaces an earlier one key by key; nothing is merged deeper than that.
    pub fn merge(self) -> Map<String, Value> {
        let mut merged = self.body;
        for (key, value) in self.path {
            merged.insert(key, Value::String(value));
        }
        for (key, value) in self.query {
            merged.insert(key, Value::String(value));
        }
        merged
    }
}

pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::Validation(vec!["body must be a JSON object".to_string()])),
        Err(_) => Err(Error::Validation(vec!["body is not valid JSON".to_string()])),
    }
}

pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Merges the sources, deserializes the candidate and runs every rule on it.
///
/// A field of the wrong type is dropped and reported alongside the rule violations of the
/// remaining fields.
pub fn validate_sources<T>(sources: Sources) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let mut merged = sources.merge();
    let mut mistyped = Vec::new();

    let candidate: T = match serde_json::from_value(Value::Object(merged.clone())) {
        Ok(candidate) => candidate,
        Err(whole) => {
            let keys: Vec<String> = merged.keys().cloned().collect();
            for key in keys {
                let alone = Map::from_iter([(key.clone(), merged[&key].clone())]);
                if serde_json::from_value::<T>(Value::Object(alone)).is_err() {
                    merged.remove(&key);
                    mistyped.push(key);
                }
            }
            serde_json::from_value(Value::Object(merged))
                .map_err(|_| Error::Validation(vec![whole.to_string()]))?
        }
    };

    let mut messages: Vec<String> = match candidate.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect_messages(&errors)
            .into_iter()
            .filter(|m| !mistyped.iter().any(|key| m.starts_with(&format!("{} ", key))))
            .collect(),
    };
    messages.extend(mistyped.iter().map(|key| format!("{} has an invalid type", key)));

    if messages.is_empty() {
        Ok(candidate)
    } else {
        messages.sort();
        Err(Error::Validation(messages))
    }
}

/// Every violated rule as `"<field> <message>"`, field names in the wire casing.
pub fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, violations) in errors.field_errors() {
        let field: &str = &field;
        for violation in violations.iter() {
            let text = violation
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| violation.code.to_string());
            if field == "__all__" {
                messages.push(text);
            } else {
                messages.push(format!("{} {}", camel_case(field), text));
            }
        }
    }
    messages.sort();
    messages
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Extractor that gates a handler on a validated, merged view of the request.
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let (mut parts, body) = req.into_parts();

        let path = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, state).await {
            Ok(Path(params)) => params,
            Err(_) => HashMap::new(),
        };
        let query = parse_query(parts.uri.query());

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| Error::BadRequest(e.body_text()))?;
        let body = parse_body(&bytes)?;

        let value = validate_sources::<T>(Sources { body, path, query })?;
        Ok(Validated(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct JobForm {
        #[validate(required(message = "is required"))]
        job_id: Option<String>,
        #[validate(required(message = "is required"), length(min = 3, message = "is too short"))]
        job_title: Option<String>,
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn later_sources_overwrite_by_key() {
        let sources = Sources {
            body: body(json!({"jobId": "from-body", "keep": 1})),
            path: HashMap::from([("jobId".to_string(), "from-path".to_string())]),
            query: vec![("keep".to_string(), "from-query".to_string())],
        };
        let merged = sources.merge();
        assert_eq!(merged["jobId"], "from-path");
        assert_eq!(merged["keep"], "from-query");
    }

    #[test]
    fn collects_every_violation() {
        let err = validate_sources::<JobForm>(Sources {
            body: body(json!({"jobTitle": "ab"})),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert_eq!(messages, vec!["jobId is required", "jobTitle is too short"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn mistyped_field_is_reported_with_the_rest() {
        let err = validate_sources::<JobForm>(Sources {
            body: body(json!({"jobTitle": 5})),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert_eq!(messages, vec!["jobId is required", "jobTitle has an invalid type"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn passes_when_every_rule_holds() {
        let form = validate_sources::<JobForm>(Sources {
            body: body(json!({"jobTitle": "rust engineer"})),
            path: HashMap::from([("jobId".to_string(), "65a1f0c2b4d3e5f6a7b8c9d0".to_string())]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(form.job_title.as_deref(), Some("rust engineer"));
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(parse_body(b"").unwrap().is_empty());
        assert!(matches!(parse_body(b"[1]"), Err(Error::Validation(_))));
        assert!(matches!(parse_body(b"{oops"), Err(Error::Validation(_))));
    }

    #[test]
    fn camel_cases_field_names() {
        assert_eq!(camel_case("user_tech_skills"), "userTechSkills");
        assert_eq!(camel_case("email"), "email");
    }
}
