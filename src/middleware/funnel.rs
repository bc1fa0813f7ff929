use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::Failure;
use crate::services::storage_service::{ObjectStore, SharedStore};

const MAX_REWRITTEN_BODY: usize = 64 * 1024;

#[derive(Debug, Default)]
pub struct Staged {
    pub local: Vec<PathBuf>,
    pub remote: Vec<String>,
}

/// Per-request record of uploaded files that must be rolled back if the request fails.
#[derive(Debug, Clone, Default)]
pub struct UploadLedger {
    inner: Arc<Mutex<Staged>>,
}

impl UploadLedger {
    pub async fn stage_local(&self, path: PathBuf) {
        self.inner.lock().await.local.push(path);
    }

    pub async fn stage_remote(&self, public_id: String) {
        self.inner.lock().await.remote.push(public_id);
    }

    pub async fn take(&self) -> Staged {
        std::mem::take(&mut *self.inner.lock().await)
    }
}

/// Staged local files are always removed. Remote objects are destroyed only when the request failed.
pub async fn roll_back(staged: Staged, failed: bool, store: &dyn ObjectStore) {
    for path in &staged.local {
        remove_local(path).await;
    }
    if !failed {
        return;
    }
    for public_id in &staged.remote {
        match store.destroy(public_id).await {
            Ok(()) => tracing::info!(public_id = %public_id, "rolled back remote upload"),
            Err(e) => tracing::warn!(public_id = %public_id, error = ?e, "remote rollback failed"),
        }
    }
}

async fn remove_local(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = ?e, "failed to remove staged file"),
    }
}

/// Outermost layer: owns the upload ledger and gives every failure the JSON error shape.
pub async fn error_funnel(State(store): State<SharedStore>, mut req: Request, next: Next) -> Response {
    let ledger = UploadLedger::default();
    req.extensions_mut().insert(ledger.clone());

    let response = next.run(req).await;
    let status = response.status();
    let failed = status.is_client_error() || status.is_server_error();

    roll_back(ledger.take().await, failed, store.as_ref()).await;

    if failed && response.extensions().get::<Failure>().is_none() {
        return reshape(response).await;
    }
    response
}

/// Rewrites framework-produced failures (extractor rejections, body limits, panics).
async fn reshape(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if is_json {
        return response;
    }

    let bytes = to_bytes(response.into_body(), MAX_REWRITTEN_BODY)
        .await
        .unwrap_or_default();
    let diagnostic = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "an unexpected error has occurred".to_string()
    } else if diagnostic.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        diagnostic.clone()
    };

    let mut reshaped = (
        status,
        Json(json!({ "message": message, "success": false, "error": diagnostic })),
    )
        .into_response();
    reshaped.extensions_mut().insert(Failure);
    reshaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage_service::MockObjectStore;
    use axum::{body::Body, routing::get, Router};
    use mockall::predicate::eq;
    use tower::ServiceExt;

    #[tokio::test]
    async fn failed_request_removes_local_file_and_every_remote_object() {
        let dir = tempfile::tempdir().unwrap();
        let staged_file = dir.path().join("resume.pdf");
        tokio::fs::write(&staged_file, b"%PDF-1.4").await.unwrap();

        let mut store = MockObjectStore::new();
        store
            .expect_destroy()
            .with(eq("resumes/one"))
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_destroy()
            .with(eq("resumes/two"))
            .times(1)
            .returning(|_| Err(crate::error::Error::Storage("gone".into())));

        let staged = Staged {
            local: vec![staged_file.clone()],
            remote: vec!["resumes/one".into(), "resumes/two".into()],
        };
        roll_back(staged, true, &store).await;

        assert!(!staged_file.exists());
    }

    #[tokio::test]
    async fn successful_request_keeps_remote_objects() {
        let dir = tempfile::tempdir().unwrap();
        let staged_file = dir.path().join("resume.pdf");
        tokio::fs::write(&staged_file, b"%PDF-1.4").await.unwrap();

        let mut store = MockObjectStore::new();
        store.expect_destroy().never();

        let staged = Staged {
            local: vec![staged_file.clone()],
            remote: vec!["resumes/kept".into()],
        };
        roll_back(staged, false, &store).await;
        assert!(!staged_file.exists());
    }

    #[tokio::test]
    async fn framework_rejections_get_the_error_shape() {
        let store: SharedStore = Arc::new(MockObjectStore::new());
        let app = Router::new()
            .route(
                "/plain",
                get(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded") }),
            )
            .layer(axum::middleware::from_fn_with_state(store, error_funnel));

        let response = app
            .oneshot(axum::http::Request::builder().uri("/plain").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = to_bytes(response.into_body(), MAX_REWRITTEN_BODY).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "length limit exceeded");
    }
}
