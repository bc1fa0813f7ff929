use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs;

use crate::config::CloudCredentials;
use crate::error::{Error, Result};
use crate::models::candidacy::StoredFile;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, local: &Path, folder: &str) -> Result<StoredFile>;
    async fn destroy(&self, public_id: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn ObjectStore>;

pub struct CloudinaryStore {
    client: Client,
    credentials: CloudCredentials,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyReply {
    result: String,
}

impl CloudinaryStore {
    pub fn new(client: Client, credentials: CloudCredentials) -> Self {
        Self { client, credentials }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/raw/{}",
            self.credentials.cloud_name, action
        )
    }

    /// Parameters must already be sorted by name.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let joined = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(self.credentials.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn upload(&self, local: &Path, folder: &str) -> Result<StoredFile> {
        let bytes = fs::read(local).await?;
        let file_name = local
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume.pdf")
            .to_string();
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", &timestamp)]);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.credentials.api_key.clone())
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("upload rejected ({}): {}", status, body)));
        }
        let reply: UploadReply = response.json().await?;
        Ok(StoredFile {
            secure_url: reply.secure_url,
            public_id: reply.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);
        let form = [
            ("public_id", public_id.to_string()),
            ("api_key", self.credentials.api_key.clone()),
            ("timestamp", timestamp),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];
        let reply: DestroyReply = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?
            .json()
            .await?;
        match reply.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(Error::Storage(format!("destroy of {} answered {}", public_id, other))),
        }
    }
}

/// Keeps objects under the uploads directory; they are served from `/uploads`.
pub struct DiskStore {
    root: PathBuf,
    public_url: String,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, public_id: &str) -> Result<PathBuf> {
        let relative = Path::new(public_id);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::Storage(format!("illegal object id {}", public_id)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for DiskStore {
    async fn upload(&self, local: &Path, folder: &str) -> Result<StoredFile> {
        let extension = local
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let public_id = format!("{}/{}.{}", folder, uuid::Uuid::new_v4(), extension);
        let target = self.resolve(&public_id)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(local, &target).await?;
        Ok(StoredFile {
            secure_url: format!("{}/uploads/{}", self.public_url, public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let target = self.resolve(public_id)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disk_store_copies_then_destroys() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("staged.pdf");
        fs::write(&local, b"%PDF-1.4").await.unwrap();

        let store = DiskStore::new(dir.path().join("store"), "http://localhost:3000/");
        let stored = store.upload(&local, "resumes").await.unwrap();
        assert!(stored.public_id.starts_with("resumes/"));
        assert!(stored
            .secure_url
            .starts_with("http://localhost:3000/uploads/resumes/"));

        let copied = dir.path().join("store").join(&stored.public_id);
        assert!(copied.exists());
        store.destroy(&stored.public_id).await.unwrap();
        assert!(!copied.exists());
        store.destroy(&stored.public_id).await.unwrap();
    }

    #[tokio::test]
    async fn disk_store_refuses_escaping_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path(), "http://localhost");
        assert!(store.destroy("../etc/passwd").await.is_err());
    }

    #[test]
    fn signatures_are_hex_sha256() {
        let store = CloudinaryStore::new(
            Client::new(),
            CloudCredentials {
                cloud_name: "demo".into(),
                api_key: "key".into(),
                api_secret: "secret".into(),
            },
        );
        let signature = store.sign(&[("folder", "resumes"), ("timestamp", "1700000000")]);
        assert_eq!(signature.len(), 64);
        assert_eq!(
            signature,
            store.sign(&[("folder", "resumes"), ("timestamp", "1700000000")])
        );
    }
}
