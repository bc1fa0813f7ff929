use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<()>;
}

/// Posts each message as JSON to a relay that owns actual delivery.
pub struct WebhookMailer {
    client: Client,
    url: String,
    secret: Option<String>,
}

impl WebhookMailer {
    pub fn new(client: Client, url: String, secret: Option<String>) -> Self {
        Self { client, url, secret }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        let mut request = self.client.post(&self.url).json(mail);
        if let Some(secret) = &self.secret {
            request = request.header("X-Webhook-Secret", secret);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::Mail(format!(
                "relay answered {} for {}",
                response.status(),
                mail.to
            )));
        }
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail relay not configured, message logged only");
        Ok(())
    }
}

#[derive(Clone)]
pub struct MailService {
    mailer: Arc<dyn Mailer>,
    public_url: String,
}

impl MailService {
    pub fn new(mailer: Arc<dyn Mailer>, public_url: String) -> Self {
        Self { mailer, public_url }
    }

    /// Fire-and-forget; delivery failures are logged and never reach the caller.
    pub fn dispatch(&self, mail: Mail) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&mail).await {
                tracing::warn!(to = %mail.to, error = ?e, "mail delivery failed");
            }
        });
    }

    pub fn verification(&self, to: &str, token: &str) -> Mail {
        Mail {
            to: to.to_string(),
            subject: "E-mail verification".to_string(),
            html: format!(
                "<p><a href=\"{}/api/auth/verify/{}\">Verify your e-mail</a></p>",
                self.public_url, token
            ),
        }
    }

    pub fn password_reset(&self, to: &str, otp: &str) -> Mail {
        Mail {
            to: to.to_string(),
            subject: "Password reset".to_string(),
            html: format!(
                "<p>Your one-time code is <b>{}</b>. It expires in 5 minutes.</p>",
                otp
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_links_point_at_the_public_url() {
        let service = MailService::new(Arc::new(LogMailer), "https://jobs.example".into());
        let mail = service.verification("hr@acme.io", "abc.def");
        assert!(mail.html.contains("https://jobs.example/api/auth/verify/abc.def"));
        assert_eq!(mail.to, "hr@acme.io");
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mail = Mail {
            to: "a@b.io".into(),
            subject: "s".into(),
            html: "h".into(),
        };
        assert!(LogMailer.send(&mail).await.is_ok());
    }
}
