pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    account_service::AccountService,
    candidacy_service::CandidacyService,
    listing_service::ListingService,
    mail_service::{LogMailer, MailService, Mailer, WebhookMailer},
    organization_service::OrganizationService,
    storage_service::{CloudinaryStore, DiskStore, SharedStore},
    token_service::TokenService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenService,
    pub account_service: AccountService,
    pub organization_service: OrganizationService,
    pub listing_service: ListingService,
    pub candidacy_service: CandidacyService,
    pub storage: SharedStore,
    pub mailer: MailService,
    pub uploads_dir: PathBuf,
}

impl AppState {
    /// Picks the remote object store and mail relay when configured, local fallbacks otherwise.
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        let storage: SharedStore = match &config.cloud {
            Some(credentials) => Arc::new(CloudinaryStore::new(http_client.clone(), credentials.clone())),
            None => Arc::new(DiskStore::new(&config.uploads_dir, &config.public_url)),
        };
        let mailer: Arc<dyn Mailer> = match &config.mail_webhook_url {
            Some(url) => Arc::new(WebhookMailer::new(
                http_client,
                url.clone(),
                config.mail_webhook_secret.clone(),
            )),
            None => Arc::new(LogMailer),
        };

        Ok(Self::with_collaborators(pool, config, storage, mailer))
    }

    pub fn with_collaborators(
        pool: PgPool,
        config: &Config,
        storage: SharedStore,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            tokens: TokenService::new(&config.jwt_secret, config.session_ttl_hours),
            account_service: AccountService::new(pool.clone()),
            organization_service: OrganizationService::new(pool.clone()),
            listing_service: ListingService::new(pool.clone()),
            candidacy_service: CandidacyService::new(pool.clone()),
            storage,
            mailer: MailService::new(mailer, config.public_url.clone()),
            uploads_dir: PathBuf::from(&config.uploads_dir),
            pool,
        }
    }
}
