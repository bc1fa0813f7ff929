use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub public_url: String,
    pub session_ttl_hours: i64,
    pub uploads_dir: String,
    pub max_upload_mb: usize,
    pub cloud: Option<CloudCredentials>,
    pub mail_webhook_url: Option<String>,
    pub mail_webhook_secret: Option<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct CloudCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let cloud = match (
            get_optional("CLOUD_NAME"),
            get_optional("CLOUD_API_KEY"),
            get_optional("CLOUD_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudCredentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        let log_format = match get_optional("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            public_url: get_env("PUBLIC_URL")?.trim_end_matches('/').to_string(),
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 168)?,
            uploads_dir: get_optional("UPLOADS_DIR").unwrap_or_else(|| "./uploads".to_string()),
            max_upload_mb: get_env_parse_or("MAX_UPLOAD_MB", 5)?,
            cloud,
            mail_webhook_url: get_optional("MAIL_WEBHOOK_URL"),
            mail_webhook_secret: get_optional("MAIL_WEBHOOK_SECRET"),
            log_format,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    get_config()
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
