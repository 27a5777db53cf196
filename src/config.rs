// src/config.rs

use std::env;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub backend_base_url: String,
    pub backend_timeout: Duration,
    pub jwt_secret: String,
    pub promo_settle: Duration,
    pub invoice_store_path: String,
    pub proof_upload_path: String,
    pub support_contact_url: String,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Reads configuration from the environment (and `.env` when present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let backend_base_url = required("BACKEND_BASE_URL")?
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", 8065)?,
            backend_base_url,
            backend_timeout: Duration::from_secs(parsed("BACKEND_TIMEOUT_SECS", 15)?),
            jwt_secret: required("JWT_SECRET")?,
            promo_settle: Duration::from_millis(parsed("PROMO_SETTLE_MS", 500)?),
            invoice_store_path: env::var("INVOICE_STORE_PATH")
                .unwrap_or_else(|_| "/invoice".to_string()),
            proof_upload_path: env::var("PROOF_UPLOAD_PATH")
                .unwrap_or_else(|_| "/api/free-enrollments/proof".to_string()),
            support_contact_url: env::var("SUPPORT_CONTACT_URL")
                .unwrap_or_else(|_| "https://wa.me/6281234567890".to_string()),
        })
    }

    /// Defaults for everything except the backend location and JWT secret.
    pub fn with_backend(backend_base_url: &str, jwt_secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8065,
            backend_base_url: backend_base_url.trim_end_matches('/').to_string(),
            backend_timeout: Duration::from_secs(15),
            jwt_secret: jwt_secret.to_string(),
            promo_settle: Duration::from_millis(500),
            invoice_store_path: "/invoice".to_string(),
            proof_upload_path: "/api/free-enrollments/proof".to_string(),
            support_contact_url: "https://wa.me/6281234567890".to_string(),
        }
    }
}
