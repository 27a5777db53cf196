// src/api/backend_client.rs
//
// Client for the platform backend that owns products, discount codes and
// invoices. Every call carries the viewer's bearer; mutating calls also carry
// that viewer's anti-forgery token in `X-CSRF-TOKEN`.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::multipart;
use serde::Deserialize;

use crate::config::Config;
use crate::invoice::{CsrfTokenProvider, InvoicePayload, InvoiceTransport, TransportReply};
use crate::models::{DiscountValidation, ViewerSession};
use crate::promo::{DiscountValidator, PromoRequest};

/// Status the backend answers with when the anti-forgery token expired.
pub const CSRF_EXPIRED_STATUS: u16 = 419;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend api error status={status} body={body}")]
    Api { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct CsrfTokenResponse {
    #[serde(alias = "csrf_token")]
    token: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceStoreResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    payment_url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<MessageBody>(body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.trim().is_empty())
}

pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    invoice_store_path: String,
    proof_upload_path: String,
    // Anti-forgery tokens are bound to the backend session, one per viewer.
    csrf_tokens: DashMap<i64, String>,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.backend_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_base_url.clone(),
            invoice_store_path: config.invoice_store_path.clone(),
            proof_upload_path: config.proof_upload_path.clone(),
            csrf_tokens: DashMap::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn fetch_csrf_token(&self, session: &ViewerSession) -> Result<String, BackendError> {
        let resp = self
            .http
            .get(self.url("/csrf-token"))
            .header("Authorization", format!("Bearer {}", session.bearer))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<CsrfTokenResponse>(&body)
            .map(|r| r.token)
            .map_err(|e| BackendError::InvalidResponse(format!("{e}; body={body}")))
    }

    /// Forwards a validated free-enrollment proof image.
    pub async fn upload_enrollment_proof(
        &self,
        session: &ViewerSession,
        product_type: &str,
        product_id: i64,
        filename: String,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<serde_json::Value, BackendError> {
        let token = self.current(session).await?;
        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(content_type)?;
        let form = multipart::Form::new()
            .text("type", product_type.to_string())
            .text("product_id", product_id.to_string())
            .part("proof", part);

        let resp = self
            .http
            .post(self.url(&self.proof_upload_path))
            .header("Authorization", format!("Bearer {}", session.bearer))
            .header("X-CSRF-TOKEN", token)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("{e}; body={body}")))
    }
}

#[async_trait]
impl DiscountValidator for BackendClient {
    async fn validate_discount(
        &self,
        session: &ViewerSession,
        req: &PromoRequest,
    ) -> Result<DiscountValidation, BackendError> {
        let resp = self
            .http
            .post(self.url("/api/discount-codes/validate"))
            .header("Authorization", format!("Bearer {}", session.bearer))
            .header("Accept", "application/json")
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        // An unknown or expired code comes back as 4xx with `valid: false`.
        if let Ok(validation) = serde_json::from_str::<DiscountValidation>(&body) {
            if status.is_success() || !validation.valid {
                return Ok(validation);
            }
        }

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Err(BackendError::InvalidResponse(format!("body={body}")))
    }
}

#[async_trait]
impl InvoiceTransport for BackendClient {
    async fn post_invoice(
        &self,
        session: &ViewerSession,
        payload: &InvoicePayload,
        csrf_token: &str,
        idempotency_key: &str,
    ) -> Result<TransportReply, BackendError> {
        let resp = self
            .http
            .post(self.url(&self.invoice_store_path))
            .header("Authorization", format!("Bearer {}", session.bearer))
            .header("X-CSRF-TOKEN", csrf_token)
            .header("Idempotency-Key", idempotency_key)
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == CSRF_EXPIRED_STATUS {
            return Ok(TransportReply::TokenExpired);
        }

        let body = resp.text().await?;
        if !status.is_success() {
            let message = server_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("invoice creation failed")
                    .to_string()
            });
            return Ok(TransportReply::Failed {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = serde_json::from_str::<InvoiceStoreResponse>(&body)
            .map_err(|e| BackendError::InvalidResponse(format!("{e}; body={body}")))?;

        match parsed.payment_url {
            Some(payment_url) if parsed.success => Ok(TransportReply::Created { payment_url }),
            _ => Ok(TransportReply::Failed {
                status: status.as_u16(),
                message: parsed
                    .message
                    .unwrap_or_else(|| "invoice creation failed".to_string()),
            }),
        }
    }
}

#[async_trait]
impl CsrfTokenProvider for BackendClient {
    async fn current(&self, session: &ViewerSession) -> Result<String, BackendError> {
        if let Some(token) = self.csrf_tokens.get(&session.viewer_id) {
            return Ok(token.value().clone());
        }
        self.refresh(session).await
    }

    async fn refresh(&self, session: &ViewerSession) -> Result<String, BackendError> {
        let token = self.fetch_csrf_token(session).await?;
        self.csrf_tokens.insert(session.viewer_id, token.clone());
        Ok(token)
    }
}
