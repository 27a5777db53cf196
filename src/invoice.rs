// src/invoice.rs
//
// Invoice creation against the platform backend. An expired anti-forgery
// token (HTTP 419) is recovered by refreshing the token and resubmitting,
// at most MAX_CSRF_RETRIES times.

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::backend_client::BackendError;
use crate::models::{ProductType, ViewerSession};

pub const MAX_CSRF_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct InvoicePayload {
    pub product_type: ProductType,
    pub product_id: i64,
    #[serde(default)]
    pub discount_amount: i64,
    pub nett_amount: i64,
    pub total_amount: i64,
    pub payment_channel: String,
    #[serde(default)]
    pub discount_code_id: Option<i64>,
    #[serde(default)]
    pub discount_code_amount: Option<i64>,
    #[serde(default)]
    pub referral_code: Option<String>,
}

// The backend reads the product reference as `type` plus `<type>_id`
// (`course_id`, `bundle_id`, ...).
impl Serialize for InvoicePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.product_type.as_str())?;
        map.serialize_entry(
            &format!("{}_id", self.product_type.as_str()),
            &self.product_id,
        )?;
        map.serialize_entry("discount_amount", &self.discount_amount)?;
        map.serialize_entry("nett_amount", &self.nett_amount)?;
        map.serialize_entry("total_amount", &self.total_amount)?;
        map.serialize_entry("payment_channel", &self.payment_channel)?;
        if let Some(id) = self.discount_code_id {
            map.serialize_entry("discount_code_id", &id)?;
        }
        if let Some(amount) = self.discount_code_amount {
            map.serialize_entry("discount_code_amount", &amount)?;
        }
        if let Some(code) = &self.referral_code {
            map.serialize_entry("referral_code", code)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportReply {
    Created { payment_url: String },
    TokenExpired,
    Failed { status: u16, message: String },
}

#[async_trait]
pub trait InvoiceTransport: Send + Sync {
    async fn post_invoice(
        &self,
        session: &ViewerSession,
        payload: &InvoicePayload,
        csrf_token: &str,
        idempotency_key: &str,
    ) -> Result<TransportReply, BackendError>;
}

#[async_trait]
pub trait CsrfTokenProvider: Send + Sync {
    /// Token to use for the viewer's next request, fetching one if none is
    /// cached.
    async fn current(&self, session: &ViewerSession) -> Result<String, BackendError>;

    /// Fetches a fresh token for the viewer, replacing the cached one.
    async fn refresh(&self, session: &ViewerSession) -> Result<String, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("csrf token still expired after {retries} refreshes")]
    CsrfExhausted { retries: u32 },
    #[error("invoice rejected status={status}: {message}")]
    Rejected { status: u16, message: String },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CreatedInvoice {
    pub payment_url: String,
    pub attempts: u32,
}

pub struct InvoiceSubmitter<'a> {
    transport: &'a dyn InvoiceTransport,
    tokens: &'a dyn CsrfTokenProvider,
    max_retries: u32,
}

impl<'a> InvoiceSubmitter<'a> {
    pub fn new(transport: &'a dyn InvoiceTransport, tokens: &'a dyn CsrfTokenProvider) -> Self {
        Self {
            transport,
            tokens,
            max_retries: MAX_CSRF_RETRIES,
        }
    }

    pub async fn submit(
        &self,
        session: &ViewerSession,
        payload: &InvoicePayload,
    ) -> Result<CreatedInvoice, InvoiceError> {
        // One key for every attempt of this submission, so a backend that
        // deduplicates can collapse token-refresh resubmits.
        let idempotency_key = Uuid::new_v4().to_string();
        let mut token = self.tokens.current(session).await?;
        let mut retries = 0;

        loop {
            let reply = self
                .transport
                .post_invoice(session, payload, &token, &idempotency_key)
                .await?;

            match reply {
                TransportReply::Created { payment_url } => {
                    log::info!(
                        "invoice created viewer_id={} product_type={} product_id={} attempts={}",
                        session.viewer_id,
                        payload.product_type.as_str(),
                        payload.product_id,
                        retries + 1
                    );
                    return Ok(CreatedInvoice {
                        payment_url,
                        attempts: retries + 1,
                    });
                }
                TransportReply::TokenExpired if retries < self.max_retries => {
                    retries += 1;
                    log::warn!(
                        "csrf token expired, refreshing retry={}/{}",
                        retries,
                        self.max_retries
                    );
                    token = self.tokens.refresh(session).await?;
                }
                TransportReply::TokenExpired => {
                    log::error!(
                        "invoice create gave up product_id={} retries={}",
                        payload.product_id,
                        retries
                    );
                    return Err(InvoiceError::CsrfExhausted { retries });
                }
                TransportReply::Failed { status, message } => {
                    log::error!(
                        "invoice create failed product_id={} status={} message={}",
                        payload.product_id,
                        status,
                        message
                    );
                    return Err(InvoiceError::Rejected { status, message });
                }
            }
        }
    }
}
