// src/error.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::api::backend_client::BackendError;
use crate::invoice::InvoiceError;
use crate::referral::ReferralError;
use crate::upload::UploadError;

/// Errors surfaced to the checkout page. Validation problems are inline and
/// recoverable; payment failures block and point the user at support.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Referral(#[from] ReferralError),
    #[error("{0}")]
    BadRequest(String),
    #[error("login required")]
    Unauthorized,
    #[error("{source}")]
    Payment {
        source: InvoiceError,
        support_contact: String,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    pub fn payment(source: InvoiceError, support_contact: &str) -> Self {
        ApiError::Payment {
            source,
            support_contact: support_contact.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upload(_) | ApiError::Referral(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Payment { .. } | ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            ApiError::Payment {
                source,
                support_contact,
            } => {
                let message = match source {
                    InvoiceError::Rejected { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                builder.json(json!({
                    "error": message,
                    "support_contact": support_contact,
                }))
            }
            // Backend bodies can carry internals; keep them in the logs.
            ApiError::Backend(e) => {
                log::error!("backend error: {e}");
                builder.json(json!({"error": "backend unavailable"}))
            }
            other => builder.json(json!({"error": other.to_string()})),
        }
    }
}
