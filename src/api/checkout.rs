// src/api/checkout.rs

use actix_multipart::Multipart;
use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponse, post, web};
use chrono::Utc;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::checkout_state::{self, CheckoutContext};
use crate::error::ApiError;
use crate::invoice::{InvoicePayload, InvoiceSubmitter};
use crate::models::{ProductType, ReferralInfo, Viewer, ViewerSession};
use crate::pricing::{self, PriceInput};
use crate::promo::PromoRequest;
use crate::referral::{self, REFERRAL_COOKIE};
use crate::upload::{self, MAX_PROOF_BYTES, UploadError};

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub payment_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReferralLinkRequest {
    pub url: String,
    pub code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReferralLinkResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProofQuery {
    pub product_type: ProductType,
    pub product_id: i64,
}

fn request_referral(req: &HttpRequest) -> Option<String> {
    let cookie = req.cookie(REFERRAL_COOKIE);
    referral::resolve(req.query_string(), cookie.as_ref().map(|c| c.value()))
}

fn remember_referral(resp: &mut HttpResponse, code: Option<&str>) {
    let Some(code) = code else {
        return;
    };
    // No max-age: lives as long as the browsing session.
    let cookie = Cookie::build(REFERRAL_COOKIE, code.to_string())
        .path("/")
        .http_only(true)
        .finish();
    if let Err(e) = resp.add_cookie(&cookie) {
        log::warn!("set referral cookie error: {e}");
    }
}

#[utoipa::path(
    post,
    path = "/api/checkout/quote",
    tag = "checkout",
    request_body = PriceInput,
    responses((status = 200, description = "Display price", body = PriceQuote))
)]
#[post("/quote")]
pub async fn quote(payload: web::Json<PriceInput>) -> HttpResponse {
    HttpResponse::Ok().json(pricing::quote(&payload))
}

#[utoipa::path(
    post,
    path = "/api/checkout/promo",
    tag = "checkout",
    request_body = PromoRequest,
    responses(
        (status = 200, description = "Applied, rejected, cleared or superseded", body = PromoOutcome),
        (status = 401, description = "Login required"),
        (status = 502, description = "Backend unavailable")
    )
)]
#[post("/promo")]
pub async fn validate_promo(
    state: web::Data<AppState>,
    session: Option<web::ReqData<ViewerSession>>,
    payload: web::Json<PromoRequest>,
) -> Result<HttpResponse, ApiError> {
    let Some(session) = session else {
        return Err(ApiError::Unauthorized);
    };

    let outcome = state
        .promo
        .validate(state.backend.as_ref(), &session, &payload)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/checkout/invoice",
    tag = "checkout",
    request_body = InvoicePayload,
    responses(
        (status = 200, description = "Invoice created, redirect to payment_url", body = InvoiceResponse),
        (status = 401, description = "Login required"),
        (status = 502, description = "Invoice creation failed; contact support")
    )
)]
#[post("/invoice")]
pub async fn create_invoice(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Option<web::ReqData<ViewerSession>>,
    payload: web::Json<InvoicePayload>,
) -> Result<HttpResponse, ApiError> {
    let Some(session) = session else {
        return Err(ApiError::Unauthorized);
    };

    let mut payload = payload.into_inner();
    if payload.nett_amount < 0 || payload.total_amount < payload.nett_amount {
        return Err(ApiError::BadRequest("invalid invoice amounts".to_string()));
    }
    if payload.referral_code.is_none() {
        payload.referral_code = request_referral(&req);
    }

    log::info!(
        "invoice submit viewer_id={} product_type={} product_id={} total={} channel={}",
        session.viewer_id,
        payload.product_type.as_str(),
        payload.product_id,
        payload.total_amount,
        payload.payment_channel
    );

    let backend = state.backend.as_ref();
    let created = InvoiceSubmitter::new(backend, backend)
        .submit(&session, &payload)
        .await
        .map_err(|e| ApiError::payment(e, &state.config.support_contact_url))?;

    Ok(HttpResponse::Ok().json(InvoiceResponse {
        payment_url: created.payment_url,
    }))
}

#[utoipa::path(
    post,
    path = "/api/checkout/state",
    tag = "checkout",
    request_body = CheckoutContext,
    responses((status = 200, description = "View the checkout page renders", body = CheckoutView))
)]
#[post("/state")]
pub async fn checkout_view(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: Option<web::ReqData<Viewer>>,
    payload: web::Json<CheckoutContext>,
) -> HttpResponse {
    let referral_code = request_referral(&req);
    let view = checkout_state::derive(
        viewer.as_deref(),
        &payload,
        ReferralInfo {
            code: referral_code.clone(),
        },
        &state.config.support_contact_url,
        Utc::now(),
    );

    let mut resp = HttpResponse::Ok().json(view);
    remember_referral(&mut resp, referral_code.as_deref());
    resp
}

#[utoipa::path(
    post,
    path = "/api/checkout/proof",
    tag = "checkout",
    responses(
        (status = 200, description = "Proof forwarded to the platform"),
        (status = 401, description = "Login required"),
        (status = 422, description = "Not an image or larger than 2MB")
    )
)]
#[post("/proof")]
pub async fn upload_proof(
    state: web::Data<AppState>,
    session: Option<web::ReqData<ViewerSession>>,
    query: web::Query<ProofQuery>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let Some(session) = session else {
        return Err(ApiError::Unauthorized);
    };

    let mut proof: Option<(String, Option<String>, Vec<u8>)> = None;

    // The first field carrying a filename is the proof; plain form fields
    // before it are drained and skipped.
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadRequest(format!("multipart error: {e}")))?;

        let Some(filename) = field
            .content_disposition()
            .get_filename()
            .map(upload::sanitize_filename)
        else {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| ApiError::BadRequest(format!("multipart error: {e}")))?;
            }
            continue;
        };
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        // Type check before reading the body.
        upload::validate_proof(content_type.as_deref(), 1)?;

        let mut file_bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let data =
                chunk.map_err(|e| ApiError::BadRequest(format!("multipart error: {e}")))?;
            if file_bytes.len() + data.len() > MAX_PROOF_BYTES {
                return Err(UploadError::TooLarge {
                    size: file_bytes.len() + data.len(),
                }
                .into());
            }
            file_bytes.extend_from_slice(&data);
        }

        proof = Some((filename, content_type, file_bytes));
        break;
    }

    let Some((filename, content_type, file_bytes)) = proof else {
        return Err(UploadError::Empty.into());
    };
    upload::validate_proof(content_type.as_deref(), file_bytes.len())?;
    let content_type = content_type.unwrap_or_default();

    let reply = state
        .backend
        .upload_enrollment_proof(
            &session,
            query.product_type.as_str(),
            query.product_id,
            filename,
            &content_type,
            file_bytes,
        )
        .await?;

    Ok(HttpResponse::Ok().json(reply))
}

#[utoipa::path(
    post,
    path = "/api/checkout/referral-link",
    tag = "checkout",
    request_body = ReferralLinkRequest,
    responses(
        (status = 200, description = "Link carrying the referral code", body = ReferralLinkResponse),
        (status = 422, description = "Invalid link")
    )
)]
#[post("/referral-link")]
pub async fn referral_link(
    req: HttpRequest,
    payload: web::Json<ReferralLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    let code = payload.code.clone().or_else(|| request_referral(&req));

    let url = match code.as_deref() {
        Some(code) => referral::with_referral(&payload.url, code)?,
        None => payload.url.clone(),
    };

    Ok(HttpResponse::Ok().json(ReferralLinkResponse { url }))
}
