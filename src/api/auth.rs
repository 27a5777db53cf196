// src/api/auth.rs

use actix_web::Error;
use actix_web::HttpMessage;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::web;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::task::{Context, Poll};

use crate::AppState;
use crate::models::{Viewer, ViewerSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    #[serde(default)]
    pub profile_complete: bool,
}

pub fn decode_viewer(token: &str, secret: &str) -> Option<Viewer> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .ok()
    .map(|data| Viewer {
        id: data.claims.sub,
        profile_complete: data.claims.profile_complete,
    })
}

/// Issues a viewer token; the platform does this at login, tests use it to
/// sign requests.
pub fn issue_token(
    viewer: &Viewer,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims {
        sub: viewer.id,
        exp,
        profile_complete: viewer.profile_complete,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

/// Middleware that:
/// - reads `Authorization: Bearer <jwt>` when present
/// - validates the JWT
/// - puts the `Viewer` into `req.extensions_mut()`, together with a
///   `ViewerSession` that carries the bearer on to the backend
///
/// A missing or invalid token lets the request through anonymously; the
/// checkout page then renders "login required".
pub struct ViewerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for ViewerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ViewerMiddlewareInner<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ViewerMiddlewareInner { service }))
    }
}

pub struct ViewerMiddlewareInner<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ViewerMiddlewareInner<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let secret = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.config.jwt_secret.clone());

        let token = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        match (secret, token) {
            (Some(secret), Some(token)) => match decode_viewer(&token, &secret) {
                Some(viewer) => {
                    let session = ViewerSession {
                        viewer_id: viewer.id,
                        bearer: token,
                    };
                    let mut ext = req.extensions_mut();
                    ext.insert(viewer);
                    ext.insert(session);
                }
                None => log::warn!("invalid viewer token, continuing anonymously"),
            },
            (None, Some(_)) => log::error!("viewer token sent but app state is missing"),
            _ => {}
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}
