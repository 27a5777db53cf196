#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use edu_checkout::AppState;
use edu_checkout::api::auth::issue_token;
use edu_checkout::api::backend_client::BackendError;
use edu_checkout::config::Config;
use edu_checkout::invoice::{CsrfTokenProvider, InvoicePayload, InvoiceTransport, TransportReply};
use edu_checkout::models::{
    ChannelGroup, FeeSchedule, InvoiceStatus, PaymentChannel, PendingInvoice, Product,
    ProductType, Viewer, ViewerSession,
};

pub const JWT_SECRET: &str = "test-secret";
pub const SUPPORT_CONTACT: &str = "https://wa.me/6281234567890";

pub fn build_state(backend_url: &str) -> AppState {
    let mut config = Config::with_backend(backend_url, JWT_SECRET);
    config.promo_settle = Duration::from_millis(1);
    AppState::new(config).expect("build app state")
}

pub fn bearer(viewer: &Viewer) -> String {
    let token = issue_token(viewer, JWT_SECRET, chrono::Duration::hours(1)).expect("sign token");
    format!("Bearer {token}")
}

pub fn viewer() -> Viewer {
    Viewer {
        id: 42,
        profile_complete: true,
    }
}

pub fn session(viewer: &Viewer) -> ViewerSession {
    ViewerSession {
        viewer_id: viewer.id,
        bearer: issue_token(viewer, JWT_SECRET, chrono::Duration::hours(1)).expect("sign token"),
    }
}

pub fn course(price: i64) -> Product {
    Product {
        id: 7,
        title: "Rust untuk Pemula".to_string(),
        product_type: ProductType::Course,
        price,
        strikethrough_price: Some(750_000),
        status: "published".to_string(),
        starts_at: None,
    }
}

pub fn channel(code: &str, flat: i64, percent: f64) -> PaymentChannel {
    PaymentChannel {
        code: code.to_string(),
        name: code.to_uppercase(),
        group: ChannelGroup::VirtualAccount,
        icon_url: None,
        fee_customer: FeeSchedule { flat, percent },
        fee_merchant: FeeSchedule::default(),
        minimum_amount: None,
        maximum_amount: None,
        active: true,
    }
}

pub fn pending_invoice(status: InvoiceStatus, expires_at: DateTime<Utc>) -> PendingInvoice {
    PendingInvoice {
        id: 1,
        invoice_code: "INV-2026-0001".to_string(),
        status,
        amount: 461_500,
        payment_channel: "BRIVA".to_string(),
        va_number: Some("88810123456789".to_string()),
        qr_code_url: None,
        payment_url: None,
        expires_at,
    }
}

pub fn invoice_payload() -> InvoicePayload {
    InvoicePayload {
        product_type: ProductType::Course,
        product_id: 7,
        discount_amount: 50_000,
        nett_amount: 450_000,
        total_amount: 461_500,
        payment_channel: "BRIVA".to_string(),
        discount_code_id: Some(3),
        discount_code_amount: Some(50_000),
        referral_code: None,
    }
}

/// Replays a fixed script of transport replies and records what was sent.
pub struct ScriptedTransport {
    replies: Mutex<Vec<TransportReply>>,
    pub tokens_seen: Mutex<Vec<String>>,
    pub keys_seen: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(mut replies: Vec<TransportReply>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            tokens_seen: Mutex::new(Vec::new()),
            keys_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> usize {
        self.tokens_seen.lock().unwrap().len()
    }
}

#[async_trait]
impl InvoiceTransport for ScriptedTransport {
    async fn post_invoice(
        &self,
        _session: &ViewerSession,
        _payload: &InvoicePayload,
        csrf_token: &str,
        idempotency_key: &str,
    ) -> Result<TransportReply, BackendError> {
        self.tokens_seen.lock().unwrap().push(csrf_token.to_string());
        self.keys_seen.lock().unwrap().push(idempotency_key.to_string());
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop()
            .expect("transport called more times than scripted"))
    }
}

/// Hands out `token-0`, then `token-1`, `token-2`, ... on each refresh.
#[derive(Default)]
pub struct CountingTokens {
    pub refreshes: AtomicU32,
}

impl CountingTokens {
    pub fn refreshes(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CsrfTokenProvider for CountingTokens {
    async fn current(&self, _session: &ViewerSession) -> Result<String, BackendError> {
        Ok(format!("token-{}", self.refreshes()))
    }

    async fn refresh(&self, _session: &ViewerSession) -> Result<String, BackendError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{n}"))
    }
}
