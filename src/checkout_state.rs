// src/checkout_state.rs
//
// Picks the one view the checkout page renders from the props the platform
// passes in. Display-only: the backend decides the real invoice status on
// the next load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::expiry::{self, ExpiryBucket};
use crate::models::{
    InvoiceStatus, PaymentChannel, PendingInvoice, Product, ReferralInfo, Viewer,
};
use crate::pricing::{self, PriceQuote};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutContext {
    pub product: Product,
    #[serde(default)]
    pub has_access: bool,
    #[serde(default)]
    pub pending_invoice: Option<PendingInvoice>,
    #[serde(default)]
    pub channels: Vec<PaymentChannel>,
    #[serde(default)]
    pub discount_amount: Option<i64>,
    #[serde(default)]
    pub selected_channel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CheckoutView {
    LoginRequired,
    ProfileIncomplete,
    AlreadyHasAccess,
    AccessGranted {
        invoice_code: String,
    },
    InvoiceExpired {
        invoice_code: String,
        support_contact: String,
    },
    PendingInvoice {
        invoice: PendingInvoice,
        bucket: ExpiryBucket,
        label: String,
    },
    PaymentForm {
        quote: PriceQuote,
        channels: Vec<PaymentChannel>,
        referral: ReferralInfo,
    },
}

pub fn derive(
    viewer: Option<&Viewer>,
    ctx: &CheckoutContext,
    referral: ReferralInfo,
    support_contact: &str,
    now: DateTime<Utc>,
) -> CheckoutView {
    let Some(viewer) = viewer else {
        return CheckoutView::LoginRequired;
    };
    if !viewer.profile_complete {
        return CheckoutView::ProfileIncomplete;
    }
    if ctx.has_access {
        return CheckoutView::AlreadyHasAccess;
    }

    if let Some(invoice) = &ctx.pending_invoice {
        let bucket = expiry::bucket(invoice.expires_at, now);
        return match invoice.status {
            InvoiceStatus::Paid => CheckoutView::AccessGranted {
                invoice_code: invoice.invoice_code.clone(),
            },
            InvoiceStatus::Expired | InvoiceStatus::Failed => CheckoutView::InvoiceExpired {
                invoice_code: invoice.invoice_code.clone(),
                support_contact: support_contact.to_string(),
            },
            InvoiceStatus::Pending if bucket.is_expired() => CheckoutView::InvoiceExpired {
                invoice_code: invoice.invoice_code.clone(),
                support_contact: support_contact.to_string(),
            },
            InvoiceStatus::Pending => CheckoutView::PendingInvoice {
                invoice: invoice.clone(),
                label: bucket.label(),
                bucket,
            },
        };
    }

    let selected = ctx
        .selected_channel
        .as_deref()
        .and_then(|code| ctx.channels.iter().find(|ch| ch.code == code));

    let product = &ctx.product;
    let quote = pricing::quote_with(
        product.price,
        product.strikethrough_price,
        ctx.discount_amount,
        selected,
    );
    let channels = if quote.is_free {
        Vec::new()
    } else {
        pricing::available_channels(&ctx.channels, quote.final_price)
    };

    CheckoutView::PaymentForm {
        quote,
        channels,
        referral,
    }
}
