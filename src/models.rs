// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Course,
    Bootcamp,
    Webinar,
    Bundle,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Course => "course",
            ProductType::Bootcamp => "bootcamp",
            ProductType::Webinar => "webinar",
            ProductType::Bundle => "bundle",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub product_type: ProductType,
    /// Integer Rupiah.
    pub price: i64,
    pub strikethrough_price: Option<i64>,
    pub status: String, // draft | published | archived
    pub starts_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Fixed,
    Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscountCode {
    pub id: i64,
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: f64,
}

/// Backend reply of `POST /api/discount-codes/validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscountValidation {
    pub valid: bool,
    #[serde(default)]
    pub discount_amount: i64,
    #[serde(default)]
    pub final_amount: i64,
    #[serde(default)]
    pub discount_code: Option<DiscountCode>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeeSchedule {
    #[serde(default)]
    pub flat: i64,
    #[serde(default)]
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGroup {
    VirtualAccount,
    Qris,
    EWallet,
    Retail,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentChannel {
    pub code: String,
    pub name: String,
    pub group: ChannelGroup,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub fee_customer: FeeSchedule,
    #[serde(default)]
    pub fee_merchant: FeeSchedule,
    #[serde(default)]
    pub minimum_amount: Option<i64>,
    #[serde(default)]
    pub maximum_amount: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Expired,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PendingInvoice {
    pub id: i64,
    pub invoice_code: String,
    pub status: InvoiceStatus,
    pub amount: i64,
    pub payment_channel: String,
    #[serde(default)]
    pub va_number: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub payment_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReferralInfo {
    pub code: Option<String>,
}

/// Signed-in user as seen by the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Viewer {
    pub id: i64,
    #[serde(default)]
    pub profile_complete: bool,
}

/// Credential the checkout forwards to the backend on the viewer's behalf.
/// The backend owns the session, so the CSRF token and the invoice both
/// belong to whoever this bearer identifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSession {
    pub viewer_id: i64,
    pub bearer: String,
}
