use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::checkout::quote,
        crate::api::checkout::validate_promo,
        crate::api::checkout::create_invoice,
        crate::api::checkout::checkout_view,
        crate::api::checkout::upload_proof,
        crate::api::checkout::referral_link
    ),
    components(
        schemas(
            crate::models::ProductType,
            crate::models::Product,
            crate::models::DiscountType,
            crate::models::DiscountCode,
            crate::models::DiscountValidation,
            crate::models::FeeSchedule,
            crate::models::ChannelGroup,
            crate::models::PaymentChannel,
            crate::models::InvoiceStatus,
            crate::models::PendingInvoice,
            crate::models::ReferralInfo,
            crate::pricing::PriceInput,
            crate::pricing::PriceQuote,
            crate::promo::PromoRequest,
            crate::promo::PromoOutcome,
            crate::invoice::InvoicePayload,
            crate::expiry::ExpiryBucket,
            crate::checkout_state::CheckoutContext,
            crate::checkout_state::CheckoutView,
            crate::api::checkout::InvoiceResponse,
            crate::api::checkout::ReferralLinkRequest,
            crate::api::checkout::ReferralLinkResponse
        )
    ),
    tags(
        (name = "checkout", description = "Checkout price, promo, invoice and view state")
    )
)]
pub struct ApiDoc;
