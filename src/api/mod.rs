pub mod auth;
pub mod backend_client;
pub mod checkout;

use actix_web::web;

/// Mounts the checkout routes under `/api/checkout`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/checkout")
            .wrap(auth::ViewerMiddleware)
            .service(checkout::quote)
            .service(checkout::validate_promo)
            .service(checkout::create_invoice)
            .service(checkout::checkout_view)
            .service(checkout::upload_proof)
            .service(checkout::referral_link),
    );
}
