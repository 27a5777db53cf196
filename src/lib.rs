pub mod api;
pub mod checkout_state;
pub mod config;
pub mod docs;
pub mod error;
pub mod expiry;
pub mod invoice;
pub mod models;
pub mod pricing;
pub mod promo;
pub mod referral;
pub mod upload;

use std::sync::Arc;

use api::backend_client::BackendClient;
use config::Config;
use promo::PromoValidator;

pub struct AppState {
    pub config: Config,
    pub backend: Arc<BackendClient>,
    pub promo: PromoValidator,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, api::backend_client::BackendError> {
        let backend = Arc::new(BackendClient::new(&config)?);
        let promo = PromoValidator::new(config.promo_settle);
        Ok(Self {
            config,
            backend,
            promo,
        })
    }
}
