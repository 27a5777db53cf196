// src/promo.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::backend_client::BackendError;
use crate::models::{DiscountValidation, ProductType, ViewerSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PromoRequest {
    pub code: String,
    pub amount: i64,
    pub product_type: ProductType,
    pub product_id: i64,
}

#[async_trait]
pub trait DiscountValidator: Send + Sync {
    async fn validate_discount(
        &self,
        session: &ViewerSession,
        req: &PromoRequest,
    ) -> Result<DiscountValidation, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromoOutcome {
    Applied { validation: DiscountValidation },
    /// Any previously applied discount must be dropped.
    Rejected { message: String },
    Cleared,
    /// A newer edit for the same checkout exists; ignore this one.
    Superseded,
}

/// Debounced promo validation, keyed by viewer and product.
///
/// Every call takes a fresh generation and waits `settle` before going to
/// the backend. A call that is no longer the latest when the wait ends, or
/// when the backend answers, resolves to `Superseded`. Generations come from
/// one process-wide counter so a key that was dropped and re-created never
/// reuses a value an older call still holds.
pub struct PromoValidator {
    settle: Duration,
    next_generation: AtomicU64,
    generations: DashMap<String, u64>,
}

impl PromoValidator {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            next_generation: AtomicU64::new(0),
            generations: DashMap::new(),
        }
    }

    pub fn session_key(session: &ViewerSession, req: &PromoRequest) -> String {
        format!(
            "{}:{}:{}",
            session.viewer_id,
            req.product_type.as_str(),
            req.product_id
        )
    }

    /// Checkouts with a validation still in flight.
    pub fn in_flight(&self) -> usize {
        self.generations.len()
    }

    fn bump(&self, key: &str) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.generations.insert(key.to_string(), generation);
        generation
    }

    fn is_latest(&self, key: &str, generation: u64) -> bool {
        self.generations
            .get(key)
            .is_some_and(|current| *current == generation)
    }

    pub async fn validate(
        &self,
        backend: &dyn DiscountValidator,
        session: &ViewerSession,
        req: &PromoRequest,
    ) -> Result<PromoOutcome, BackendError> {
        let key = Self::session_key(session, req);
        let claim = GenerationClaim {
            generations: &self.generations,
            generation: self.bump(&key),
            key,
        };
        self.settle_and_check(backend, session, &claim.key, claim.generation, req)
            .await
    }

    async fn settle_and_check(
        &self,
        backend: &dyn DiscountValidator,
        session: &ViewerSession,
        key: &str,
        generation: u64,
        req: &PromoRequest,
    ) -> Result<PromoOutcome, BackendError> {
        let code = req.code.trim();
        if code.is_empty() {
            return Ok(PromoOutcome::Cleared);
        }

        tokio::time::sleep(self.settle).await;
        if !self.is_latest(key, generation) {
            return Ok(PromoOutcome::Superseded);
        }

        let req = PromoRequest {
            code: code.to_string(),
            ..req.clone()
        };
        let validation = backend.validate_discount(session, &req).await?;

        if !self.is_latest(key, generation) {
            log::info!("stale promo response dropped key={} code={}", key, req.code);
            return Ok(PromoOutcome::Superseded);
        }

        if validation.valid {
            Ok(PromoOutcome::Applied { validation })
        } else {
            let message = validation
                .message
                .unwrap_or_else(|| "Kode promo tidak valid".to_string());
            log::info!("promo rejected code={} message={}", req.code, message);
            Ok(PromoOutcome::Rejected { message })
        }
    }
}

/// Releases the key's entry when its call finishes or is dropped mid-wait,
/// unless a newer call has taken the key since.
struct GenerationClaim<'a> {
    generations: &'a DashMap<String, u64>,
    key: String,
    generation: u64,
}

impl Drop for GenerationClaim<'_> {
    fn drop(&mut self) {
        let generation = self.generation;
        self.generations
            .remove_if(&self.key, |_, current| *current == generation);
    }
}
