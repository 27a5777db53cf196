// src/expiry.rs

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use utoipa::ToSchema;

const HOUR_SECS: i64 = 60 * 60;
const URGENT_WINDOW_SECS: i64 = 3 * HOUR_SECS;

/// Cosmetic countdown state of a pending invoice. The backend stays the
/// authority on the real payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExpiryBucket {
    Normal { hours: i64, minutes: i64 },
    Urgent { hours: i64, minutes: i64 },
    Expired,
}

pub fn bucket(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> ExpiryBucket {
    let left = expires_at - now;
    if left <= TimeDelta::zero() {
        return ExpiryBucket::Expired;
    }
    let remaining = left.num_seconds();

    // The last hour counts down in minutes only, never below one.
    if remaining <= HOUR_SECS {
        return ExpiryBucket::Urgent {
            hours: 0,
            minutes: (remaining / 60).max(1),
        };
    }

    let hours = remaining / HOUR_SECS;
    let minutes = (remaining % HOUR_SECS) / 60;

    if remaining <= URGENT_WINDOW_SECS {
        ExpiryBucket::Urgent { hours, minutes }
    } else {
        ExpiryBucket::Normal { hours, minutes }
    }
}

impl ExpiryBucket {
    pub fn is_expired(&self) -> bool {
        matches!(self, ExpiryBucket::Expired)
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, ExpiryBucket::Urgent { .. })
    }

    /// Countdown text shown on the pending invoice banner.
    pub fn label(&self) -> String {
        match *self {
            ExpiryBucket::Expired => "Kedaluwarsa".to_string(),
            ExpiryBucket::Urgent { hours: 0, minutes }
            | ExpiryBucket::Normal { hours: 0, minutes } => {
                format!("Berakhir dalam {minutes} menit")
            }
            ExpiryBucket::Urgent { hours, minutes } | ExpiryBucket::Normal { hours, minutes } => {
                if minutes == 0 {
                    format!("Berakhir dalam {hours} jam")
                } else {
                    format!("Berakhir dalam {hours} jam {minutes} menit")
                }
            }
        }
    }
}
