// ── Runtime redemption configuration ──
//
// Tuning for the redemption path. Built by the config crate or by
// embedding code and handed to `CouponService`; core never reads files.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::model::CouponType;

/// Configuration for a [`CouponService`](crate::CouponService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionConfig {
    /// How many times a redemption is retried after a storage conflict.
    pub max_retries: u32,
    /// Base delay between retries; attempt `n` waits `n * retry_backoff`.
    pub retry_backoff: Duration,
    /// Coupon types whose `max_amount_per_use` is enforced on redemption.
    pub amount_cap_types: BTreeSet<CouponType>,
    /// Capacity of the redemption broadcast channel.
    pub event_buffer: usize,
}

impl RedemptionConfig {
    pub fn enforces_amount_cap(&self, coupon_type: CouponType) -> bool {
        self.amount_cap_types.contains(&coupon_type)
    }
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff: Duration::from_millis(10),
            amount_cap_types: BTreeSet::from([CouponType::GasSponsorship]),
            event_buffer: 256,
        }
    }
}
