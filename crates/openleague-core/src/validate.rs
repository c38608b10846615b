// ── Coupon eligibility ──
//
// Pure checks against time and usage. No locking, no side effects:
// the redeemer calls the same function again under the row lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Coupon, CouponCode, CouponType};

/// What a caller may still do with a valid coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub code: CouponCode,
    #[serde(rename = "type")]
    pub coupon_type: CouponType,
    pub remaining_uses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount_per_use: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Check whether `coupon` can be redeemed at `now`.
///
/// Expiry is checked first, so an expired coupon reports `Expired` even
/// when it is also exhausted.
pub fn validate(coupon: &Coupon, now: DateTime<Utc>) -> Result<Eligibility, CoreError> {
    if let Some(expired_at) = coupon.expires_at.filter(|at| now >= *at) {
        return Err(CoreError::Expired {
            code: coupon.code.to_string(),
            expired_at,
        });
    }

    if coupon.is_exhausted() {
        return Err(CoreError::Exhausted {
            code: coupon.code.to_string(),
            max_uses: coupon.max_uses,
        });
    }

    Ok(Eligibility {
        code: coupon.code.clone(),
        coupon_type: coupon.coupon_type,
        remaining_uses: coupon.remaining_uses(),
        max_amount_per_use: coupon.max_amount_per_use,
        expires_at: coupon.expires_at,
    })
}
