// ── Coupon domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::ids::{CouponCode, PrincipalId};

/// What a coupon grants when redeemed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CouponType {
    /// Sponsors on-chain gas up to `max_amount_per_use` per redemption.
    GasSponsorship,
    Discount,
    FeatureUnlock,
}

impl CouponType {
    /// Prefix used when a code is generated for this type.
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::GasSponsorship => "GAS",
            Self::Discount => "DSC",
            Self::FeatureUnlock => "FTR",
        }
    }
}

/// A redeemable authorization token with a bounded use count.
///
/// `uses_count <= max_uses` holds for every stored coupon. The only
/// mutations after creation are redemption increments and soft expiry,
/// each of which bumps `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: CouponCode,
    #[serde(rename = "type")]
    pub coupon_type: CouponType,
    pub max_uses: u32,
    pub uses_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount_per_use: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: PrincipalId,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency version, bumped on every mutation.
    #[serde(default)]
    pub version: u64,
}

impl Coupon {
    pub fn remaining_uses(&self) -> u32 {
        self.max_uses.saturating_sub(self.uses_count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.uses_count >= self.max_uses
    }

    /// Expiry is exclusive: a coupon expiring at `t` is unusable at `t`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_exhausted() && !self.is_expired_at(now)
    }
}

/// Request to create a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCoupon {
    /// User-supplied code; generated from the type prefix when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub coupon_type: CouponType,
    #[serde(default = "default_max_uses")]
    pub max_uses: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount_per_use: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_max_uses() -> u32 {
    1
}

impl NewCoupon {
    pub fn new(coupon_type: CouponType) -> Self {
        Self {
            code: None,
            coupon_type,
            max_uses: default_max_uses(),
            max_amount_per_use: None,
            expires_at: None,
            description: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = max_uses;
        self
    }

    pub fn with_max_amount_per_use(mut self, cap: u64) -> Self {
        self.max_amount_per_use = Some(cap);
        self
    }

    pub fn with_expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Generate a fresh code such as `GAS-1F3A9C07`.
pub(crate) fn generate_code(coupon_type: CouponType) -> CouponCode {
    let simple = Uuid::new_v4().simple().to_string();
    let suffix = simple.get(..8).unwrap_or(&simple);
    CouponCode::new(format!("{}-{suffix}", coupon_type.code_prefix()))
}
