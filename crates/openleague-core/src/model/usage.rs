// ── Coupon usage records ──
//
// Append-only audit entries, one per successful redemption.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::CouponCode;

/// Immutable audit entry for one redemption event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponUsageRecord {
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub code: CouponCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    pub used_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Caller-supplied inputs for one redemption attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl RedeemRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Build the record this request produces when committed at `now`.
    pub(crate) fn to_record(
        &self,
        coupon_id: Uuid,
        code: CouponCode,
        now: DateTime<Utc>,
    ) -> CouponUsageRecord {
        CouponUsageRecord {
            id: Uuid::new_v4(),
            coupon_id,
            code,
            amount: self.amount,
            used_at: now,
            tx_hash: self.tx_hash.clone(),
            metadata: self.metadata.clone(),
            ip_address: self.ip_address.clone(),
        }
    }
}
