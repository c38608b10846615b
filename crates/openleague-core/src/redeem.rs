// ── Coupon redemption ──
//
// Validate-then-consume. The read is optimistic: the commit carries the
// version observed at validation time and the store refuses it if the
// row moved underneath us. Conflicts are retried a bounded number of
// times; every retry re-reads, so a coupon drained by a concurrent
// request surfaces as `Exhausted`, never as a double spend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::RedemptionConfig;
use crate::error::CoreError;
use crate::model::{Coupon, CouponCode, CouponUsageRecord, RedeemRequest};
use crate::store::CouponStore;
use crate::validate::validate;

/// Runs redemptions against a shared store.
#[derive(Clone)]
pub struct Redeemer {
    store: Arc<dyn CouponStore>,
    config: RedemptionConfig,
}

impl Redeemer {
    pub fn new(store: Arc<dyn CouponStore>, config: RedemptionConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RedemptionConfig {
        &self.config
    }

    /// Redeem once, retrying only on `StorageConflict`.
    pub async fn redeem(&self, request: &RedeemRequest) -> Result<CouponUsageRecord, CoreError> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_redeem(request, Utc::now()) {
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        code = %request.code,
                        attempt,
                        max_retries = self.config.max_retries,
                        "redemption conflicted, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                result => return result,
            }
        }
    }

    /// A single validate-then-commit attempt evaluated at `now`.
    pub fn try_redeem(
        &self,
        request: &RedeemRequest,
        now: DateTime<Utc>,
    ) -> Result<CouponUsageRecord, CoreError> {
        let code = CouponCode::new(&request.code);
        let coupon = self
            .store
            .find_by_code(&code)?
            .ok_or_else(|| CoreError::NotFound {
                code: code.to_string(),
            })?;

        validate(&coupon, now)?;
        check_amount(&coupon, request.amount, &self.config)?;

        let record = request.to_record(coupon.id, coupon.code.clone(), now);
        let updated = self
            .store
            .commit_redemption(&coupon.code, coupon.version, record.clone())?;

        info!(
            code = %updated.code,
            uses = updated.uses_count,
            max_uses = updated.max_uses,
            amount = ?record.amount,
            "coupon redeemed"
        );
        Ok(record)
    }
}

/// Enforce `max_amount_per_use` for coupon types configured to cap amounts.
///
/// No amount, or no cap on the coupon, always passes.
pub fn check_amount(
    coupon: &Coupon,
    amount: Option<u64>,
    config: &RedemptionConfig,
) -> Result<(), CoreError> {
    if !config.enforces_amount_cap(coupon.coupon_type) {
        return Ok(());
    }
    match (amount, coupon.max_amount_per_use) {
        (Some(amount), Some(cap)) if amount > cap => {
            debug!(code = %coupon.code, amount, cap, "amount over per-use cap");
            Err(CoreError::AmountExceeded {
                code: coupon.code.to_string(),
                amount,
                cap,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CouponType, PrincipalId};
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn coupon(code: &str, coupon_type: CouponType, max_uses: u32) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: CouponCode::new(code),
            coupon_type,
            max_uses,
            uses_count: 0,
            max_amount_per_use: None,
            expires_at: None,
            description: None,
            created_by: PrincipalId::from("admin"),
            created_at: Utc::now(),
            version: 0,
        }
    }

    fn redeemer_with(coupons: Vec<Coupon>) -> (Arc<MemoryStore>, Redeemer) {
        let store = Arc::new(MemoryStore::new());
        for c in coupons {
            store.insert(c).unwrap();
        }
        let redeemer = Redeemer::new(store.clone(), RedemptionConfig::default());
        (store, redeemer)
    }

    #[test]
    fn gas_coupon_with_two_uses() {
        let (store, redeemer) =
            redeemer_with(vec![coupon("GAS-1", CouponType::GasSponsorship, 2)]);
        let now = Utc::now();
        let req = RedeemRequest::new("GAS-1");

        redeemer.try_redeem(&req, now).unwrap();
        redeemer.try_redeem(&req, now).unwrap();
        let err = redeemer.try_redeem(&req, now).unwrap_err();

        assert!(matches!(err, CoreError::Exhausted { .. }));
        let stored = store.find_by_code(&CouponCode::new("GAS-1")).unwrap().unwrap();
        assert_eq!(stored.uses_count, 2);
        assert_eq!(store.usage_for(&stored.code).unwrap().len(), 2);
    }

    #[test]
    fn expired_coupon_is_never_redeemed() {
        let mut old = coupon("OLD-1", CouponType::Discount, 5);
        old.expires_at = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let (store, redeemer) = redeemer_with(vec![old]);

        let err = redeemer
            .try_redeem(&RedeemRequest::new("OLD-1"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Expired { .. }));
        assert!(store.usage_for(&CouponCode::new("OLD-1")).unwrap().is_empty());
    }

    #[test]
    fn amount_cap_on_gas_sponsorship() {
        let mut gas = coupon("GAS-CAP", CouponType::GasSponsorship, 3);
        gas.max_amount_per_use = Some(100);
        let (_store, redeemer) = redeemer_with(vec![gas]);
        let now = Utc::now();

        let err = redeemer
            .try_redeem(&RedeemRequest::new("GAS-CAP").with_amount(150), now)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::AmountExceeded {
                amount: 150,
                cap: 100,
                ..
            }
        ));

        let record = redeemer
            .try_redeem(&RedeemRequest::new("GAS-CAP").with_amount(50), now)
            .unwrap();
        assert_eq!(record.amount, Some(50));
    }

    #[test]
    fn amount_equal_to_cap_passes() {
        let mut gas = coupon("GAS-EQ", CouponType::GasSponsorship, 1);
        gas.max_amount_per_use = Some(100);
        let config = RedemptionConfig::default();

        check_amount(&gas, Some(100), &config).unwrap();
        assert!(check_amount(&gas, Some(101), &config).is_err());

        let (store, redeemer) = redeemer_with(vec![gas]);
        let record = redeemer
            .try_redeem(&RedeemRequest::new("GAS-EQ").with_amount(100), Utc::now())
            .unwrap();
        assert_eq!(record.amount, Some(100));
        let stored = store.find_by_code(&CouponCode::new("GAS-EQ")).unwrap().unwrap();
        assert_eq!(stored.uses_count, 1);
    }

    #[test]
    fn capped_coupon_without_amount_passes() {
        let mut gas = coupon("GAS-NA", CouponType::GasSponsorship, 2);
        gas.max_amount_per_use = Some(100);
        check_amount(&gas, None, &RedemptionConfig::default()).unwrap();

        let (_store, redeemer) = redeemer_with(vec![gas]);
        let record = redeemer
            .try_redeem(&RedeemRequest::new("GAS-NA"), Utc::now())
            .unwrap();
        assert_eq!(record.amount, None);
    }

    #[test]
    fn amount_cap_ignored_for_unconfigured_types() {
        let mut discount = coupon("DSC-1", CouponType::Discount, 1);
        discount.max_amount_per_use = Some(10);
        let (_store, redeemer) = redeemer_with(vec![discount]);

        let record = redeemer
            .try_redeem(&RedeemRequest::new("DSC-1").with_amount(500), Utc::now())
            .unwrap();
        assert_eq!(record.amount, Some(500));
    }

    #[test]
    fn record_carries_request_fields() {
        let (_store, redeemer) =
            redeemer_with(vec![coupon("FTR-1", CouponType::FeatureUnlock, 1)]);
        let now = Utc::now();
        let req = RedeemRequest::new("ftr-1")
            .with_tx_hash("0xdeadbeef")
            .with_ip_address("203.0.113.7")
            .with_metadata(serde_json::json!({ "tournament": "spring-cup" }));

        let record = redeemer.try_redeem(&req, now).unwrap();
        assert_eq!(record.code.as_str(), "FTR-1");
        assert_eq!(record.used_at, now);
        assert_eq!(record.tx_hash.as_deref(), Some("0xdeadbeef"));
        assert_eq!(record.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(record.metadata.unwrap()["tournament"], "spring-cup");
    }

    #[test]
    fn unknown_code_is_not_found() {
        let (_store, redeemer) = redeemer_with(Vec::new());
        let err = redeemer
            .try_redeem(&RedeemRequest::new("NOPE"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn expiry_is_checked_at_redemption_time() {
        let mut c = coupon("SOON-1", CouponType::Discount, 1);
        let now = Utc::now();
        c.expires_at = Some(now + Duration::seconds(30));
        let (_store, redeemer) = redeemer_with(vec![c]);

        let err = redeemer
            .try_redeem(&RedeemRequest::new("SOON-1"), now + Duration::minutes(1))
            .unwrap_err();
        assert!(matches!(err, CoreError::Expired { .. }));
    }

    #[tokio::test]
    async fn async_redeem_succeeds_without_contention() {
        let (_store, redeemer) = redeemer_with(vec![coupon("GAS-2", CouponType::Discount, 1)]);
        let record = redeemer.redeem(&RedeemRequest::new("GAS-2")).await.unwrap();
        assert_eq!(record.code.as_str(), "GAS-2");
    }
}
