// ── Coupon service ──
//
// Facade tying store, redeemer, and access guard together. Cheaply
// cloneable; every clone shares the same store and event channel.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RedemptionConfig;
use crate::error::CoreError;
use crate::guard::authorize;
use crate::model::{
    Coupon, CouponCode, CouponUsageRecord, NewCoupon, Principal, RedeemRequest, Role,
    generate_code,
};
use crate::redeem::Redeemer;
use crate::store::CouponStore;
use crate::validate::{Eligibility, validate};

/// Roles allowed to administer coupons they do not own.
const COUPON_ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];

/// Any authenticated principal may redeem.
const REDEEMER_ROLES: &[Role] = &[Role::User, Role::Admin, Role::SuperAdmin];

/// The main entry point for consumers.
#[derive(Clone)]
pub struct CouponService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    store: Arc<dyn CouponStore>,
    redeemer: Redeemer,
    redeemed_tx: broadcast::Sender<Arc<CouponUsageRecord>>,
}

impl CouponService {
    pub fn new(store: Arc<dyn CouponStore>, config: RedemptionConfig) -> Self {
        let (redeemed_tx, _) = broadcast::channel(config.event_buffer.max(1));
        let redeemer = Redeemer::new(Arc::clone(&store), config);
        Self {
            inner: Arc::new(ServiceInner {
                store,
                redeemer,
                redeemed_tx,
            }),
        }
    }

    pub fn config(&self) -> &RedemptionConfig {
        self.inner.redeemer.config()
    }

    // ── Administration ───────────────────────────────────────────

    /// Create a coupon. Requires an admin role or the super-admin flag.
    pub fn create_coupon(&self, actor: &Principal, request: NewCoupon) -> Result<Coupon, CoreError> {
        authorize(actor, None, COUPON_ADMIN_ROLES).into_result("create coupons")?;

        let now = Utc::now();
        if request.max_uses == 0 {
            return Err(CoreError::Validation {
                field: "max_uses".into(),
                reason: "must be at least 1".into(),
            });
        }
        if let Some(expires_at) = request.expires_at.filter(|at| *at <= now) {
            return Err(CoreError::Validation {
                field: "expires_at".into(),
                reason: format!("{expires_at} is not in the future"),
            });
        }

        let code = match request.code.as_deref() {
            Some(raw) => CouponCode::new(raw),
            None => generate_code(request.coupon_type),
        };
        if code.is_empty() {
            return Err(CoreError::Validation {
                field: "code".into(),
                reason: "must not be blank".into(),
            });
        }

        let coupon = Coupon {
            id: Uuid::new_v4(),
            code,
            coupon_type: request.coupon_type,
            max_uses: request.max_uses,
            uses_count: 0,
            max_amount_per_use: request.max_amount_per_use,
            expires_at: request.expires_at,
            description: request.description,
            created_by: actor.id.clone(),
            created_at: now,
            version: 0,
        };
        self.inner.store.insert(coupon.clone())?;

        info!(
            code = %coupon.code,
            coupon_type = %coupon.coupon_type,
            max_uses = coupon.max_uses,
            actor = %actor.id,
            "coupon created"
        );
        Ok(coupon)
    }

    /// Soft-expire a coupon now. Allowed for its creator and admins.
    pub fn expire_coupon(&self, actor: &Principal, code: &str) -> Result<Coupon, CoreError> {
        let coupon = self.coupon(code)?;
        authorize(actor, Some(&coupon.created_by), COUPON_ADMIN_ROLES)
            .into_result("expire this coupon")?;

        let expired = self.inner.store.expire(&coupon.code, Utc::now())?;
        info!(code = %expired.code, actor = %actor.id, "coupon expired");
        Ok(expired)
    }

    /// Usage log for a coupon. Allowed for its creator and admins.
    pub fn usage(&self, actor: &Principal, code: &str) -> Result<Vec<CouponUsageRecord>, CoreError> {
        let coupon = self.coupon(code)?;
        authorize(actor, Some(&coupon.created_by), COUPON_ADMIN_ROLES)
            .into_result("read usage for this coupon")?;
        self.inner.store.usage_for(&coupon.code)
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn coupon(&self, code: &str) -> Result<Coupon, CoreError> {
        let code = CouponCode::new(code);
        self.inner
            .store
            .find_by_code(&code)?
            .ok_or_else(|| CoreError::NotFound {
                code: code.to_string(),
            })
    }

    pub fn coupons(&self) -> Result<Vec<Coupon>, CoreError> {
        self.inner.store.list()
    }

    /// Check a code's current eligibility without consuming it.
    pub fn validate_code(&self, code: &str) -> Result<Eligibility, CoreError> {
        let coupon = self.coupon(code)?;
        let result = validate(&coupon, Utc::now());
        if let Err(ref err) = result {
            debug!(code = %coupon.code, error = %err, "coupon not eligible");
        }
        result
    }

    // ── Redemption ───────────────────────────────────────────────

    /// Consume one use of a coupon on behalf of `actor` and record it.
    pub async fn redeem(
        &self,
        actor: &Principal,
        request: RedeemRequest,
    ) -> Result<CouponUsageRecord, CoreError> {
        authorize(actor, None, REDEEMER_ROLES).into_result("redeem coupons")?;
        let record = self.inner.redeemer.redeem(&request).await?;
        debug!(code = %record.code, actor = %actor.id, "redemption recorded");
        // No subscribers is fine.
        let _ = self.inner.redeemed_tx.send(Arc::new(record.clone()));
        Ok(record)
    }

    /// Subscribe to successful redemptions.
    pub fn subscribe_redemptions(&self) -> broadcast::Receiver<Arc<CouponUsageRecord>> {
        self.inner.redeemed_tx.subscribe()
    }
}
