//! Coupon redemption and access control for the Open League platform.
//!
//! This crate owns the only part of the platform with hard invariants:
//!
//! - **[`CouponService`]**: Facade over a [`CouponStore`]: creates and
//!   expires coupons behind the access guard, validates codes, redeems
//!   them with bounded conflict retries, and broadcasts each successful
//!   redemption to subscribers.
//!
//! - **[`validate()`]**: Pure eligibility check of a coupon against the
//!   clock and its use counter.
//!
//! - **[`Redeemer`]**: Validate-then-consume with an optimistic version
//!   check, so two concurrent redemptions of a last remaining use can
//!   never both succeed.
//!
//! - **[`authorize()`]**: The single access decision for mutating
//!   operations: super-admin flag, resource ownership, or role membership.
//!
//! - **[`MemoryStore`]**: `DashMap`-backed store with per-coupon row
//!   locking and JSON snapshot persistence.

pub mod config;
pub mod error;
pub mod guard;
pub mod model;
pub mod redeem;
pub mod service;
pub mod store;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::RedemptionConfig;
pub use error::CoreError;
pub use guard::{AllowReason, Decision, DenyReason, authorize};
pub use redeem::Redeemer;
pub use service::CouponService;
pub use store::{CouponStore, MemoryStore, StoreSnapshot};
pub use validate::{Eligibility, validate};

pub use model::{
    Coupon, CouponCode, CouponType, CouponUsageRecord, NewCoupon, PrincipalId, Principal,
    RedeemRequest, Role,
};
