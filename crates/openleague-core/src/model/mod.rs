// ── Domain model ──
//
// Canonical coupon, usage, and principal types shared by every layer.

pub mod coupon;
pub mod ids;
pub mod principal;
pub mod usage;

pub use coupon::{Coupon, CouponType, NewCoupon};
pub(crate) use coupon::generate_code;
pub use ids::{CouponCode, PrincipalId};
pub use principal::{Principal, Role};
pub use usage::{CouponUsageRecord, RedeemRequest};
