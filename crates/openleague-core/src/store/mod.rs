// ── Coupon persistence ──
//
// The logical operations the redemption core needs from a store.
// Implementations must make `commit_redemption` atomic per coupon.

mod memory;
mod snapshot;

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::model::{Coupon, CouponCode, CouponUsageRecord};

pub use memory::MemoryStore;
pub use snapshot::StoreSnapshot;

/// Transactional primitives over coupons and their usage records.
///
/// Reads return owned copies; callers never hold a lock across calls.
pub trait CouponStore: Send + Sync {
    fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, CoreError>;

    /// Insert a new coupon. Fails with `DuplicateCode` if the code is taken.
    fn insert(&self, coupon: Coupon) -> Result<(), CoreError>;

    /// Increment `uses_count` and append `record` as one unit.
    ///
    /// The commit only applies if the stored version still equals
    /// `expected_version` (otherwise `StorageConflict`) and the coupon
    /// is still eligible at `record.used_at` (otherwise `Expired` or
    /// `Exhausted`). On any error nothing is changed.
    fn commit_redemption(
        &self,
        code: &CouponCode,
        expected_version: u64,
        record: CouponUsageRecord,
    ) -> Result<Coupon, CoreError>;

    /// Soft-expire a coupon by setting `expires_at`.
    fn expire(&self, code: &CouponCode, at: DateTime<Utc>) -> Result<Coupon, CoreError>;

    /// All coupons, oldest first.
    fn list(&self) -> Result<Vec<Coupon>, CoreError>;

    /// Usage records for one coupon, in redemption order.
    fn usage_for(&self, code: &CouponCode) -> Result<Vec<CouponUsageRecord>, CoreError>;
}
