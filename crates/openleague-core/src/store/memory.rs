// ── In-memory coupon store ──
//
// Concurrent storage with per-coupon write serialization. Each coupon
// and its usage records share one `DashMap` entry, so the shard write
// guard taken by `get_mut` acts as the row lock for a redemption.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tracing::debug;

use super::CouponStore;
use crate::error::CoreError;
use crate::model::{Coupon, CouponCode, CouponUsageRecord};
use crate::validate::validate;

/// A coupon together with its append-only usage log.
#[derive(Debug, Clone)]
pub(super) struct CouponRow {
    pub(super) coupon: Coupon,
    pub(super) usage: Vec<CouponUsageRecord>,
}

/// Thread-safe coupon store kept entirely in memory.
///
/// Every mutation bumps a revision counter observable through
/// [`subscribe`](Self::subscribe), which lets owners persist only
/// when something changed.
pub struct MemoryStore {
    rows: DashMap<CouponCode, CouponRow>,
    revision: watch::Sender<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0u64);
        Self {
            rows: DashMap::new(),
            revision,
        }
    }

    pub(super) fn from_rows(rows: impl IntoIterator<Item = CouponRow>) -> Self {
        let store = Self::new();
        for row in rows {
            store.rows.insert(row.coupon.code.clone(), row);
        }
        store
    }

    pub(super) fn rows(&self) -> Vec<CouponRow> {
        let mut rows: Vec<CouponRow> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| {
            a.coupon
                .created_at
                .cmp(&b.coupon.created_at)
                .then_with(|| a.coupon.code.cmp(&b.coupon.code))
        });
        rows
    }

    /// Subscribe to the revision counter, bumped once per applied mutation.
    /// The current value counts as seen.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn bump_revision(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.revision.send_modify(|v| *v += 1);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CouponStore for MemoryStore {
    fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, CoreError> {
        Ok(self.rows.get(code).map(|r| r.coupon.clone()))
    }

    fn insert(&self, coupon: Coupon) -> Result<(), CoreError> {
        match self.rows.entry(coupon.code.clone()) {
            Entry::Occupied(_) => Err(CoreError::DuplicateCode {
                code: coupon.code.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(CouponRow {
                    coupon,
                    usage: Vec::new(),
                });
                self.bump_revision();
                Ok(())
            }
        }
    }

    fn commit_redemption(
        &self,
        code: &CouponCode,
        expected_version: u64,
        record: CouponUsageRecord,
    ) -> Result<Coupon, CoreError> {
        let updated = {
            let mut row = self.rows.get_mut(code).ok_or_else(|| CoreError::NotFound {
                code: code.to_string(),
            })?;

            if row.coupon.version != expected_version {
                debug!(
                    %code,
                    expected_version,
                    actual_version = row.coupon.version,
                    "redemption commit lost the version race"
                );
                return Err(CoreError::StorageConflict {
                    code: code.to_string(),
                });
            }

            // Increment-if-below-cap, evaluated under the row lock.
            validate(&row.coupon, record.used_at)?;

            row.coupon.uses_count += 1;
            row.coupon.version += 1;
            row.usage.push(record);
            row.coupon.clone()
        };

        self.bump_revision();
        Ok(updated)
    }

    fn expire(&self, code: &CouponCode, at: DateTime<Utc>) -> Result<Coupon, CoreError> {
        let updated = {
            let mut row = self.rows.get_mut(code).ok_or_else(|| CoreError::NotFound {
                code: code.to_string(),
            })?;
            // Never push an existing expiry further out.
            let expires_at = row.coupon.expires_at.map_or(at, |current| current.min(at));
            row.coupon.expires_at = Some(expires_at);
            row.coupon.version += 1;
            row.coupon.clone()
        };

        self.bump_revision();
        Ok(updated)
    }

    fn list(&self) -> Result<Vec<Coupon>, CoreError> {
        Ok(self.rows().into_iter().map(|r| r.coupon).collect())
    }

    fn usage_for(&self, code: &CouponCode) -> Result<Vec<CouponUsageRecord>, CoreError> {
        self.rows
            .get(code)
            .map(|r| r.usage.clone())
            .ok_or_else(|| CoreError::NotFound {
                code: code.to_string(),
            })
    }
}
