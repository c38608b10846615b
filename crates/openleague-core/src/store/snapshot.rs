// ── JSON snapshots of the memory store ──
//
// Lets single-shot consumers (the CLI) persist state between runs.
// Loading re-checks the store invariants so a hand-edited file can't
// smuggle in an over-used coupon.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::memory::{CouponRow, MemoryStore};
use crate::error::CoreError;
use crate::model::{Coupon, CouponCode, CouponUsageRecord};

/// Serializable image of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    #[serde(default)]
    pub usage: Vec<CouponUsageRecord>,
}

impl MemoryStore {
    /// Capture the current contents.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::default();
        for row in self.rows() {
            snapshot.coupons.push(row.coupon);
            snapshot.usage.extend(row.usage);
        }
        snapshot
    }

    /// Rebuild a store, rejecting snapshots that violate store invariants.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, CoreError> {
        let mut rows: HashMap<CouponCode, CouponRow> = HashMap::new();
        for coupon in snapshot.coupons {
            if coupon.max_uses == 0 {
                return Err(corrupt(format!("coupon {} has a cap of zero uses", coupon.code)));
            }
            if coupon.uses_count > coupon.max_uses {
                return Err(corrupt(format!(
                    "coupon {} has {} uses but a cap of {}",
                    coupon.code, coupon.uses_count, coupon.max_uses
                )));
            }
            let code = coupon.code.clone();
            let row = CouponRow {
                coupon,
                usage: Vec::new(),
            };
            if rows.insert(code.clone(), row).is_some() {
                return Err(corrupt(format!("duplicate coupon code {code}")));
            }
        }

        let mut record_ids = HashSet::new();
        for record in snapshot.usage {
            if !record_ids.insert(record.id) {
                return Err(corrupt(format!("duplicate usage record {}", record.id)));
            }
            let row = rows
                .get_mut(&record.code)
                .ok_or_else(|| corrupt(format!("usage record for unknown coupon {}", record.code)))?;
            row.usage.push(record);
        }

        for row in rows.values_mut() {
            let recorded = row.usage.len();
            if u32::try_from(recorded).ok() != Some(row.coupon.uses_count) {
                return Err(corrupt(format!(
                    "coupon {} counts {} uses but has {recorded} usage records",
                    row.coupon.code, row.coupon.uses_count
                )));
            }
            row.usage.sort_by_key(|r| r.used_at);
        }

        Ok(Self::from_rows(rows.into_values()))
    }

    /// Load from a JSON file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            coupons = snapshot.coupons.len(),
            records = snapshot.usage.len(),
            "loaded snapshot"
        );
        Self::from_snapshot(snapshot)
    }

    /// Write a JSON snapshot, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "saved snapshot");
        Ok(())
    }
}

fn corrupt(message: String) -> CoreError {
    CoreError::Storage {
        message: format!("corrupt snapshot: {message}"),
    }
}
