// ── Store session ──
//
// One CLI invocation: load the snapshot, run commands against a
// `CouponService`, and write the snapshot back only if something changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use openleague_core::{CouponService, MemoryStore, RedemptionConfig};

use crate::error::CliError;

pub struct Session {
    store: Arc<MemoryStore>,
    service: CouponService,
    data_file: PathBuf,
    changes: watch::Receiver<u64>,
}

impl Session {
    pub fn open(data_file: PathBuf, config: RedemptionConfig) -> Result<Self, CliError> {
        let store = Arc::new(MemoryStore::load(&data_file)?);
        debug!(path = %data_file.display(), coupons = store.len(), "store loaded");
        let changes = store.subscribe();
        let service = CouponService::new(store.clone(), config);
        Ok(Self {
            store,
            service,
            data_file,
            changes,
        })
    }

    pub fn service(&self) -> &CouponService {
        &self.service
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Write the snapshot back if any mutation happened since `open`.
    pub fn persist(&self) -> Result<(), CliError> {
        // The store owns the sender, so the channel cannot close under us.
        if !self.changes.has_changed().unwrap_or(true) {
            return Ok(());
        }
        self.store.save(&self.data_file)?;
        debug!(
            path = %self.data_file.display(),
            revision = *self.changes.borrow(),
            "store saved"
        );
        Ok(())
    }
}
