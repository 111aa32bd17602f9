//! # Cart Slots
//!
//! Durable key-value slots that hold a serialized [`CartLedger`](crate::cart::CartLedger)
//! between restarts. A slot stores one opaque JSON document.

use crate::error::{PosError, PosResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Slot key used when none is configured
pub const DEFAULT_CART_SLOT: &str = "deli_cart";

/// A named slot that a ledger writes after every mutation.
pub trait CartStore: Send + Sync {
    /// Slot key (for logging)
    fn slot(&self) -> &str;

    /// Read the stored document; `Ok(None)` when the slot has never been written.
    fn load(&self) -> PosResult<Option<String>>;

    /// Replace the stored document.
    fn save(&self, document: &str) -> PosResult<()>;
}

/// Type alias for a shared cart slot (dynamic dispatch)
pub type BoxedCartStore = Arc<dyn CartStore>;

/// Process-local slot, useful for tests and for kiosks without a writable disk
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    slot: String,
    document: Mutex<Option<String>>,
}

impl MemoryCartStore {
    pub fn new(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            document: Mutex::new(None),
        }
    }

    /// Builder: pre-populate the slot
    pub fn with_document(self, document: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.document.lock() {
            *guard = Some(document.into());
        }
        self
    }
}

impl CartStore for MemoryCartStore {
    fn slot(&self) -> &str {
        &self.slot
    }

    fn load(&self) -> PosResult<Option<String>> {
        let guard = self
            .document
            .lock()
            .map_err(|_| PosError::Storage(format!("slot {} lock poisoned", self.slot)))?;
        Ok(guard.clone())
    }

    fn save(&self, document: &str) -> PosResult<()> {
        let mut guard = self
            .document
            .lock()
            .map_err(|_| PosError::Storage(format!("slot {} lock poisoned", self.slot)))?;
        *guard = Some(document.to_string());
        Ok(())
    }
}

/// One JSON file per slot, `<dir>/<slot>.json`
#[derive(Debug, Clone)]
pub struct FileCartStore {
    slot: String,
    path: PathBuf,
}

impl FileCartStore {
    pub fn new(dir: impl AsRef<Path>, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let path = dir.as_ref().join(format!("{}.json", slot));
        Self { slot, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStore for FileCartStore {
    fn slot(&self) -> &str {
        &self.slot
    }

    fn load(&self) -> PosResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PosError::Storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, document: &str) -> PosResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PosError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        // Write-then-rename so a crash never leaves a half-written slot
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, document)
            .map_err(|e| PosError::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            PosError::Storage(format!("failed to replace {}: {}", self.path.display(), e))
        })
    }
}
