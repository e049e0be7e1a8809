//! Snapshot cache storage.
//!
//! One logical record: the current `Snapshot`, serialized as JSON under a
//! single key. The durable backend (Redis in production) sits behind the
//! `SnapshotBackend` trait; the store itself owns an in-process fallback
//! slot holding the most recent snapshot seen by this process, so a single
//! running instance keeps serving readers when the backend is briefly
//! unavailable. The fallback is not shared across instances.
//!
//! Contract:
//! - `get` never errors; backend failure degrades to the fallback slot,
//!   which may itself be empty.
//! - `put` is best-effort; the snapshot always lands in the fallback slot,
//!   and a durable-write failure is reported, not raised.
//! - The snapshot slot is last-write-wins; concurrent refreshes do not
//!   compare-and-swap.

pub mod redis;

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use self::redis::RedisBackend;

/// Durable backend holding the single snapshot record.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Read the current snapshot, if one has been written.
    async fn read(&self) -> Result<Option<Snapshot>>;

    /// Overwrite the current snapshot.
    async fn write(&self, snapshot: &Snapshot) -> Result<()>;
}

/// How a `put` was persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// Written to the durable backend (and the fallback slot)
    Durable,
    /// Durable write failed; only this process's fallback slot has it
    FallbackOnly,
    /// No durable backend configured
    MemoryOnly,
}

/// Cache store for the current snapshot.
pub struct SnapshotStore {
    backend: Option<Box<dyn SnapshotBackend>>,
    fallback: RwLock<Option<Snapshot>>,
}

impl SnapshotStore {
    /// Create a store backed by a durable backend plus the fallback slot.
    pub fn new(backend: Box<dyn SnapshotBackend>) -> Self {
        Self {
            backend: Some(backend),
            fallback: RwLock::new(None),
        }
    }

    /// Create a store with no durable backend (local development).
    pub fn memory_only() -> Self {
        Self {
            backend: None,
            fallback: RwLock::new(None),
        }
    }

    /// Read the current snapshot. Never errors.
    ///
    /// A backend error or an empty backend degrades to the in-process
    /// fallback value.
    pub async fn get(&self) -> Option<Snapshot> {
        if let Some(backend) = &self.backend {
            match backend.read().await {
                Ok(Some(snapshot)) => return Some(snapshot),
                Ok(None) => {}
                Err(error) => {
                    log::warn!(
                        "Cache backend read failed, serving in-process fallback: {}",
                        error
                    );
                }
            }
        }

        self.fallback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write a new snapshot. Best-effort: never a hard failure.
    ///
    /// The fallback slot is updated first so the snapshot is not lost when
    /// the durable write fails.
    pub async fn put(&self, snapshot: Snapshot) -> PutOutcome {
        {
            let mut slot = self.fallback.write().unwrap_or_else(PoisonError::into_inner);
            *slot = Some(snapshot.clone());
        }

        let Some(backend) = &self.backend else {
            return PutOutcome::MemoryOnly;
        };

        match backend.write(&snapshot).await {
            Ok(()) => PutOutcome::Durable,
            Err(error) => {
                log::warn!(
                    "Cache backend write failed, snapshot kept in-process only: {}",
                    error
                );
                PutOutcome::FallbackOnly
            }
        }
    }
}
