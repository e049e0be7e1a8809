//! Redis snapshot backend.
//!
//! Stores the serialized snapshot as one JSON string under one key. The
//! connection manager multiplexes and reconnects on its own; every error
//! is mapped to `AppError::Cache` so the store can degrade to its fallback
//! slot.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};

use crate::error::{AppError, Result};
use crate::models::{CacheConfig, Snapshot};
use crate::storage::SnapshotBackend;

/// Redis-backed snapshot storage.
pub struct RedisBackend {
    connection: ConnectionManager,
    key: String,
}

impl RedisBackend {
    /// Connect to Redis using the cache configuration.
    ///
    /// Connection attempts are bounded so a down backend fails fast and
    /// the caller can fall back to memory-only operation.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let url = config
            .redis_url
            .as_deref()
            .ok_or_else(|| AppError::config("cache.redis_url is not set"))?;

        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(config.connect_timeout_ms));

        let client = Client::open(url).map_err(AppError::cache)?;
        let connection = client
            .get_connection_manager_with_config(manager_config)
            .await
            .map_err(AppError::cache)?;

        Ok(Self {
            connection,
            key: config.key.clone(),
        })
    }
}

#[async_trait]
impl SnapshotBackend for RedisBackend {
    async fn read(&self) -> Result<Option<Snapshot>> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = connection.get(&self.key).await.map_err(AppError::cache)?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        let mut connection = self.connection.clone();
        let _: () = connection
            .set(&self.key, json)
            .await
            .map_err(AppError::cache)?;

        log::info!(
            "Wrote snapshot with {} events to cache key {}",
            snapshot.events.len(),
            self.key
        );
        Ok(())
    }
}
