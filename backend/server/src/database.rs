//! # Redis
//!
//! Document store for submitted applications.
//!
//! ## Requirements
//!
//! - Durable write per submission, no updates or deletes
//! - No queries besides a connectivity check
//! - Safe to share between in-flight requests
//!
//! ## Implementation
//!
//! - Redis hash: 1 big key `applications`, then id-json pairs
//! - `HSETNX` so a record is written exactly once
//! - Connection manager is cloned per call, it multiplexes internally
//! - Health check is a bounded `PING`
use std::time::Duration;

use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::warn;

use crate::{BoxFuture, application::ApplicationRecord};

pub const APPLICATIONS_KEY: &str = "applications";

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(2);
const PING_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum StoreError {
    /// The record failed the store's schema check.
    #[error("{0}")]
    Validation(String),

    #[error("Record {0} already exists")]
    Conflict(String),

    #[error("Redis error: {0}")]
    Unavailable(#[from] RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Persistence for application records.
pub trait RecordStore: Send + Sync {
    /// Validates and durably writes a new record.
    fn insert<'a>(
        &'a self,
        record: &'a ApplicationRecord,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Current connectivity, never blocks longer than the store's own ping timeout.
    fn status(&self) -> BoxFuture<'_, ConnectionStatus>;
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connects eagerly so a bad `DATABASE_URL` fails at startup.
    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(CONNECTION_TIMEOUT);

        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager_with_config(config).await?;

        Ok(Self { connection })
    }
}

impl RecordStore for RedisStore {
    fn insert<'a>(
        &'a self,
        record: &'a ApplicationRecord,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            record.validate().map_err(StoreError::Validation)?;

            let id = record.id.to_string();
            let json = serde_json::to_string(record)?;

            let mut connection = self.connection.clone();
            let created: bool = connection.hset_nx(APPLICATIONS_KEY, &id, json).await?;

            if !created {
                return Err(StoreError::Conflict(id));
            }

            Ok::<(), StoreError>(())
        })
    }

    fn status(&self) -> BoxFuture<'_, ConnectionStatus> {
        Box::pin(async move {
            let mut connection = self.connection.clone();
            let ping = redis::cmd("PING");

            match timeout(PING_TIMEOUT, ping.query_async::<String>(&mut connection)).await {
                Ok(Ok(_)) => ConnectionStatus::Connected,
                Ok(Err(e)) => {
                    warn!("Redis ping failed: {e}");
                    ConnectionStatus::Disconnected
                }
                Err(_) => {
                    warn!("Redis ping timed out after {PING_TIMEOUT:?}");
                    ConnectionStatus::Disconnected
                }
            }
        })
    }
}
