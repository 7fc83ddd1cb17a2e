//! The data gateway trait and the in-memory implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::error::DataAccessError;

/// Narrow capability interface to the record store.
///
/// Implementations are stateless with respect to callers and safe to share
/// across concurrent tasks (`Arc<dyn DataGateway>`).
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Count live records in a table.
    async fn count_records(&self, table: &str) -> Result<u64, DataAccessError>;

    /// Find ids of soft-deleted records whose deletion is older than `cutoff`.
    async fn find_soft_deleted_older_than(
        &self,
        table: &str,
        cutoff: Duration,
    ) -> Result<Vec<String>, DataAccessError>;

    /// Permanently delete records by id. Returns the number purged.
    async fn purge(&self, table: &str, ids: &[String]) -> Result<u64, DataAccessError>;

    /// Count records created within the trailing `window`.
    async fn record_growth_since(
        &self,
        table: &str,
        window: Duration,
    ) -> Result<u64, DataAccessError>;
}

/// A record held by the in-memory gateway.
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    /// A live record created now.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Mark the record soft-deleted at a given instant.
    pub fn deleted_at(mut self, at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(at);
        self
    }

    /// Override the creation instant.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

/// In-memory gateway for tests and local development.
///
/// Supports a switchable failure mode so callers can exercise backend-fault
/// paths and recovery.
pub struct MemoryGateway {
    tables: RwLock<HashMap<String, Vec<MemoryRecord>>>,
    failing: AtomicBool,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Toggle the simulated backend fault.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Insert a record into a table.
    pub async fn insert(&self, table: &str, record: MemoryRecord) {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().push(record);
    }

    fn check_available(&self) -> Result<(), DataAccessError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DataAccessError::Unavailable(
                "simulated backend fault".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn count_records(&self, table: &str) -> Result<u64, DataAccessError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let count = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| r.deleted_at.is_none()).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn find_soft_deleted_older_than(
        &self,
        table: &str,
        cutoff: Duration,
    ) -> Result<Vec<String>, DataAccessError> {
        self.check_available()?;
        let threshold = Utc::now() - cutoff;
        let tables = self.tables.read().await;
        let ids = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.deleted_at.is_some_and(|d| d < threshold))
                    .map(|r| r.id.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    async fn purge(&self, table: &str, ids: &[String]) -> Result<u64, DataAccessError> {
        self.check_available()?;
        if ids.is_empty() {
            return Ok(0);
        }
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !ids.contains(&r.id));
        Ok((before - rows.len()) as u64)
    }

    async fn record_growth_since(
        &self,
        table: &str,
        window: Duration,
    ) -> Result<u64, DataAccessError> {
        self.check_available()?;
        let since = Utc::now() - window;
        let tables = self.tables.read().await;
        let count = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| r.created_at >= since).count())
            .unwrap_or(0);
        Ok(count as u64)
    }
}
