//! Application state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use opswatch_gateway::DataGateway;
use opswatch_scheduler::Scheduler;

/// Process-scoped context shared across handlers. Passed explicitly at
/// construction so multiple independent instances can coexist in tests.
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub gateway: Arc<dyn DataGateway>,
    /// Shared secret for protected routes; `None` leaves them open.
    pub api_key: Option<String>,
    /// Allowed origins for protected routes; empty means unrestricted.
    pub allowed_origins: Vec<String>,
    /// Tables the dashboard aggregates over.
    pub tables: Vec<String>,
    start_time: Instant,
    request_count: AtomicU64,
}

impl AppState {
    pub fn new(
        scheduler: Arc<Scheduler>,
        gateway: Arc<dyn DataGateway>,
        api_key: Option<String>,
        allowed_origins: Vec<String>,
        tables: Vec<String>,
    ) -> Self {
        Self {
            scheduler,
            gateway,
            api_key,
            allowed_origins,
            tables,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Requests served since boot.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn increment_requests(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }
}
