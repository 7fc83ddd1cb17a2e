//! Builtin maintenance tasks wired over the data gateway.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use opswatch_gateway::DataGateway;
use opswatch_scheduler::{SchedulerError, TaskAction, TaskRegistry};
use tracing::info;

/// Tables the accounting backend exposes through its REST surface.
pub const ACCOUNTING_TABLES: &[&str] = &[
    "projects",
    "income",
    "expenses",
    "personal_income",
    "personal_expenses",
];

/// Soft-deleted records older than this are purged for good.
const RETENTION_DAYS: i64 = 30;

/// Growth metrics look back over this window.
const GROWTH_WINDOW_DAYS: i64 = 7;

const HEALTH_CHECK_INTERVAL: StdDuration = StdDuration::from_secs(300);
const DAILY_INTERVAL: StdDuration = StdDuration::from_secs(86_400);

/// Register the builtin task set against a registry.
pub fn register_builtin(
    registry: &TaskRegistry,
    gateway: Arc<dyn DataGateway>,
) -> Result<(), SchedulerError> {
    registry.register(
        "health_check",
        Some(HEALTH_CHECK_INTERVAL),
        health_check_action(gateway.clone()),
    )?;
    registry.register(
        "database_cleanup",
        Some(DAILY_INTERVAL),
        database_cleanup_action(gateway.clone()),
    )?;
    registry.register(
        "performance_analytics",
        Some(DAILY_INTERVAL),
        performance_analytics_action(gateway.clone()),
    )?;
    registry.register(
        "cost_report",
        Some(DAILY_INTERVAL),
        cost_report_action(gateway),
    )?;
    Ok(())
}

fn health_check_action(gateway: Arc<dyn DataGateway>) -> TaskAction {
    Arc::new(move || {
        let gateway = gateway.clone();
        Box::pin(async move {
            let count = gateway.count_records("projects").await?;
            Ok(format!("backend reachable ({count} project record(s))"))
        })
    })
}

fn database_cleanup_action(gateway: Arc<dyn DataGateway>) -> TaskAction {
    Arc::new(move || {
        let gateway = gateway.clone();
        Box::pin(async move {
            let cutoff = Duration::days(RETENTION_DAYS);
            let mut total_purged = 0u64;
            let mut parts = Vec::new();
            for table in ACCOUNTING_TABLES {
                let ids = gateway.find_soft_deleted_older_than(table, cutoff).await?;
                if ids.is_empty() {
                    continue;
                }
                let purged = gateway.purge(table, &ids).await?;
                info!(table, purged, "Purged expired soft-deleted records");
                parts.push(format!("{table}: {purged}"));
                total_purged += purged;
            }
            if parts.is_empty() {
                return Ok(format!(
                    "no records older than {RETENTION_DAYS} day(s) to purge"
                ));
            }
            Ok(format!(
                "purged {total_purged} record(s) older than {RETENTION_DAYS} day(s) ({})",
                parts.join(", ")
            ))
        })
    })
}

fn performance_analytics_action(gateway: Arc<dyn DataGateway>) -> TaskAction {
    Arc::new(move || {
        let gateway = gateway.clone();
        Box::pin(async move {
            let window = Duration::days(GROWTH_WINDOW_DAYS);
            let mut parts = Vec::with_capacity(ACCOUNTING_TABLES.len());
            for table in ACCOUNTING_TABLES {
                let added = gateway.record_growth_since(table, window).await?;
                parts.push(format!("{table}: +{added}"));
            }
            Ok(format!(
                "growth over {GROWTH_WINDOW_DAYS} day(s): {}",
                parts.join(", ")
            ))
        })
    })
}

fn cost_report_action(gateway: Arc<dyn DataGateway>) -> TaskAction {
    Arc::new(move || {
        let gateway = gateway.clone();
        Box::pin(async move {
            let mut total = 0u64;
            let mut parts = Vec::with_capacity(ACCOUNTING_TABLES.len());
            for table in ACCOUNTING_TABLES {
                let count = gateway.count_records(table).await?;
                parts.push(format!("{table}: {count}"));
                total += count;
            }
            Ok(format!("{total} active record(s) ({})", parts.join(", ")))
        })
    })
}
