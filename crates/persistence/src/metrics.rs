//! Storage metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of one repository query.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "inventory_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Count a ledger append per movement kind.
///
/// The ledger is the audit surface of the whole engine, so appends get their
/// own counter next to the generic query histogram.
pub fn record_ledger_append(operation: &str) {
    counter!(
        "inventory_ledger_entries_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record connection pool health. Call periodically from the host process.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("inventory_db_connections_active").set(active as f64);
    gauge!("inventory_db_connections_idle").set(idle as f64);
    gauge!("inventory_db_connections_total").set(size as f64);
}

/// A helper to time repository operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("find_material_by_id");
/// let result = sqlx::query_as::<_, MaterialEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    /// Create a new timer for the given query name.
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(&self.query_name, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("test_query");
        assert_eq!(timer.query_name, "test_query");
    }

    #[test]
    fn test_query_timer_with_string() {
        let name = String::from("append_ledger_entry");
        let timer = QueryTimer::new(name);
        assert_eq!(timer.query_name, "append_ledger_entry");
    }
}
