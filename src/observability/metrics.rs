//! Metrics for the GraphQL API
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed with [`init`].

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    GraphqlRequests,
    GraphqlRequestErrors,
    GraphqlRequestDuration,
    StorageTableReads,
    StorageRowsRead,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::GraphqlRequests => "quiz_books_graphql_requests_total",
            MetricName::GraphqlRequestErrors => "quiz_books_graphql_request_errors_total",
            MetricName::GraphqlRequestDuration => "quiz_books_graphql_request_duration_seconds",
            MetricName::StorageTableReads => "quiz_books_storage_table_reads_total",
            MetricName::StorageRowsRead => "quiz_books_storage_rows_read_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            GraphqlRequests,
            GraphqlRequestErrors,
            GraphqlRequestDuration,
            StorageTableReads,
            StorageRowsRead,
        ]
        .into_iter()
    }

    /// Help text exported alongside the metric
    pub fn description(&self) -> &'static str {
        match self {
            MetricName::GraphqlRequests => "GraphQL requests executed",
            MetricName::GraphqlRequestErrors => "GraphQL responses carrying errors",
            MetricName::GraphqlRequestDuration => "GraphQL request execution time",
            MetricName::StorageTableReads => "Full-table reads issued by root fields",
            MetricName::StorageRowsRead => "Rows returned by full-table reads",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus exporter listening on `addr`
pub fn init(addr: SocketAddr) -> Result<(), String> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    for name in MetricName::all_metrics() {
        match name {
            MetricName::GraphqlRequestDuration => {
                ::metrics::describe_histogram!(name.as_str(), name.description())
            }
            _ => ::metrics::describe_counter!(name.as_str(), name.description()),
        }
    }
    info!("Prometheus exporter listening on http://{}/metrics", addr);
    Ok(())
}

/// Same as [`init`] but only warns on failure, so the API still starts
pub fn init_or_warn(addr: SocketAddr) {
    if let Err(e) = init(addr) {
        warn!("{}", e);
    }
}

pub mod graphql {
    use super::*;

    pub fn request_completed(elapsed: Duration, had_errors: bool) {
        ::metrics::counter!(MetricName::GraphqlRequests.as_str()).increment(1);
        if had_errors {
            ::metrics::counter!(MetricName::GraphqlRequestErrors.as_str()).increment(1);
        }
        ::metrics::histogram!(MetricName::GraphqlRequestDuration.as_str())
            .record(elapsed.as_secs_f64());
    }
}

pub mod storage {
    use super::*;

    /// One unfiltered read behind a root field
    pub fn table_read(field: &'static str, rows: usize) {
        ::metrics::counter!(MetricName::StorageTableReads.as_str(), "field" => field).increment(1);
        ::metrics::counter!(MetricName::StorageRowsRead.as_str(), "field" => field)
            .increment(rows as u64);
    }
}
