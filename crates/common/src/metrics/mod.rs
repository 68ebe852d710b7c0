//! Prometheus series for the sync endpoints and the spreadsheet backend

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Prefix of every series name
pub const METRICS_PREFIX: &str = "brandsheet";

/// Latency buckets in seconds.
///
/// Every request fans out to the spreadsheet service, so the tail is long.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0,
];

fn name(suffix: &str) -> String {
    format!("{}_{}", METRICS_PREFIX, suffix)
}

/// Describe every series so the exporter lists them before first use
pub fn register_metrics() {
    describe_counter!(name("requests_total"), Unit::Count, "Sync API requests by route and status");
    describe_histogram!(
        name("request_duration_seconds"),
        Unit::Seconds,
        "Sync API latency, including spreadsheet round trips"
    );

    describe_counter!(name("sync_reads_total"), Unit::Count, "Sheet reads served");
    describe_gauge!(
        name("sync_records_returned"),
        Unit::Count,
        "Records returned by the last read of a sheet"
    );
    describe_counter!(name("sync_writes_total"), Unit::Count, "Writes by action and outcome");

    describe_counter!(name("store_calls_total"), Unit::Count, "Calls made to the spreadsheet backend");
    describe_histogram!(
        name("store_call_duration_seconds"),
        Unit::Seconds,
        "Latency of successful spreadsheet backend calls"
    );
    describe_counter!(name("store_errors_total"), Unit::Count, "Failed spreadsheet backend calls");
    describe_gauge!(name("store_up"), "1 when the last readiness probe reached the spreadsheet");

    tracing::debug!("Metric descriptions registered");
}

/// Times one sync API request
pub struct RequestMetrics {
    started: Instant,
    method: &'static str,
    route: &'static str,
}

impl RequestMetrics {
    pub fn start(method: &'static str, route: &'static str) -> Self {
        Self {
            started: Instant::now(),
            method,
            route,
        }
    }

    pub fn finish(self, status: u16) {
        let elapsed = self.started.elapsed().as_secs_f64();

        counter!(
            name("requests_total"),
            "method" => self.method,
            "route" => self.route,
            "status" => status.to_string()
        )
        .increment(1);
        histogram!(name("request_duration_seconds"), "method" => self.method, "route" => self.route)
            .record(elapsed);
    }
}

/// A read of `sheet` returned `record_count` records
pub fn record_read(sheet: &str, record_count: usize) {
    counter!(name("sync_reads_total"), "sheet" => sheet.to_string()).increment(1);
    gauge!(name("sync_records_returned"), "sheet" => sheet.to_string()).set(record_count as f64);
}

/// A write finished; `outcome` is `applied`, `no_match` or `error`
pub fn record_write(action: &'static str, outcome: &'static str) {
    counter!(name("sync_writes_total"), "action" => action, "outcome" => outcome).increment(1);
}

/// One call to the spreadsheet backend finished
pub fn record_store_call(duration_secs: f64, backend: &'static str, operation: &str, success: bool) {
    let operation = operation.to_string();
    counter!(
        name("store_calls_total"),
        "backend" => backend,
        "operation" => operation.clone(),
        "status" => if success { "ok" } else { "error" }
    )
    .increment(1);

    if success {
        histogram!(name("store_call_duration_seconds"), "backend" => backend, "operation" => operation)
            .record(duration_secs);
    } else {
        counter!(name("store_errors_total"), "backend" => backend, "operation" => operation).increment(1);
    }
}

/// Outcome of a readiness probe
pub fn record_store_up(up: bool) {
    gauge!(name("store_up")).set(if up { 1.0 } else { 0.0 });
}
