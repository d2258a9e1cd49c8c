//! Prometheus metrics

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Markets that ran through the pipeline
    MarketsScanned,
    /// Markets rejected as invalid input
    MarketsRejected,
    /// Markets estimated from the base rate alone
    BaseRateFallbacks,
    /// New opportunity records
    OpportunitiesCreated,
    /// Refreshed opportunity records
    OpportunitiesUpdated,
    /// Failed or timed-out source fetches
    SourceErrors,
    /// Scans that hit their deadline
    PartialScans,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One market's fetch + estimation + scoring
    Pipeline,
    /// One source fetch
    SourceFetch,
    /// Whole scan
    Scan,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Active opportunities after the last scan
    ActiveOpportunities,
    /// Largest absolute edge seen in the last scan
    LastScanMaxEdge,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::MarketsScanned => "polyalpha_markets_scanned_total",
        CounterMetric::MarketsRejected => "polyalpha_markets_rejected_total",
        CounterMetric::BaseRateFallbacks => "polyalpha_base_rate_fallbacks_total",
        CounterMetric::OpportunitiesCreated => "polyalpha_opportunities_created_total",
        CounterMetric::OpportunitiesUpdated => "polyalpha_opportunities_updated_total",
        CounterMetric::SourceErrors => "polyalpha_source_errors_total",
        CounterMetric::PartialScans => "polyalpha_partial_scans_total",
    }
}

fn latency_name(metric: LatencyMetric) -> &'static str {
    match metric {
        LatencyMetric::Pipeline => "polyalpha_pipeline_latency_ms",
        LatencyMetric::SourceFetch => "polyalpha_source_fetch_latency_ms",
        LatencyMetric::Scan => "polyalpha_scan_latency_ms",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::ActiveOpportunities => "polyalpha_active_opportunities",
        GaugeMetric::LastScanMaxEdge => "polyalpha_last_scan_max_edge",
    }
}

/// Increment a counter
pub fn increment(metric: CounterMetric, by: u64) {
    metrics::counter!(counter_name(metric)).increment(by);
}

/// Count a failed fetch against its source
pub fn record_source_error(source: &str) {
    metrics::counter!(counter_name(CounterMetric::SourceErrors), "source" => source.to_string())
        .increment(1);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(latency_name(metric)).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}
