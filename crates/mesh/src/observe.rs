//! Where RTT measurements are reported.

use corelib::SampleKind;

/// Histogram name for round-trip times, in seconds.
pub const RTT_METRIC: &str = "mesh_rtt_seconds";

/// Receives measured values labelled by sample kind and peer name.
pub trait ObservationSink: Send + Sync {
    fn observe(&self, metric: &'static str, kind: SampleKind, peer: &str, seconds: f64);
}

/// Records observations as histograms through the `metrics` facade.
///
/// Without an installed recorder the values are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct MetricsSink;

impl ObservationSink for MetricsSink {
    fn observe(&self, metric: &'static str, kind: SampleKind, peer: &str, seconds: f64) {
        metrics::histogram!(metric, "sample" => kind.name(), "peer" => peer.to_owned())
            .record(seconds);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl ObservationSink for NoopSink {
    fn observe(&self, _metric: &'static str, _kind: SampleKind, _peer: &str, _seconds: f64) {}
}
