//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Providers never touch `metrics` directly; every count flows through
//! `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, ProviderCounters};
pub use sink::{
    MetricsEvent, MetricsSink, ProviderKind, metrics_report, metrics_reset_all, with_metrics_sink,
};
