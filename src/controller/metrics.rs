//! Prometheus metrics for the MediaTailor operator
//!
//! # Exported metrics
//! The `/metrics` endpoint (when built with `--features metrics`) exports the following metrics:
//! - `mediatailor_reconcile_duration_seconds` (histogram): reconcile duration labeled by controller.
//! - `mediatailor_reconcile_errors_total` (counter): reconcile errors labeled by controller and kind.
//! - `mediatailor_remote_calls_total` (counter): control plane calls labeled by operation and outcome.
//! - `mediatailor_channel_running` (gauge): 1 while a channel is observed running, labeled by namespace/name.

use std::sync::atomic::{AtomicI64, AtomicU64};

use once_cell::sync::Lazy;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Labels for operator reconcile metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ReconcileLabels {
    /// Controller name, e.g. "channel"
    pub controller: String,
}

/// Labels for operator error metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub controller: String,
    /// Error kind/category, e.g. "kube", "remote", "validation"
    pub kind: String,
}

/// Labels for control plane calls
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RemoteCallLabels {
    /// Operation name, e.g. "StartChannel"
    pub operation: String,
    /// "success" or the error kind
    pub outcome: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ChannelLabels {
    pub namespace: String,
    pub name: String,
}

/// Histogram tracking reconcile duration (seconds)
pub static RECONCILE_DURATION_SECONDS: Lazy<Family<ReconcileLabels, Histogram>> = Lazy::new(|| {
    fn reconcile_histogram() -> Histogram {
        // 1ms .. ~32s across 16 buckets.
        Histogram::new(exponential_buckets(0.001, 2.0, 16))
    }

    Family::new_with_constructor(reconcile_histogram)
});

/// Counter tracking reconcile errors
pub static RECONCILE_ERRORS_TOTAL: Lazy<Family<ErrorLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Counter tracking control plane calls
pub static REMOTE_CALLS_TOTAL: Lazy<Family<RemoteCallLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Gauge tracking the observed running state of each channel
pub static CHANNEL_RUNNING: Lazy<Family<ChannelLabels, Gauge<i64, AtomicI64>>> =
    Lazy::new(Family::default);

/// Counters are registered without the `_total` suffix; the encoder adds it.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();

    registry.register(
        "mediatailor_reconcile_duration_seconds",
        "Duration of reconcile loops in seconds",
        RECONCILE_DURATION_SECONDS.clone(),
    );

    registry.register(
        "mediatailor_reconcile_errors",
        "Total number of reconcile errors",
        RECONCILE_ERRORS_TOTAL.clone(),
    );

    registry.register(
        "mediatailor_remote_calls",
        "Total number of MediaTailor control plane calls",
        REMOTE_CALLS_TOTAL.clone(),
    );
    registry.register(
        "mediatailor_channel_running",
        "Whether the channel was observed running (1) or stopped (0)",
        CHANNEL_RUNNING.clone(),
    );

    registry
});

/// Observe a reconcile duration in seconds.
pub fn observe_reconcile_duration_seconds(controller: &str, seconds: f64) {
    let labels = ReconcileLabels {
        controller: controller.to_string(),
    };
    RECONCILE_DURATION_SECONDS
        .get_or_create(&labels)
        .observe(seconds);
}

/// Increment the reconcile error counter.
pub fn inc_reconcile_error(controller: &str, kind: &str) {
    let labels = ErrorLabels {
        controller: controller.to_string(),
        kind: kind.to_string(),
    };
    RECONCILE_ERRORS_TOTAL.get_or_create(&labels).inc();
}

pub fn inc_remote_call(operation: &str, outcome: &str) {
    let labels = RemoteCallLabels {
        operation: operation.to_string(),
        outcome: outcome.to_string(),
    };
    REMOTE_CALLS_TOTAL.get_or_create(&labels).inc();
}

pub fn set_channel_running(namespace: &str, name: &str, running: bool) {
    let labels = ChannelLabels {
        namespace: namespace.to_string(),
        name: name.to_string(),
    };
    CHANNEL_RUNNING
        .get_or_create(&labels)
        .set(i64::from(running));
}

/// Forget a deleted channel
pub fn remove_channel(namespace: &str, name: &str) {
    let labels = ChannelLabels {
        namespace: namespace.to_string(),
        name: name.to_string(),
    };
    CHANNEL_RUNNING.remove(&labels);
}
