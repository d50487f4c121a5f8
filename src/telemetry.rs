//! Self-observability metrics exposed on `/metrics`

use std::time::Duration;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics recorded by the pusher itself
///
/// Cloning is cheap; all clones share the same registry and collectors.
#[derive(Clone)]
pub struct PusherMetrics {
    /// Latency of individual Prometheus queries
    prometheus_requests: Histogram,

    /// Duration of the query phase of a collection cycle
    cycle_duration: Histogram,

    query_failures: IntCounterVec,
    pushes: IntCounterVec,
    push_failures: IntCounterVec,

    registry: Registry,
}

impl PusherMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let prometheus_requests = Histogram::with_opts(HistogramOpts::new(
            "statuspage_pusher_prometheus_requests",
            "The response times of prometheus requests",
        ))?;
        registry.register(Box::new(prometheus_requests.clone()))?;

        let cycle_duration = Histogram::with_opts(HistogramOpts::new(
            "statuspage_pusher_cycle_duration_seconds",
            "Duration of the query phase of each collection cycle",
        ))?;
        registry.register(Box::new(cycle_duration.clone()))?;

        let query_failures = IntCounterVec::new(
            Opts::new(
                "statuspage_pusher_query_failures_total",
                "Failed Prometheus queries per component",
            ),
            &["component"],
        )?;
        registry.register(Box::new(query_failures.clone()))?;

        let pushes = IntCounterVec::new(
            Opts::new(
                "statuspage_pusher_pushes_total",
                "Successful status pushes per component and status",
            ),
            &["component", "status"],
        )?;
        registry.register(Box::new(pushes.clone()))?;

        let push_failures = IntCounterVec::new(
            Opts::new(
                "statuspage_pusher_push_failures_total",
                "Failed status pushes per component",
            ),
            &["component"],
        )?;
        registry.register(Box::new(push_failures.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            prometheus_requests,
            cycle_duration,
            query_failures,
            pushes,
            push_failures,
            registry,
        })
    }

    pub fn observe_prometheus_request(&self, elapsed: Duration) {
        self.prometheus_requests.observe(elapsed.as_secs_f64());
    }

    pub fn observe_cycle(&self, elapsed: Duration) {
        self.cycle_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_query_failure(&self, component: &str) {
        self.query_failures.with_label_values(&[component]).inc();
    }

    pub fn record_push(&self, component: &str, status: &str) {
        self.pushes.with_label_values(&[component, status]).inc();
    }

    pub fn record_push_failure(&self, component: &str) {
        self.push_failures.with_label_values(&[component]).inc();
    }

    /// Number of query-phase durations observed so far
    pub fn cycle_count(&self) -> u64 {
        self.cycle_duration.get_sample_count()
    }

    /// Sum of all observed query-phase durations, in seconds
    pub fn cycle_duration_sum(&self) -> f64 {
        self.cycle_duration.get_sample_sum()
    }

    pub fn prometheus_request_count(&self) -> u64 {
        self.prometheus_requests.get_sample_count()
    }

    pub fn query_failure_count(&self, component: &str) -> u64 {
        self.counter_value("statuspage_pusher_query_failures_total", component)
    }

    pub fn push_failure_count(&self, component: &str) -> u64 {
        self.counter_value("statuspage_pusher_push_failures_total", component)
    }

    /// Reads a per-component counter from a gathered snapshot, so a lookup
    /// never creates an empty labelled series.
    fn counter_value(&self, family: &str, component: &str) -> u64 {
        self.registry
            .gather()
            .iter()
            .filter(|mf| mf.name() == family)
            .flat_map(|mf| mf.get_metric())
            .filter(|m| {
                m.get_label()
                    .iter()
                    .any(|l| l.name() == "component" && l.value() == component)
            })
            .map(|m| m.get_counter().value() as u64)
            .sum()
    }

    /// Render the registry in the Prometheus text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
