//! Collection cycle - query every component, classify, push
//!
//! ## Message Flow
//!
//! ```text
//! run_once → per component (concurrent): query → classify first sample → push
//!          → CycleReport
//! ```
//!
//! Each component pushes as soon as its own query resolves, so a slow query
//! never delays another component. The query phase ends when the last query
//! resolves and is observed once per cycle.
//!
//! A component whose query fails is skipped for the cycle; nothing is pushed
//! for it. Failures never leak into other components.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::config::QueryConfig;
use crate::source::{MetricsSource, QueryResult};
use crate::status::Status;
use crate::statuspage::StatusReporter;
use crate::telemetry::PusherMetrics;

/// What happened to one component during a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pushed(Status),
    QueryFailed(String),
    PushFailed(Status, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentOutcome {
    pub component: String,
    pub outcome: Outcome,
}

/// Summary of one cycle, in component id order
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub query_duration: Duration,
    pub outcomes: Vec<ComponentOutcome>,
}

impl CycleReport {
    pub fn outcome(&self, component: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.component == component)
            .map(|o| &o.outcome)
    }

    pub fn pushed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Pushed(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.pushed()
    }
}

pub struct CollectionCycle<S, R> {
    queries: Arc<QueryConfig>,
    source: S,
    reporter: R,
    metrics: PusherMetrics,
}

impl<S, R> CollectionCycle<S, R>
where
    S: MetricsSource,
    R: StatusReporter,
{
    pub fn new(queries: Arc<QueryConfig>, source: S, reporter: R, metrics: PusherMetrics) -> Self {
        Self {
            queries,
            source,
            reporter,
            metrics,
        }
    }

    pub fn queries(&self) -> &QueryConfig {
        &self.queries
    }

    /// Run one full cycle and wait for every query and push to finish
    #[instrument(skip_all)]
    pub async fn run_once(&self) -> CycleReport {
        info!(
            "started to query and push statuses for {} components",
            self.queries.len()
        );

        let started_at = Utc::now();
        let start = Instant::now();

        if self.queries.is_empty() {
            self.metrics.observe_cycle(Duration::ZERO);
        }

        let pending = AtomicUsize::new(self.queries.len());
        let processed = join_all(self.queries.iter().map(|(component, expression)| {
            self.process_component(component, expression, start, &pending)
        }))
        .await;

        let query_duration = processed
            .iter()
            .map(|(_, elapsed)| *elapsed)
            .max()
            .unwrap_or_default();

        let report = CycleReport {
            started_at,
            query_duration,
            outcomes: processed.into_iter().map(|(outcome, _)| outcome).collect(),
        };

        info!(
            "finished querying and pushing statuses ({} pushed, {} failed)",
            report.pushed(),
            report.failed()
        );

        report
    }

    /// Query, classify and push one component. The last query of the cycle
    /// to resolve records the query phase duration.
    async fn process_component(
        &self,
        component: &str,
        expression: &str,
        start: Instant,
        pending: &AtomicUsize,
    ) -> (ComponentOutcome, Duration) {
        let result = self.source.query(expression).await;

        let elapsed = start.elapsed();
        if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.metrics.observe_cycle(elapsed);
            debug!("query phase took {elapsed:?}");
        }

        (self.push_component(component, result).await, elapsed)
    }

    async fn push_component(
        &self,
        component: &str,
        result: Result<QueryResult, crate::error::QueryError>,
    ) -> ComponentOutcome {
        let outcome = match result {
            Ok(result) => {
                if result.len() > 1 {
                    debug!(
                        "{component}: using first of {} samples, ignoring the rest",
                        result.len()
                    );
                }
                let status = Status::classify(result.first_value());
                self.push_status(component, status).await
            }
            Err(e) => {
                warn!("{component}: skipping push, {e}");
                self.metrics.record_query_failure(component);
                Outcome::QueryFailed(e.to_string())
            }
        };

        ComponentOutcome {
            component: component.to_string(),
            outcome,
        }
    }

    async fn push_status(&self, component: &str, status: Status) -> Outcome {
        match self.reporter.push(component, status).await {
            Ok(()) => {
                self.metrics.record_push(component, status.as_str());
                Outcome::Pushed(status)
            }
            Err(e) => {
                error!("{component}: failed to push status {status}: {e}");
                self.metrics.record_push_failure(component);
                Outcome::PushFailed(status, e.to_string())
            }
        }
    }
}
