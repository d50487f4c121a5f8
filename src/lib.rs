//! Periodically evaluates Prometheus queries and reports the result of each
//! one as the status of a Statuspage component.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod cycle;
pub mod error;
pub mod scheduler;
pub mod source;
pub mod status;
pub mod statuspage;
pub mod telemetry;

pub use config::{Args, QueryConfig, Settings};
pub use cycle::{CollectionCycle, CycleReport, Outcome};
pub use scheduler::Scheduler;
pub use source::{MetricsSource, PrometheusClient, QueryResult};
pub use status::Status;
pub use statuspage::{StatusReporter, StatuspageClient};
pub use telemetry::PusherMetrics;
