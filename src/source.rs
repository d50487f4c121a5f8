//! Metrics source client
//!
//! Evaluates instant queries against the Prometheus HTTP API
//! (`GET /api/v1/query`) and turns the response into a flat list of samples.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use crate::error::QueryError;
use crate::telemetry::PusherMetrics;

/// Timeout applied to every query request
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// One numeric sample of a query result
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

/// Samples returned by one query, in the order the source returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub samples: Vec<Sample>,
}

impl QueryResult {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Result holding a single unlabeled sample
    pub fn single(value: f64) -> Self {
        Self::new(vec![Sample {
            labels: BTreeMap::new(),
            value,
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Value of the first sample in result order; the rest are not consulted
    pub fn first_value(&self) -> Option<f64> {
        self.samples.first().map(|sample| sample.value)
    }
}

#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn query(&self, expression: &str) -> Result<QueryResult, QueryError>;
}

/// Client for a Prometheus-compatible query API
#[derive(Clone)]
pub struct PrometheusClient {
    client: reqwest::Client,
    endpoint: Url,
    metrics: PusherMetrics,
}

impl PrometheusClient {
    pub fn new(base: &Url, metrics: PusherMetrics) -> anyhow::Result<Self> {
        Self::with_timeout(base, metrics, QUERY_TIMEOUT)
    }

    pub fn with_timeout(
        base: &Url,
        metrics: PusherMetrics,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut endpoint = base.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| anyhow!("{base} cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(["api", "v1", "query"]);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            metrics,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute(&self, expression: &str) -> Result<QueryResult, QueryError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("query", expression)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(QueryError(format!("HTTP error: {status}: {body}")));
        }

        let response: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| QueryError(format!("malformed response body: {e}")))?;

        response.into_result()
    }
}

#[async_trait]
impl MetricsSource for PrometheusClient {
    #[instrument(skip(self))]
    async fn query(&self, expression: &str) -> Result<QueryResult, QueryError> {
        if expression.trim().is_empty() {
            return Err(QueryError("empty query expression".to_string()));
        }

        trace!("querying {}", self.endpoint);

        let start = Instant::now();
        let result = self.execute(expression).await;
        self.metrics.observe_prometheus_request(start.elapsed());

        match &result {
            Ok(result) => debug!("query returned {} samples", result.len()),
            Err(e) => warn!("{e}"),
        }

        result
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    data: Option<QueryData>,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "resultType", content = "result", rename_all = "lowercase")]
enum QueryData {
    Vector(Vec<VectorSeries>),
    Matrix(Vec<MatrixSeries>),
    Scalar(RawPoint),
    String(RawPoint),
}

#[derive(Debug, Deserialize)]
struct VectorSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    value: RawPoint,
}

#[derive(Debug, Deserialize)]
struct MatrixSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    values: Vec<RawPoint>,
}

/// `[<unix timestamp>, "<value>"]`
type RawPoint = (f64, String);

fn parse_value((_, value): &RawPoint) -> Result<f64, QueryError> {
    value
        .parse::<f64>()
        .map_err(|_| QueryError(format!("invalid sample value {value:?}")))
}

impl ApiResponse {
    fn into_result(self) -> Result<QueryResult, QueryError> {
        if self.status != "success" {
            return Err(QueryError(format!(
                "{}: {}",
                self.error_type.as_deref().unwrap_or("error"),
                self.error.as_deref().unwrap_or("no error message")
            )));
        }

        let data = self
            .data
            .ok_or_else(|| QueryError("response has no data".to_string()))?;

        let samples = match data {
            QueryData::Vector(series) => series
                .into_iter()
                .map(|series| {
                    Ok(Sample {
                        value: parse_value(&series.value)?,
                        labels: series.metric,
                    })
                })
                .collect::<Result<Vec<_>, QueryError>>()?,
            // first point of each series, so the first sample is still the
            // first point of the first series
            QueryData::Matrix(series) => series
                .into_iter()
                .filter_map(|series| {
                    let point = series.values.first()?;
                    Some(parse_value(point).map(|value| Sample {
                        labels: series.metric,
                        value,
                    }))
                })
                .collect::<Result<Vec<_>, QueryError>>()?,
            QueryData::Scalar(point) => vec![Sample {
                labels: BTreeMap::new(),
                value: parse_value(&point)?,
            }],
            QueryData::String(_) => {
                return Err(QueryError("string results are not supported".to_string()));
            }
        };

        Ok(QueryResult::new(samples))
    }
}
