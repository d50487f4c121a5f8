//! Component status pusher for the Statuspage API

use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::PushError;
use crate::status::Status;

/// Public Statuspage API
pub const DEFAULT_BASE_URL: &str = "https://api.statuspage.io/v1";

/// Timeout applied to every push request
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait StatusReporter: Send + Sync {
    async fn push(&self, component_id: &str, status: Status) -> Result<(), PushError>;
}

/// `{"component": {"status": "..."}}`
#[derive(Debug, Clone, Serialize)]
pub struct ComponentUpdate {
    pub component: ComponentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub status: Status,
}

impl ComponentUpdate {
    pub fn new(status: Status) -> Self {
        Self {
            component: ComponentStatus { status },
        }
    }
}

#[derive(Clone)]
pub struct StatuspageClient {
    client: Client,
    base: Url,
    page_id: String,
    api_key: String,
}

impl StatuspageClient {
    pub fn new(base: Url, page_id: String, api_key: String) -> anyhow::Result<Self> {
        if base.cannot_be_a_base() {
            return Err(anyhow!("{base} cannot be used as a base URL"));
        }

        let client = Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base,
            page_id,
            api_key,
        })
    }

    /// `{base}/pages/{page_id}/components/{component_id}` with both ids
    /// percent-encoded as single path segments.
    ///
    /// Empty ids and the dot segments `.` and `..` cannot be expressed as a
    /// single segment and are rejected.
    pub fn component_url(&self, component_id: &str) -> Result<Url, PushError> {
        for id in [self.page_id.as_str(), component_id] {
            if matches!(id, "" | "." | "..") {
                return Err(PushError::InvalidId(id.to_string()));
            }
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PushError::InvalidId(self.base.to_string()))?
            .pop_if_empty()
            .push("pages")
            .push(&self.page_id)
            .push("components")
            .push(component_id);
        Ok(url)
    }
}

#[async_trait]
impl StatusReporter for StatuspageClient {
    #[instrument(skip(self))]
    async fn push(&self, component_id: &str, status: Status) -> Result<(), PushError> {
        let payload = ComponentUpdate::new(status);
        debug!(
            "status payload: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        );

        info!("pushing status {status} for component {component_id}");

        let response = self
            .client
            .patch(self.component_url(component_id)?)
            .header(header::AUTHORIZATION, format!("OAuth {}", self.api_key))
            .json(&payload)
            .send()
            .await?;

        let code = response.status();
        if code.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PushError::Status {
            status: code.as_u16(),
            body,
        })
    }
}
