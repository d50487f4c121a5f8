//! Startup parameters and the query configuration file

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::trace;
use url::Url;

use crate::error::ConfigError;
use crate::statuspage::DEFAULT_BASE_URL;

/// Component id to query expression, read once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QueryConfig(BTreeMap<String, String>);

impl QueryConfig {
    pub fn new(queries: BTreeMap<String, String>) -> Self {
        Self(queries)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse(&content)
            .map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })
            .inspect(|config| trace!("loaded query config: {config:?}"))
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document is a valid, empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, component: &str) -> Option<&str> {
        self.0.get(component).map(String::as_str)
    }

    /// (component id, expression) pairs in component id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, expr)| (id.as_str(), expr.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryConfig {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Raw startup parameters.
///
/// Every flag can also be given as an upper-cased environment variable, which
/// wins over the flag (see [`Args::overlay_env`]).
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(version, about = "Push Prometheus query results to Statuspage")]
pub struct Args {
    /// URL of Prometheus server
    #[arg(long, default_value = "http://localhost:9090")]
    pub prom: String,

    /// Statuspage API key
    #[arg(long, default_value = "")]
    pub apikey: String,

    /// Statuspage page ID
    #[arg(long, default_value = "")]
    pub pageid: String,

    /// Query config file
    #[arg(long, default_value = "queries.yaml")]
    pub config: String,

    /// Metric push interval
    #[arg(long, default_value = "300s")]
    pub interval: String,

    /// Log level, for example "error", "warn", "info", "debug", ...
    #[arg(long, default_value = "info")]
    pub loglevel: String,

    /// Base URL of the Statuspage API
    #[arg(long = "statuspage-url", default_value = DEFAULT_BASE_URL)]
    pub statuspage_url: String,

    /// Address for the /healthz and /metrics endpoints
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub listen: String,
}

impl Default for Args {
    fn default() -> Self {
        Self::parse_from(["statuspage-pusher"])
    }
}

impl Args {
    /// Replace every value whose environment variable is set
    pub fn overlay_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields: [(&str, &mut String); 8] = [
            ("PROM", &mut self.prom),
            ("APIKEY", &mut self.apikey),
            ("PAGEID", &mut self.pageid),
            ("CONFIG", &mut self.config),
            ("INTERVAL", &mut self.interval),
            ("LOGLEVEL", &mut self.loglevel),
            ("STATUSPAGE_URL", &mut self.statuspage_url),
            ("LISTEN", &mut self.listen),
        ];

        for (key, field) in fields {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        self
    }

    /// Parse the command line and apply the process environment
    pub fn from_env() -> Self {
        Self::parse().overlay_env(|key| std::env::var(key).ok())
    }

    pub fn resolve(self) -> Result<Settings, ConfigError> {
        Ok(Settings {
            prometheus_url: parse_url("Prometheus", &self.prom)?,
            statuspage_url: parse_url("Statuspage", &self.statuspage_url)?,
            api_key: self.apikey,
            page_id: self.pageid,
            query_config: self.config,
            interval: parse_interval(&self.interval)?,
            log_level: parse_log_level(&self.loglevel)?,
            listen: self
                .listen
                .parse()
                .map_err(|_| ConfigError::InvalidListenAddr(self.listen.clone()))?,
        })
    }
}

/// Validated, immutable process settings
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub prometheus_url: Url,
    pub statuspage_url: Url,
    pub api_key: String,
    pub page_id: String,
    pub query_config: String,
    pub interval: Duration,
    pub log_level: LevelFilter,
    pub listen: SocketAddr,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("prometheus_url", &self.prometheus_url.as_str())
            .field("statuspage_url", &self.statuspage_url.as_str())
            .field("api_key", &"<redacted>")
            .field("page_id", &self.page_id)
            .field("query_config", &self.query_config)
            .field("interval", &self.interval)
            .field("log_level", &self.log_level)
            .field("listen", &self.listen)
            .finish()
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    };

    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(url)
}

/// Durations like `300s`, `5m` or `1h30m`
pub fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    let interval = humantime::parse_duration(value.trim())
        .map_err(|e| ConfigError::InvalidInterval(format!("{value}: {e}")))?;

    if interval.is_zero() {
        return Err(ConfigError::InvalidInterval(format!(
            "{value}: interval must be positive"
        )));
    }

    Ok(interval)
}

pub fn parse_log_level(value: &str) -> Result<LevelFilter, ConfigError> {
    let level = match value.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" | "fatal" | "panic" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => return Err(ConfigError::InvalidLogLevel(value.to_string())),
    };
    Ok(level)
}
