//! Error types for configuration, queries and pushes

use std::fmt;

/// Errors that abort startup
#[derive(Debug)]
pub enum ConfigError {
    /// The query configuration file could not be read
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The query configuration file is not a mapping of strings to strings
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    /// The collection interval is not a valid duration
    InvalidInterval(String),

    /// The log level is not one we know
    InvalidLogLevel(String),

    /// A URL parameter could not be parsed
    InvalidUrl { name: &'static str, value: String },

    /// The listen address could not be parsed
    InvalidListenAddr(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "couldn't read config file {path}: {source}")
            }
            ConfigError::Parse { path, source } => {
                write!(f, "couldn't parse config file {path}: {source}")
            }
            ConfigError::InvalidInterval(value) => {
                write!(f, "couldn't parse interval value: {value}")
            }
            ConfigError::InvalidLogLevel(value) => write!(f, "invalid log level: {value}"),
            ConfigError::InvalidUrl { name, value } => write!(f, "invalid {name} URL: {value}"),
            ConfigError::InvalidListenAddr(value) => write!(f, "invalid listen address: {value}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A query against the metrics source failed.
///
/// Transport errors, timeouts, non-2xx responses and malformed bodies all end
/// up here; callers only need to know that there is no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError(pub String);

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query failed: {}", self.0)
    }
}

impl std::error::Error for QueryError {}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError(err.to_string())
    }
}

/// A status push to the reporting API failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushError {
    /// The API answered with a status outside 200..300
    Status { status: u16, body: String },

    /// The request never produced a response
    Transport(String),

    /// The page or component id cannot be used as a URL path segment
    InvalidId(String),
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Status { status, body } if body.is_empty() => {
                write!(f, "HTTP status {status}, empty API response")
            }
            PushError::Status { status, body } => {
                write!(f, "HTTP status {status}, API error: {body}")
            }
            PushError::Transport(msg) => write!(f, "transport failure: {msg}"),
            PushError::InvalidId(id) => write!(f, "invalid id for URL path: {id:?}"),
        }
    }
}

impl std::error::Error for PushError {}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        PushError::Transport(err.to_string())
    }
}
