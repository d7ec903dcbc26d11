use std::time::Duration;

use thiserror::Error;

/// Configuration errors surfaced before any probe is issued.
///
/// These are caller mistakes, as opposed to probe failures at runtime which
/// are folded into the gate outcome instead of being raised.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("invalid target URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("unsupported scheme '{0}' (expected http, https or tcp)")]
    UnsupportedScheme(String),

    #[error("target URL has no host")]
    MissingHost,

    #[error("target URL has no port and the scheme implies none")]
    MissingPort,

    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    #[error("probe timeout must be greater than zero")]
    InvalidProbeTimeout,

    #[error("maximum wait must be greater than zero")]
    InvalidMaxWait,

    #[error("maximum interval must be greater than zero")]
    InvalidMaxInterval,

    #[error("maximum wait {max_wait:?} must exceed one poll interval {interval:?}")]
    DeadlineTooShort {
        max_wait: Duration,
        interval: Duration,
    },

    #[error("backoff factor {0} must be at least 1.0")]
    InvalidBackoff(f64),

    #[error("no target given (pass a URL, set READYGATE_TARGET or use --config)")]
    NoTarget,

    #[error("failed to read config file '{path}': {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    ConfigParse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
}
