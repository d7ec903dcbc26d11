use serde::Deserialize;

/// A named target from the gate config file.
/// Contains the URL to wait for and optional per-target policy overrides;
/// anything left out falls back to the command-line values.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// The URL of the service to wait for.
    pub url: String,

    /// HTTP status codes that count as ready.
    /// Any response at all counts when not specified.
    #[serde(default)]
    pub accepted_status_codes: Option<Vec<u16>>,

    /// Seconds between probe attempts.
    #[serde(default)]
    pub interval_seconds: Option<f64>,

    /// Maximum seconds to wait for readiness.
    #[serde(default)]
    pub max_wait_seconds: Option<f64>,

    /// Per-probe timeout in seconds.
    #[serde(default)]
    pub probe_timeout_seconds: Option<f64>,

    /// Interval multiplier applied after each failed attempt.
    #[serde(default)]
    pub backoff: Option<f64>,
}

pub type Config = std::collections::HashMap<String, TargetConfig>;
