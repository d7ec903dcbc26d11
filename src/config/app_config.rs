use std::env;
use std::time::Duration;

use clap::Parser;

use super::model::{Config, TargetConfig};
use crate::error::GateError;
use crate::gate::policy::{Endpoint, PollPolicy};

/// Block until a dependent service accepts traffic, then exit 0.
///
/// Exit codes: 0 ready, 1 deadline exceeded, 2 aborted, 64 bad configuration.
#[derive(Debug, Parser)]
#[command(name = "readygate", version)]
pub struct Cli {
    /// Target URL (http://, https:// or tcp://). Falls back to the
    /// READYGATE_TARGET environment variable.
    pub target: Option<String>,

    /// Seconds between probe attempts.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub interval: f64,

    /// Maximum seconds to wait for readiness.
    #[arg(long, default_value_t = 60.0, allow_negative_numbers = true)]
    pub max_wait: f64,

    /// Per-probe timeout in seconds. Defaults to the poll interval.
    #[arg(long, allow_negative_numbers = true)]
    pub probe_timeout: Option<f64>,

    /// Multiply the interval by this factor after each failed attempt.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub backoff: f64,

    /// Upper bound on the interval once backoff kicks in, in seconds.
    #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
    pub max_interval: f64,

    /// HTTP status code that counts as ready (repeatable). Any response
    /// counts when omitted.
    #[arg(long = "status")]
    pub accepted_status_codes: Vec<u16>,

    /// YAML file with named targets to gate one after another.
    #[arg(long)]
    pub config: Option<String>,
}

/// One fully-resolved wait: where to probe and how.
#[derive(Debug, Clone)]
pub struct GatePlan {
    pub label: String,
    pub endpoint: Endpoint,
    pub policy: PollPolicy,
    pub accepted_status_codes: Option<Vec<u16>>,
}

/// Resolve the command line, environment and optional config file into the
/// list of gates to run. File targets come first (sorted by name for a stable
/// run order), then the positional/environment target if given.
pub fn load_plans(cli: &Cli) -> Result<Vec<GatePlan>, GateError> {
    let mut plans = Vec::new();

    if let Some(path) = &cli.config {
        let raw = std::fs::read_to_string(path).map_err(|source| GateError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let file: Config = serde_yaml::from_str(&raw).map_err(|source| GateError::ConfigParse {
            path: path.clone(),
            source,
        })?;

        log::info!("loaded {} target(s) from {path}", file.len());

        let mut names: Vec<String> = file.keys().cloned().collect();
        names.sort();
        for name in names {
            plans.push(plan_from_target(cli, &name, &file[&name])?);
        }
    }

    let direct_target = cli
        .target
        .clone()
        .or_else(|| env::var("READYGATE_TARGET").ok());
    if let Some(url) = direct_target {
        let endpoint = Endpoint::parse(&url)?;
        plans.push(GatePlan {
            label: endpoint.to_string(),
            endpoint,
            policy: base_policy(cli)?,
            accepted_status_codes: accepted_from_cli(cli),
        });
    }

    if plans.is_empty() {
        return Err(GateError::NoTarget);
    }
    Ok(plans)
}

fn plan_from_target(cli: &Cli, name: &str, target: &TargetConfig) -> Result<GatePlan, GateError> {
    let base = base_policy(cli)?;

    let interval = match target.interval_seconds {
        Some(secs) => seconds(secs, GateError::InvalidInterval)?,
        None => base.interval,
    };
    let max_wait = match target.max_wait_seconds {
        Some(secs) => seconds(secs, GateError::InvalidMaxWait)?,
        None => base.max_wait,
    };
    let probe_timeout = match (target.probe_timeout_seconds, cli.probe_timeout) {
        (Some(secs), _) => seconds(secs, GateError::InvalidProbeTimeout)?,
        (None, Some(_)) => base.probe_timeout,
        (None, None) => interval,
    };

    let policy = PollPolicy {
        interval,
        max_wait,
        probe_timeout,
        backoff: target.backoff.unwrap_or(base.backoff),
        max_interval: base.max_interval,
    };

    Ok(GatePlan {
        label: name.to_string(),
        endpoint: Endpoint::parse(&target.url)?,
        policy,
        accepted_status_codes: target
            .accepted_status_codes
            .clone()
            .or_else(|| accepted_from_cli(cli)),
    })
}

fn base_policy(cli: &Cli) -> Result<PollPolicy, GateError> {
    let interval = seconds(cli.interval, GateError::InvalidInterval)?;
    let probe_timeout = match cli.probe_timeout {
        Some(secs) => seconds(secs, GateError::InvalidProbeTimeout)?,
        None => interval,
    };
    Ok(PollPolicy {
        interval,
        max_wait: seconds(cli.max_wait, GateError::InvalidMaxWait)?,
        probe_timeout,
        backoff: cli.backoff,
        max_interval: seconds(cli.max_interval, GateError::InvalidMaxInterval)?,
    })
}

fn accepted_from_cli(cli: &Cli) -> Option<Vec<u16>> {
    if cli.accepted_status_codes.is_empty() {
        None
    } else {
        Some(cli.accepted_status_codes.clone())
    }
}

// Negative and non-finite inputs fail here; zero is caught by policy
// validation so the error names the offending knob.
fn seconds(value: f64, err: GateError) -> Result<Duration, GateError> {
    Duration::try_from_secs_f64(value).map_err(|_| err)
}
