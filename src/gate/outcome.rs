use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::probe::ProbeStatus;

/// One probe execution. Logged, then discarded.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub number: u32,
    pub at: DateTime<Utc>,
    pub elapsed: Duration,
    pub status: ProbeStatus,
}

impl Attempt {
    pub fn new(number: u32, elapsed: Duration, status: ProbeStatus) -> Self {
        Attempt {
            number,
            at: Utc::now(),
            elapsed,
            status,
        }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.status.is_up() {
            "✅"
        } else if self.status.is_transient() {
            "⏳"
        } else {
            "❌"
        };
        write!(
            f,
            "{} {marker} attempt {} (t+{:.2}s): {}",
            self.at.format("%H:%M:%S%.3f"),
            self.number,
            self.elapsed.as_secs_f64(),
            self.status
        )
    }
}

/// Why a gate aborted before its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortCause {
    /// The caller cancelled the wait.
    Cancelled,
    /// A probe failed in a way retrying cannot fix.
    Fatal(String),
}

/// Terminal result of one gate invocation. Produced exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ready {
        attempts: u32,
        elapsed: Duration,
    },
    DeadlineExceeded {
        attempts: u32,
        elapsed: Duration,
        last_status: ProbeStatus,
    },
    Aborted {
        attempts: u32,
        elapsed: Duration,
        cause: AbortCause,
    },
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready { .. })
    }

    /// Process exit code for the command-line packaging. Zero only for
    /// `Ready`; timeouts and aborts stay distinguishable for the pipeline
    /// driver.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Ready { .. } => 0,
            Outcome::DeadlineExceeded { .. } => 1,
            Outcome::Aborted { .. } => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready { attempts, elapsed } => write!(
                f,
                "✅ ready after {attempts} attempt(s) in {:.2}s",
                elapsed.as_secs_f64()
            ),
            Outcome::DeadlineExceeded {
                attempts,
                elapsed,
                last_status,
            } => write!(
                f,
                "❌ deadline exceeded after {attempts} attempt(s) in {:.2}s (last: {last_status})",
                elapsed.as_secs_f64()
            ),
            Outcome::Aborted {
                attempts,
                elapsed,
                cause: AbortCause::Cancelled,
            } => write!(
                f,
                "❌ aborted after {attempts} attempt(s) in {:.2}s (cancelled)",
                elapsed.as_secs_f64()
            ),
            Outcome::Aborted {
                attempts,
                elapsed,
                cause: AbortCause::Fatal(detail),
            } => write!(
                f,
                "❌ aborted after {attempts} attempt(s) in {:.2}s ({detail})",
                elapsed.as_secs_f64()
            ),
        }
    }
}
