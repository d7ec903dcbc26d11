use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use super::outcome::{AbortCause, Attempt, Outcome};
use super::policy::{Endpoint, PollPolicy};
use crate::error::GateError;
use crate::probe::{Probe, ProbeStatus};

/// Blocks a pipeline until a dependent service answers its probe.
///
/// A gate runs once: construction validates the endpoint and policy without
/// touching the network, `wait` consumes the gate, probes on the policy's
/// cadence and resolves to exactly one [`Outcome`]. The progression is
/// idle → probing → ready | deadline exceeded | aborted, and every terminal
/// state is final; waiting again means constructing a fresh gate.
pub struct ReadinessGate {
    endpoint: Endpoint,
    policy: PollPolicy,
    label: String,
}

impl ReadinessGate {
    pub fn new(endpoint: Endpoint, policy: PollPolicy) -> Result<Self, GateError> {
        policy.validate()?;
        let label = endpoint.to_string();
        Ok(ReadinessGate {
            endpoint,
            policy,
            label,
        })
    }

    /// Prefix for the per-attempt log lines. Defaults to the endpoint URL.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Poll until the probe reports the service up, the deadline passes, or
    /// `cancel` fires.
    ///
    /// The deadline is checked before every sleep and the sleep target is
    /// clamped to it, so the gate never sleeps past the deadline and the last
    /// attempt lands as close to it as possible. Attempts are strictly
    /// sequential; the inter-attempt sleep and the probe itself both race the
    /// cancellation token, so an abort resolves without waiting out the
    /// current interval.
    pub async fn wait<P: Probe>(self, probe: &P, cancel: &CancellationToken) -> Outcome {
        let started = Instant::now();
        let deadline = started + self.policy.max_wait;
        let mut interval = self.policy.interval;
        let mut attempts: u32 = 0;
        let mut last_status = ProbeStatus::Refused;

        log::debug!(
            "[{}] waiting for {} up to {:.1}s, probing every {:.1}s",
            self.label,
            self.endpoint,
            self.policy.max_wait.as_secs_f64(),
            self.policy.interval.as_secs_f64()
        );

        loop {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Outcome::Aborted {
                        attempts,
                        elapsed: started.elapsed(),
                        cause: AbortCause::Cancelled,
                    };
                }
                status = probe.check() => status,
            };

            attempts += 1;
            let elapsed = started.elapsed();
            let attempt = Attempt::new(attempts, elapsed, status.clone());
            println!("[{}] {attempt}", self.label);

            match status {
                ProbeStatus::Up { .. } => {
                    return Outcome::Ready { attempts, elapsed };
                }
                ProbeStatus::Failed { detail } => {
                    return Outcome::Aborted {
                        attempts,
                        elapsed,
                        cause: AbortCause::Fatal(detail),
                    };
                }
                transient => last_status = transient,
            }

            let now = Instant::now();
            if now >= deadline {
                return Outcome::DeadlineExceeded {
                    attempts,
                    elapsed: started.elapsed(),
                    last_status,
                };
            }

            let wake = deadline.min(now + interval);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Outcome::Aborted {
                        attempts,
                        elapsed: started.elapsed(),
                        cause: AbortCause::Cancelled,
                    };
                }
                _ = sleep_until(wake) => {}
            }

            interval = self.policy.next_interval(interval);
        }
    }
}
