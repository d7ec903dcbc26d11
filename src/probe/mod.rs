pub mod http;
pub mod tcp;

use std::fmt;

use crate::error::GateError;
use crate::gate::policy::{Endpoint, Scheme};

/// Classification of a single probe attempt.
///
/// `Refused`, `TimedOut` and `UnexpectedStatus` are the expected shapes of a
/// service that is still starting and are retried. `Failed` is reserved for
/// failures another attempt cannot fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The service answered. HTTP probes carry the response status.
    Up { http_status: Option<u16> },
    /// Nothing is listening on the endpoint yet.
    Refused,
    /// The probe did not complete within the per-probe timeout.
    TimedOut,
    /// The service answered with a status outside the accepted set.
    UnexpectedStatus { http_status: u16 },
    /// A failure retrying cannot fix (unresolvable host, broken request).
    Failed { detail: String },
}

impl ProbeStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, ProbeStatus::Up { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProbeStatus::Refused | ProbeStatus::TimedOut | ProbeStatus::UnexpectedStatus { .. }
        )
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Up {
                http_status: Some(code),
            } => write!(f, "up (status {code})"),
            ProbeStatus::Up { http_status: None } => write!(f, "up"),
            ProbeStatus::Refused => write!(f, "connection refused"),
            ProbeStatus::TimedOut => write!(f, "probe timed out"),
            ProbeStatus::UnexpectedStatus { http_status } => {
                write!(f, "unexpected status {http_status}")
            }
            ProbeStatus::Failed { detail } => write!(f, "probe failed: {detail}"),
        }
    }
}

/// One readiness check against a fixed endpoint.
///
/// The gate only ever sees this seam, so tests can script attempt sequences
/// without a server on the other end.
pub trait Probe {
    async fn check(&self) -> ProbeStatus;
}

/// The probe transports the binary wires up, selected by URL scheme.
pub enum ServiceProbe {
    Http(http::HttpProbe),
    Tcp(tcp::TcpProbe),
}

impl ServiceProbe {
    pub fn for_endpoint(
        endpoint: &Endpoint,
        probe_timeout: std::time::Duration,
        accepted_status_codes: Option<Vec<u16>>,
    ) -> Result<Self, GateError> {
        match endpoint.scheme {
            Scheme::Http | Scheme::Https => Ok(ServiceProbe::Http(http::HttpProbe::new(
                endpoint,
                probe_timeout,
                accepted_status_codes,
            )?)),
            Scheme::Tcp => {
                if accepted_status_codes.is_some() {
                    log::warn!("accepted status codes are ignored for tcp:// targets");
                }
                Ok(ServiceProbe::Tcp(tcp::TcpProbe::new(endpoint, probe_timeout)))
            }
        }
    }
}

impl Probe for ServiceProbe {
    async fn check(&self) -> ProbeStatus {
        match self {
            ServiceProbe::Http(probe) => probe.check().await,
            ServiceProbe::Tcp(probe) => probe.check().await,
        }
    }
}
