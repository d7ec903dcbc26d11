use std::io;
use std::time::Duration;

use reqwest::Client;

use super::ProbeStatus;
use crate::error::GateError;
use crate::gate::policy::Endpoint;

/// HTTP readiness probe: one GET per attempt.
///
/// The client keeps no idle connections, so every attempt exercises a fresh
/// connect. Certificate validation is disabled; CI mock servers present
/// self-signed certificates.
pub struct HttpProbe {
    client: Client,
    url: String,
    accepted_status_codes: Option<Vec<u16>>,
}

impl HttpProbe {
    pub fn new(
        endpoint: &Endpoint,
        probe_timeout: Duration,
        accepted_status_codes: Option<Vec<u16>>,
    ) -> Result<Self, GateError> {
        let client = Client::builder()
            .timeout(probe_timeout)
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("readygate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GateError::HttpClient)?;

        Ok(HttpProbe {
            client,
            url: endpoint.url(),
            accepted_status_codes,
        })
    }

    pub async fn check(&self) -> ProbeStatus {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match &self.accepted_status_codes {
                    Some(accepted) if !accepted.contains(&status) => {
                        ProbeStatus::UnexpectedStatus {
                            http_status: status,
                        }
                    }
                    _ => ProbeStatus::Up {
                        http_status: Some(status),
                    },
                }
            }
            Err(err) => classify_error(&err),
        }
    }
}

fn classify_error(err: &reqwest::Error) -> ProbeStatus {
    if err.is_timeout() {
        return ProbeStatus::TimedOut;
    }
    if err.is_connect() {
        if let Some(io_err) = find_io_source(err) {
            return match io_err.kind() {
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted => ProbeStatus::Refused,
                io::ErrorKind::TimedOut => ProbeStatus::TimedOut,
                _ => ProbeStatus::Failed {
                    detail: report(err),
                },
            };
        }
        // Connect failure with no io detail, typically name resolution.
        return ProbeStatus::Failed {
            detail: report(err),
        };
    }
    ProbeStatus::Failed {
        detail: report(err),
    }
}

fn find_io_source<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a io::Error> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        source = inner.source();
    }
    None
}

fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    use std::fmt::Write;

    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
