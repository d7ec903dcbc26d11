use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use super::ProbeStatus;
use crate::gate::policy::Endpoint;

/// Raw TCP readiness probe for services without an HTTP surface.
///
/// A completed connect is the whole check; the socket is dropped immediately.
pub struct TcpProbe {
    addr: String,
    probe_timeout: Duration,
}

impl TcpProbe {
    pub fn new(endpoint: &Endpoint, probe_timeout: Duration) -> Self {
        TcpProbe {
            addr: endpoint.authority(),
            probe_timeout,
        }
    }

    pub async fn check(&self) -> ProbeStatus {
        match timeout(self.probe_timeout, TcpStream::connect(&self.addr)).await {
            Err(_) => ProbeStatus::TimedOut,
            Ok(Ok(_stream)) => ProbeStatus::Up { http_status: None },
            Ok(Err(err)) => match err.kind() {
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted => ProbeStatus::Refused,
                io::ErrorKind::TimedOut => ProbeStatus::TimedOut,
                _ => ProbeStatus::Failed {
                    detail: err.to_string(),
                },
            },
        }
    }
}
