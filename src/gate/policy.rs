use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::GateError;

/// Probe transport, derived from the target URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    Tcp,
}

/// The service to wait for. Parsed once from the target URL and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    /// Parse and validate a target URL.
    ///
    /// Accepts `http://`, `https://` and `tcp://` targets. The port may be
    /// omitted for http/https (80/443 are assumed); `tcp://` targets must name
    /// one explicitly.
    pub fn parse(raw: &str) -> Result<Self, GateError> {
        let url = Url::parse(raw).map_err(|source| GateError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "tcp" => Scheme::Tcp,
            other => return Err(GateError::UnsupportedScheme(other.to_string())),
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(GateError::MissingHost)?
            .to_string();

        let port = url
            .port_or_known_default()
            .ok_or(GateError::MissingPort)?;

        let path = match url.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };

        Ok(Endpoint {
            scheme,
            host,
            port,
            path,
        })
    }

    /// The URL probed by the HTTP transports.
    pub fn url(&self) -> String {
        let scheme = match self.scheme {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Tcp => "tcp",
        };
        format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }

    /// `host:port`, as consumed by `TcpStream::connect`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// How to wait: the cadence, the deadline and the per-probe timeout.
///
/// A factor above 1.0 stretches the interval after every failed attempt, up to
/// `max_interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
    pub probe_timeout: Duration,
    pub backoff: f64,
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(1),
            backoff: 1.0,
            max_interval: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    pub fn validate(&self) -> Result<(), GateError> {
        if self.interval.is_zero() {
            return Err(GateError::InvalidInterval);
        }
        if self.probe_timeout.is_zero() {
            return Err(GateError::InvalidProbeTimeout);
        }
        if self.max_wait <= self.interval {
            return Err(GateError::DeadlineTooShort {
                max_wait: self.max_wait,
                interval: self.interval,
            });
        }
        if self.backoff < 1.0 {
            return Err(GateError::InvalidBackoff(self.backoff));
        }
        Ok(())
    }

    /// The interval to sleep after one more failed attempt.
    pub fn next_interval(&self, current: Duration) -> Duration {
        if self.backoff <= 1.0 {
            return current;
        }
        current.mul_f64(self.backoff).min(self.max_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http_target_with_explicit_port() {
        let endpoint = Endpoint::parse("http://localhost:5000/").expect("valid URL");
        assert_eq!(endpoint.scheme, Scheme::Http);
        assert_eq!(endpoint.host, "localhost");
        assert_eq!(endpoint.port, 5000);
        assert_eq!(endpoint.path, "/");
        assert_eq!(endpoint.url(), "http://localhost:5000/");
    }

    #[test]
    fn assumes_default_ports_for_http_and_https() {
        assert_eq!(Endpoint::parse("http://example.com").unwrap().port, 80);
        assert_eq!(Endpoint::parse("https://example.com").unwrap().port, 443);
    }

    #[test]
    fn keeps_the_health_path() {
        let endpoint = Endpoint::parse("http://localhost:5000/health").unwrap();
        assert_eq!(endpoint.path, "/health");
        assert_eq!(endpoint.url(), "http://localhost:5000/health");
    }

    #[test]
    fn selects_tcp_scheme_and_requires_a_port() {
        let endpoint = Endpoint::parse("tcp://127.0.0.1:6379").unwrap();
        assert_eq!(endpoint.scheme, Scheme::Tcp);
        assert_eq!(endpoint.authority(), "127.0.0.1:6379");

        assert!(matches!(
            Endpoint::parse("tcp://127.0.0.1"),
            Err(GateError::MissingPort)
        ));
    }

    #[test]
    fn rejects_junk_targets() {
        assert!(matches!(
            Endpoint::parse("ftp://example.com"),
            Err(GateError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            Endpoint::parse("not a url"),
            Err(GateError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let policy = PollPolicy {
            interval: Duration::ZERO,
            ..PollPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(GateError::InvalidInterval)));
    }

    #[test]
    fn validate_rejects_deadline_at_or_below_one_interval() {
        let policy = PollPolicy {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(5),
            ..PollPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(GateError::DeadlineTooShort { .. })
        ));
    }

    #[test]
    fn validate_rejects_backoff_below_one() {
        let policy = PollPolicy {
            backoff: 0.5,
            ..PollPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(GateError::InvalidBackoff(_))
        ));
    }

    #[test]
    fn backoff_grows_the_interval_up_to_the_cap() {
        let policy = PollPolicy {
            backoff: 2.0,
            max_interval: Duration::from_secs(4),
            ..PollPolicy::default()
        };
        let mut interval = policy.interval;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(interval);
            interval = policy.next_interval(interval);
        }
        assert_eq!(
            seen,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn fixed_cadence_leaves_the_interval_alone() {
        let policy = PollPolicy::default();
        assert_eq!(
            policy.next_interval(Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }
}
