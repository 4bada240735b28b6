//! Backend addressing types.

use std::fmt;

/// Host and port of one inference backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendAddress {
    host: String,
    port: u16,
}

impl BackendAddress {
    /// Create an address for a backend on `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Host as it appears in a URL authority (IPv6 literals bracketed).
    #[must_use]
    pub fn url_host(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// Base URL of the backend (e.g., <http://localhost:8081>).
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.url_host(), self.port)
    }
}

impl fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.url_host(), self.port)
    }
}

/// One model id served by one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub model_id: String,
    pub address: BackendAddress,
}

/// What a single probe found: a live backend and the ids it reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendModels {
    pub address: BackendAddress,
    pub model_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_and_display() {
        let addr = BackendAddress::new("localhost", 8081);
        assert_eq!(addr.base_url(), "http://localhost:8081");
        assert_eq!(addr.to_string(), "localhost:8081");
        assert_eq!(addr.port(), 8081);
        assert_eq!(addr.host(), "localhost");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let addr = BackendAddress::new("::1", 8081);
        assert_eq!(addr.base_url(), "http://[::1]:8081");
        assert_eq!(addr.to_string(), "[::1]:8081");

        let already = BackendAddress::new("[::1]", 8081);
        assert_eq!(already.base_url(), "http://[::1]:8081");
    }
}
