//! HTTP listener settings.

use crate::error::{Result, SystemError};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default cap on concurrent WebSocket subscribers.
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 100;

/// Where the dashboard listens and what it serves.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind: SocketAddr,
    /// Send permissive CORS headers
    pub cors: bool,
    /// Directory mounted at `/static`; its `index.html` replaces the built-in page
    pub static_dir: Option<PathBuf>,
    /// WebSocket upgrades beyond this many subscribers get a 503
    pub max_subscribers: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), crate::DEFAULT_WEB_PORT),
            cors: true,
            static_dir: Some(PathBuf::from("static")),
            max_subscribers: DEFAULT_MAX_SUBSCRIBERS,
        }
    }
}

impl WebConfig {
    /// Listen on `host:port`. `host` must be an IPv4 or IPv6 literal.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let ip = host
            .parse::<IpAddr>()
            .map_err(|e| SystemError::config_error(format!("Invalid bind host {:?}: {}", host, e)))?;

        Ok(Self {
            bind: SocketAddr::new(ip, port),
            ..Default::default()
        })
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    /// `None` serves the built-in dashboard and no `/static` route.
    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    pub fn with_max_subscribers(mut self, max: usize) -> Self {
        self.max_subscribers = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listens_everywhere() {
        let config = WebConfig::default();
        assert_eq!(config.bind.to_string(), "0.0.0.0:8080");
        assert!(config.cors);
        assert_eq!(config.max_subscribers, DEFAULT_MAX_SUBSCRIBERS);
    }

    #[test]
    fn test_ipv6_host() {
        let config = WebConfig::new("::1", 9090).unwrap();
        assert_eq!(config.bind.to_string(), "[::1]:9090");
    }

    #[test]
    fn test_hostname_is_rejected() {
        let err = WebConfig::new("not a host", 9090).unwrap_err();
        assert!(matches!(err, SystemError::Config(_)));
    }
}
