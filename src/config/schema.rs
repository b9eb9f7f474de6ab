//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the redirection edge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Site layout used to locate the administrative area.
    pub site: SiteConfig,

    /// Redirection service settings (project key, endpoints).
    pub redirection: RedirectionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Upstream that produces the site's content.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Public URLs of the site and of its administrative interface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root URL of the site (e.g., "https://example.com").
    pub site_url: String,

    /// URL of the administrative interface (e.g., "https://example.com/wp-admin/").
    pub admin_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost".to_string(),
            admin_url: "http://localhost/wp-admin/".to_string(),
        }
    }
}

/// Settings for the external redirection service.
///
/// The defaults mirror a fresh install: an empty project key, a single
/// unnamed connection and admin pages excluded from redirection. Such a
/// configuration is accepted at startup but leaves the edge misconfigured,
/// so every request passes through untouched.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RedirectionConfig {
    /// Project key identifying the rule set on the service.
    pub project_key: String,

    /// Named endpoints of the service, in preference order.
    ///
    /// `None` when the key is missing from the file.
    #[serde(default)]
    pub connections: Option<Vec<ConnectionConfig>>,

    /// Skip rule matching for requests under the admin root.
    pub do_not_redirect_admin: bool,
}

impl Default for RedirectionConfig {
    fn default() -> Self {
        Self {
            project_key: String::new(),
            connections: Some(vec![ConnectionConfig::default()]),
            do_not_redirect_admin: true,
        }
    }
}

/// A named socket endpoint of the redirection service.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Operator-chosen connection name, unique within the list.
    #[serde(default)]
    pub name: String,

    /// Socket address, e.g. "tcp://127.0.0.1:20301" or "unix:///var/run/agent.sock".
    #[serde(default)]
    pub remote_socket: String,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout to a service endpoint, in milliseconds.
    pub connect_ms: u64,

    /// Deadline for a whole match or log command, in milliseconds.
    pub command_ms: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 500,
            command_ms: 1000,
            request_secs: 30,
        }
    }
}

/// Upstream application server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_install_defaults() {
        let config = RedirectionConfig::default();
        assert!(config.project_key.is_empty());
        assert!(config.do_not_redirect_admin);
        assert_eq!(config.connections, Some(vec![ConnectionConfig::default()]));
    }

    #[test]
    fn test_missing_connections_is_none() {
        let config: EdgeConfig = toml::from_str(
            r#"
            [redirection]
            project_key = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.redirection.project_key, "abc");
        assert!(config.redirection.connections.is_none());
        assert!(config.redirection.do_not_redirect_admin);
    }

    #[test]
    fn test_parse_full_section() {
        let config: EdgeConfig = toml::from_str(
            r#"
            [site]
            site_url = "https://x.test"
            admin_url = "https://x.test/wp-admin/"

            [redirection]
            project_key = "abc"
            do_not_redirect_admin = false

            [[redirection.connections]]
            name = "primary"
            remote_socket = "tcp://127.0.0.1:20301"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        let connections = config.redirection.connections.unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].name, "primary");
        assert!(!config.redirection.do_not_redirect_admin);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.timeouts.command_ms, 1000);
    }
}
