//! Configuration validation.
//!
//! Serde handles the syntax; these checks cover what a well-formed file can
//! still get wrong. All errors are collected, not just the first.
//!
//! An empty project key is deliberately not an error here: it puts the edge
//! in its misconfigured pass-through mode instead of refusing to start.

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid listener bind address '{0}'")]
    BindAddress(String),

    #[error("invalid {field} '{value}'")]
    Url { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("duplicate redirection connection name '{0}'")]
    DuplicateConnection(String),

    #[error("upstream address must not be empty")]
    EmptyUpstream,

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (field, value) in [
        ("site_url", &config.site.site_url),
        ("admin_url", &config.site.admin_url),
    ] {
        if Url::parse(value).is_err() {
            errors.push(ValidationError::Url {
                field,
                value: value.clone(),
            });
        }
    }

    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_ms"));
    }
    if config.timeouts.command_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.command_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if let Some(connections) = &config.redirection.connections {
        let mut seen = HashSet::new();
        for connection in connections {
            if !seen.insert(connection.name.as_str()) {
                errors.push(ValidationError::DuplicateConnection(
                    connection.name.clone(),
                ));
            }
        }
    }

    if config.upstream.address.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstream);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ConnectionConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EdgeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = EdgeConfig::default();
        config.listener.bind_address = "nope".into();
        config.site.admin_url = "/wp-admin".into();
        config.timeouts.command_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroTimeout("timeouts.command_ms")));
    }

    #[test]
    fn test_duplicate_connection_names() {
        let mut config = EdgeConfig::default();
        config.redirection.connections = Some(vec![
            ConnectionConfig {
                name: "agent".into(),
                remote_socket: "tcp://127.0.0.1:1".into(),
            },
            ConnectionConfig {
                name: "agent".into(),
                remote_socket: "tcp://127.0.0.1:2".into(),
            },
        ]);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateConnection("agent".into())]
        );
    }

    #[test]
    fn test_empty_project_key_is_accepted() {
        let mut config = EdgeConfig::default();
        config.redirection.project_key.clear();
        config.redirection.connections = None;
        assert!(validate_config(&config).is_ok());
    }
}
