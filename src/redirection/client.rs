//! Redirection service client with timeout and error handling.
//!
//! # Responsibilities
//! - Hold the project key and endpoints of one request cycle
//! - Issue match and log commands through a [`Transport`]
//! - Bound every command with a deadline
//! - Turn every failure into pass-through so the site keeps serving

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::config::RedirectionConfig;
use crate::http::request::RequestContext;
use crate::observability::metrics;
use crate::redirection::error::{ClientError, ClientResult};
use crate::redirection::transport::Transport;
use crate::redirection::types::{
    Command, Decision, Endpoint, LogRequest, LoggedResponse, RuleMatch,
};

/// Client facade for one request cycle.
#[derive(Clone)]
pub struct RedirectionClient {
    project_key: String,
    endpoints: Arc<[Endpoint]>,
    transport: Arc<dyn Transport>,
    command_timeout: Duration,
}

impl std::fmt::Debug for RedirectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectionClient")
            .field("endpoints", &self.endpoints)
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}

impl RedirectionClient {
    pub fn new(
        project_key: impl Into<String>,
        endpoints: Vec<Endpoint>,
        transport: Arc<dyn Transport>,
        command_timeout: Duration,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            endpoints: endpoints.into(),
            transport,
            command_timeout,
        }
    }

    /// Build a client from configuration.
    ///
    /// Returns `None` when the project key is empty or the connection list
    /// is missing; the caller treats that as a misconfigured edge.
    pub fn from_config(
        config: &RedirectionConfig,
        transport: Arc<dyn Transport>,
        command_timeout: Duration,
    ) -> Option<Self> {
        if config.project_key.is_empty() {
            return None;
        }
        let connections = config.connections.as_ref()?;

        Some(Self::new(
            config.project_key.clone(),
            Endpoint::from_connections(connections),
            transport,
            command_timeout,
        ))
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Ask the service whether a rule matches the request.
    ///
    /// Transport failures, timeouts and malformed answers all yield `None`.
    pub async fn match_request(&self, request: &RequestContext) -> Option<Decision> {
        let command = Command::Match(request.clone());
        let answer = match self.execute(&command).await {
            Ok(answer) => answer?,
            Err(e) => {
                tracing::warn!(
                    host = %request.host,
                    path = %request.path,
                    error = %e,
                    "Redirection match failed, passing request through"
                );
                return None;
            }
        };

        match Decision::try_from(answer) {
            Ok(decision) => Some(decision),
            Err(e) => {
                metrics::record_backend_error(command.name());
                tracing::warn!(path = %request.path, error = %e, "Ignoring unusable rule answer");
                None
            }
        }
    }

    /// Report the final response of a request. Failures are logged and dropped.
    pub async fn log(&self, request: &RequestContext, response: &LoggedResponse) {
        let command = Command::Log(LogRequest {
            request: request.clone(),
            response: response.clone(),
        });
        match self.execute(&command).await {
            Ok(_) => metrics::record_log_sent(),
            Err(e) => {
                tracing::warn!(
                    path = %request.path,
                    status = response.status_code,
                    error = %e,
                    "Redirection log dropped"
                );
            }
        }
    }

    async fn execute(&self, command: &Command) -> ClientResult<Option<RuleMatch>> {
        let start = Instant::now();
        let fut = self
            .transport
            .send(&self.endpoints, &self.project_key, command);

        let result = match timeout(self.command_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.command_timeout.as_millis() as u64)),
        };

        metrics::record_command(command.name(), start);
        if result.is_err() {
            metrics::record_backend_error(command.name());
        }
        result
    }
}
