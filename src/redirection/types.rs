//! Commands, answers and decisions exchanged with the redirection service.

use serde::{Deserialize, Serialize};

use crate::config::ConnectionConfig;
use crate::http::request::RequestContext;
use crate::redirection::error::ClientError;

/// A named service endpoint, handed to the transport as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub remote_socket: String,
}

impl Endpoint {
    /// Build the ordered endpoint list from configured connections.
    ///
    /// A repeated name replaces the earlier endpoint's address in place.
    pub fn from_connections(connections: &[ConnectionConfig]) -> Vec<Endpoint> {
        let mut endpoints: Vec<Endpoint> = Vec::with_capacity(connections.len());
        for connection in connections {
            match endpoints.iter_mut().find(|e| e.name == connection.name) {
                Some(existing) => existing.remote_socket = connection.remote_socket.clone(),
                None => endpoints.push(Endpoint {
                    name: connection.name.clone(),
                    remote_socket: connection.remote_socket.clone(),
                }),
            }
        }
        endpoints
    }
}

/// Final response details reported by a log command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedResponse {
    pub status_code: u16,
    pub rule_id: Option<String>,
    pub location: Option<String>,
}

/// Payload of a log command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRequest {
    #[serde(flatten)]
    pub request: RequestContext,
    #[serde(flatten)]
    pub response: LoggedResponse,
}

/// A command sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "snake_case")]
pub enum Command {
    Match(RequestContext),
    Log(LogRequest),
}

impl Command {
    /// Short name used in logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Match(_) => "match",
            Command::Log(_) => "log",
        }
    }

    /// Whether the service answers this command.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Command::Match(_))
    }
}

/// Rule answer returned by the service for a match command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub status_code: u16,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub rule_id: Option<String>,
}

/// What to do with a request that matched a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Send a redirect to `location` with the given status.
    Redirect {
        status: u16,
        location: String,
        rule_id: Option<String>,
    },
    /// Answer 410 Gone.
    Gone { rule_id: Option<String> },
}

impl Decision {
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Decision::Redirect { rule_id, .. } | Decision::Gone { rule_id } => rule_id.as_deref(),
        }
    }

    /// Consume the decision, keeping only the rule ID.
    pub fn into_rule_id(self) -> Option<String> {
        match self {
            Decision::Redirect { rule_id, .. } | Decision::Gone { rule_id } => rule_id,
        }
    }
}

impl TryFrom<RuleMatch> for Decision {
    type Error = ClientError;

    /// 410 means gone; anything else needs a target to redirect to.
    fn try_from(answer: RuleMatch) -> Result<Self, Self::Error> {
        if answer.status_code == 410 {
            return Ok(Decision::Gone {
                rule_id: answer.rule_id,
            });
        }
        match answer.location {
            Some(location) if !location.is_empty() => Ok(Decision::Redirect {
                status: answer.status_code,
                location,
                rule_id: answer.rule_id,
            }),
            _ => Err(ClientError::Protocol(format!(
                "status {} answer without location",
                answer.status_code
            ))),
        }
    }
}
