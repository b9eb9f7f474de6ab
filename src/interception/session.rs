//! Per-request interception state.
//!
//! A [`Session`] is created by the decision phase and consumed by the
//! logging phase of the same request, so the logging phase can neither run
//! first nor see another request's rule.

use crate::redirection::RedirectionClient;

/// State carried from the decision phase to the logging phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The redirection settings were unusable for this request.
    pub misconfigured: bool,
    /// Rule that produced the terminal response, if any.
    pub last_rule_id: Option<String>,
}

/// One request's interception cycle.
#[derive(Debug)]
pub struct Session {
    pub(crate) state: SessionState,
    pub(crate) client: Option<RedirectionClient>,
}

impl Session {
    pub(crate) fn start() -> Self {
        Self {
            state: SessionState::default(),
            client: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_misconfigured(&self) -> bool {
        self.state.misconfigured
    }

    pub fn last_rule_id(&self) -> Option<&str> {
        self.state.last_rule_id.as_deref()
    }
}
