//! Two-phase request interception.
//!
//! # Data Flow
//! ```text
//! on_early_dispatch (decision.rs):
//!     config snapshot → client facade (or misconfigured)
//!     → RequestContext → admin exclusion → match query
//!     → PassThrough | Terminate(redirect / 410)
//!
//! host produces the response (or the terminal response stands)
//!
//! on_late_dispatch (logging.rs):
//!     RequestContext (rebuilt) + final status + emitted Location
//!     + rule id from the session → log command (background task)
//! ```
//!
//! # Design Decisions
//! - The [`Session`] returned by the early phase is the only state shared
//!   with the late phase, and the late phase consumes it
//! - Configuration is read once per request; a reload only affects later requests
//! - Neither phase can fail; service problems degrade to pass-through

pub mod admin;
pub mod decision;
pub mod logging;
pub mod middleware;
pub mod session;

use axum::response::Response;
use std::sync::Arc;

use crate::config::ConfigStore;
use crate::redirection::Transport;

pub use admin::AdminPathClassifier;
pub use middleware::{intercept, interception_middleware};
pub use session::{Session, SessionState};

/// Result of the decision phase.
#[derive(Debug)]
pub enum EarlyOutcome {
    /// Let the host generate the response.
    PassThrough,
    /// Send this response; the host's handler must not run.
    Terminate(Response),
}

impl EarlyOutcome {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, EarlyOutcome::PassThrough)
    }
}

/// Runs both interception phases against the live configuration.
#[derive(Clone)]
pub struct Interceptor {
    store: Arc<ConfigStore>,
    transport: Arc<dyn Transport>,
}

impl Interceptor {
    pub fn new(store: Arc<ConfigStore>, transport: Arc<dyn Transport>) -> Self {
        Self { store, transport }
    }
}
