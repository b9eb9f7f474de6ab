//! Redirection service integration.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → client.rs (facade: match / log, deadline, error swallowing)
//!     → transport.rs (endpoint failover, JSON lines over TCP/Unix)
//!     → external redirection service
//!     ← RuleMatch answer
//!     → types.rs (Decision: Redirect | Gone)
//! ```
//!
//! # Failure Policy
//! - No error crosses the facade; an unreachable or slow service means
//!   "no rule", and a failed log is dropped
//! - Every command is bounded by the configured command timeout

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::RedirectionClient;
pub use error::{ClientError, ClientResult};
pub use transport::{SocketTransport, Transport};
pub use types::{Command, Decision, Endpoint, LogRequest, LoggedResponse, RuleMatch};
