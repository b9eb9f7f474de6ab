//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → interception (decision phase)
//!     → upstream handler, unless a rule answered
//!     → interception (logging phase)
//!     → Send to client
//! ```
//!
//! request.rs turns the incoming request into the identity reported to the
//! redirection service; response.rs builds terminal responses and reads back
//! what was actually sent.

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, RequestEnvironment, Scheme, ServedOverTls, X_REQUEST_ID};
pub use response::{emitted_location, DoNotCachePage};
pub use server::HttpServer;
