//! Redirection edge library.
//!
//! Wraps a site with a two-phase interception layer: before the site
//! handles a request the redirection service is asked for a matching rule,
//! and after the response is final the outcome is reported back.

pub mod config;
pub mod http;
pub mod interception;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod redirection;

pub use config::{ConfigStore, EdgeConfig};
pub use http::HttpServer;
pub use interception::{intercept, EarlyOutcome, Interceptor};
pub use lifecycle::Shutdown;
pub use redirection::{RedirectionClient, SocketTransport, Transport};
