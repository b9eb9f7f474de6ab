//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Interception phases and the service client produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (decision counters, command latency)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line via the trace span
//! - Service failures are warnings, never errors surfaced to visitors

pub mod logging;
pub mod metrics;
