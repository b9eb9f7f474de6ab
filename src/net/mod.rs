//! Network layer subsystem.
//!
//! TLS is optional; when configured, the listener terminates it and every
//! request is marked so the edge reports the https scheme.

pub mod tls;
