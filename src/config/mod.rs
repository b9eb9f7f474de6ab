//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → store.rs (ArcSwap<EdgeConfig>, one snapshot per request)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap in store.rs
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - A missing project key is a runtime state (pass-through), not a load error

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ConnectionConfig, EdgeConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RedirectionConfig, SiteConfig, TimeoutConfig, TlsConfig, UpstreamConfig,
};
pub use store::ConfigStore;
pub use watcher::ConfigWatcher;
