//! Live configuration shared by every request.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::config::schema::EdgeConfig;

/// Holds the active configuration behind a lock-free pointer swap.
///
/// Each request takes one snapshot at its start and keeps it for both
/// interception phases, so a reload never changes settings mid-request.
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<EdgeConfig>,
}

impl ConfigStore {
    pub fn new(config: EdgeConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Current configuration.
    pub fn snapshot(&self) -> Arc<EdgeConfig> {
        self.current.load_full()
    }

    /// Install a new configuration for subsequent requests.
    pub fn replace(&self, config: EdgeConfig) {
        self.current.store(Arc::new(config));
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(EdgeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_survives_replace() {
        let store = ConfigStore::default();
        let before = store.snapshot();

        let mut next = EdgeConfig::default();
        next.redirection.project_key = "key".into();
        store.replace(next);

        assert!(before.redirection.project_key.is_empty());
        assert_eq!(store.snapshot().redirection.project_key, "key");
    }
}
