//! Named shared hub instances
//!
//! A `HubNamespace` hands out hub instances by name, creating them on
//! first use. Forwarding runtimes resolve the one shared hub through a
//! namespace handle passed in explicitly, so shared state is always
//! reachable from a constructor argument rather than a process global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::hub::{FanoutHub, HubConfig};

/// Clonable registry of named hub instances
#[derive(Debug, Clone, Default)]
pub struct HubNamespace {
    hubs: Arc<Mutex<HashMap<String, Arc<FanoutHub>>>>,
}

impl HubNamespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the hub registered under `name`, creating it on first use
    ///
    /// The configuration only applies when this call creates the hub;
    /// later callers receive the existing instance unchanged.
    pub fn hub(&self, name: &str, config: &HubConfig) -> Arc<FanoutHub> {
        let mut hubs = self.hubs.lock().unwrap_or_else(PoisonError::into_inner);

        hubs.entry(name.to_string())
            .or_insert_with(|| Arc::new(FanoutHub::with_config(config.clone())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_resolves_same_hub() {
        let namespace = HubNamespace::new();
        let config = HubConfig::default();

        let first = namespace.hub("global", &config);
        let second = namespace.hub("global", &config);

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_names_are_isolated() {
        let namespace = HubNamespace::new();
        let config = HubConfig::default();

        let first = namespace.hub("one", &config);
        let second = namespace.hub("two", &config);

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_clones_share_state() {
        let namespace = HubNamespace::new();
        let clone = namespace.clone();
        let config = HubConfig::default();

        let first = namespace.hub("global", &config);
        let second = clone.hub("global", &config);

        assert!(Arc::ptr_eq(&first, &second));
    }
}
