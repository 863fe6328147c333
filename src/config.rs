//! Gateway configuration

use crate::hub::HubConfig;
use crate::registry::DEFAULT_KEY_PREFIX;

/// How requests reach a fanout hub
///
/// Chosen once at process startup; there is no runtime switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    /// The process owns a private hub
    Embedded,
    /// Requests are routed to the single shared hub instance
    Forwarding,
}

/// Gateway configuration options
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Runtime strategy selected at startup
    pub runtime_mode: RuntimeMode,

    /// Hub tunables applied to the hub this process talks to
    pub hub: HubConfig,

    /// Key prefix for registry entries in the shared store
    pub registry_key_prefix: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            runtime_mode: RuntimeMode::Embedded,
            hub: HubConfig::default(),
            registry_key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Set the runtime mode
    pub fn runtime_mode(mut self, mode: RuntimeMode) -> Self {
        self.runtime_mode = mode;
        self
    }

    /// Set the hub configuration
    pub fn hub(mut self, hub: HubConfig) -> Self {
        self.hub = hub;
        self
    }

    /// Set the registry key prefix
    pub fn registry_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.registry_key_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();

        assert_eq!(config.runtime_mode, RuntimeMode::Embedded);
        assert_eq!(config.registry_key_prefix, "fanout");
        assert_eq!(config.hub.tail_buffer_size, 200);
    }

    #[test]
    fn test_builder_chaining() {
        let config = GatewayConfig::default()
            .runtime_mode(RuntimeMode::Forwarding)
            .hub(HubConfig::default().tail_buffer_size(32))
            .registry_key_prefix("staging");

        assert_eq!(config.runtime_mode, RuntimeMode::Forwarding);
        assert_eq!(config.hub.tail_buffer_size, 32);
        assert_eq!(config.registry_key_prefix, "staging");
    }
}
