//! Node registration helpers
//!
//! Builds the metadata record a node announces itself with. The routable
//! IP comes from the environment in precedence order: the explicit
//! override, then the common host/pod variables injected by container
//! schedulers, then loopback for local runs.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};

use super::types::NodeRegistration;

/// Environment variable explicitly overriding the advertised node IP
pub const NODE_IP_ENV: &str = "FANOUT_NODE_IP";

/// Resolve the advertised node IP from an environment map
pub fn resolve_node_ip(env: &HashMap<String, String>) -> String {
    for var in [NODE_IP_ENV, "HOST_IP", "POD_IP"] {
        if let Some(value) = env.get(var) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    "127.0.0.1".to_string()
}

/// Build a node registration stamped with the current time
pub fn build_node_registration(
    node_id: impl Into<String>,
    hostname: impl Into<String>,
    env: &HashMap<String, String>,
) -> NodeRegistration {
    node_registration_at(node_id, hostname, env, Utc::now())
}

/// Build a node registration with an explicit start time
pub fn node_registration_at(
    node_id: impl Into<String>,
    hostname: impl Into<String>,
    env: &HashMap<String, String>,
    started_at: DateTime<Utc>,
) -> NodeRegistration {
    NodeRegistration {
        node_id: node_id.into(),
        hostname: hostname.into(),
        ip: resolve_node_ip(env),
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
