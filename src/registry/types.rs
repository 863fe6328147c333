//! Registry record types

use serde::{Deserialize, Serialize};

/// Metadata registered for one node process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRegistration {
    /// Stable id of the node process
    pub node_id: String,
    /// Hostname the node reported at startup
    pub hostname: String,
    /// Routable address of the node
    pub ip: String,
    /// RFC 3339 timestamp of the node's startup
    pub started_at: String,
}

/// Metadata registered for one subscriber connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRegistration {
    /// The connection's id on its owning node
    pub connection_id: String,
    /// Node currently holding the connection
    pub node_id: String,
    /// Topics the connection subscribed with
    pub topics: Vec<String>,
}

/// A publish to be routed across nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishMessage {
    /// Topic the event addresses
    pub topic: String,
    /// Caller-supplied event id
    pub id: String,
}

/// Routing decision for a cross-node publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    /// True when no node currently serves the topic
    pub dropped: bool,
    pub topic: String,
    pub id: String,
    /// Nodes that must receive the event, sorted by id
    pub target_nodes: Vec<String>,
}
