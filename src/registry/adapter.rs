//! Distributed registry adapter
//!
//! Tracks, across processes, which node currently holds live subscribers
//! for which topic, so a publish handled on one node can discover every
//! other node that must receive the event. The actual cross-node hop is
//! the transport layer's job; this adapter only answers the routing
//! question.
//!
//! Every logical operation is a sequence of independent key-level calls
//! against the shared store. There is no multi-key transaction:
//! concurrent mutations of the same connection, topic, or node may
//! interleave, and callers tolerate the brief inconsistency windows that
//! result.

use crate::topic::normalize_topics;

use super::error::RegistryError;
use super::store::KeyValueStore;
use super::types::{ConnectionRegistration, NodeRegistration, PublishMessage, PublishResult};

/// Default key prefix for registry entries
pub const DEFAULT_KEY_PREFIX: &str = "fanout";

/// Registry adapter over an injected key/value-and-set store
pub struct RegistryAdapter<S: KeyValueStore> {
    store: S,
    key_prefix: String,
}

impl<S: KeyValueStore> RegistryAdapter<S> {
    /// Create an adapter with the default key prefix
    pub fn new(store: S) -> Self {
        Self::with_key_prefix(store, DEFAULT_KEY_PREFIX)
    }

    /// Create an adapter with a custom key prefix
    pub fn with_key_prefix(store: S, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
        }
    }

    /// Register a node and its metadata
    ///
    /// Idempotent: re-registering refreshes the metadata in place.
    pub async fn register_node(&self, registration: &NodeRegistration) -> Result<(), RegistryError> {
        self.store
            .sadd(&self.nodes_key(), &[registration.node_id.as_str()])
            .await?;
        self.store
            .hset(
                &self.node_key(&registration.node_id),
                &[
                    ("nodeId", registration.node_id.as_str()),
                    ("hostname", registration.hostname.as_str()),
                    ("ip", registration.ip.as_str()),
                    ("startedAt", registration.started_at.as_str()),
                ],
            )
            .await?;

        tracing::info!(node_id = %registration.node_id, "Node registered");
        Ok(())
    }

    /// Register a connection against its owning node and topics
    pub async fn register_connection(
        &self,
        registration: &ConnectionRegistration,
    ) -> Result<(), RegistryError> {
        let topics = normalize_topics(&registration.topics);
        let topics_field = topics.join(",");

        self.store
            .hset(
                &self.connection_key(&registration.connection_id),
                &[
                    ("connectionId", registration.connection_id.as_str()),
                    ("nodeId", registration.node_id.as_str()),
                    ("topics", topics_field.as_str()),
                ],
            )
            .await?;
        self.store
            .sadd(
                &self.node_connections_key(&registration.node_id),
                &[registration.connection_id.as_str()],
            )
            .await?;

        for topic in &topics {
            self.store
                .sadd(&self.topic_nodes_key(topic), &[registration.node_id.as_str()])
                .await?;
            self.store
                .sadd(
                    &self.topic_connections_key(topic),
                    &[registration.connection_id.as_str()],
                )
                .await?;
        }

        tracing::debug!(
            connection_id = %registration.connection_id,
            node_id = %registration.node_id,
            topics = topics.len(),
            "Connection registered"
        );
        Ok(())
    }

    /// Unregister a connection
    ///
    /// No-op when the connection is unknown. Otherwise removes it from
    /// its node's connection set and every topic's connection set, drops
    /// the owning node from a topic's node set only when none of the
    /// node's remaining connections still subscribes, and finally deletes
    /// the metadata record.
    pub async fn unregister_connection(&self, connection_id: &str) -> Result<(), RegistryError> {
        let record = self.store.hgetall(&self.connection_key(connection_id)).await?;

        let node_id = match (
            record.get("connectionId").filter(|id| !id.is_empty()),
            record.get("nodeId").filter(|id| !id.is_empty()),
        ) {
            (Some(_), Some(node_id)) => node_id.clone(),
            _ => return Ok(()),
        };

        let topics = record
            .get("topics")
            .map(|raw| normalize_topics(raw.split(',')))
            .unwrap_or_default();

        self.store
            .srem(&self.node_connections_key(&node_id), &[connection_id])
            .await?;

        for topic in &topics {
            self.store
                .srem(&self.topic_connections_key(topic), &[connection_id])
                .await?;

            if !self.node_has_topic(&node_id, topic).await? {
                self.store
                    .srem(&self.topic_nodes_key(topic), &[node_id.as_str()])
                    .await?;
            }
        }

        self.store
            .del(&[self.connection_key(connection_id).as_str()])
            .await?;

        tracing::debug!(
            connection_id = %connection_id,
            node_id = %node_id,
            "Connection unregistered"
        );
        Ok(())
    }

    /// Unregister a node and everything it owns
    ///
    /// Cascades through `unregister_connection` for each owned
    /// connection, then removes the node's metadata and its membership
    /// in the global node set.
    pub async fn unregister_node(&self, node_id: &str) -> Result<(), RegistryError> {
        let connection_ids = self
            .store
            .smembers(&self.node_connections_key(node_id))
            .await?;

        for connection_id in &connection_ids {
            self.unregister_connection(connection_id).await?;
        }

        self.store.del(&[self.node_key(node_id).as_str()]).await?;
        self.store.srem(&self.nodes_key(), &[node_id]).await?;

        tracing::info!(
            node_id = %node_id,
            connections = connection_ids.len(),
            "Node unregistered"
        );
        Ok(())
    }

    /// Sorted list of node ids currently serving a topic
    pub async fn get_topic_distribution(&self, topic: &str) -> Result<Vec<String>, RegistryError> {
        let mut nodes = self.store.smembers(&self.topic_nodes_key(topic)).await?;
        nodes.sort();
        Ok(nodes)
    }

    /// Resolve the target nodes for a cross-node publish
    pub async fn publish_to_topic(
        &self,
        message: &PublishMessage,
    ) -> Result<PublishResult, RegistryError> {
        let target_nodes = self.get_topic_distribution(&message.topic).await?;

        Ok(PublishResult {
            dropped: target_nodes.is_empty(),
            topic: message.topic.clone(),
            id: message.id.clone(),
            target_nodes,
        })
    }

    // O(connections-per-node): scans the node's remaining connections to
    // decide whether the node still serves the topic.
    async fn node_has_topic(&self, node_id: &str, topic: &str) -> Result<bool, RegistryError> {
        let connection_ids = self
            .store
            .smembers(&self.node_connections_key(node_id))
            .await?;

        for connection_id in connection_ids {
            let record = self
                .store
                .hgetall(&self.connection_key(&connection_id))
                .await?;

            let topics = record
                .get("topics")
                .map(|raw| normalize_topics(raw.split(',')))
                .unwrap_or_default();

            if topics.iter().any(|candidate| candidate == topic) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn nodes_key(&self) -> String {
        format!("{}:nodes", self.key_prefix)
    }

    fn node_key(&self, node_id: &str) -> String {
        format!("{}:node:{}", self.key_prefix, node_id)
    }

    fn node_connections_key(&self, node_id: &str) -> String {
        format!("{}:node:{}:connections", self.key_prefix, node_id)
    }

    fn connection_key(&self, connection_id: &str) -> String {
        format!("{}:connection:{}", self.key_prefix, connection_id)
    }

    fn topic_nodes_key(&self, topic: &str) -> String {
        format!("{}:topic:{}:nodes", self.key_prefix, topic)
    }

    fn topic_connections_key(&self, topic: &str) -> String {
        format!("{}:topic:{}:connections", self.key_prefix, topic)
    }
}
