//! Runtime strategy selection
//!
//! The request layer talks to a `GatewayRuntime`, never to a hub
//! directly. Which hub backs the runtime is decided once at startup from
//! configuration: an embedded runtime owns a private hub, a forwarding
//! runtime routes every call to the single shared hub instance resolved
//! from a namespace. Both variants expose the same surface, so the
//! request layer is indifferent to the deployment shape.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{GatewayConfig, RuntimeMode};
use crate::error::Result;
use crate::hub::{
    ConnectionSummary, FanoutHub, HubConfig, Page, PayloadSource, PublishReceipt, Subscription,
    TopicSummary, TopicTail,
};

use super::namespace::HubNamespace;

/// Name of the hub instance forwarding runtimes share
pub const SHARED_HUB_NAME: &str = "global";

/// Request-boundary surface of a gateway deployment
#[async_trait]
pub trait GatewayRuntime: Send + Sync {
    /// Open a subscriber stream
    async fn open_stream(
        &self,
        raw_topics: Option<&str>,
        connection_id: Option<&str>,
    ) -> Result<Subscription>;

    /// Publish an event
    async fn publish(
        &self,
        raw_topics: Option<&str>,
        event_id: Option<&str>,
        payload: PayloadSource,
    ) -> Result<PublishReceipt>;

    /// List topics sorted by name
    async fn list_topics(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Result<Page<TopicSummary>>;

    /// List connections sorted by id
    async fn list_connections(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Result<Page<ConnectionSummary>>;

    /// Read back recent events for a topic
    async fn tail_events(&self, topic: &str, limit: Option<&str>) -> Result<TopicTail>;
}

/// Runtime owning a private hub
pub struct EmbeddedRuntime {
    hub: Arc<FanoutHub>,
}

impl EmbeddedRuntime {
    /// Create a runtime with a freshly-configured private hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            hub: Arc::new(FanoutHub::with_config(config)),
        }
    }

    /// Get the underlying hub
    pub fn hub(&self) -> &Arc<FanoutHub> {
        &self.hub
    }
}

#[async_trait]
impl GatewayRuntime for EmbeddedRuntime {
    async fn open_stream(
        &self,
        raw_topics: Option<&str>,
        connection_id: Option<&str>,
    ) -> Result<Subscription> {
        Ok(self.hub.subscribe(raw_topics, connection_id).await?)
    }

    async fn publish(
        &self,
        raw_topics: Option<&str>,
        event_id: Option<&str>,
        payload: PayloadSource,
    ) -> Result<PublishReceipt> {
        Ok(self.hub.publish(raw_topics, event_id, payload).await?)
    }

    async fn list_topics(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Result<Page<TopicSummary>> {
        Ok(self.hub.list_topics(page, page_size).await)
    }

    async fn list_connections(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Result<Page<ConnectionSummary>> {
        Ok(self.hub.list_connections(page, page_size).await)
    }

    async fn tail_events(&self, topic: &str, limit: Option<&str>) -> Result<TopicTail> {
        Ok(self.hub.tail_events(topic, limit).await)
    }
}

/// Runtime forwarding every call to the shared hub instance
pub struct ForwardingRuntime {
    hub: Arc<FanoutHub>,
}

impl ForwardingRuntime {
    /// Resolve the shared hub from the namespace
    pub fn new(namespace: &HubNamespace, config: &HubConfig) -> Self {
        Self {
            hub: namespace.hub(SHARED_HUB_NAME, config),
        }
    }

    /// Get the shared hub
    pub fn hub(&self) -> &Arc<FanoutHub> {
        &self.hub
    }
}

#[async_trait]
impl GatewayRuntime for ForwardingRuntime {
    async fn open_stream(
        &self,
        raw_topics: Option<&str>,
        connection_id: Option<&str>,
    ) -> Result<Subscription> {
        Ok(self.hub.subscribe(raw_topics, connection_id).await?)
    }

    async fn publish(
        &self,
        raw_topics: Option<&str>,
        event_id: Option<&str>,
        payload: PayloadSource,
    ) -> Result<PublishReceipt> {
        Ok(self.hub.publish(raw_topics, event_id, payload).await?)
    }

    async fn list_topics(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Result<Page<TopicSummary>> {
        Ok(self.hub.list_topics(page, page_size).await)
    }

    async fn list_connections(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Result<Page<ConnectionSummary>> {
        Ok(self.hub.list_connections(page, page_size).await)
    }

    async fn tail_events(&self, topic: &str, limit: Option<&str>) -> Result<TopicTail> {
        Ok(self.hub.tail_events(topic, limit).await)
    }
}

/// Select the runtime variant from configuration
pub fn resolve_runtime(
    config: &GatewayConfig,
    namespace: &HubNamespace,
) -> Arc<dyn GatewayRuntime> {
    match config.runtime_mode {
        RuntimeMode::Embedded => Arc::new(EmbeddedRuntime::new(config.hub.clone())),
        RuntimeMode::Forwarding => Arc::new(ForwardingRuntime::new(namespace, &config.hub)),
    }
}
