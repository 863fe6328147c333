//! Real-time publish/subscribe gateway core
//!
//! Publishers push topic-scoped events; any number of long-lived
//! subscribers receive them as a text event stream. The crate provides
//! the broker's core (the per-process fanout hub and the distributed
//! registry) and leaves HTTP routing, dashboards, and authentication
//! enforcement to the surrounding service.
//!
//! # Architecture
//!
//! ```text
//!   subscribe ──► runtime ──► FanoutHub ──► Subscription (SSE frames)
//!                    │            │
//!   publish ────────►│            ├── topics ──► tail rings (replay)
//!                    │            └── connections ──► sinks (fanout)
//!                    │
//!                    └── RegistryAdapter ──► shared store
//!                          (which nodes serve which topic)
//! ```
//!
//! # Modules
//!
//! - [`hub`]: connection/topic state, SSE framing and delivery, bounded
//!   per-topic replay
//! - [`registry`]: cross-node topic/connection membership over an
//!   injected key/value-and-set store
//! - [`runtime`]: embedded vs forwarding deployment strategy, chosen at
//!   startup
//! - [`topic`]: topic list parsing and normalization
//! - [`auth`]: bearer-token check with constant-time comparison
//!
//! # Example
//!
//! ```
//! use fanout_rs::hub::{FanoutHub, PayloadSource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), fanout_rs::hub::HubError> {
//! let hub = FanoutHub::new();
//!
//! let _subscription = hub.subscribe(Some("alerts"), None).await?;
//! let receipt = hub
//!     .publish(Some("alerts"), Some("evt-1"), PayloadSource::text("hello"))
//!     .await?;
//!
//! assert_eq!(receipt.delivered, Some(1));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod hub;
pub mod registry;
pub mod runtime;
pub mod topic;

pub use config::{GatewayConfig, RuntimeMode};
pub use error::{Error, Result};
pub use hub::{FanoutHub, HubConfig, PayloadSource, PublishReceipt, PublishStatus, Subscription};
pub use registry::{
    ConnectionRegistration, KeyValueStore, MemoryStore, NodeRegistration, RegistryAdapter,
};
pub use runtime::{resolve_runtime, GatewayRuntime, HubNamespace};
