//! Distributed registry for cross-node routing
//!
//! In a multi-process deployment every node registers itself and its
//! live connections here, against a shared key/value-and-set store. A
//! publish handled on any node can then resolve which other nodes hold
//! subscribers for a topic and hand the event to the transport layer for
//! forwarding.
//!
//! The registry is advisory routing data: event payloads never transit
//! it, and its per-key operations are deliberately non-transactional.

pub mod adapter;
pub mod error;
pub mod node;
pub mod store;
pub mod types;

pub use adapter::{RegistryAdapter, DEFAULT_KEY_PREFIX};
pub use error::RegistryError;
pub use node::{build_node_registration, node_registration_at, resolve_node_ip, NODE_IP_ENV};
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use types::{ConnectionRegistration, NodeRegistration, PublishMessage, PublishResult};
