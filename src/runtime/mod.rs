//! Runtime selection for gateway deployments
//!
//! A deployment either embeds a private hub in the process or forwards
//! every request to one shared hub instance. The choice is made once at
//! startup from `GatewayConfig`; after that the request layer only sees
//! the `GatewayRuntime` trait.

pub mod adapter;
pub mod namespace;

pub use adapter::{
    resolve_runtime, EmbeddedRuntime, ForwardingRuntime, GatewayRuntime, SHARED_HUB_NAME,
};
pub use namespace::HubNamespace;
