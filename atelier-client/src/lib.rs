//! Atelier data client
//!
//! The provider contract plus its HTTP and in-memory implementations,
//! the cache-invalidation and notification seams, and typed per-resource
//! wrappers used by the save pipeline.

pub mod api;
pub mod cache;
pub mod config;
pub mod http;
pub mod memory;
pub mod notify;
pub mod provider;

pub use api::OrderApi;
pub use cache::{CacheInvalidator, CacheScope, RecordingInvalidator, TracingInvalidator};
pub use config::ClientConfig;
pub use http::HttpProvider;
pub use memory::{MemoryProvider, ProviderCall, ProviderOp};
pub use notify::{Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use provider::DataProvider;

// Re-export shared types for convenience
pub use shared::{ListQuery, ProviderError, ProviderResult, Resource};
