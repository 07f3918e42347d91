//! Shared types for the Atelier order suite
//!
//! Wire models for the order aggregate, the data-access error taxonomy,
//! list-query types, and small utilities used by both the provider and
//! pipeline crates.

pub mod error;
pub mod models;
pub mod query;
pub mod resource;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ProviderError, ProviderResult};
pub use query::ListQuery;
pub use resource::Resource;
