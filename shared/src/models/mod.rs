//! Wire models for the order aggregate
//!
//! Record types mirror the data service's row shape. `*Fields` types carry
//! only the user-entered data portion; they are what change detection
//! compares, so identity and audit columns never appear in them.
//! All server IDs are `i64`.

pub mod child;
pub mod detail;
pub mod order;
pub mod payment;
pub mod requirement;
pub mod workshop;

// Re-exports
pub use child::*;
pub use detail::*;
pub use order::*;
pub use payment::*;
pub use requirement::*;
pub use workshop::*;
