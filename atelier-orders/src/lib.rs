//! Order save pipeline
//!
//! An order is edited as one aggregate: the header draft plus detail
//! lines, payments, workshop assignments, and resource requirements.
//! Saving diffs the aggregate against what was loaded, then persists
//! the changes as a fixed sequence of phases with rollback for orders
//! that did not exist before the save.

pub mod aggregate;
pub mod diff;
pub mod error;
pub mod money;
pub mod rollback;
pub mod sequencer;
pub mod totals;
pub mod validate;

pub use aggregate::{ChildEntry, ChildSet, OrderAggregate, OrderIdentity};
pub use diff::ChildPlan;
pub use error::{SaveError, SavePhase, SaveResult};
pub use rollback::RollbackOutcome;
pub use sequencer::{OrderSaveService, SaveReport};
