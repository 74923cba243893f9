//! Storage layer
//!
//! SQLite-backed persistence for the relationship graph and the deposit
//! log. The two stores are independent: each owns its own connection and
//! only the tables it manages.

pub mod schema;
pub mod relationships;
pub mod deposits;

pub use relationships::RelationshipStore;
pub use deposits::DepositLog;
