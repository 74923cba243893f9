//! # Depograph - Archival relationship & deposit tracking core
//!
//! The storage core of a records-management system: tracks how business
//! objects (projects, collections, datasets, files) relate to one another
//! and to their archival deposits.
//!
//! Depograph provides:
//! - A typed, directed relationship graph with duplicate-tolerant inserts
//! - Paginated, deduplicating bulk iteration over the edge set
//! - An append-only deposit-version log with parent/child deposit chains
//! - Root resolution over a deposit's candidate archival nodes
//! - SQLite-backed storage with fail-fast argument validation

pub mod id;
pub mod edge;
pub mod deposit;
pub mod storage;
pub mod cursor;
pub mod feed;
pub mod identity;
pub mod resolver;
pub mod config;

// Re-exports for convenient access
pub use id::ObjectId;
pub use edge::{Edge, EdgeEnd, RelationType};
pub use deposit::{DepositRecord, DepositStatus, ObjectType};
pub use storage::{DepositLog, RelationshipStore};
pub use cursor::EdgeCursor;
pub use feed::{FeedEntry, FeedLink, Marker, StatusFeed};
pub use identity::{ArchiveNode, EntityIdentityIndex, KeyStrategy, NodeKind};
pub use resolver::{Resolution, RootResolver};

/// Result type alias for Depograph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Depograph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Cursor exhausted: next requested past end of iteration")]
    CursorExhausted,

    #[error("Deposit id already recorded: {0}")]
    DuplicateDeposit(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
