//! Deposit records - One row per archival deposit attempt
//!
//! An object may accumulate many deposit records over time, one per
//! attempt/version. Records are never deleted, only appended and
//! individually updated by deposit id. A record whose parent deposit id
//! references another record models compositional deposits: a dataset's
//! file-deposits are children of the dataset's own deposit.

use crate::id::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of one deposit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    /// Submitted, outcome not yet observed
    Pending,
    /// Archived successfully
    Deposited,
    /// Archival transaction failed
    Failed,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Deposited => "deposited",
            DepositStatus::Failed => "failed",
        }
    }
}

impl FromStr for DepositStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DepositStatus::Pending),
            "deposited" => Ok(DepositStatus::Deposited),
            "failed" => Ok(DepositStatus::Failed),
            _ => Err(crate::Error::Parse(format!("Unknown deposit status: {}", s))),
        }
    }
}

impl std::fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of business object a deposit archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Collection,
    Dataset,
    DataFile,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Collection => "collection",
            ObjectType::Dataset => "dataset",
            ObjectType::DataFile => "datafile",
        }
    }
}

impl FromStr for ObjectType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collection" => Ok(ObjectType::Collection),
            "dataset" => Ok(ObjectType::Dataset),
            "datafile" => Ok(ObjectType::DataFile),
            _ => Err(crate::Error::Parse(format!("Unknown object type: {}", s))),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One archival deposit attempt for a business object.
///
/// `deposit_id` is the primary key, caller-assigned, globally unique and
/// immutable once recorded. Every other field is mutable via
/// [`DepositLog::update`](crate::storage::DepositLog::update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    /// Primary key of this deposit attempt
    pub deposit_id: ObjectId,
    /// Deposit this one decomposed from, if any
    pub parent_deposit_id: Option<ObjectId>,
    /// Business object being archived
    pub object_id: ObjectId,
    /// Archival-store id assigned on ingest, once known
    pub archive_id: Option<ObjectId>,
    /// Archival state handle, once known
    pub state_id: Option<ObjectId>,
    /// Lifecycle state of the attempt
    pub status: DepositStatus,
    /// Kind of object being archived
    pub object_type: ObjectType,
    /// When the attempt was made
    pub deposit_date: DateTime<Utc>,
}

impl DepositRecord {
    /// Create a new pending record, timestamped at call time
    pub fn new(deposit_id: ObjectId, object_id: ObjectId, object_type: ObjectType) -> Self {
        Self {
            deposit_id,
            parent_deposit_id: None,
            object_id,
            archive_id: None,
            state_id: None,
            status: DepositStatus::Pending,
            object_type,
            deposit_date: Utc::now(),
        }
    }

    /// Attach a parent deposit (compositional deposit chain)
    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent_deposit_id = Some(parent);
        self
    }

    /// Override the timestamp (callers replaying a known deposit time)
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.deposit_date = date;
        self
    }
}
