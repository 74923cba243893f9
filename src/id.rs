//! Object identifier - Opaque, validated identity for business objects
//!
//! The surrounding records-management system addresses everything by string
//! id: projects, collections, datasets, files, deposits, archival nodes.
//! `ObjectId` wraps those strings and guarantees they are non-blank, so
//! every store operation can assume a usable key.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier for a business object, deposit, or archival reference.
///
/// This id serves as the key for:
/// - Relationship edges (source and target)
/// - Deposit records (object, deposit, parent-deposit, archive, state ids)
/// - Archival node resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create a new ObjectId, rejecting empty or whitespace-only input
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "object id must be non-empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// The raw identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectId::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_id() {
        let id = ObjectId::new("proj:42").unwrap();
        assert_eq!(id.as_str(), "proj:42");
        assert_eq!(id.to_string(), "proj:42");
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(ObjectId::new("").is_err());
        assert!(ObjectId::new("   ").is_err());
    }

    #[test]
    fn test_from_str() {
        let id: ObjectId = "dataset-7".parse().unwrap();
        assert_eq!(id.as_str(), "dataset-7");
        assert!("".parse::<ObjectId>().is_err());
    }
}
