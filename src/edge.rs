//! Edge types - Typed, directed relationships between business objects
//!
//! The domain's relationships come in semantically paired inverses:
//! - `Aggregates` / `IsAggregatedBy`: containment (collection → dataset)
//! - `IsAdministeredBy` / `IsAdministratorFor`: administration
//! - `IsDepositorFor` / `AcceptsDeposit`: deposit rights
//!
//! The store never auto-creates the inverse of an edge; callers that want
//! bidirectionality insert both directions explicitly.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of relationship types between business objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// Container aggregates a member (collection → dataset, dataset → file)
    Aggregates,
    /// Member is aggregated by a container
    IsAggregatedBy,
    /// Object is administered by a person or group
    IsAdministeredBy,
    /// Person or group administers an object
    IsAdministratorFor,
    /// Person deposits into a collection
    IsDepositorFor,
    /// Collection accepts deposits from a person
    AcceptsDeposit,
}

impl RelationType {
    /// Get the string representation of the relation type
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Aggregates => "aggregates",
            RelationType::IsAggregatedBy => "isaggregatedby",
            RelationType::IsAdministeredBy => "isadministeredby",
            RelationType::IsAdministratorFor => "isadministratorfor",
            RelationType::IsDepositorFor => "isdepositorfor",
            RelationType::AcceptsDeposit => "acceptsdeposit",
        }
    }

    /// Get all relation types
    pub fn all() -> &'static [RelationType] {
        &[
            RelationType::Aggregates,
            RelationType::IsAggregatedBy,
            RelationType::IsAdministeredBy,
            RelationType::IsAdministratorFor,
            RelationType::IsDepositorFor,
            RelationType::AcceptsDeposit,
        ]
    }

    /// Get the paired inverse relation
    pub fn inverse(&self) -> RelationType {
        match self {
            RelationType::Aggregates => RelationType::IsAggregatedBy,
            RelationType::IsAggregatedBy => RelationType::Aggregates,
            RelationType::IsAdministeredBy => RelationType::IsAdministratorFor,
            RelationType::IsAdministratorFor => RelationType::IsAdministeredBy,
            RelationType::IsDepositorFor => RelationType::AcceptsDeposit,
            RelationType::AcceptsDeposit => RelationType::IsDepositorFor,
        }
    }
}

impl FromStr for RelationType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aggregates" => Ok(RelationType::Aggregates),
            "isaggregatedby" => Ok(RelationType::IsAggregatedBy),
            "isadministeredby" => Ok(RelationType::IsAdministeredBy),
            "isadministratorfor" => Ok(RelationType::IsAdministratorFor),
            "isdepositorfor" => Ok(RelationType::IsDepositorFor),
            "acceptsdeposit" => Ok(RelationType::AcceptsDeposit),
            _ => Err(crate::Error::Parse(format!("Unknown relation type: {}", s))),
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which end of an edge an id must occupy for a directed query.
///
/// The domain frequently models asymmetric containment with one relation
/// type plus a direction ("children of X" is `Aggregates` at `Source`,
/// "parent of X" is `Aggregates` at `Target`) rather than two inverse types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    /// Id must be the edge source
    Source,
    /// Id must be the edge target
    Target,
    /// Either end; equivalent to the undirected query
    Either,
}

/// A typed, directed fact linking two business objects.
///
/// Edge identity is the full (source, target, rel) triple: multiple edges
/// between the same pair with different types are independent facts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source object id
    pub source: ObjectId,
    /// Target object id
    pub target: ObjectId,
    /// Type of relationship
    pub rel: RelationType,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: ObjectId, target: ObjectId, rel: RelationType) -> Self {
        Self { source, target, rel }
    }

    /// Check whether `id` appears at either end of this edge
    pub fn touches(&self, id: &ObjectId) -> bool {
        &self.source == id || &self.target == id
    }

    /// Create the inverse edge (swapped ends, paired inverse relation)
    pub fn inverted(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            rel: self.rel.inverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    #[test]
    fn test_relation_type_roundtrip() {
        for rel in RelationType::all() {
            let s = rel.as_str();
            let parsed: RelationType = s.parse().unwrap();
            assert_eq!(*rel, parsed);
        }
    }

    #[test]
    fn test_inverse_pairs() {
        for rel in RelationType::all() {
            assert_eq!(rel.inverse().inverse(), *rel);
            assert_ne!(rel.inverse(), *rel);
        }
    }

    #[test]
    fn test_edge_touches() {
        let edge = Edge::new(oid("coll"), oid("ds"), RelationType::Aggregates);
        assert!(edge.touches(&oid("coll")));
        assert!(edge.touches(&oid("ds")));
        assert!(!edge.touches(&oid("other")));
    }

    #[test]
    fn test_edge_inverted() {
        let edge = Edge::new(oid("who"), oid("what"), RelationType::IsAdministratorFor);
        let inv = edge.inverted();
        assert_eq!(inv.source, oid("what"));
        assert_eq!(inv.target, oid("who"));
        assert_eq!(inv.rel, RelationType::IsAdministeredBy);
    }

    #[test]
    fn test_edge_identity_is_full_triple() {
        let a = Edge::new(oid("x"), oid("y"), RelationType::Aggregates);
        let b = Edge::new(oid("x"), oid("y"), RelationType::IsAdministeredBy);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
