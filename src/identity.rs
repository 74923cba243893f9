//! Entity identity index - resolving archival references to nodes
//!
//! The archive addresses a node under several identifier families: its
//! primary id, alternate ids assigned on re-ingest, and former external
//! references. Which families are indexed is a construction-time choice
//! (a [`KeyStrategy`]); the indexing function is a pure node → keys mapping
//! and the built index is immutable.
//!
//! When several nodes collide under one key, lookup returns an arbitrary
//! member of the collision set (first indexed). Callers must not assume
//! determinism when an aliasing strategy permits multi-valued keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::id::ObjectId;

/// Classification of an archival graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// One logical object; the only kind eligible for root resolution
    DeliverableUnit,
    /// A stored file belonging to a deliverable unit
    File,
}

/// An archival graph node, as reported by the archive.
///
/// Transient: consumed during root resolution, never persisted by this
/// crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveNode {
    /// Primary archival id
    pub id: ObjectId,
    /// Node classification
    pub kind: NodeKind,
    /// Ids of parent nodes within the same deposit, if any
    pub parent_refs: Vec<ObjectId>,
    /// Alternate ids assigned by the archive
    pub alternate_ids: Vec<ObjectId>,
    /// Former external references (pre-ingest identifiers)
    pub former_refs: Vec<ObjectId>,
}

impl ArchiveNode {
    pub fn new(id: ObjectId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            parent_refs: Vec::new(),
            alternate_ids: Vec::new(),
            former_refs: Vec::new(),
        }
    }

    pub fn with_parents(mut self, parents: Vec<ObjectId>) -> Self {
        self.parent_refs = parents;
        self
    }

    pub fn with_alternates(mut self, alternates: Vec<ObjectId>) -> Self {
        self.alternate_ids = alternates;
        self
    }

    pub fn with_former_refs(mut self, refs: Vec<ObjectId>) -> Self {
        self.former_refs = refs;
        self
    }
}

/// Which identifier families an index covers. Families are cumulative:
/// each later strategy includes the earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStrategy {
    /// Primary ids only
    PrimaryOnly,
    /// Primary plus alternate ids
    WithAlternates,
    /// Primary, alternate and former external references
    #[default]
    WithFormerRefs,
}

impl KeyStrategy {
    /// Pure mapping from a node to the keys it is indexed under
    pub fn keys_for(&self, node: &ArchiveNode) -> Vec<ObjectId> {
        let mut keys = vec![node.id.clone()];
        if matches!(self, KeyStrategy::WithAlternates | KeyStrategy::WithFormerRefs) {
            keys.extend(node.alternate_ids.iter().cloned());
        }
        if matches!(self, KeyStrategy::WithFormerRefs) {
            keys.extend(node.former_refs.iter().cloned());
        }
        keys
    }
}

/// Immutable index from archival reference strings to nodes.
pub struct EntityIdentityIndex {
    nodes: Vec<ArchiveNode>,
    /// key → indexes into `nodes`, in insertion order
    by_key: HashMap<String, Vec<usize>>,
}

impl EntityIdentityIndex {
    /// Build an index over `nodes` using the keys `strategy` yields.
    ///
    /// Nodes colliding under a key are all recorded; lookup returns the
    /// first.
    pub fn build(nodes: Vec<ArchiveNode>, strategy: KeyStrategy) -> Self {
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            for key in strategy.keys_for(node) {
                by_key.entry(key.as_str().to_string()).or_default().push(idx);
            }
        }
        Self { nodes, by_key }
    }

    /// Resolve an archival reference to a node, if indexed.
    ///
    /// Under a collision this returns an arbitrary member of the collision
    /// set; the collision is logged but not surfaced.
    pub fn resolve(&self, reference: &str) -> Option<&ArchiveNode> {
        let members = self.by_key.get(reference)?;
        if members.len() > 1 {
            debug!(
                reference,
                collisions = members.len(),
                "reference is aliased to multiple nodes, returning first indexed"
            );
        }
        members.first().map(|&idx| &self.nodes[idx])
    }

    /// Count of indexed nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    fn unit(id: &str) -> ArchiveNode {
        ArchiveNode::new(oid(id), NodeKind::DeliverableUnit)
    }

    #[test]
    fn test_primary_only_ignores_aliases() {
        let node = unit("du-1")
            .with_alternates(vec![oid("alt-1")])
            .with_former_refs(vec![oid("ext-1")]);
        let index = EntityIdentityIndex::build(vec![node], KeyStrategy::PrimaryOnly);

        assert!(index.resolve("du-1").is_some());
        assert!(index.resolve("alt-1").is_none());
        assert!(index.resolve("ext-1").is_none());
    }

    #[test]
    fn test_families_are_cumulative() {
        let node = unit("du-1")
            .with_alternates(vec![oid("alt-1")])
            .with_former_refs(vec![oid("ext-1")]);

        let with_alts =
            EntityIdentityIndex::build(vec![node.clone()], KeyStrategy::WithAlternates);
        assert!(with_alts.resolve("alt-1").is_some());
        assert!(with_alts.resolve("ext-1").is_none());

        let full = EntityIdentityIndex::build(vec![node], KeyStrategy::WithFormerRefs);
        assert!(full.resolve("du-1").is_some());
        assert!(full.resolve("alt-1").is_some());
        assert!(full.resolve("ext-1").is_some());
    }

    #[test]
    fn test_collision_returns_a_member_of_the_set() {
        let a = unit("du-a").with_former_refs(vec![oid("shared-ref")]);
        let b = unit("du-b").with_former_refs(vec![oid("shared-ref")]);
        let index = EntityIdentityIndex::build(vec![a, b], KeyStrategy::WithFormerRefs);

        let hit = index.resolve("shared-ref").unwrap();
        assert!(hit.id == oid("du-a") || hit.id == oid("du-b"));
    }

    #[test]
    fn test_miss_is_none() {
        let index = EntityIdentityIndex::build(vec![unit("du-1")], KeyStrategy::default());
        assert!(index.resolve("nope").is_none());
        assert_eq!(index.len(), 1);
        assert!(!index.is_empty());
    }
}
