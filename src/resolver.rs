//! Root resolver - which archival node heads a freshly-ingested graph
//!
//! Given a deposit-status feed and a pool of candidate archival nodes, the
//! resolver determines whether the ingest finished and, on completion,
//! which single deliverable unit is the root of the deposited object graph.

use tracing::warn;

use crate::feed::{Marker, StatusFeed};
use crate::id::ObjectId;
use crate::identity::{ArchiveNode, EntityIdentityIndex, NodeKind};

/// Outcome of resolving a deposit-status feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No completion or failure marker observed yet
    Pending,
    /// A failure marker was found; no root resolution was attempted
    Failed {
        /// The deposit the feed reports on
        deposit_ref: ObjectId,
    },
    /// A completion marker was found
    Complete {
        /// The deposit the feed reports on
        deposit_ref: ObjectId,
        /// Root deliverable unit, if one was determined. `None` means the
        /// deposit completed rootless, a legitimate terminal state.
        root: Option<ObjectId>,
        /// True when more than one candidate had no local parent. The
        /// returned root is then the first under pool enumeration order,
        /// kept for compatibility; this flag lets callers tell the two
        /// cases apart.
        ambiguous: bool,
        /// Every resolved reference, root or not, for deposit-record
        /// linkage by the caller
        entities: Vec<ObjectId>,
    },
}

/// Resolves deposit-status feeds against an entity identity index.
pub struct RootResolver<'a> {
    index: &'a EntityIdentityIndex,
}

impl<'a> RootResolver<'a> {
    pub fn new(index: &'a EntityIdentityIndex) -> Self {
        Self { index }
    }

    /// Resolve the terminal state and, on completion, the graph root.
    ///
    /// The feed is scanned for the first completion or failure marker.
    /// Unresolvable related references are dropped with a diagnostic: a
    /// feed may legitimately reference entities not yet indexed.
    pub fn resolve(&self, feed: &StatusFeed) -> Resolution {
        let marker = match feed.first_marker() {
            Some((marker, _)) => marker,
            None => return Resolution::Pending,
        };

        if marker == Marker::Failed {
            return Resolution::Failed {
                deposit_ref: feed.id.clone(),
            };
        }

        let mut candidates: Vec<&ArchiveNode> = Vec::new();
        let mut entities: Vec<ObjectId> = Vec::new();
        for reference in feed.related_refs() {
            match self.index.resolve(reference) {
                Some(node) => {
                    entities.push(node.id.clone());
                    candidates.push(node);
                }
                None => {
                    warn!(deposit = %feed.id, reference, "dropping unresolvable archival reference");
                }
            }
        }

        let (root, ambiguous) = find_root(&candidates);
        Resolution::Complete {
            deposit_ref: feed.id.clone(),
            root,
            ambiguous,
            entities,
        }
    }
}

/// First deliverable unit with no parent inside the candidate pool.
///
/// A candidate is a root iff none of its parent refs is the id of another
/// candidate in the same pool. The first match under enumeration order
/// wins; the second return value reports whether more than one candidate
/// qualified.
fn find_root(candidates: &[&ArchiveNode]) -> (Option<ObjectId>, bool) {
    let units: Vec<&ArchiveNode> = candidates
        .iter()
        .copied()
        .filter(|node| node.kind == NodeKind::DeliverableUnit)
        .collect();

    let mut roots = units.iter().filter(|node| {
        !node
            .parent_refs
            .iter()
            .any(|parent| units.iter().any(|other| &other.id == parent))
    });

    let first = roots.next().map(|node| node.id.clone());
    let ambiguous = roots.next().is_some();
    (first, ambiguous)
}
