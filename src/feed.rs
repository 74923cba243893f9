//! Deposit-status feed - parsed semantics of the archive's status document
//!
//! The archive reports deposit progress through an ordered feed document.
//! The serialization format itself is handled upstream; this module consumes
//! only the parsed shape: a top-level id, ordered entries with titles and
//! typed links, and document-level links. Two reserved entry titles mark
//! the terminal outcomes of an ingest.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};

/// Entry title marking a successful ingest
pub const COMPLETE_MARKER: &str = "ingest.complete";
/// Entry title marking a failed ingest
pub const FAIL_MARKER: &str = "ingest.fail";

/// Link relation marking a reference to an archival entity
pub const RELATED_REL: &str = "related";

/// Terminal marker found in a feed, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Complete,
    Failed,
}

/// A typed link carried by a feed entry or the document itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedLink {
    /// Link relation attribute (`related` marks archival references)
    pub rel: String,
    /// Link target: an archival reference string
    pub href: String,
}

impl FeedLink {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }

    /// Convenience constructor for a `related` archival reference
    pub fn related(href: impl Into<String>) -> Self {
        Self::new(RELATED_REL, href)
    }

    fn is_related(&self) -> bool {
        self.rel == RELATED_REL
    }
}

/// One entry of the status feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Entry title; reserved titles mark ingest completion or failure
    pub title: String,
    /// Links attached to this entry
    pub links: Vec<FeedLink>,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            links: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: Vec<FeedLink>) -> Self {
        self.links = links;
        self
    }

    fn marker(&self) -> Option<Marker> {
        match self.title.as_str() {
            COMPLETE_MARKER => Some(Marker::Complete),
            FAIL_MARKER => Some(Marker::Failed),
            _ => None,
        }
    }
}

/// Parsed deposit-status feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFeed {
    /// Top-level feed identifier: the deposit reference this feed reports on
    pub id: ObjectId,
    /// Entries in document order
    pub entries: Vec<FeedEntry>,
    /// Document-level links
    pub links: Vec<FeedLink>,
}

impl StatusFeed {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            entries: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn with_entries(mut self, entries: Vec<FeedEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_links(mut self, links: Vec<FeedLink>) -> Self {
        self.links = links;
        self
    }

    /// First completion or failure marker in document order.
    ///
    /// Scanning stops at the first marker found. A feed with no marker is a
    /// valid, expected state (ingest still in progress), not malformed input.
    pub fn first_marker(&self) -> Option<(Marker, &FeedEntry)> {
        self.entries
            .iter()
            .find_map(|entry| entry.marker().map(|m| (m, entry)))
    }

    /// All `related` archival references from the marker entry and the
    /// document-level links, in document order, first occurrence kept.
    pub fn related_refs(&self) -> Vec<&str> {
        let marker_links = self
            .first_marker()
            .map(|(_, entry)| entry.links.as_slice())
            .unwrap_or(&[]);

        let mut seen = std::collections::HashSet::new();
        marker_links
            .iter()
            .chain(self.links.iter())
            .filter(|link| link.is_related())
            .map(|link| link.href.as_str())
            .filter(|href| seen.insert(*href))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    #[test]
    fn test_no_marker_is_valid() {
        let feed = StatusFeed::new(oid("dep-1"))
            .with_entries(vec![FeedEntry::new("ingest.started"), FeedEntry::new("note")]);
        assert!(feed.first_marker().is_none());
    }

    #[test]
    fn test_first_marker_wins() {
        let feed = StatusFeed::new(oid("dep-1")).with_entries(vec![
            FeedEntry::new("ingest.started"),
            FeedEntry::new(FAIL_MARKER),
            FeedEntry::new(COMPLETE_MARKER),
        ]);
        let (marker, entry) = feed.first_marker().unwrap();
        assert_eq!(marker, Marker::Failed);
        assert_eq!(entry.title, FAIL_MARKER);
    }

    #[test]
    fn test_related_refs_from_entry_and_document() {
        let feed = StatusFeed::new(oid("dep-1"))
            .with_entries(vec![FeedEntry::new(COMPLETE_MARKER).with_links(vec![
                FeedLink::related("arch:du-1"),
                FeedLink::new("self", "arch:ignored"),
            ])])
            .with_links(vec![
                FeedLink::related("arch:du-2"),
                FeedLink::related("arch:du-1"),
            ]);

        // Entry links first, document links after, duplicate dropped
        assert_eq!(feed.related_refs(), vec!["arch:du-1", "arch:du-2"]);
    }

    #[test]
    fn test_non_related_links_ignored() {
        let feed = StatusFeed::new(oid("dep-1"))
            .with_entries(vec![FeedEntry::new(COMPLETE_MARKER)])
            .with_links(vec![FeedLink::new("alternate", "arch:du-1")]);
        assert!(feed.related_refs().is_empty());
    }
}
