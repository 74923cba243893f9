//! Paginated edge cursor - chunked, deduplicating bulk iteration
//!
//! A forward-only, single-pass iterator over the full edge set, meant for
//! maintenance and export jobs rather than per-entity queries. Pages are
//! fetched by offset/limit, so concurrent writers can cause rows to be
//! skipped or double-visited across page boundaries; that is the accepted
//! contract for this cursor.

use std::collections::{HashSet, VecDeque};

use crate::edge::Edge;
use crate::storage::RelationshipStore;
use crate::{Error, Result};

/// Stateful cursor over all edges in a [`RelationshipStore`].
///
/// Configured with an initial offset, a step (page size) and a maximum
/// number of edges to visit. Each page is deduplicated independently and
/// consumed one edge at a time; the next page is fetched automatically once
/// the current one is exhausted. The cursor is read-only.
pub struct EdgeCursor<'a> {
    store: &'a RelationshipStore,
    step: u64,
    end_offset: u64,
    current_offset: u64,
    page: VecDeque<Edge>,
}

impl<'a> EdgeCursor<'a> {
    /// Create a cursor visiting at most `max` edges starting at
    /// `initial_offset`, fetching `step` edges per page.
    ///
    /// `step` is clamped to `max` if larger; a zero step can never make
    /// progress and is rejected up front.
    pub fn new(
        store: &'a RelationshipStore,
        initial_offset: u64,
        step: u64,
        max: u64,
    ) -> Result<Self> {
        if step == 0 {
            return Err(Error::InvalidArgument(
                "cursor step must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            store,
            step: step.min(max).max(1),
            end_offset: initial_offset + max,
            current_offset: initial_offset,
            page: VecDeque::new(),
        })
    }

    /// Whether another edge is available.
    ///
    /// May fetch the next page, so it can fail on storage errors. Callers
    /// are expected to check this before each [`next_edge`](Self::next_edge).
    pub fn has_next(&mut self) -> Result<bool> {
        while self.page.is_empty() && self.current_offset < self.end_offset {
            let limit = self.step.min(self.end_offset - self.current_offset);
            let rows = self.store.fetch_page(self.current_offset, limit)?;
            let fetched = rows.len() as u64;

            self.current_offset = (self.current_offset + self.step).min(self.end_offset);
            if fetched < limit {
                // Store ran out before the cap; no later page can be non-empty
                self.current_offset = self.end_offset;
            }

            let mut seen: HashSet<Edge> = HashSet::new();
            for edge in rows {
                if seen.insert(edge.clone()) {
                    self.page.push_back(edge);
                }
            }
        }
        Ok(!self.page.is_empty())
    }

    /// Consume the next edge.
    ///
    /// Requesting an edge past the end of iteration is a programming error
    /// and fails with [`Error::CursorExhausted`], distinct from the normal
    /// "no more results" signalled by [`has_next`](Self::has_next).
    pub fn next_edge(&mut self) -> Result<Edge> {
        if self.has_next()? {
            Ok(self.page.pop_front().expect("page is non-empty"))
        } else {
            Err(Error::CursorExhausted)
        }
    }
}
