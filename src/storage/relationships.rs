//! Relationship store - durable typed edges between business objects

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rusqlite::{Connection, ErrorCode, params};
use tracing::{debug, warn};

use super::schema;
use crate::edge::{Edge, EdgeEnd, RelationType};
use crate::id::ObjectId;
use crate::{Error, Result};

/// SQLite-backed store of typed, directed edges.
///
/// Inserts are duplicate-tolerant: re-adding an existing (source, target,
/// reltype) triple is a silent no-op, which doubles as the concurrency
/// contract when two callers race on the same triple.
pub struct RelationshipStore {
    conn: Connection,
}

impl RelationshipStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::edge_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Insert an edge; re-inserting an existing triple succeeds silently
    pub fn add_edge(&self, edge: &Edge) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO edges (source, target, reltype) VALUES (?1, ?2, ?3)",
            params![
                edge.source.as_str(),
                edge.target.as_str(),
                edge.rel.as_str()
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate(&err) => {
                debug!(source = %edge.source, target = %edge.target, rel = %edge.rel,
                    "edge already present, insert is a no-op");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Insert a batch of edges.
    ///
    /// Attempts a single transaction first; if that fails on a duplicate
    /// triple, rolls back and re-inserts edge by edge so the non-duplicate
    /// members of the batch still land.
    pub fn add_edges(&mut self, edges: &HashSet<Edge>) -> Result<()> {
        match self.try_add_batch(edges) {
            Ok(()) => Ok(()),
            Err(Error::Storage(err)) if is_duplicate(&err) => {
                warn!(
                    batch_size = edges.len(),
                    "batch insert collided with existing edges, retrying edge by edge"
                );
                for edge in edges {
                    self.add_edge(edge)?;
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn try_add_batch(&mut self, edges: &HashSet<Edge>) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO edges (source, target, reltype) VALUES (?1, ?2, ?3)")?;
            for edge in edges {
                stmt.execute(params![
                    edge.source.as_str(),
                    edge.target.as_str(),
                    edge.rel.as_str()
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Remove an exact triple; removing a non-existent edge is a no-op
    pub fn remove_edge(&self, edge: &Edge) -> Result<()> {
        self.conn.execute(
            "DELETE FROM edges WHERE source = ?1 AND target = ?2 AND reltype = ?3",
            params![
                edge.source.as_str(),
                edge.target.as_str(),
                edge.rel.as_str()
            ],
        )?;
        Ok(())
    }

    /// Remove a set of exact triples
    pub fn remove_edges(&self, edges: &HashSet<Edge>) -> Result<()> {
        for edge in edges {
            self.remove_edge(edge)?;
        }
        Ok(())
    }

    /// Remove every edge where `id` appears as source or target
    pub fn remove_all_edges_touching(&self, id: &ObjectId) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM edges WHERE source = ?1 OR target = ?1",
            [id.as_str()],
        )?;
        debug!(id = %id, removed, "removed all edges touching object");
        Ok(())
    }

    /// All edges touching `id` in either direction, grouped by relation type
    pub fn edges_for(&self, id: &ObjectId) -> Result<BTreeMap<RelationType, HashSet<Edge>>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, target, reltype FROM edges WHERE source = ?1 OR target = ?1",
        )?;
        let mut grouped: BTreeMap<RelationType, HashSet<Edge>> = BTreeMap::new();
        let rows = stmt.query_map([id.as_str()], row_to_edge)?;
        for row in rows {
            let edge = row?;
            grouped.entry(edge.rel).or_default().insert(edge);
        }
        Ok(grouped)
    }

    /// All edges of one relation type touching `id` in either direction
    pub fn edges_for_type(&self, id: &ObjectId, rel: RelationType) -> Result<HashSet<Edge>> {
        self.edges_for_end(id, rel, EdgeEnd::Either)
    }

    /// Directed query: edges of `rel` where `id` occupies the given end
    pub fn edges_for_end(
        &self,
        id: &ObjectId,
        rel: RelationType,
        end: EdgeEnd,
    ) -> Result<HashSet<Edge>> {
        let sql = match end {
            EdgeEnd::Source => {
                "SELECT source, target, reltype FROM edges WHERE source = ?1 AND reltype = ?2"
            }
            EdgeEnd::Target => {
                "SELECT source, target, reltype FROM edges WHERE target = ?1 AND reltype = ?2"
            }
            EdgeEnd::Either => {
                "SELECT source, target, reltype FROM edges WHERE (source = ?1 OR target = ?1) AND reltype = ?2"
            }
        };
        let mut stmt = self.conn.prepare(sql)?;
        let edges = stmt
            .query_map(params![id.as_str(), rel.as_str()], row_to_edge)?
            .collect::<rusqlite::Result<HashSet<Edge>>>()?;
        Ok(edges)
    }

    /// One page of the full edge set, in stable insertion order.
    ///
    /// Used by [`EdgeCursor`](crate::cursor::EdgeCursor); page boundaries are
    /// offset-based, so concurrent writers can shift rows across pages.
    pub fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Edge>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, target, reltype FROM edges ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;
        let edges = stmt
            .query_map(params![limit, offset], row_to_edge)?
            .collect::<rusqlite::Result<Vec<Edge>>>()?;
        Ok(edges)
    }

    /// Count all edges
    pub fn count_edges(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// True when a storage error is a uniqueness-constraint violation
fn is_duplicate(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Convert a (source, target, reltype) row to an Edge
fn row_to_edge(row: &rusqlite::Row) -> rusqlite::Result<Edge> {
    let source: String = row.get(0)?;
    let target: String = row.get(1)?;
    let rel_str: String = row.get(2)?;

    let source = ObjectId::new(source).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let target = ObjectId::new(target).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let rel: RelationType = rel_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Edge::new(source, target, rel))
}
