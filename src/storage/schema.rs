//! Database schema definitions

/// SQL to create the edges table
///
/// The UNIQUE constraint on the full triple is the store's idempotence
/// contract: re-inserting an existing edge raises a constraint violation
/// that the store converts to a no-op.
pub const CREATE_EDGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    reltype TEXT NOT NULL,
    UNIQUE(source, target, reltype)
)
"#;

/// SQL to create the deposits table
pub const CREATE_DEPOSITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS deposits (
    deposit_id TEXT PRIMARY KEY,
    parent_deposit_id TEXT,
    object_id TEXT NOT NULL,
    archive_id TEXT,
    state_id TEXT,
    status TEXT NOT NULL,
    object_type TEXT NOT NULL,
    deposit_date TEXT NOT NULL
)
"#;

/// SQL to create indexes on the edges table
pub const CREATE_EDGE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source)",
    "CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target)",
    "CREATE INDEX IF NOT EXISTS idx_edges_reltype ON edges(reltype)",
];

/// SQL to create indexes on the deposits table
pub const CREATE_DEPOSIT_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_deposits_object ON deposits(object_id)",
    "CREATE INDEX IF NOT EXISTS idx_deposits_parent ON deposits(parent_deposit_id)",
    "CREATE INDEX IF NOT EXISTS idx_deposits_date ON deposits(deposit_date)",
];

/// Schema statements for the relationship store
pub fn edge_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_EDGES_TABLE];
    stmts.extend(CREATE_EDGE_INDEXES.iter().copied());
    stmts
}

/// Schema statements for the deposit log
pub fn deposit_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_DEPOSITS_TABLE];
    stmts.extend(CREATE_DEPOSIT_INDEXES.iter().copied());
    stmts
}
