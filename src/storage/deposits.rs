//! Deposit log - append-only record of archival deposit attempts

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use tracing::debug;

use super::schema;
use crate::deposit::{DepositRecord, DepositStatus, ObjectType};
use crate::id::ObjectId;
use crate::{Error, Result};

const SELECT_COLUMNS: &str = "deposit_id, parent_deposit_id, object_id, archive_id, state_id, \
     status, object_type, deposit_date";

/// SQLite-backed log of deposit attempts, keyed by deposit id.
///
/// Records are appended and individually updated, never deleted. Listing
/// operations return newest-first by deposit date.
pub struct DepositLog {
    conn: Connection,
}

impl DepositLog {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let log = Self { conn };
        log.initialize_schema()?;
        Ok(log)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let log = Self { conn };
        log.initialize_schema()?;
        Ok(log)
    }

    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::deposit_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Record a new deposit attempt.
    ///
    /// The deposit id must not already be in the log; a reused id fails
    /// with [`Error::DuplicateDeposit`]. Deposit ids are immutable once
    /// assigned.
    pub fn add(&self, record: &DepositRecord) -> Result<()> {
        let result = self.conn.execute(
            &format!("INSERT INTO deposits ({SELECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                record.deposit_id.as_str(),
                record.parent_deposit_id.as_ref().map(|id| id.as_str()),
                record.object_id.as_str(),
                record.archive_id.as_ref().map(|id| id.as_str()),
                record.state_id.as_ref().map(|id| id.as_str()),
                record.status.as_str(),
                record.object_type.as_str(),
                format_date(&record.deposit_date),
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(Error::DuplicateDeposit(record.deposit_id.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replace all mutable fields of the record with this deposit id.
    ///
    /// Updating an id that is not in the log affects zero rows and is a
    /// successful no-op, never an error.
    pub fn update(&self, record: &DepositRecord) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE deposits SET parent_deposit_id = ?2, object_id = ?3, archive_id = ?4, \
             state_id = ?5, status = ?6, object_type = ?7, deposit_date = ?8 \
             WHERE deposit_id = ?1",
            params![
                record.deposit_id.as_str(),
                record.parent_deposit_id.as_ref().map(|id| id.as_str()),
                record.object_id.as_str(),
                record.archive_id.as_ref().map(|id| id.as_str()),
                record.state_id.as_ref().map(|id| id.as_str()),
                record.status.as_str(),
                record.object_type.as_str(),
                format_date(&record.deposit_date),
            ],
        )?;
        if updated == 0 {
            debug!(deposit_id = %record.deposit_id, "update matched no rows");
        }
        Ok(())
    }

    /// Look up one deposit attempt by deposit id
    pub fn lookup(&self, deposit_id: &ObjectId) -> Result<Option<DepositRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM deposits WHERE deposit_id = ?1"),
                [deposit_id.as_str()],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All child deposits of a parent deposit, newest first
    pub fn lookup_children(&self, parent_deposit_id: &ObjectId) -> Result<Vec<DepositRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM deposits WHERE parent_deposit_id = ?1 \
             ORDER BY deposit_date DESC, deposit_id DESC"
        ))?;
        let records = stmt
            .query_map([parent_deposit_id.as_str()], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// List deposit attempts, newest first; `None` filters mean "any"
    pub fn list(
        &self,
        object_type: Option<ObjectType>,
        status: Option<DepositStatus>,
    ) -> Result<Vec<DepositRecord>> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM deposits");
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(ty) = object_type {
            clauses.push("object_type = ?");
            args.push(ty.as_str().to_string());
        }
        if let Some(st) = status {
            clauses.push("status = ?");
            args.push(st.as_str().to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY deposit_date DESC, deposit_id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Deposit history of one business object, newest first
    pub fn list_for_object(
        &self,
        object_id: &ObjectId,
        status: Option<DepositStatus>,
    ) -> Result<Vec<DepositRecord>> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM deposits WHERE object_id = ?");
        let mut args: Vec<String> = vec![object_id.as_str().to_string()];

        if let Some(st) = status {
            sql.push_str(" AND status = ?");
            args.push(st.as_str().to_string());
        }
        sql.push_str(" ORDER BY deposit_date DESC, deposit_id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Count all deposit attempts
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM deposits", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Fixed-width UTC timestamp so lexicographic ORDER BY is chronological
fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_date(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn opt_id(column: usize, raw: Option<String>) -> rusqlite::Result<Option<ObjectId>> {
    raw.map(|s| {
        ObjectId::new(s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    })
    .transpose()
}

/// Convert a deposits row to a DepositRecord
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<DepositRecord> {
    let deposit_id: String = row.get(0)?;
    let status_str: String = row.get(5)?;
    let type_str: String = row.get(6)?;
    let date_str: String = row.get(7)?;

    let deposit_id = ObjectId::new(deposit_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let object_id: String = row.get(2)?;
    let object_id = ObjectId::new(object_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let status: DepositStatus = status_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let object_type: ObjectType = type_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(DepositRecord {
        deposit_id,
        parent_deposit_id: opt_id(1, row.get(1)?)?,
        object_id,
        archive_id: opt_id(3, row.get(3)?)?,
        state_id: opt_id(4, row.get(4)?)?,
        status,
        object_type,
        deposit_date: parse_date(7, &date_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn oid(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn record(dep: &str, obj: &str, hour: u32) -> DepositRecord {
        DepositRecord::new(oid(dep), oid(obj), ObjectType::Dataset).with_date(at(hour))
    }

    #[test]
    fn test_add_and_lookup() {
        let log = DepositLog::open_in_memory().unwrap();
        let rec = record("dep-1", "ds-1", 9);
        log.add(&rec).unwrap();

        let found = log.lookup(&oid("dep-1")).unwrap().unwrap();
        assert_eq!(found, rec);
        assert!(log.lookup(&oid("dep-404")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_deposit_id_rejected() {
        let log = DepositLog::open_in_memory().unwrap();
        log.add(&record("dep-1", "ds-1", 9)).unwrap();

        let err = log.add(&record("dep-1", "ds-2", 10)).unwrap_err();
        assert!(matches!(err, Error::DuplicateDeposit(id) if id == "dep-1"));
        assert_eq!(log.count().unwrap(), 1);
    }

    #[test]
    fn test_update_replaces_mutable_fields() {
        let log = DepositLog::open_in_memory().unwrap();
        let mut rec = record("dep-1", "ds-1", 9);
        log.add(&rec).unwrap();

        rec.status = DepositStatus::Deposited;
        rec.archive_id = Some(oid("arch-77"));
        rec.state_id = Some(oid("state-77"));
        log.update(&rec).unwrap();

        let found = log.lookup(&oid("dep-1")).unwrap().unwrap();
        assert_eq!(found.status, DepositStatus::Deposited);
        assert_eq!(found.archive_id, Some(oid("arch-77")));
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let log = DepositLog::open_in_memory().unwrap();
        log.update(&record("dep-ghost", "ds-1", 9)).unwrap();
        assert_eq!(log.count().unwrap(), 0);
    }

    #[test]
    fn test_lookup_children() {
        let log = DepositLog::open_in_memory().unwrap();
        log.add(&record("dep-parent", "ds-1", 8)).unwrap();
        log.add(
            &DepositRecord::new(oid("dep-f1"), oid("file-1"), ObjectType::DataFile)
                .with_parent(oid("dep-parent"))
                .with_date(at(9)),
        )
        .unwrap();
        log.add(
            &DepositRecord::new(oid("dep-f2"), oid("file-2"), ObjectType::DataFile)
                .with_parent(oid("dep-parent"))
                .with_date(at(10)),
        )
        .unwrap();

        let children = log.lookup_children(&oid("dep-parent")).unwrap();
        assert_eq!(children.len(), 2);
        // Newest first
        assert_eq!(children[0].deposit_id, oid("dep-f2"));
        assert_eq!(children[1].deposit_id, oid("dep-f1"));
    }

    #[test]
    fn test_list_filters_and_order() {
        let log = DepositLog::open_in_memory().unwrap();
        log.add(&record("dep-1", "ds-1", 8)).unwrap();
        let mut failed = record("dep-2", "ds-2", 9);
        failed.status = DepositStatus::Failed;
        log.add(&failed).unwrap();
        log.add(
            &DepositRecord::new(oid("dep-3"), oid("coll-1"), ObjectType::Collection)
                .with_date(at(10)),
        )
        .unwrap();

        let all = log.list(None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].deposit_id, oid("dep-3"));
        assert_eq!(all[2].deposit_id, oid("dep-1"));

        let datasets = log.list(Some(ObjectType::Dataset), None).unwrap();
        assert_eq!(datasets.len(), 2);

        let failed_datasets = log
            .list(Some(ObjectType::Dataset), Some(DepositStatus::Failed))
            .unwrap();
        assert_eq!(failed_datasets.len(), 1);
        assert_eq!(failed_datasets[0].deposit_id, oid("dep-2"));
    }

    #[test]
    fn test_list_for_object_is_filtered_history() {
        let log = DepositLog::open_in_memory().unwrap();
        log.add(&record("dep-1", "ds-1", 8)).unwrap();
        let mut v2 = record("dep-2", "ds-1", 9);
        v2.status = DepositStatus::Deposited;
        log.add(&v2).unwrap();
        log.add(&record("dep-other", "ds-2", 10)).unwrap();

        let history = log.list_for_object(&oid("ds-1"), None).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].deposit_id, oid("dep-2"));

        let deposited = log
            .list_for_object(&oid("ds-1"), Some(DepositStatus::Deposited))
            .unwrap();
        assert_eq!(deposited.len(), 1);
        assert!(deposited.iter().all(|r| r.status == DepositStatus::Deposited));
        // Strict subset of the unfiltered history
        assert!(deposited.iter().all(|r| history.contains(r)));
        assert!(deposited.len() < history.len());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deposits.db");

        {
            let log = DepositLog::open(&path).unwrap();
            log.add(&record("dep-1", "ds-1", 9)).unwrap();
        }

        let log = DepositLog::open(&path).unwrap();
        assert_eq!(log.count().unwrap(), 1);
        let rec = log.lookup(&oid("dep-1")).unwrap().unwrap();
        assert_eq!(rec.deposit_date, at(9));
    }
}
