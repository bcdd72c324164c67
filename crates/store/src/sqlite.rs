// SQLite-backed record store. One table holds every collection; the field
// map is stored as a JSON object.

use std::collections::BTreeMap;
use std::path::Path;

use rolodex_recon::{Record, RecordId, RecordStatus, RecordStore, StoreError};
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use tracing::{debug, warn};

use crate::schema::Schema;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    status TEXT,                  -- created | to_verify | NULL
    fields TEXT NOT NULL          -- JSON object, field -> value
);

CREATE INDEX IF NOT EXISTS records_collection ON records (collection, id);
"#;

pub struct SqliteStore {
    conn: Connection,
    collection: String,
    schema: Schema,
    /// False only for a read-only open of a database without `records`.
    has_table: bool,
}

impl SqliteStore {
    pub fn open(path: &Path, collection: &str, schema: Schema) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(backend_error)?;
        debug!(path = %path.display(), collection, "opened record store");
        Self::init(conn, collection, schema)
    }

    pub fn open_in_memory(collection: &str, schema: Schema) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend_error)?;
        Self::init(conn, collection, schema)
    }

    /// Open for seeding only. The file is never modified: no schema is
    /// created, and a database without a `records` table seeds empty.
    pub fn open_read_only(path: &Path, collection: &str, schema: Schema) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(backend_error)?;
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'records'",
                [],
                |row| row.get(0),
            )
            .map_err(backend_error)?;
        debug!(path = %path.display(), collection, has_table = tables > 0, "opened record store read-only");
        Ok(Self {
            conn,
            collection: collection.to_string(),
            schema,
            has_table: tables > 0,
        })
    }

    fn init(conn: Connection, collection: &str, schema: Schema) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend_error)?;
        Ok(Self {
            conn,
            collection: collection.to_string(),
            schema,
            has_table: true,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of records in the configured collection.
    pub fn count(&self) -> Result<usize, StoreError> {
        if !self.has_table {
            return Ok(0);
        }
        let n: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![self.collection],
                |row| row.get(0),
            )
            .map_err(backend_error)?;
        usize::try_from(n)
            .map_err(|_| StoreError::backend("SQLITE_ERROR", format!("invalid record count {n}")))
    }
}

impl RecordStore for SqliteStore {
    fn seed_all(&mut self) -> Result<Vec<Record>, StoreError> {
        if !self.has_table {
            debug!(collection = %self.collection, "no records table, nothing to seed");
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare("SELECT id, status, fields FROM records WHERE collection = ?1 ORDER BY id")
            .map_err(backend_error)?;

        let rows = stmt
            .query_map(params![self.collection], |row| {
                let id: i64 = row.get(0)?;
                let status: Option<String> = row.get(1)?;
                let fields: String = row.get(2)?;
                Ok((id, status, fields))
            })
            .map_err(backend_error)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, status, fields) = row.map_err(backend_error)?;
            let fields: BTreeMap<String, String> = serde_json::from_str(&fields).map_err(|e| {
                StoreError::backend("CORRUPT_RECORD", format!("record {id}: {e}"))
            })?;
            records.push(Record {
                id: Some(RecordId::from(id)),
                status: status.as_deref().and_then(RecordStatus::parse),
                fields,
            });
        }

        debug!(collection = %self.collection, records = records.len(), "seeded from store");
        Ok(records)
    }

    fn create_one(&mut self, record: &Record) -> Result<RecordId, StoreError> {
        if let Err(violations) = self.schema.validate(record) {
            warn!(
                collection = %self.collection,
                violations = violations.len(),
                "record rejected by schema"
            );
            return Err(StoreError::Validation(violations));
        }

        let fields = serde_json::to_string(&record.fields)
            .map_err(|e| StoreError::backend("SERIALIZE", e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO records (collection, status, fields) VALUES (?1, ?2, ?3)",
                params![self.collection, record.status.map(|s| s.as_str()), fields],
            )
            .map_err(backend_error)?;

        let id = RecordId::from(self.conn.last_insert_rowid());
        debug!(collection = %self.collection, id = %id, "inserted record");
        Ok(id)
    }
}

/// Map a rusqlite failure to a backend error with a `SQLITE_*` code.
fn backend_error(err: rusqlite::Error) -> StoreError {
    let code = match &err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::DatabaseBusy => "SQLITE_BUSY",
            ErrorCode::DatabaseLocked => "SQLITE_LOCKED",
            ErrorCode::ReadOnly => "SQLITE_READONLY",
            ErrorCode::ConstraintViolation => "SQLITE_CONSTRAINT",
            ErrorCode::CannotOpen => "SQLITE_CANTOPEN",
            ErrorCode::NotADatabase => "SQLITE_NOTADB",
            ErrorCode::DatabaseCorrupt => "SQLITE_CORRUPT",
            ErrorCode::DiskFull => "SQLITE_FULL",
            ErrorCode::PermissionDenied => "SQLITE_PERM",
            _ => "SQLITE_ERROR",
        },
        _ => "SQLITE_ERROR",
    };
    StoreError::backend(code, err.to_string())
}
