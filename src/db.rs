use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

/// Error kind for every database operation. Callers pattern-match instead of
/// catching unstructured faults; nothing here is allowed to abort the process.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database connection lock poisoned")]
    Poisoned,
}

pub struct Db {
    pub conn: Mutex<Connection>,
}

impl Db {
    /// Opens the SQLite database at `path` (or in memory for `:memory:`).
    /// Schema creation is deferred to [`Db::init_schema`], which the startup
    /// hook runs once the server is live.
    pub fn open(path: &str) -> Result<Self, DbError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        Ok(Db {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    /// Idempotent schema initialization.
    pub fn init_schema(&self) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                filename TEXT NOT NULL,
                stored_path TEXT NOT NULL,
                sha256 TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                content_type TEXT NOT NULL DEFAULT 'application/pdf',
                uploaded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_session ON documents(session_id);
            ",
        )?;
        Ok(())
    }

    /// Connectivity probe: runs a trivial query and reports whether the
    /// connection answered correctly.
    pub fn probe(&self) -> Result<bool, DbError> {
        let conn = self.conn()?;
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(one == 1)
    }
}

// --- Document operations ---

const DOCUMENT_COLUMNS: &str =
    "id, session_id, filename, stored_path, sha256, size_bytes, content_type, uploaded_at";

fn row_to_json(row: &rusqlite::Row<'_>) -> rusqlite::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "id": row.get::<_, String>(0)?,
        "session_id": row.get::<_, String>(1)?,
        "filename": row.get::<_, String>(2)?,
        "stored_path": row.get::<_, String>(3)?,
        "sha256": row.get::<_, String>(4)?,
        "size_bytes": row.get::<_, i64>(5)?,
        "content_type": row.get::<_, String>(6)?,
        "uploaded_at": row.get::<_, String>(7)?,
    }))
}

#[allow(clippy::too_many_arguments)]
pub fn insert_document(
    db: &Db,
    id: &str,
    session_id: &str,
    filename: &str,
    stored_path: &str,
    sha256: &str,
    size_bytes: i64,
    content_type: &str,
    uploaded_at: &str,
) -> Result<(), DbError> {
    let conn = db.conn()?;
    conn.execute(
        "INSERT INTO documents (id, session_id, filename, stored_path, sha256, size_bytes, content_type, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![id, session_id, filename, stored_path, sha256, size_bytes, content_type, uploaded_at],
    )?;
    Ok(())
}

pub fn get_document(
    db: &Db,
    id: &str,
    session_id: &str,
) -> Result<Option<serde_json::Value>, DbError> {
    let conn = db.conn()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1 AND session_id = ?2"
    ))?;

    let result = stmt
        .query_row(params![id, session_id], row_to_json)
        .optional()?;

    Ok(result)
}

pub fn list_documents(db: &Db, session_id: &str) -> Result<Vec<serde_json::Value>, DbError> {
    let conn = db.conn()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE session_id = ?1 ORDER BY uploaded_at DESC"
    ))?;

    let rows = stmt
        .query_map(params![session_id], row_to_json)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Deletes the row and returns the stored path so the caller can remove the
/// file. `None` when the document does not exist in this session.
pub fn delete_document(db: &Db, id: &str, session_id: &str) -> Result<Option<String>, DbError> {
    let conn = db.conn()?;
    let path: Option<String> = conn
        .query_row(
            "SELECT stored_path FROM documents WHERE id = ?1 AND session_id = ?2",
            params![id, session_id],
            |row| row.get(0),
        )
        .optional()?;

    if path.is_some() {
        conn.execute(
            "DELETE FROM documents WHERE id = ?1 AND session_id = ?2",
            params![id, session_id],
        )?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Db {
        let db = Db::open(":memory:").expect("open in-memory db");
        db.init_schema().expect("init schema");
        db
    }

    #[test]
    fn init_schema_is_idempotent() {
        let db = memory_db();
        db.init_schema().expect("second init succeeds");
    }

    #[test]
    fn probe_reports_healthy() {
        let db = memory_db();
        assert!(db.probe().expect("probe succeeds"));
    }

    #[test]
    fn probe_fails_on_poisoned_lock() {
        let db = memory_db();
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = db.conn.lock().unwrap();
                    panic!("poison the lock");
                })
                .join();
        });
        assert!(matches!(db.probe(), Err(DbError::Poisoned)));
    }

    #[test]
    fn document_roundtrip() {
        let db = memory_db();
        insert_document(
            &db,
            "doc-1",
            "sess-1",
            "w2.pdf",
            "/tmp/doc-1.pdf",
            "abc123",
            42,
            "application/pdf",
            "2026-01-01T00:00:00Z",
        )
        .unwrap();

        let doc = get_document(&db, "doc-1", "sess-1").unwrap().unwrap();
        assert_eq!(doc["filename"], "w2.pdf");
        assert_eq!(doc["size_bytes"], 42);

        // Scoped to the owning session.
        assert!(get_document(&db, "doc-1", "sess-2").unwrap().is_none());

        let listed = list_documents(&db, "sess-1").unwrap();
        assert_eq!(listed.len(), 1);

        let path = delete_document(&db, "doc-1", "sess-1").unwrap();
        assert_eq!(path.as_deref(), Some("/tmp/doc-1.pdf"));
        assert!(list_documents(&db, "sess-1").unwrap().is_empty());
        assert!(delete_document(&db, "doc-1", "sess-1").unwrap().is_none());
    }
}
