use crate::db::Db;
use crate::storage::DocumentStore;

/// Outcome of probing one optional subsystem at startup. Absence is an
/// expected, supported configuration, not an error: the server runs degraded
/// with the corresponding feature disabled.
pub enum Capability<T> {
    Loaded(T),
    Unavailable(String),
}

impl<T> Capability<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Capability::Loaded(value) => Some(value),
            Capability::Unavailable(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Capability::Loaded(_))
    }
}

/// The capability set, negotiated once before the server starts and injected
/// into managed state. Read-only thereafter.
pub struct AppCapabilities {
    pub database: Capability<Db>,
    pub documents: Capability<DocumentStore>,
}

impl AppCapabilities {
    /// Document routes need both the database (metadata rows) and the store
    /// (file bytes); either one missing disables the whole group.
    pub fn documents_enabled(&self) -> bool {
        self.database.is_loaded() && self.documents.is_loaded()
    }
}

/// Probes each optional subsystem independently. A failure disables that
/// subsystem with a logged warning; negotiation itself never fails.
pub fn negotiate() -> AppCapabilities {
    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "tax_advisor.db".to_string());
    let database = match Db::open(&db_path) {
        Ok(db) => Capability::Loaded(db),
        Err(e) => {
            eprintln!("Warning: Database components not found: {e}");
            Capability::Unavailable(e.to_string())
        }
    };

    let uploads_dir =
        std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads/sessions".to_string());
    let documents = match DocumentStore::open(&uploads_dir) {
        Ok(store) => Capability::Loaded(store),
        Err(e) => {
            eprintln!("Warning: Document routes not found: {e}");
            Capability::Unavailable(e.to_string())
        }
    };

    AppCapabilities {
        database,
        documents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_exposes_value() {
        let cap = Capability::Loaded(7);
        assert!(cap.is_loaded());
        assert_eq!(cap.loaded(), Some(&7));
    }

    #[test]
    fn unavailable_exposes_nothing() {
        let cap: Capability<i32> = Capability::Unavailable("missing".to_string());
        assert!(!cap.is_loaded());
        assert!(cap.loaded().is_none());
    }

    #[test]
    fn documents_need_both_subsystems() {
        let tmp = tempfile::tempdir().unwrap();
        let both = AppCapabilities {
            database: Capability::Loaded(Db::open(":memory:").unwrap()),
            documents: Capability::Loaded(DocumentStore::open(tmp.path().join("up")).unwrap()),
        };
        assert!(both.documents_enabled());

        let db_only = AppCapabilities {
            database: Capability::Loaded(Db::open(":memory:").unwrap()),
            documents: Capability::Unavailable("no store".to_string()),
        };
        assert!(!db_only.documents_enabled());
    }
}
