use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem store for uploaded documents, grouped into per-session
/// subdirectories under a single root.
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Opens the store, creating the root directory if it does not exist.
    /// Idempotent: an existing directory is not an error.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(DocumentStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an uploaded document under `<root>/<session_id>/<doc_id>.pdf`
    /// and returns the stored path.
    pub fn store(&self, session_id: &str, doc_id: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dir = self.root.join(session_id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{doc_id}.pdf"));
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Removes a stored file. Missing files are ignored — the database row is
    /// the source of truth and may outlive a manually deleted file.
    pub fn remove(&self, stored_path: &str) -> io::Result<()> {
        match fs::remove_file(stored_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("uploads/sessions");
        let store = DocumentStore::open(&root).unwrap();
        assert!(store.root().is_dir());
        // Second open over the same directory succeeds.
        DocumentStore::open(&root).unwrap();
    }

    #[test]
    fn store_and_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(tmp.path().join("uploads")).unwrap();

        let path = store.store("sess-1", "doc-1", b"%PDF-1.4 test").unwrap();
        assert!(path.is_file());
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4 test");

        store.remove(path.to_str().unwrap()).unwrap();
        assert!(!path.exists());
        // Removing again is not an error.
        store.remove(path.to_str().unwrap()).unwrap();
    }
}
