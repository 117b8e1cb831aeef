//! File-backed durable session store.
//!
//! All three keys live in one JSON object (`session.json`) inside a
//! capability-scoped directory. Every batch rewrites the whole document into
//! a staged file and renames it over the old one, so a crash leaves either
//! the previous document or the new one, never a mix. An empty document is
//! represented by the absence of the file.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{SessionKey, SessionStore, SessionStoreError, StoreOp, WriteBatch};

/// Name of the session document inside the store directory.
pub const SESSION_FILE: &str = "session.json";

type Document = BTreeMap<String, String>;

/// Session store persisting to `<dir>/session.json`.
pub struct FileSessionStore {
    path: PathBuf,
    dir: Dir,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open (creating if needed) the store directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionStoreError> {
        let path = path.into();
        Dir::create_ambient_dir_all(&path, ambient_authority())
            .map_err(|error| io_error(&path, &error))?;
        let dir = Dir::open_ambient_dir(&path, ambient_authority())
            .map_err(|error| io_error(&path, &error))?;
        Ok(Self {
            path,
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the session document.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn document_path(&self) -> PathBuf {
        self.path.join(SESSION_FILE)
    }

    fn read_document(&self) -> Result<Document, SessionStoreError> {
        let raw = match self.dir.read_to_string(SESSION_FILE) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(error) => return Err(io_error(&self.document_path(), &error)),
        };
        serde_json::from_str(&raw).map_err(|error| {
            SessionStoreError::corrupt(format!("{}: {error}", self.document_path().display()))
        })
    }

    fn write_document(&self, document: &Document) -> Result<(), SessionStoreError> {
        if document.is_empty() {
            return match self.dir.remove_file(SESSION_FILE) {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(io_error(&self.document_path(), &error)),
            };
        }

        let serialized = serde_json::to_vec_pretty(document).map_err(|error| {
            SessionStoreError::corrupt(format!("failed to serialise session document: {error}"))
        })?;
        let staged = format!(".session-{}.tmp", Uuid::new_v4().simple());
        self.dir
            .write(&staged, &serialized)
            .map_err(|error| io_error(&self.path.join(&staged), &error))?;

        if let Err(error) = self.dir.rename(&staged, &self.dir, SESSION_FILE) {
            let _cleanup_result = self.dir.remove_file(&staged);
            return Err(io_error(&self.document_path(), &error));
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionStoreError> {
        let mut document = self.read_document()?;
        Ok(document.remove(key.as_str()))
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), SessionStoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| SessionStoreError::io("session store write lock poisoned"))?;

        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(SessionStoreError::Corrupt { message }) => {
                warn!(%message, "replacing corrupt session document");
                Document::new()
            }
            Err(error) => return Err(error),
        };
        // Only the three session keys are ever kept.
        document.retain(|name, _| SessionKey::from_name(name).is_some());

        for op in batch.into_ops() {
            match op {
                StoreOp::Put(key, value) => {
                    document.insert(key.as_str().to_owned(), value);
                }
                StoreOp::Delete(key) => {
                    document.remove(key.as_str());
                }
            }
        }

        debug!(
            keys = document.len(),
            path = %self.document_path().display(),
            "writing session document"
        );
        self.write_document(&document)
    }
}

fn io_error(path: &Path, error: &io::Error) -> SessionStoreError {
    SessionStoreError::io(format!("{}: {error}", path.display()))
}
