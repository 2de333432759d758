//! Local persistence for checkpoints and inspections.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/
//!   routes/<uuid>.json        # Route reference data
//!   checkpoints/<uuid>.json   # Checkpoint reference data
//!   inspections.jsonl         # Append-only inspection records
//! ```
//!
//! The verification engine never touches storage. Callers load a
//! checkpoint, verify against it, then append an inspection.

mod checkpoint;
mod inspection;
mod route;

use std::{fs, io, path::PathBuf};

use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("route not found: {0}")]
    RouteNotFound(Uuid),

    #[error("route already exists: {0}")]
    RouteAlreadyExists(Uuid),

    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(Uuid),

    #[error("checkpoint already exists: {0}")]
    CheckpointAlreadyExists(Uuid),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory tree is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory tree cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("routes"))?;
        fs::create_dir_all(root.join("checkpoints"))?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.patrol/`.
    #[must_use]
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".patrol"))
    }

    fn route_path(&self, id: Uuid) -> PathBuf {
        self.root.join("routes").join(format!("{id}.json"))
    }

    fn checkpoint_path(&self, id: Uuid) -> PathBuf {
        self.root.join("checkpoints").join(format!("{id}.json"))
    }

    fn inspections_path(&self) -> PathBuf {
        self.root.join("inspections.jsonl")
    }

    /// Reads every `*.json` record in `dir`, in no particular order.
    fn load_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>> {
        let entries = match fs::read_dir(self.root.join(dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = fs::read_to_string(&path)?;
            records.push(serde_json::from_str(&json)?);
        }
        Ok(records)
    }
}
