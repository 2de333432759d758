//! Checkpoint storage: create, load, list, and remove checkpoints.

use std::{fs, io};

use uuid::Uuid;

use crate::model::Checkpoint;

use super::{Result, Storage, StorageError};

impl Storage {
    /// Writes a new checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CheckpointAlreadyExists`] if the id is taken, or an
    /// I/O or JSON error if the record cannot be written.
    pub fn create_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()> {
        let path = self.checkpoint_path(checkpoint.id);
        if path.exists() {
            return Err(StorageError::CheckpointAlreadyExists(checkpoint.id));
        }
        let json = serde_json::to_string_pretty(checkpoint)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads a single checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CheckpointNotFound`] for an unknown id,
    /// [`StorageError::Corrupt`] if the file holds a different checkpoint, or an
    /// I/O or JSON error if the record cannot be read.
    pub fn load_checkpoint(&self, id: Uuid) -> Result<Checkpoint> {
        let path = self.checkpoint_path(id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::CheckpointNotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        let checkpoint: Checkpoint = serde_json::from_str(&json)?;
        if checkpoint.id != id {
            return Err(StorageError::Corrupt(format!(
                "{} holds checkpoint {}",
                path.display(),
                checkpoint.id
            )));
        }
        Ok(checkpoint)
    }

    /// Lists checkpoints, optionally restricted to one route.
    ///
    /// Ordered by route, then sequence order, then name.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if a record cannot be read.
    pub fn list_checkpoints(&self, route: Option<Uuid>) -> Result<Vec<Checkpoint>> {
        let mut checkpoints: Vec<Checkpoint> = self.load_all("checkpoints")?;
        checkpoints.retain(|c| route.is_none_or(|id| c.route_id == id));
        checkpoints.sort_by(|a, b| {
            a.route_id
                .cmp(&b.route_id)
                .then(a.sequence_order.cmp(&b.sequence_order))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(checkpoints)
    }

    /// Removes a checkpoint. Its inspections are kept.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CheckpointNotFound`] for an unknown id, or an I/O
    /// error if the file cannot be removed.
    pub fn delete_checkpoint(&self, id: Uuid) -> Result<()> {
        match fs::remove_file(self.checkpoint_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::CheckpointNotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
