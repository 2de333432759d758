//! Inspection storage: append and load inspection records.

use std::{fs, io};

// Traits must be in scope for `.lines()` on BufReader and `.write_all()` on File.
use io::{BufRead, Write};

use uuid::Uuid;

use crate::model::Inspection;

use super::{Result, Storage};

impl Storage {
    /// Appends an inspection record.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if the record cannot be appended.
    pub fn append_inspection(&self, inspection: &Inspection) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.inspections_path())?;
        let mut line = serde_json::to_string(inspection)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Loads inspection records in the order they were recorded,
    /// optionally restricted to one checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if the log cannot be read or a line is malformed.
    pub fn list_inspections(&self, checkpoint: Option<Uuid>) -> Result<Vec<Inspection>> {
        let file = match fs::File::open(self.inspections_path()) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = io::BufReader::new(file);
        let mut inspections = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let inspection: Inspection = serde_json::from_str(&line)?;
            if checkpoint.is_none_or(|id| inspection.checkpoint_id == id) {
                inspections.push(inspection);
            }
        }
        Ok(inspections)
    }
}
