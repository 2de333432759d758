//! Inspection records: what gets submitted after a verified visit.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoReading;

use super::VerifiedVisit;

/// How the inspector judged the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InspectionStatus {
    /// Nothing to report.
    Completed,

    /// Something needs follow-up.
    Flagged,
}

/// A submitted inspection, serialized as one line of JSONL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Uuid,
    pub checkpoint_id: Uuid,
    pub inspector: String,
    pub status: InspectionStatus,
    pub recorded_at: Timestamp,

    /// The device fix captured at verification time.
    pub position: GeoReading,

    pub distance_meters: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Inspection {
    /// Build a record for a verified visit.
    #[must_use]
    pub fn new(
        visit: &VerifiedVisit,
        inspector: &str,
        status: InspectionStatus,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            checkpoint_id: visit.checkpoint_id(),
            inspector: inspector.to_string(),
            status,
            recorded_at: Timestamp::now(),
            position: visit.reading(),
            distance_meters: visit.distance_meters(),
            notes,
        }
    }
}
