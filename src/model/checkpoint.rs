//! Checkpoint: a fixed place an inspector must prove they visited.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::geo::GeoReading;

/// Tolerance applied when a checkpoint has no usable radius.
pub const DEFAULT_RADIUS_METERS: f64 = 20.0;

/// Reference data for one checkpoint on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: Uuid,

    /// Route the checkpoint belongs to.
    pub route_id: Uuid,

    pub name: String,

    /// Position within the route. Display ordering only.
    pub sequence_order: i32,

    /// Secret token printed in the checkpoint's code.
    /// Compared byte-for-byte against scanned text.
    pub qr_code_value: String,

    pub latitude: f64,
    pub longitude: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<f64>,
}

impl Checkpoint {
    /// Exact, case-sensitive token comparison. No trimming or normalization.
    #[must_use]
    pub fn matches_token(&self, scanned: &str) -> bool {
        self.qr_code_value == scanned
    }

    /// Reference coordinates.
    #[must_use]
    pub fn position(&self) -> GeoReading {
        GeoReading::new(self.latitude, self.longitude)
    }

    /// The tolerance actually used for proximity checks.
    #[must_use]
    pub fn radius(&self) -> f64 {
        effective_radius(self.radius_meters)
    }
}

/// Resolve a configured radius to the tolerance in force.
///
/// Absent, zero, negative, and NaN radii all become [`DEFAULT_RADIUS_METERS`].
/// A configured zero therefore does not mean "exact position required".
#[must_use]
pub fn effective_radius(configured: Option<f64>) -> f64 {
    match configured {
        Some(radius) if radius > 0.0 => radius,
        _ => DEFAULT_RADIUS_METERS,
    }
}

/// A fresh random token for a new checkpoint.
#[must_use]
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// Short, non-reversible fingerprint of a token, safe to log.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..4])
}
