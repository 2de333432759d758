//! Verification verdicts.

use uuid::Uuid;

use crate::geo::GeoReading;
use crate::geolocation::GeolocationError;

/// Outcome of one verification attempt.
///
/// Only variants that measured a distance carry one.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Scanned text is not this checkpoint's token. Location was never requested.
    TokenMismatch,

    /// No position fix could be obtained.
    LocationUnavailable { cause: GeolocationError },

    /// Token matched but the device is farther than the tolerance allows.
    OutOfRange { distance_meters: f64 },

    /// Token matched and the device is within tolerance.
    Verified(VerifiedVisit),
}

/// Proof that an inspector stood at a checkpoint with its token in hand.
///
/// Only the verification engine constructs these; an inspection record
/// can only be built from one.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedVisit {
    checkpoint_id: Uuid,
    reading: GeoReading,
    distance_meters: f64,
}

impl VerifiedVisit {
    pub(crate) fn new(checkpoint_id: Uuid, reading: GeoReading, distance_meters: f64) -> Self {
        Self {
            checkpoint_id,
            reading,
            distance_meters,
        }
    }

    #[must_use]
    pub fn checkpoint_id(&self) -> Uuid {
        self.checkpoint_id
    }

    /// The device fix that passed the proximity check.
    #[must_use]
    pub fn reading(&self) -> GeoReading {
        self.reading
    }

    #[must_use]
    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }
}

/// A verdict together with the tolerance it was judged against.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub verdict: Verdict,
    pub radius_meters: f64,
}

impl Verification {
    /// Measured distance, present whenever a position fix was obtained.
    #[must_use]
    pub fn distance_meters(&self) -> Option<f64> {
        match &self.verdict {
            Verdict::OutOfRange { distance_meters } => Some(*distance_meters),
            Verdict::Verified(visit) => Some(visit.distance_meters),
            Verdict::TokenMismatch | Verdict::LocationUnavailable { .. } => None,
        }
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self.verdict, Verdict::Verified(_))
    }

    /// The verified visit, if this attempt passed.
    #[must_use]
    pub fn visit(&self) -> Option<&VerifiedVisit> {
        match &self.verdict {
            Verdict::Verified(visit) => Some(visit),
            _ => None,
        }
    }
}
