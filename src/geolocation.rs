//! Geolocation provider contract.
//!
//! The platform hands back at most one fix per request. Every failure mode
//! is folded into [`GeolocationError`] at this boundary.

use std::time::Duration;

use async_trait::async_trait;

use crate::geo::GeoReading;

/// Bounded wait used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Why a position fix could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation not supported")]
    Unsupported,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("timed out waiting for a position fix")]
    Timeout,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Request options passed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Source of device position fixes.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Request a single fix. Implementations should honor `options.timeout`,
    /// but callers enforce it regardless.
    ///
    /// # Errors
    ///
    /// Why no fix could be produced.
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoReading, GeolocationError>;
}

/// A provider that always reports the same fix, or reports no capability at all.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(Option<GeoReading>);

impl FixedPosition {
    #[must_use]
    pub fn new(reading: Option<GeoReading>) -> Self {
        Self(reading)
    }
}

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoReading, GeolocationError> {
        self.0.ok_or(GeolocationError::Unsupported)
    }
}
