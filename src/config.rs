//! Patrol configuration.
//!
//! Loaded from `~/.patrol/config.toml`. Every key is optional; a missing
//! file means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geolocation::PositionOptions;
use crate::scan::ScanHints;

/// Patrol configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Default inspector for inspection records.
    /// Used when `--as` and `PATROL_INSPECTOR` are absent.
    pub inspector: Option<String>,

    /// Bounded wait for a position fix.
    pub geolocation_timeout_ms: u64,

    /// Ask the platform for its most accurate fix.
    pub high_accuracy: bool,

    /// Decoder frame rate hint.
    pub frame_rate: u32,

    /// Requested decode region side length, in pixels.
    pub scan_box: u32,

    /// Width available for the camera preview, in pixels.
    pub display_width: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inspector: None,
            geolocation_timeout_ms: 5000,
            high_accuracy: true,
            frame_rate: 10,
            scan_box: 250,
            display_width: 300,
        }
    }
}

impl Config {
    /// Load config from `~/.patrol/config.toml`, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns a message naming the path if the file exists but cannot be read
    /// or parsed.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns a message naming the path if the file exists but cannot be read
    /// or parsed.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.patrol/config.toml`.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".patrol").join("config.toml"))
    }

    #[must_use]
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.geolocation_timeout_ms),
        }
    }

    #[must_use]
    pub fn scan_hints(&self) -> ScanHints {
        ScanHints {
            frame_rate: self.frame_rate,
            scan_box: self.scan_box,
            display_width: Some(self.display_width),
        }
    }
}
