//! Inspector identity resolution.
//!
//! Every inspection record names who performed it. Rather than requiring
//! `--as` on every invocation, the inspector is resolved through a chain:
//!
//! 1. `--as <inspector>`: explicit per-command override
//! 2. `PATROL_INSPECTOR` env var: per shell or device
//! 3. `inspector` in `~/.patrol/config.toml`: default for single-user installs

use std::env;

use crate::config::Config;

/// Error message shown when the inspector cannot be resolved.
pub const INSPECTOR_REQUIRED: &str = "inspector required: pass --as <inspector>, \
    set PATROL_INSPECTOR, or add `inspector = \"...\"` to ~/.patrol/config.toml";

/// Resolve the acting inspector from the tiered resolution chain.
///
/// # Errors
///
/// Returns [`INSPECTOR_REQUIRED`] when no source names an inspector.
pub fn resolve_inspector(explicit: Option<&str>, config: &Config) -> Result<String, String> {
    if let Some(name) = explicit
        && !name.is_empty()
    {
        return Ok(name.to_string());
    }

    if let Ok(name) = env::var("PATROL_INSPECTOR")
        && !name.is_empty()
    {
        return Ok(name);
    }

    config
        .inspector
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| INSPECTOR_REQUIRED.to_string())
}
