//! Output formatting for CLI display.

use patrol::model::{Checkpoint, Inspection, InspectionStatus, Route, Verdict, Verification};

use super::short_id;

/// The message shown to the inspector for a verdict.
pub(super) fn format_verdict(checkpoint: &Checkpoint, verification: &Verification) -> String {
    let radius = verification.radius_meters;
    match &verification.verdict {
        Verdict::TokenMismatch => {
            format!("Invalid QR code for {}. Scan again.", checkpoint.name)
        }
        Verdict::LocationUnavailable { cause } => {
            format!("Cannot verify location: {cause}.")
        }
        Verdict::OutOfRange { distance_meters } => format!(
            "Too far: you are {distance_meters:.1}m away (max {radius}m). Move closer."
        ),
        Verdict::Verified(visit) => format!(
            "Checkpoint {} verified ({:.1}m away, max {radius}m).",
            checkpoint.name,
            visit.distance_meters()
        ),
    }
}

/// One line per route: short ID, name, status, description.
pub(super) fn format_route(route: &Route) -> String {
    let mut line = format!("{}  {}", short_id(route.id), route.name);
    if !route.is_active {
        line.push_str("  [inactive]");
    }
    line.push_str("  : ");
    line.push_str(route.description.as_deref().unwrap_or("No description"));
    line
}

/// One line per checkpoint: order, short ID, route, name, position, radius.
pub(super) fn format_checkpoint(checkpoint: &Checkpoint, route_name: &str) -> String {
    format!(
        "#{:<3} {}  [{route_name}] {}  ({:.6}, {:.6})  r={}m",
        checkpoint.sequence_order,
        short_id(checkpoint.id),
        checkpoint.name,
        checkpoint.latitude,
        checkpoint.longitude,
        checkpoint.radius()
    )
}

/// One line per inspection. `checkpoint_name` is `None` once the checkpoint is removed.
pub(super) fn format_inspection(inspection: &Inspection, checkpoint_name: Option<&str>) -> String {
    let status = match inspection.status {
        InspectionStatus::Completed => "completed",
        InspectionStatus::Flagged => "flagged",
    };
    let checkpoint = checkpoint_name.map_or_else(
        || format!("checkpoint {}", short_id(inspection.checkpoint_id)),
        str::to_string,
    );
    let mut line = format!(
        "{}  {}  {checkpoint}  [{status}] by {}  {:.1}m",
        inspection.recorded_at,
        short_id(inspection.id),
        inspection.inspector,
        inspection.distance_meters,
    );
    if let Some(notes) = &inspection.notes {
        line.push_str("  : ");
        line.push_str(notes);
    }
    line
}
