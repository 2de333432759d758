//! Checkpoint management commands.

use std::collections::HashMap;

use uuid::Uuid;

use patrol::geo::GeoReading;
use patrol::model::{Checkpoint, Route, generate_token};
use patrol::storage::Storage;

use super::{format::format_checkpoint, short_id};

pub(super) fn cmd_add(
    storage: &Storage,
    route: &Route,
    name: String,
    order: i32,
    position: GeoReading,
    radius: Option<f64>,
    token: Option<String>,
) -> Result<(), String> {
    let radius = check_radius(radius)?;

    let token = match token {
        Some(t) if t.is_empty() => return Err("token must not be empty".to_string()),
        Some(t) => t,
        None => generate_token(),
    };

    let checkpoint = Checkpoint {
        id: Uuid::new_v4(),
        route_id: route.id,
        name,
        sequence_order: order,
        qr_code_value: token,
        latitude: position.latitude,
        longitude: position.longitude,
        radius_meters: radius,
    };

    storage
        .create_checkpoint(&checkpoint)
        .map_err(|e| format!("failed to create checkpoint: {e}"))?;

    println!("{}", checkpoint.id);
    println!("{}", checkpoint.qr_code_value);
    Ok(())
}

/// Zero is accepted and stored; it means the default tolerance.
fn check_radius(radius: Option<f64>) -> Result<Option<f64>, String> {
    match radius {
        Some(r) if !r.is_finite() || r < 0.0 => Err(format!(
            "radius must be a non-negative number of meters, got {r}"
        )),
        other => Ok(other),
    }
}

/// List checkpoints grouped by route, routes in name order.
pub(super) fn cmd_list(storage: &Storage, route: Option<&Route>) -> Result<(), String> {
    let checkpoints = storage
        .list_checkpoints(route.map(|r| r.id))
        .map_err(|e| format!("failed to list checkpoints: {e}"))?;

    if checkpoints.is_empty() {
        println!("No checkpoints");
        return Ok(());
    }

    let routes = match route {
        Some(route) => vec![route.clone()],
        None => storage
            .list_routes(true)
            .map_err(|e| format!("failed to list routes: {e}"))?,
    };

    let mut by_route: HashMap<Uuid, Vec<&Checkpoint>> = HashMap::new();
    for checkpoint in &checkpoints {
        by_route.entry(checkpoint.route_id).or_default().push(checkpoint);
    }

    for route in &routes {
        let Some(members) = by_route.get(&route.id) else {
            continue;
        };
        for checkpoint in members {
            println!("{}", format_checkpoint(checkpoint, &route.name));
        }
    }
    Ok(())
}

pub(super) fn cmd_remove(storage: &Storage, checkpoint: &Checkpoint) -> Result<(), String> {
    storage
        .delete_checkpoint(checkpoint.id)
        .map_err(|e| format!("failed to remove checkpoint: {e}"))?;
    eprintln!("Checkpoint {} removed", short_id(checkpoint.id));
    Ok(())
}
