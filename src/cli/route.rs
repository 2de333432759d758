//! Route management commands.

use patrol::model::Route;
use patrol::storage::Storage;

use super::{format::format_route, short_id};

pub(super) fn cmd_add(
    storage: &Storage,
    name: String,
    description: Option<String>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("route name must not be empty".to_string());
    }
    let route = Route::new(name, description.filter(|d| !d.is_empty()));
    storage
        .create_route(&route)
        .map_err(|e| format!("failed to create route: {e}"))?;
    println!("{}", route.id);
    Ok(())
}

pub(super) fn cmd_list(storage: &Storage, include_inactive: bool) -> Result<(), String> {
    let routes = storage
        .list_routes(include_inactive)
        .map_err(|e| format!("failed to list routes: {e}"))?;

    if routes.is_empty() {
        println!("{}", if include_inactive { "No routes" } else { "No active routes" });
        return Ok(());
    }

    for route in &routes {
        println!("{}", format_route(route));
    }
    Ok(())
}

pub(super) fn cmd_set_active(
    storage: &Storage,
    mut route: Route,
    active: bool,
) -> Result<(), String> {
    if route.is_active == active {
        eprintln!(
            "Route {} already {}",
            short_id(route.id),
            if active { "active" } else { "inactive" }
        );
        return Ok(());
    }
    route.is_active = active;
    storage
        .update_route(&route)
        .map_err(|e| format!("failed to update route: {e}"))?;
    eprintln!(
        "Route {} {}",
        short_id(route.id),
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}
