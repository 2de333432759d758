//! CLI interface for patrol.
//!
//! A thin driver over the verification core. Each subcommand is
//! non-interactive except `scan`, which reads codes from standard input.
//!
//! Checkpoint references take a full UUID or an unambiguous prefix. Route
//! references also accept the route's exact name.

mod checkpoint;
mod format;
mod route;
mod visit;

use std::collections::HashMap;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use patrol::config::Config;
use patrol::geo::{GeoReading, haversine_distance};
use patrol::model::{Checkpoint, InspectionStatus, Route};
use patrol::storage::Storage;

use format::format_inspection;

/// Patrol: prove you were there.
#[derive(Debug, Parser)]
#[command(name = "patrol", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Log more detail to stderr. `PATROL_LOG` overrides this.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: walking a route
  1. patrol route add 'North fence' --description 'Outer perimeter'
  2. patrol checkpoint add --route 'North fence' --name 'Gate 3' --order 1 --lat 40.0 --lon -74.0
     → prints the checkpoint ID and its token (print the token as a QR code)
  3. patrol route list
  4. patrol checkpoint list --route 'North fence'
  5. patrol scan 6f1c --lat 40.00001 --lon -74.0 --as ana
     → reads scanned codes from standard input until one verifies
  6. patrol inspections --checkpoint 6f1c

Single-shot verification:
  patrol verify 6f1c --token <scanned> --lat 40.00001 --lon -74.0 --as ana";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage routes.
    Route {
        #[command(subcommand)]
        command: RouteCommand,
    },

    /// Manage checkpoints.
    Checkpoint {
        #[command(subcommand)]
        command: CheckpointCommand,
    },

    /// Verify one scanned token against a checkpoint.
    ///
    /// On success an inspection is recorded and its ID printed.
    /// Any other verdict exits non-zero.
    Verify {
        /// Checkpoint ID or unambiguous prefix.
        checkpoint: String,

        /// The decoded text.
        #[arg(long)]
        token: String,

        #[command(flatten)]
        position: PositionArgs,

        #[command(flatten)]
        submit: SubmitArgs,
    },

    /// Scan codes from standard input until one verifies.
    ///
    /// Each non-empty line is one decoded code. Failed attempts re-arm
    /// the scanner. End of input aborts.
    Scan {
        /// Checkpoint ID or unambiguous prefix.
        checkpoint: String,

        #[command(flatten)]
        position: PositionArgs,

        #[command(flatten)]
        submit: SubmitArgs,
    },

    /// List recorded inspections.
    Inspections {
        /// Only inspections of this checkpoint.
        #[arg(long)]
        checkpoint: Option<String>,
    },

    /// Great-circle distance in meters between two points.
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
}

#[derive(Debug, Subcommand)]
pub enum RouteCommand {
    /// Add an active route. Prints its ID.
    Add {
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// List active routes by name.
    List {
        /// Include inactive routes.
        #[arg(long)]
        all: bool,
    },

    /// Make a route available for patrols again.
    Activate {
        /// Route ID, prefix, or exact name.
        route: String,
    },

    /// Hide a route from patrols. Its checkpoints and inspections are kept.
    Deactivate {
        /// Route ID, prefix, or exact name.
        route: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CheckpointCommand {
    /// Add a checkpoint. Prints its ID and token.
    Add {
        /// Route ID, prefix, or exact name.
        #[arg(long)]
        route: String,

        #[arg(long)]
        name: String,

        /// Position within the route.
        #[arg(long, default_value_t = 1)]
        order: i32,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Allowed distance in meters. Zero or omitted means 20.
        #[arg(long)]
        radius: Option<f64>,

        /// Token to embed in the code. Generated when omitted.
        #[arg(long)]
        token: Option<String>,
    },

    /// List checkpoints in route order.
    List {
        /// Route ID, prefix, or exact name.
        #[arg(long)]
        route: Option<String>,
    },

    /// Remove a checkpoint. Its inspections are kept.
    Remove {
        /// Checkpoint ID or unambiguous prefix.
        checkpoint: String,
    },
}

/// Simulated device position.
#[derive(Debug, Clone, Args)]
pub struct PositionArgs {
    /// Device latitude. Omit both to simulate a device without geolocation.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Device longitude.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl PositionArgs {
    fn reading(&self) -> Result<Option<GeoReading>, String> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => check_position(GeoReading::new(lat, lon)).map(Some),
            _ => Ok(None),
        }
    }
}

/// Reject coordinates outside the WGS84 ranges, including NaN.
fn check_position(position: GeoReading) -> Result<GeoReading, String> {
    if (-90.0..=90.0).contains(&position.latitude)
        && (-180.0..=180.0).contains(&position.longitude)
    {
        Ok(position)
    } else {
        Err(format!(
            "coordinates out of range: ({}, {})",
            position.latitude, position.longitude
        ))
    }
}

/// What to record once a visit verifies.
#[derive(Debug, Clone, Args)]
pub struct SubmitArgs {
    /// Inspector performing the visit.
    #[arg(long = "as")]
    inspector: Option<String>,

    /// Free-form observations.
    #[arg(long)]
    notes: Option<String>,

    /// Flag the checkpoint for follow-up.
    #[arg(long)]
    flag: bool,
}

impl SubmitArgs {
    fn status(&self) -> InspectionStatus {
        if self.flag {
            InspectionStatus::Flagged
        } else {
            InspectionStatus::Completed
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub async fn run(cli: Cli, config: &Config, storage: &Storage) -> Result<(), String> {
    match cli.command {
        Command::Route { command } => match command {
            RouteCommand::Add { name, description } => route::cmd_add(storage, name, description),
            RouteCommand::List { all } => route::cmd_list(storage, all),
            RouteCommand::Activate { route } => {
                let route = resolve_route(storage, &route)?;
                route::cmd_set_active(storage, route, true)
            }
            RouteCommand::Deactivate { route } => {
                let route = resolve_route(storage, &route)?;
                route::cmd_set_active(storage, route, false)
            }
        },
        Command::Checkpoint { command } => match command {
            CheckpointCommand::Add {
                route,
                name,
                order,
                lat,
                lon,
                radius,
                token,
            } => {
                let route = resolve_route(storage, &route)?;
                checkpoint::cmd_add(
                    storage,
                    &route,
                    name,
                    order,
                    check_position(GeoReading::new(lat, lon))?,
                    radius,
                    token,
                )
            }
            CheckpointCommand::List { route } => {
                let route = match route {
                    Some(reference) => Some(resolve_route(storage, &reference)?),
                    None => None,
                };
                checkpoint::cmd_list(storage, route.as_ref())
            }
            CheckpointCommand::Remove { checkpoint } => {
                let checkpoint = resolve_checkpoint(storage, &checkpoint)?;
                checkpoint::cmd_remove(storage, &checkpoint)
            }
        },
        Command::Verify {
            checkpoint,
            token,
            position,
            submit,
        } => {
            let checkpoint = resolve_checkpoint(storage, &checkpoint)?;
            let position = position.reading()?;
            visit::cmd_verify(config, storage, &checkpoint, &token, position, &submit).await
        }
        Command::Scan {
            checkpoint,
            position,
            submit,
        } => {
            let checkpoint = resolve_checkpoint(storage, &checkpoint)?;
            let position = position.reading()?;
            visit::cmd_scan(config, storage, &checkpoint, position, &submit).await
        }
        Command::Inspections { checkpoint } => {
            let checkpoint_id = match checkpoint {
                Some(reference) => Some(resolve_checkpoint(storage, &reference)?.id),
                None => None,
            };
            cmd_inspections(storage, checkpoint_id)
        }
        Command::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let meters =
                haversine_distance(GeoReading::new(lat1, lon1), GeoReading::new(lat2, lon2));
            println!("{meters:.1}");
            Ok(())
        }
    }
}

fn cmd_inspections(storage: &Storage, checkpoint: Option<Uuid>) -> Result<(), String> {
    let inspections = storage
        .list_inspections(checkpoint)
        .map_err(|e| format!("failed to list inspections: {e}"))?;

    if inspections.is_empty() {
        println!("No inspections");
        return Ok(());
    }

    // Removed checkpoints keep their inspections; those fall back to a short ID.
    let names: HashMap<Uuid, String> = storage
        .list_checkpoints(None)
        .map_err(|e| format!("failed to list checkpoints: {e}"))?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    for inspection in &inspections {
        let name = names.get(&inspection.checkpoint_id).map(String::as_str);
        println!("{}", format_inspection(inspection, name));
    }
    Ok(())
}

/// Resolve a route reference (full UUID, exact name, or unambiguous ID prefix).
fn resolve_route(storage: &Storage, reference: &str) -> Result<Route, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_route(id)
            .map_err(|e| format!("route not found: {e}"));
    }

    let routes = storage
        .list_routes(true)
        .map_err(|e| format!("failed to list routes: {e}"))?;

    let named: Vec<&Route> = routes.iter().filter(|r| r.name == reference).collect();
    let matches: Vec<&Route> = if named.is_empty() {
        routes
            .iter()
            .filter(|r| r.id.to_string().starts_with(reference))
            .collect()
    } else {
        named
    };

    match matches.as_slice() {
        [] => Err(format!("no route matching '{reference}'")),
        [only] => Ok((*only).clone()),
        many => {
            let ids: Vec<String> = many.iter().map(|r| short_id(r.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous; matches {} routes: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}

/// Resolve a checkpoint reference (full UUID or unambiguous prefix) to a checkpoint.
fn resolve_checkpoint(storage: &Storage, reference: &str) -> Result<Checkpoint, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_checkpoint(id)
            .map_err(|e| format!("checkpoint not found: {e}"));
    }

    let checkpoints = storage
        .list_checkpoints(None)
        .map_err(|e| format!("failed to list checkpoints: {e}"))?;

    let matches: Vec<&Checkpoint> = checkpoints
        .iter()
        .filter(|c| c.id.to_string().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no checkpoint matching '{reference}'")),
        [only] => Ok((*only).clone()),
        many => {
            let ids: Vec<String> = many.iter().map(|c| short_id(c.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous; matches {} checkpoints: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
