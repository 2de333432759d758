mod cli;

use std::{io, process};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use patrol::{config::Config, storage::Storage};

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let root = Storage::default_root().unwrap_or_else(|| {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    });

    let storage = match Storage::new(root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            process::exit(1);
        }
    };

    let result = runtime.block_on(cli::run(cli, &config, &storage));
    // A standard-input read may still be parked on the blocking pool.
    runtime.shutdown_background();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays machine-readable.
/// `PATROL_LOG` takes an `EnvFilter` directive and wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "patrol=debug" } else { "patrol=warn" };
    let filter = EnvFilter::try_from_env("PATROL_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
