//! bind-zonegen binary entry point.

use bind_zonegen::{telemetry, Config, GeneratorError, ZoneGenerator};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Generate BIND9 zone files from zone query descriptions.
#[derive(Parser, Debug)]
#[command(name = "bind-zonegen")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML). Missing file means built-in defaults.
    #[arg(short, long, default_value = "bind-zonegen.toml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(
        config_file = %args.config.display(),
        zone_list = %config.paths.zone_list.display(),
        output_dir = %config.paths.output_dir.display(),
        "Starting bind-zonegen"
    );

    let summary = match ZoneGenerator::new(config).run() {
        Ok(summary) => summary,
        Err(e) => {
            error!("Zone generation aborted: {}", e);
            return Err(e.into());
        }
    };

    if !summary.failed.is_empty() {
        for failed in &summary.failed {
            error!(zone = %failed.zone, "{}", failed.error);
        }
        return Err(GeneratorError::ZonesFailed {
            count: summary.failed.len(),
        }
        .into());
    }

    Ok(())
}
