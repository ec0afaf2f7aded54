//! Run orchestration: zone list in, zone files and master config out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span};

use crate::config::Config;
use crate::error::GeneratorError;
use crate::forward::render_forward_zone;
use crate::named_conf::{forward_file_name, render_named_conf, FORWARD_DIR, REVERSE_DIR};
use crate::reverse::{render_reverse_zone, ReverseZoneIndex};
use crate::zone::ZoneDescription;

/// Directory of JSON snapshots under the output directory.
pub const JSON_DIR: &str = "json";

/// A zone that was skipped because of a zone-scoped error.
#[derive(Debug)]
pub struct FailedZone {
    /// Zone name from the zone list.
    pub zone: String,
    /// Why it failed.
    pub error: GeneratorError,
}

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Zones whose forward zone file was written, in zone list order.
    pub forward_zones: Vec<String>,
    /// Number of reverse zone files written.
    pub reverse_zones: usize,
    /// Zones skipped because their description was invalid.
    pub failed: Vec<FailedZone>,
}

/// Generates every zone file of a deployment in one pass.
pub struct ZoneGenerator {
    config: Config,
}

impl ZoneGenerator {
    /// Create a generator with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline once.
    ///
    /// A missing input file or an IO failure aborts the run; files written
    /// for earlier zones are left in place. A zone with an invalid
    /// description is skipped, recorded in the summary and left out of the
    /// master configuration.
    pub fn run(&self) -> Result<RunSummary, GeneratorError> {
        let paths = &self.config.paths;
        info!(
            zone_list = %paths.zone_list.display(),
            query_dir = %paths.query_dir.display(),
            output_dir = %paths.output_dir.display(),
            "Starting zone generation"
        );

        let zones = read_zone_list(&paths.zone_list)?;
        info!(zones = zones.len(), "Loaded zone list");

        for dir in [FORWARD_DIR, REVERSE_DIR, JSON_DIR] {
            let path = paths.output_dir.join(dir);
            fs::create_dir_all(&path).map_err(|e| GeneratorError::io(&path, e))?;
        }

        let mut index = ReverseZoneIndex::new();
        let mut summary = RunSummary::default();

        for zone in zones {
            let _span = info_span!("zone", zone = %zone).entered();
            match self.generate_zone(&zone, &mut index) {
                Ok(()) => summary.forward_zones.push(zone),
                Err(e) if e.is_zone_scoped() => {
                    error!(error = %e, "Skipping zone");
                    summary.failed.push(FailedZone { zone, error: e });
                }
                Err(e) => return Err(e),
            }
        }

        for (subnet, entries) in index.iter() {
            let path = paths
                .output_dir
                .join(REVERSE_DIR)
                .join(subnet.file_name());
            let contents = render_reverse_zone(
                subnet,
                entries,
                &self.config.deployment,
                &self.config.reverse_soa,
            );
            write_file(&path, &contents)?;
            debug!(subnet = %subnet, ptr_records = entries.len(), path = %path.display(), "Wrote reverse zone");
        }
        summary.reverse_zones = index.len();

        let master = paths.output_dir.join(&paths.master_config);
        let contents = render_named_conf(&summary.forward_zones, &index, &paths.bind_dir);
        write_file(&master, &contents)?;
        info!(path = %master.display(), "BIND configuration file has been generated");

        info!(
            forward_zones = summary.forward_zones.len(),
            reverse_zones = summary.reverse_zones,
            failed = summary.failed.len(),
            "Zone generation complete"
        );

        Ok(summary)
    }

    fn generate_zone(&self, zone: &str, index: &mut ReverseZoneIndex) -> Result<(), GeneratorError> {
        let paths = &self.config.paths;

        let query = paths.query_dir.join(format!("{zone}.txt"));
        let input = read_input(&query)?;
        let description = ZoneDescription::parse(&input, self.config.parser.duplicate_nodes)?;
        debug!(nodes = description.len(), "Parsed zone description");

        let snapshot = paths
            .output_dir
            .join(JSON_DIR)
            .join(format!("{zone}.json"));
        write_file(&snapshot, &description.to_json()?)?;

        let forward = render_forward_zone(zone, &description, &self.config.deployment)?;
        let path = paths
            .output_dir
            .join(FORWARD_DIR)
            .join(forward_file_name(zone));
        write_file(&path, &forward)?;
        info!(path = %path.display(), "Wrote forward zone");

        index.add_zone(&description);
        Ok(())
    }
}

/// Read the master zone list: one zone name per non-blank line.
pub fn read_zone_list(path: &Path) -> Result<Vec<String>, GeneratorError> {
    Ok(read_input(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn read_input(path: &Path) -> Result<String, GeneratorError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => GeneratorError::MissingInput {
            path: PathBuf::from(path),
        },
        _ => GeneratorError::io(path, e),
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), GeneratorError> {
    fs::write(path, contents).map_err(|e| GeneratorError::io(path, e))
}
