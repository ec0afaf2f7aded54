//! Shared test infrastructure for end-to-end generation tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use bind_zonegen::config::{Config, DeploymentConfig, PathsConfig};

// --- Constants ---

pub const TOP_LEVEL_DOMAIN: &str = "example.com";
pub const INTERNAL_DOMAIN: &str = "internal.example.com";
pub const NAMESERVER: &str = "ns1.example.com";
pub const NAMESERVER_IPV4: &str = "10.0.0.2";

/// SOA and NS lines for a zone root.
pub fn root_block() -> String {
    "\
Name=,Records=2,Children=0
SOA: ns1.example.com (serial=2024050101, refresh=3600, retry=600, expire=604800, minttl=300, ttl=86400)
NS: ns1.example.com ttl=86400
"
    .to_string()
}

// --- Workspace builder ---

/// A scratch directory laid out like a generator working directory.
pub struct TestWorkspace {
    dir: TempDir,
    zones: Vec<String>,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join("zone_query")).unwrap();
        Self {
            dir,
            zones: Vec::new(),
        }
    }

    /// Add a zone to the zone list with the given description.
    pub fn add_zone(&mut self, zone: &str, description: &str) -> &mut Self {
        fs::write(self.query_path(zone), description).unwrap();
        self.zones.push(zone.to_string());
        self
    }

    /// Add a zone to the zone list without writing its description.
    pub fn add_zone_without_file(&mut self, zone: &str) -> &mut Self {
        self.zones.push(zone.to_string());
        self
    }

    /// Write the zone list and return a config pointing into the workspace.
    pub fn config(&self) -> Config {
        fs::write(self.root().join("zone.txt"), self.zones.join("\n") + "\n").unwrap();
        Config {
            paths: PathsConfig {
                zone_list: self.root().join("zone.txt"),
                query_dir: self.root().join("zone_query"),
                output_dir: self.out_dir(),
                ..PathsConfig::default()
            },
            deployment: DeploymentConfig {
                top_level_domain: TOP_LEVEL_DOMAIN.to_string(),
                internal_domain: INTERNAL_DOMAIN.to_string(),
                nameserver: NAMESERVER.to_string(),
                hostmaster: "hostmaster.example.com.".to_string(),
                nameserver_ipv4: NAMESERVER_IPV4.parse().unwrap(),
            },
            ..Config::default()
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root().join("out")
    }

    fn query_path(&self, zone: &str) -> PathBuf {
        self.root().join("zone_query").join(format!("{zone}.txt"))
    }

    pub fn forward_path(&self, zone: &str) -> PathBuf {
        self.out_dir().join("forward_zone").join(format!("db.{zone}"))
    }

    pub fn reverse_path(&self, subnet: &str) -> PathBuf {
        self.out_dir()
            .join("reverse_zone")
            .join(format!("db.{subnet}.arpa"))
    }

    pub fn json_path(&self, zone: &str) -> PathBuf {
        self.out_dir().join("json").join(format!("{zone}.json"))
    }

    pub fn named_conf_path(&self) -> PathBuf {
        self.out_dir().join("named.conf.local")
    }
}

// --- Assertions ---

/// Read a generated file, failing the test with its path if absent.
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// Assert `haystack` contains each line of `lines`, in order.
pub fn assert_lines_in_order(haystack: &str, lines: &[&str]) {
    let mut rest = haystack;
    for line in lines {
        match rest.find(line) {
            Some(pos) => rest = &rest[pos + line.len()..],
            None => panic!("expected line {line:?} (in order) in:\n{haystack}"),
        }
    }
}
