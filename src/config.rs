//! Configuration types for bind-zonegen.
//!
//! Every field has a default, so the generator runs without a config file.
//! Values are layered: defaults, then the optional TOML file, then
//! `ZONEGEN__<SECTION>__<FIELD>` environment variables.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use crate::error::GeneratorError;
use crate::zone::DuplicateNodePolicy;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ZONEGEN";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Deployment-wide identity of the primary nameserver.
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Synthetic SOA values for generated reverse zones.
    #[serde(default)]
    pub reverse_soa: ReverseSoaConfig,

    /// Zone query parser behaviour.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Load configuration from an optional TOML file and the environment.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let config = ::config::Config::builder()
            .add_source(
                ::config::File::from(path.to_path_buf())
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Master zone list, one zone name per line.
    #[serde(default = "default_zone_list")]
    pub zone_list: PathBuf,

    /// Directory holding `<zone>.txt` query files.
    #[serde(default = "default_query_dir")]
    pub query_dir: PathBuf,

    /// Root for `forward_zone/`, `reverse_zone/` and `json/`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Master configuration file, relative to `output_dir` unless absolute.
    #[serde(default = "default_master_config")]
    pub master_config: PathBuf,

    /// Directory BIND reads zone files from, as written into the master config.
    #[serde(default = "default_bind_dir")]
    pub bind_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            zone_list: default_zone_list(),
            query_dir: default_query_dir(),
            output_dir: default_output_dir(),
            master_config: default_master_config(),
            bind_dir: default_bind_dir(),
        }
    }
}

fn default_zone_list() -> PathBuf {
    PathBuf::from("zone.txt")
}

fn default_query_dir() -> PathBuf {
    PathBuf::from("zone_query")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_master_config() -> PathBuf {
    PathBuf::from("named.conf.local")
}

fn default_bind_dir() -> String {
    "/etc/bind".to_string()
}

/// Identity of the primary nameserver, shared by every generated zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Zones equal to or below this domain get the nameserver's A record.
    #[serde(default = "default_top_level_domain")]
    pub top_level_domain: String,

    /// Suffix appended to host names in PTR targets.
    #[serde(default = "default_internal_domain")]
    pub internal_domain: String,

    /// Nameserver FQDN, without trailing dot (e.g. "ns1.example.com").
    #[serde(default = "default_nameserver")]
    pub nameserver: String,

    /// Hostmaster mailbox in DNS format (e.g. "hostmaster.example.com.").
    #[serde(default = "default_hostmaster")]
    pub hostmaster: String,

    /// Nameserver IPv4 address.
    #[serde(default = "default_nameserver_ipv4")]
    pub nameserver_ipv4: Ipv4Addr,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            top_level_domain: default_top_level_domain(),
            internal_domain: default_internal_domain(),
            nameserver: default_nameserver(),
            hostmaster: default_hostmaster(),
            nameserver_ipv4: default_nameserver_ipv4(),
        }
    }
}

fn default_top_level_domain() -> String {
    "example.com".to_string()
}

fn default_internal_domain() -> String {
    "internal.example.com".to_string()
}

fn default_nameserver() -> String {
    "mstbind.example.com".to_string()
}

fn default_hostmaster() -> String {
    "hostmaster.example.com.".to_string()
}

fn default_nameserver_ipv4() -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 0, 1)
}

/// SOA values for generated reverse zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseSoaConfig {
    /// `$TTL` of the reverse zone in seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Zone serial.
    #[serde(default = "default_serial")]
    pub serial: u32,

    /// Refresh interval in seconds.
    #[serde(default = "default_refresh")]
    pub refresh: u32,

    /// Retry interval in seconds.
    #[serde(default = "default_retry")]
    pub retry: u32,

    /// Expire time in seconds.
    #[serde(default = "default_expire")]
    pub expire: u32,

    /// Minimum TTL in seconds.
    #[serde(default = "default_minimum")]
    pub minimum: u32,
}

fn default_ttl() -> u32 {
    86400
}

fn default_serial() -> u32 {
    1
}

fn default_refresh() -> u32 {
    604800
}

fn default_retry() -> u32 {
    86400
}

fn default_expire() -> u32 {
    2419200
}

fn default_minimum() -> u32 {
    86400
}

impl Default for ReverseSoaConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            serial: default_serial(),
            refresh: default_refresh(),
            retry: default_retry(),
            expire: default_expire(),
            minimum: default_minimum(),
        }
    }
}

/// Zone query parser behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Handling of repeated `Name=` headers within one zone.
    #[serde(default)]
    pub duplicate_nodes: DuplicateNodePolicy,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "debug", "bind_zonegen=debug,warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
