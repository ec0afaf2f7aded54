//! bind-zonegen - BIND9 zone files from zone query descriptions.
//!
//! This crate turns a simplified, line-oriented description of DNS records
//! into the files a BIND9 primary needs: one forward zone per described zone,
//! one reverse zone per /24 subnet seen across all zones, and a master
//! `named.conf.local` including all of them.
//!
//! ## Pipeline
//!
//! ```text
//! zone.txt ──▶ zone_query/<zone>.txt ──▶ ZoneDescription ──┬──▶ json/<zone>.json
//!                                                          ├──▶ forward_zone/db.<zone>
//!                                                          └──▶ ReverseZoneIndex
//!                                                                   │
//!                               reverse_zone/db.<a.b.c>.arpa ◀──────┤
//!                               named.conf.local ◀──────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bind_zonegen::{Config, ZoneGenerator};
//!
//! let config = Config::load("bind-zonegen.toml".as_ref()).unwrap();
//! let summary = ZoneGenerator::new(config).run().unwrap();
//! println!("{} forward zones", summary.forward_zones.len());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod forward;
pub mod generator;
pub mod named_conf;
pub mod record;
pub mod reverse;
pub mod telemetry;
pub mod zone;

// Re-export main types
pub use crate::config::{Config, DeploymentConfig, PathsConfig, ReverseSoaConfig, TelemetryConfig};
pub use crate::error::GeneratorError;
pub use generator::{RunSummary, ZoneGenerator};
pub use record::{Record, RecordError};
pub use reverse::ReverseZoneIndex;
pub use zone::{DuplicateNodePolicy, ZoneDescription, ZoneNode};
