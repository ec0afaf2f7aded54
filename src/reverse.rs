//! Reverse (PTR) zones.
//!
//! A records of every zone in a run are folded into one [`ReverseZoneIndex`]
//! keyed by /24 subnet. Each subnet becomes a `db.<a.b.c>.arpa` zone file.
//! PTR owner names are the host octet only, so only classful /24 reverse
//! zones are produced.

use std::fmt;
use std::fmt::Write;
use std::net::Ipv4Addr;

use hickory_proto::rr::RecordType;
use tracing::debug;

use crate::config::{DeploymentConfig, ReverseSoaConfig};
use crate::zone::ZoneDescription;

/// The first three octets of an IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet([u8; 3]);

impl Subnet {
    /// Subnet containing `addr`.
    pub fn of(addr: Ipv4Addr) -> Self {
        let [a, b, c, _] = addr.octets();
        Self([a, b, c])
    }

    /// Reverse lookup zone name, e.g. `0.0.10.in-addr.arpa` for `10.0.0`.
    pub fn arpa_zone(&self) -> String {
        let [a, b, c] = self.0;
        format!("{c}.{b}.{a}.in-addr.arpa")
    }

    /// Zone file name, e.g. `db.10.0.0.arpa`.
    pub fn file_name(&self) -> String {
        format!("db.{self}.arpa")
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}.{b}.{c}")
    }
}

/// One PTR entry: an address and the host that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrEntry {
    /// Host address.
    pub address: Ipv4Addr,
    /// Owning node name from the zone description.
    pub host: String,
}

impl PtrEntry {
    /// Octet-reversed address, e.g. `5.0.0.10` for `10.0.0.5`.
    pub fn reversed_ip(&self) -> String {
        reversed(self.address)
    }

    /// Owner name of the PTR record within its /24 zone.
    pub fn host_octet(&self) -> u8 {
        self.address.octets()[3]
    }
}

fn reversed(addr: Ipv4Addr) -> String {
    let [a, b, c, d] = addr.octets();
    format!("{d}.{c}.{b}.{a}")
}

/// PTR entries of a run, grouped by subnet in order of first encounter.
#[derive(Debug, Clone, Default)]
pub struct ReverseZoneIndex {
    subnets: Vec<(Subnet, Vec<PtrEntry>)>,
}

impl ReverseZoneIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry.
    pub fn insert(&mut self, address: Ipv4Addr, host: impl Into<String>) {
        let subnet = Subnet::of(address);
        let entry = PtrEntry {
            address,
            host: host.into(),
        };
        match self.subnets.iter_mut().find(|(s, _)| *s == subnet) {
            Some((_, entries)) => entries.push(entry),
            None => self.subnets.push((subnet, vec![entry])),
        }
    }

    /// Fold every A record below the apex of `zone` into the index.
    pub fn add_zone(&mut self, zone: &ZoneDescription) {
        for node in zone.hosts() {
            for record in node.records.iter().filter(|r| r.rtype == RecordType::A) {
                if let Some(ip) = record.ip {
                    self.insert(ip, node.name.as_str());
                }
            }
        }
        debug!(subnets = self.subnets.len(), "reverse index updated");
    }

    /// Entries for one subnet.
    pub fn get(&self, subnet: &Subnet) -> Option<&[PtrEntry]> {
        self.subnets
            .iter()
            .find(|(s, _)| s == subnet)
            .map(|(_, entries)| entries.as_slice())
    }

    /// Subnets and their entries in order of first encounter.
    pub fn iter(&self) -> impl Iterator<Item = (&Subnet, &[PtrEntry])> {
        self.subnets.iter().map(|(s, e)| (s, e.as_slice()))
    }

    /// Subnets in order of first encounter.
    pub fn subnets(&self) -> impl Iterator<Item = &Subnet> {
        self.subnets.iter().map(|(s, _)| s)
    }

    /// Number of subnets.
    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    /// True when no A record was seen.
    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }
}

/// Render the reverse zone file for one subnet.
pub fn render_reverse_zone(
    subnet: &Subnet,
    entries: &[PtrEntry],
    deployment: &DeploymentConfig,
    soa: &ReverseSoaConfig,
) -> String {
    let ns = deployment.nameserver.trim_end_matches('.');
    let internal = deployment.internal_domain.trim_end_matches('.');
    let mut out = String::new();

    let _ = writeln!(out, "$TTL {}", soa.ttl);
    let _ = writeln!(out, "@ IN SOA {ns}. {} (", deployment.hostmaster);
    let _ = writeln!(out, "\t{} ; Serial", soa.serial);
    let _ = writeln!(out, "\t{} ; Refresh", soa.refresh);
    let _ = writeln!(out, "\t{} ; Retry", soa.retry);
    let _ = writeln!(out, "\t{} ; Expire", soa.expire);
    let _ = writeln!(out, "\t{} ; Minimum TTL", soa.minimum);
    out.push_str(")\n\n");
    let _ = writeln!(out, "@ IN NS {ns}.\n");

    for entry in entries {
        let _ = writeln!(
            out,
            "{}\tIN\tPTR\t{}.{internal}.",
            entry.host_octet(),
            entry.host
        );
    }

    if Subnet::of(deployment.nameserver_ipv4) == *subnet {
        let _ = writeln!(
            out,
            "{}\tIN\tPTR\t{ns}.",
            deployment.nameserver_ipv4.octets()[3]
        );
    }

    out
}
