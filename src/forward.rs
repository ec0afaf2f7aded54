//! Forward zone rendering.

use std::fmt::Write;

use hickory_proto::rr::RecordType;
use tracing::{debug, warn};

use crate::config::DeploymentConfig;
use crate::error::GeneratorError;
use crate::record::{Record, SOA_TIMERS};
use crate::zone::ZoneDescription;

/// Records of one type bucketed by TTL, buckets in first-seen order.
#[derive(Debug, Default)]
struct TtlGroups<'a> {
    groups: Vec<(&'a str, Vec<(&'a str, String)>)>,
}

impl<'a> TtlGroups<'a> {
    fn push(&mut self, ttl: &'a str, owner: &'a str, value: String) {
        match self.groups.iter_mut().find(|(t, _)| *t == ttl) {
            Some((_, entries)) => entries.push((owner, value)),
            None => self.groups.push((ttl, vec![(owner, value)])),
        }
    }

    fn render(&self, out: &mut String, rtype: RecordType) {
        let _ = writeln!(out, "; {rtype} Records");
        for (ttl, entries) in &self.groups {
            let _ = writeln!(out, "; TTL {ttl}");
            for (owner, value) in entries {
                let _ = writeln!(out, "{owner}\t{ttl}\tIN {rtype}\t{value}");
            }
            out.push('\n');
        }
    }
}

/// Whether `zone` is the top-level domain or one of its subdomains.
pub fn within_domain(zone: &str, domain: &str) -> bool {
    let zone = zone.trim_end_matches('.');
    let domain = domain.trim_end_matches('.');
    zone.eq_ignore_ascii_case(domain)
        || (zone.len() > domain.len()
            && zone.as_bytes()[zone.len() - domain.len() - 1] == b'.'
            && zone[zone.len() - domain.len()..].eq_ignore_ascii_case(domain))
}

fn find_soa<'a>(zone_name: &str, zone: &'a ZoneDescription) -> Result<&'a Record, GeneratorError> {
    let missing = || GeneratorError::MissingSoa {
        zone: zone_name.to_string(),
    };
    let root = zone.root().ok_or_else(missing)?;
    let mut soas = root.records.iter().filter(|r| r.rtype == RecordType::SOA);
    let soa = soas.next().ok_or_else(missing)?;
    let extra = soas.count();
    if extra > 0 {
        warn!(zone = zone_name, extra, "multiple SOA records, using the first");
    }
    Ok(soa)
}

/// Render the BIND forward zone file for `zone_name`.
pub fn render_forward_zone(
    zone_name: &str,
    zone: &ZoneDescription,
    deployment: &DeploymentConfig,
) -> Result<String, GeneratorError> {
    let soa = find_soa(zone_name, zone)?;
    let ns = deployment.nameserver.trim_end_matches('.');
    let mut out = String::new();

    // `validate` guarantees the SOA attributes are present.
    let _ = writeln!(out, "$TTL {}", soa.ttl().unwrap_or_default());
    let _ = writeln!(out, "@ IN SOA {ns}. {} (", deployment.hostmaster);
    for field in SOA_TIMERS {
        let _ = writeln!(
            out,
            "\t{}\t; {}",
            soa.attr(field).unwrap_or_default(),
            capitalize(field)
        );
    }
    out.push_str(")\n\n");

    let _ = writeln!(out, "@\tIN\tNS\t{ns}.\n");

    if within_domain(zone_name, &deployment.top_level_domain) {
        let _ = writeln!(out, "{ns}.\tIN\tA\t{}\n", deployment.nameserver_ipv4);
    }

    if let Some(root) = zone.root() {
        for record in root.records.iter().filter(|r| r.rtype == RecordType::NS) {
            let _ = writeln!(
                out,
                "@\t{}\tIN NS\t{}",
                record.ttl().unwrap_or_default(),
                record.domain.as_deref().unwrap_or_default()
            );
        }
    }
    out.push('\n');

    let mut a_records = TtlGroups::default();
    let mut cname_records = TtlGroups::default();
    for node in zone.hosts() {
        for record in &node.records {
            let ttl = record.ttl().unwrap_or_default();
            match record.rtype {
                RecordType::A => {
                    if let Some(ip) = record.ip {
                        a_records.push(ttl, &node.name, ip.to_string());
                    }
                }
                RecordType::CNAME => {
                    if let Some(target) = &record.domain {
                        cname_records.push(ttl, &node.name, target.clone());
                    }
                }
                other => {
                    debug!(zone = zone_name, node = %node.name, rtype = %other, "record type not rendered");
                }
            }
        }
    }
    a_records.render(&mut out, RecordType::A);
    cname_records.render(&mut out, RecordType::CNAME);

    Ok(out)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
