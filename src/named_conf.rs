//! Master zone-inclusion file (`named.conf.local`).

use std::fmt::Write;

use crate::reverse::ReverseZoneIndex;

/// Directory of forward zone files, under the output and BIND directories.
pub const FORWARD_DIR: &str = "forward_zone";

/// Directory of reverse zone files, under the output and BIND directories.
pub const REVERSE_DIR: &str = "reverse_zone";

/// Forward zone file name.
pub fn forward_file_name(zone: &str) -> String {
    format!("db.{zone}")
}

fn write_zone_block(out: &mut String, zone: &str, bind_dir: &str, dir: &str, file: &str) {
    let _ = writeln!(out, "zone \"{zone}\" in {{");
    out.push_str("    type master;\n");
    let _ = writeln!(out, "    file \"{bind_dir}/{dir}/{file}\";");
    out.push_str("};\n\n");
}

/// Render the master configuration.
///
/// Forward zones come first, in the given order, then one reverse zone per
/// subnet of `index`.
pub fn render_named_conf(forward_zones: &[String], index: &ReverseZoneIndex, bind_dir: &str) -> String {
    let bind_dir = bind_dir.trim_end_matches('/');
    let mut out = String::new();

    out.push_str("// BIND configuration file\n");
    out.push_str("    // Place additional options here.\n\n\n");

    for zone in forward_zones {
        write_zone_block(&mut out, zone, bind_dir, FORWARD_DIR, &forward_file_name(zone));
    }

    for subnet in index.subnets() {
        write_zone_block(
            &mut out,
            &subnet.arpa_zone(),
            bind_dir,
            REVERSE_DIR,
            &subnet.file_name(),
        );
    }

    out
}
