//! Zone query descriptions.
//!
//! A description is a sequence of `Name=<name>,Records=<n>,Children=<n>`
//! headers, each followed by the record lines of that node:
//!
//! ```text
//! Name=,Records=2,Children=1
//! SOA: ns1.example.com (serial=1, refresh=3600, retry=600, expire=604800, minttl=300, ttl=86400)
//! NS: ns1.example.com ttl=86400
//! Name=web1,Records=1,Children=0
//! A: 10.0.0.5 ttl=3600
//! ```
//!
//! The header with an empty name is the zone apex, stored under [`ROOT`].

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::GeneratorError;
use crate::record::Record;

/// Key of the zone apex node.
pub const ROOT: &str = "root";

const HEADER_PREFIX: &str = "Name=";

/// What to do when a node name appears in more than one header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNodePolicy {
    /// The later header replaces the node's declared counts and records.
    /// The node keeps the position of its first header.
    #[default]
    Replace,
    /// A repeated node name fails the parse.
    Reject,
}

/// One named entity of a zone: a host, a subdomain or the apex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneNode {
    /// Node name, unique within the zone.
    #[serde(skip)]
    pub name: String,

    /// Declared record count from the header. Not checked against `records`.
    #[serde(rename = "Records")]
    pub record_count: u32,

    /// Declared child count from the header.
    #[serde(rename = "Children")]
    pub child_count: u32,

    /// Records in file order.
    #[serde(rename = "DNS_Records")]
    pub records: Vec<Record>,
}

impl ZoneNode {
    /// Create an empty node.
    pub fn new(name: impl Into<String>, record_count: u32, child_count: u32) -> Self {
        Self {
            name: name.into(),
            record_count,
            child_count,
            records: Vec::new(),
        }
    }

    /// Whether this is the zone apex.
    pub fn is_root(&self) -> bool {
        self.name == ROOT
    }
}

/// All nodes of one zone, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneDescription {
    nodes: Vec<ZoneNode>,
}

impl ZoneDescription {
    /// Parse the full text of a zone query file.
    pub fn parse(input: &str, duplicates: DuplicateNodePolicy) -> Result<Self, GeneratorError> {
        let mut zone = ZoneDescription::default();
        let mut current: Option<usize> = None;

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.starts_with(HEADER_PREFIX) {
                let node = parse_header(line, line_no)?;
                current = Some(zone.insert_node(node, duplicates, line_no)?);
            } else if line.is_empty() {
                continue;
            } else if let Some(pos) = current {
                let record = Record::parse(line)
                    .and_then(|r| r.validate().map(|_| r))
                    .map_err(|source| GeneratorError::MalformedRecord {
                        line: line_no,
                        source,
                    })?;
                zone.nodes[pos].records.push(record);
            } else {
                debug!(line = line_no, "ignoring record line before first header");
            }
        }

        Ok(zone)
    }

    fn insert_node(
        &mut self,
        node: ZoneNode,
        duplicates: DuplicateNodePolicy,
        line: usize,
    ) -> Result<usize, GeneratorError> {
        match self.position(&node.name) {
            None => {
                self.nodes.push(node);
                Ok(self.nodes.len() - 1)
            }
            Some(pos) => match duplicates {
                DuplicateNodePolicy::Replace => {
                    warn!(node = %node.name, line, "duplicate node header replaces earlier node");
                    self.nodes[pos] = node;
                    Ok(pos)
                }
                DuplicateNodePolicy::Reject => Err(GeneratorError::DuplicateNode {
                    name: node.name,
                    line,
                }),
            },
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Look up a node by name.
    pub fn get(&self, name: &str) -> Option<&ZoneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// The apex node, if the description declared one.
    pub fn root(&self) -> Option<&ZoneNode> {
        self.get(ROOT)
    }

    /// All nodes in order.
    pub fn nodes(&self) -> &[ZoneNode] {
        &self.nodes
    }

    /// All nodes except the apex, in order.
    pub fn hosts(&self) -> impl Iterator<Item = &ZoneNode> {
        self.nodes.iter().filter(|n| !n.is_root())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no header was found.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pretty-printed JSON snapshot (2-space indentation).
    pub fn to_json(&self) -> Result<String, GeneratorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse `Name=<name>,Records=<n>,Children=<n>`.
fn parse_header(line: &str, line_no: usize) -> Result<ZoneNode, GeneratorError> {
    let malformed = |reason: String| GeneratorError::MalformedHeader {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(',').collect();
    let [name, records, children] = fields[..] else {
        return Err(malformed(format!(
            "expected 3 comma-separated fields, found {}",
            fields.len()
        )));
    };

    let field = |part: &str, key: &str| -> Result<String, GeneratorError> {
        match part.trim().split_once('=') {
            Some((k, v)) if k.trim() == key => Ok(v.trim().to_string()),
            _ => Err(malformed(format!("expected '{key}=<value>', found '{part}'"))),
        }
    };
    let count = |part: &str, key: &str| -> Result<u32, GeneratorError> {
        let value = field(part, key)?;
        value
            .parse()
            .map_err(|_| malformed(format!("{key} must be a non-negative integer, found '{value}'")))
    };

    let name = field(name, "Name")?;
    let name = if name.is_empty() { ROOT.to_string() } else { name };

    Ok(ZoneNode::new(
        name,
        count(records, "Records")?,
        count(children, "Children")?,
    ))
}

impl Serialize for ZoneDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for node in &self.nodes {
            map.serialize_entry(&node.name, node)?;
        }
        map.end()
    }
}

struct ZoneVisitor;

impl<'de> Visitor<'de> for ZoneVisitor {
    type Value = ZoneDescription;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of node names to nodes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ZoneDescription, A::Error> {
        let mut zone = ZoneDescription::default();
        while let Some((name, mut node)) = access.next_entry::<String, ZoneNode>()? {
            node.name = name;
            match zone.position(&node.name) {
                Some(pos) => zone.nodes[pos] = node,
                None => zone.nodes.push(node),
            }
        }
        Ok(zone)
    }
}

impl<'de> Deserialize<'de> for ZoneDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ZoneVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::RecordType;

    const SAMPLE: &str = "\
Name=,Records=3,Children=2
SOA: ns1.example.com (serial=1, refresh=3600, retry=600, expire=604800, minttl=300, ttl=86400)
NS: ns1.example.com ttl=86400

Name=web1,Records=1,Children=0
A: 10.0.0.5 ttl=3600
Name=www,Records=1,Children=0
CNAME: web1.corp.example.com. ttl=300
";

    #[test]
    fn test_parse_nodes_in_order() {
        let zone = ZoneDescription::parse(SAMPLE, DuplicateNodePolicy::Replace).unwrap();
        let names: Vec<_> = zone.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["root", "web1", "www"]);

        let root = zone.root().unwrap();
        assert_eq!(root.record_count, 3);
        assert_eq!(root.child_count, 2);
        assert_eq!(root.records.len(), 2);
        assert_eq!(root.records[0].rtype, RecordType::SOA);
        assert_eq!(root.records[1].rtype, RecordType::NS);

        let web1 = zone.get("web1").unwrap();
        assert_eq!(web1.records.len(), 1);
        assert_eq!(web1.records[0].ip, Some("10.0.0.5".parse().unwrap()));
    }

    #[test]
    fn test_hosts_skip_root() {
        let zone = ZoneDescription::parse(SAMPLE, DuplicateNodePolicy::Replace).unwrap();
        let hosts: Vec<_> = zone.hosts().map(|n| n.name.as_str()).collect();
        assert_eq!(hosts, vec!["web1", "www"]);
    }

    #[test]
    fn test_records_before_first_header_are_ignored() {
        let input = "A: 10.0.0.1 ttl=60\nName=host,Records=1,Children=0\nA: 10.0.0.2 ttl=60\n";
        let zone = ZoneDescription::parse(input, DuplicateNodePolicy::Replace).unwrap();
        assert_eq!(zone.len(), 1);
        assert_eq!(zone.get("host").unwrap().records.len(), 1);
    }

    #[test]
    fn test_declared_counts_are_informational() {
        let input = "Name=host,Records=5,Children=9\nA: 10.0.0.2 ttl=60\n";
        let zone = ZoneDescription::parse(input, DuplicateNodePolicy::Replace).unwrap();
        let host = zone.get("host").unwrap();
        assert_eq!(host.record_count, 5);
        assert_eq!(host.records.len(), 1);
    }

    #[test]
    fn test_duplicate_replace_keeps_position() {
        let input = "\
Name=a,Records=1,Children=0
A: 10.0.0.1 ttl=60
Name=b,Records=1,Children=0
A: 10.0.0.2 ttl=60
Name=a,Records=1,Children=0
A: 10.0.0.3 ttl=60
";
        let zone = ZoneDescription::parse(input, DuplicateNodePolicy::Replace).unwrap();
        let names: Vec<_> = zone.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let a = zone.get("a").unwrap();
        assert_eq!(a.records.len(), 1);
        assert_eq!(a.records[0].ip, Some("10.0.0.3".parse().unwrap()));
    }

    #[test]
    fn test_duplicate_reject() {
        let input = "Name=a,Records=0,Children=0\nName=a,Records=0,Children=0\n";
        let err = ZoneDescription::parse(input, DuplicateNodePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::DuplicateNode { ref name, line: 2 } if name == "a"
        ));
    }

    #[test]
    fn test_malformed_headers() {
        for input in [
            "Name=a,Records=1",
            "Name=a,Records=1,Children=0,Extra=1",
            "Name=a,Records=x,Children=0",
            "Name=a,Count=1,Children=0",
            "Name=a,Records=-1,Children=0",
        ] {
            let err = ZoneDescription::parse(input, DuplicateNodePolicy::Replace).unwrap_err();
            assert!(
                matches!(err, GeneratorError::MalformedHeader { line: 1, .. }),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn test_malformed_record_reports_line() {
        let input = "Name=host,Records=1,Children=0\n\nthis is not a record\n";
        let err = ZoneDescription::parse(input, DuplicateNodePolicy::Replace).unwrap_err();
        assert!(matches!(err, GeneratorError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_json_snapshot_layout() {
        let input = "Name=,Records=1,Children=0\nNS: ns1.example.com ttl=60\n";
        let zone = ZoneDescription::parse(input, DuplicateNodePolicy::Replace).unwrap();
        let expected = r#"{
  "root": {
    "Records": 1,
    "Children": 0,
    "DNS_Records": [
      {
        "type": "NS",
        "domain": "ns1.example.com",
        "ttl": "60"
      }
    ]
  }
}"#;
        assert_eq!(zone.to_json().unwrap(), expected);
    }

    #[test]
    fn test_json_snapshot_round_trip() {
        let zone = ZoneDescription::parse(SAMPLE, DuplicateNodePolicy::Replace).unwrap();
        let json = zone.to_json().unwrap();
        let back: ZoneDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zone);
    }
}
