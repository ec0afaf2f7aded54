//! Record lines of a zone query description.
//!
//! A record line looks like `<TYPE>: <positional>... key=value, key=value`.
//! Parsing is split in two steps: [`Record::parse`] tokenizes the line and
//! [`Record::validate`] checks it against the schema for its record type.

use std::fmt;
use std::net::Ipv4Addr;

use hickory_proto::rr::{Name, RecordType};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Attribute keys that would shadow record fields in the JSON snapshot.
const RESERVED_KEYS: [&str; 3] = ["type", "domain", "ip"];

/// SOA timer attributes, in zone file order.
pub const SOA_TIMERS: [&str; 5] = ["serial", "refresh", "retry", "expire", "minttl"];

/// Errors for a single record line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The line has no `TYPE:` prefix.
    #[error("expected '<TYPE>: <details>', found '{0}'")]
    MissingSeparator(String),

    /// The type token is not a DNS record type.
    #[error("unknown record type '{0}'")]
    UnknownType(String),

    /// A positional field required by the record type is absent.
    #[error("{rtype} record requires a {field}")]
    MissingField {
        /// Record type.
        rtype: RecordType,
        /// Missing field name.
        field: &'static str,
    },

    /// An attribute required by the record type is absent.
    #[error("{rtype} record requires attribute '{key}'")]
    MissingAttribute {
        /// Record type.
        rtype: RecordType,
        /// Missing attribute key.
        key: &'static str,
    },

    /// An attribute key collides with a record field.
    #[error("attribute '{0}' is reserved")]
    ReservedAttribute(String),

    /// The A record address is not an IPv4 address.
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    /// The domain field is not a valid DNS name.
    #[error("invalid domain name '{value}': {reason}")]
    InvalidName {
        /// Offending value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// One token of a record's details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A bare value such as a host name or an address.
    Positional(&'a str),
    /// A `key=value` pair.
    Attribute {
        /// Attribute name.
        key: &'a str,
        /// Raw attribute value.
        value: &'a str,
    },
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split record details into positional tokens and `key=value` attributes.
///
/// Tokens are separated by whitespace and commas. The key of an attribute is
/// the run of word characters directly before the first `=`, so `(serial=1`
/// yields key `serial`. The value is everything after that `=`.
pub fn tokenize(details: &str) -> Vec<Token<'_>> {
    details
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let Some((before, value)) = piece.split_once('=') else {
                return Token::Positional(piece);
            };
            let key_start = before
                .char_indices()
                .rev()
                .find(|(_, c)| !is_word_char(*c))
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            let key = &before[key_start..];
            if key.is_empty() || value.is_empty() {
                Token::Positional(piece)
            } else {
                Token::Attribute { key, value }
            }
        })
        .collect()
}

/// Ordered attribute list. Re-inserting a key overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Insert or overwrite an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Raw value of an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no attributes were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One DNS resource record from a zone query description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Record type.
    pub rtype: RecordType,
    /// Target name for SOA, NS and CNAME records.
    pub domain: Option<String>,
    /// Address for A records.
    pub ip: Option<Ipv4Addr>,
    /// Trailing `key=value` attributes.
    pub attributes: Attributes,
}

impl Record {
    /// Create a record of the given type with no fields set.
    pub fn new(rtype: RecordType) -> Self {
        Self {
            rtype,
            domain: None,
            ip: None,
            attributes: Attributes::default(),
        }
    }

    /// Parse one trimmed record line.
    ///
    /// Only the shape of the line is checked here. An A record without any
    /// positional token is left without `ip` and caught by [`Record::validate`].
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let line = line.trim();
        let Some((type_token, details)) = line.split_once(':') else {
            return Err(RecordError::MissingSeparator(line.to_string()));
        };
        let type_token = type_token.trim();
        if type_token.is_empty() {
            return Err(RecordError::MissingSeparator(line.to_string()));
        }
        let rtype: RecordType = type_token
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| RecordError::UnknownType(type_token.to_string()))?;

        let mut record = Record::new(rtype);
        let tokens = tokenize(details);
        let first_positional = tokens.iter().find_map(|t| match t {
            Token::Positional(v) => Some(*v),
            Token::Attribute { .. } => None,
        });

        match rtype {
            RecordType::SOA | RecordType::NS | RecordType::CNAME => {
                record.domain = first_positional.map(str::to_string);
            }
            RecordType::A => {
                if let Some(value) = first_positional {
                    record.ip = Some(
                        value
                            .parse()
                            .map_err(|_| RecordError::InvalidAddress(value.to_string()))?,
                    );
                }
            }
            _ => {}
        }

        for token in tokens {
            if let Token::Attribute { key, value } = token {
                record.attributes.insert(key, value);
            }
        }

        Ok(record)
    }

    /// Check the record against the schema for its type.
    pub fn validate(&self) -> Result<(), RecordError> {
        if let Some(key) = self
            .attributes
            .iter()
            .map(|(k, _)| k)
            .find(|k| RESERVED_KEYS.iter().any(|r| r == k))
        {
            return Err(RecordError::ReservedAttribute(key.to_string()));
        }

        let required: &[&'static str] = match self.rtype {
            RecordType::SOA => &["serial", "refresh", "retry", "expire", "minttl", "ttl"],
            RecordType::NS | RecordType::CNAME | RecordType::A => &["ttl"],
            _ => &[],
        };

        match self.rtype {
            RecordType::SOA | RecordType::NS | RecordType::CNAME => {
                let domain = self.domain.as_deref().ok_or(RecordError::MissingField {
                    rtype: self.rtype,
                    field: "domain",
                })?;
                Name::from_ascii(domain).map_err(|e| RecordError::InvalidName {
                    value: domain.to_string(),
                    reason: e.to_string(),
                })?;
            }
            RecordType::A if self.ip.is_none() => {
                return Err(RecordError::MissingField {
                    rtype: self.rtype,
                    field: "ip",
                });
            }
            _ => {}
        }

        for &key in required {
            if self.attributes.get(key).is_none() {
                return Err(RecordError::MissingAttribute {
                    rtype: self.rtype,
                    key,
                });
            }
        }

        Ok(())
    }

    /// Attribute value with surrounding `)` stripped.
    ///
    /// Multi-line SOA descriptions close their parenthesis on the last
    /// attribute, e.g. `ttl=3600)`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|v| v.trim_matches(')'))
    }

    /// TTL used for grouping and rendering.
    pub fn ttl(&self) -> Option<&str> {
        self.attr("ttl")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.rtype.to_string())?;
        if let Some(domain) = &self.domain {
            map.serialize_entry("domain", domain)?;
        }
        if let Some(ip) = &self.ip {
            map.serialize_entry("ip", &ip.to_string())?;
        }
        for (key, value) in self.attributes.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a record object with a 'type' field")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut rtype = None;
        let mut domain = None;
        let mut ip = None;
        let mut attributes = Attributes::default();

        while let Some((key, value)) = access.next_entry::<String, String>()? {
            match key.as_str() {
                "type" => {
                    rtype = Some(
                        value
                            .to_ascii_uppercase()
                            .parse::<RecordType>()
                            .map_err(|_| de::Error::custom(format!("unknown type '{value}'")))?,
                    );
                }
                "domain" => domain = Some(value),
                "ip" => {
                    ip = Some(
                        value
                            .parse::<Ipv4Addr>()
                            .map_err(|_| de::Error::custom(format!("invalid ip '{value}'")))?,
                    );
                }
                _ => attributes.insert(key, value),
            }
        }

        Ok(Record {
            rtype: rtype.ok_or_else(|| de::Error::missing_field("type"))?,
            domain,
            ip,
            attributes,
        })
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_a_record() {
        let record = Record::parse("A: 10.0.0.5 ttl=3600").unwrap();
        assert_eq!(record.rtype, RecordType::A);
        assert_eq!(record.ip, Some(Ipv4Addr::new(10, 0, 0, 5)));
        assert_eq!(record.domain, None);
        assert_eq!(record.attributes.get("ttl"), Some("3600"));
        assert_eq!(record.attributes.len(), 1);
        record.validate().unwrap();
    }

    #[test]
    fn test_parse_soa_record() {
        let record = Record::parse(
            "SOA: ns1.example.com (serial=2024010101, refresh=3600, retry=600, expire=604800, minttl=300, ttl=86400)",
        )
        .unwrap();
        assert_eq!(record.rtype, RecordType::SOA);
        assert_eq!(record.domain.as_deref(), Some("ns1.example.com"));
        assert_eq!(record.attr("serial"), Some("2024010101"));
        assert_eq!(record.attributes.get("ttl"), Some("86400)"));
        assert_eq!(record.ttl(), Some("86400"));
        record.validate().unwrap();
    }

    #[test]
    fn test_parse_cname_record() {
        let record = Record::parse("CNAME: web1.example.com. ttl=300").unwrap();
        assert_eq!(record.domain.as_deref(), Some("web1.example.com."));
        assert_eq!(record.ttl(), Some("300"));
        record.validate().unwrap();
    }

    #[test]
    fn test_later_attribute_overrides_in_place() {
        let record = Record::parse("NS: ns2.example.com ttl=60 weight=1 ttl=120").unwrap();
        let attrs: Vec<_> = record.attributes.iter().collect();
        assert_eq!(attrs, vec![("ttl", "120"), ("weight", "1")]);
    }

    #[test]
    fn test_other_known_type_keeps_attributes() {
        let record = Record::parse("MX: mail.example.com prio=10 ttl=300").unwrap();
        assert_eq!(record.rtype, RecordType::MX);
        assert_eq!(record.domain, None);
        assert_eq!(record.attributes.get("prio"), Some("10"));
        record.validate().unwrap();
    }

    #[rstest]
    #[case("10.0.0.5 ttl=60", vec![Token::Positional("10.0.0.5"), Token::Attribute { key: "ttl", value: "60" }])]
    #[case("a,b=c", vec![Token::Positional("a"), Token::Attribute { key: "b", value: "c" }])]
    #[case("(serial=1", vec![Token::Attribute { key: "serial", value: "1" }])]
    #[case("ttl=60)", vec![Token::Attribute { key: "ttl", value: "60)" }])]
    #[case("=x k=", vec![Token::Positional("=x"), Token::Positional("k=")])]
    #[case("  ", vec![])]
    fn test_tokenize(#[case] input: &str, #[case] expected: Vec<Token<'static>>) {
        assert_eq!(tokenize(input), expected);
    }

    #[rstest]
    #[case("")]
    #[case("A 10.0.0.1 ttl=60")]
    #[case(": 10.0.0.1")]
    fn test_missing_separator_rejected(#[case] line: &str) {
        assert!(matches!(
            Record::parse(line),
            Err(RecordError::MissingSeparator(_))
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert_eq!(
            Record::parse("BOGUS: foo ttl=1"),
            Err(RecordError::UnknownType("BOGUS".to_string()))
        );
    }

    #[test]
    fn test_invalid_address_rejected() {
        assert_eq!(
            Record::parse("A: 10.0.0 ttl=60"),
            Err(RecordError::InvalidAddress("10.0.0".to_string()))
        );
    }

    #[rstest]
    #[case("A: ttl=60", RecordError::MissingField { rtype: RecordType::A, field: "ip" })]
    #[case("NS: ttl=60", RecordError::MissingField { rtype: RecordType::NS, field: "domain" })]
    #[case("A: 10.0.0.1", RecordError::MissingAttribute { rtype: RecordType::A, key: "ttl" })]
    #[case("CNAME: www.example.com", RecordError::MissingAttribute { rtype: RecordType::CNAME, key: "ttl" })]
    #[case("SOA: ns1.example.com serial=1 refresh=2 retry=3 expire=4 ttl=5", RecordError::MissingAttribute { rtype: RecordType::SOA, key: "minttl" })]
    #[case("A: 10.0.0.1 ttl=60 ip=10.0.0.2", RecordError::ReservedAttribute("ip".to_string()))]
    fn test_schema_violations(#[case] line: &str, #[case] expected: RecordError) {
        let record = Record::parse(line).unwrap();
        assert_eq!(record.validate(), Err(expected));
    }

    #[test]
    fn test_json_shape() {
        let record = Record::parse("A: 10.0.0.5 ttl=3600 owner=ops").unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"type":"A","ip":"10.0.0.5","ttl":"3600","owner":"ops"}"#
        );
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_json_requires_type() {
        let result: Result<Record, _> = serde_json::from_str(r#"{"ttl":"60"}"#);
        assert!(result.is_err());
    }
}
