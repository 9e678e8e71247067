//! Workload operation records
//!
//! A workload is a line-oriented text log with one operation per line:
//!
//! ```text
//! I <key> <value>      insert
//! U <key> <value>      update
//! M <key> <value>      merge
//! P <key>              point query
//! D <key>              point delete
//! R <start> <end>      range delete
//! S <start> <end>      range query
//! ```
//!
//! Only the first space after the key is a delimiter, so value payloads may
//! contain spaces. Single-field kinds take the whole remainder as the key.
//!
//! # Example
//!
//! ```
//! use kvreplay::workload::{parse_line, OperationKind};
//!
//! let op = parse_line(b"I k1 hello world").unwrap();
//! assert_eq!(op.kind, OperationKind::Insert);
//! assert_eq!(op.key, b"k1");
//! assert_eq!(op.value(), Some(&b"hello world"[..]));
//! ```

pub mod generate;
pub mod reader;

pub use reader::WorkloadReader;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of a workload operation
///
/// Declaration order is the order kinds appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Insert,
    Update,
    Merge,
    PointQuery,
    PointDelete,
    RangeDelete,
    RangeQuery,
}

/// Fields a record of a given kind carries after its opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fields {
    /// `<key>`, the entire remainder of the line
    Key,
    /// `<key> <value>`
    KeyValue,
    /// `<start> <end>`, a half-open key range
    KeyRange,
}

/// Opcode table. Adding an operation is one entry here plus its store call.
const OPCODES: &[(&str, OperationKind)] = &[
    ("I", OperationKind::Insert),
    ("U", OperationKind::Update),
    ("M", OperationKind::Merge),
    ("P", OperationKind::PointQuery),
    ("D", OperationKind::PointDelete),
    ("R", OperationKind::RangeDelete),
    ("S", OperationKind::RangeQuery),
];

impl OperationKind {
    /// Every kind, in report order
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Merge,
        OperationKind::PointQuery,
        OperationKind::PointDelete,
        OperationKind::RangeDelete,
        OperationKind::RangeQuery,
    ];

    /// Number of distinct kinds
    pub const COUNT: usize = Self::ALL.len();

    /// Look up the kind for a workload opcode
    pub fn from_opcode(opcode: &[u8]) -> Option<Self> {
        OPCODES
            .iter()
            .find(|(code, _)| code.as_bytes() == opcode)
            .map(|&(_, kind)| kind)
    }

    /// Opcode written in workload files for this kind
    pub fn opcode(self) -> &'static str {
        OPCODES
            .iter()
            .find(|&&(_, kind)| kind == self)
            .map(|&(code, _)| code)
            .unwrap_or("?")
    }

    /// Fields required after the opcode
    pub fn fields(self) -> Fields {
        match self {
            OperationKind::Insert | OperationKind::Update | OperationKind::Merge => Fields::KeyValue,
            OperationKind::PointQuery | OperationKind::PointDelete => Fields::Key,
            OperationKind::RangeDelete | OperationKind::RangeQuery => Fields::KeyRange,
        }
    }

    /// Human-readable label used in reports
    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Merge => "merge",
            OperationKind::PointQuery => "point query",
            OperationKind::PointDelete => "point delete",
            OperationKind::RangeDelete => "range delete",
            OperationKind::RangeQuery => "range query",
        }
    }

    /// Dense index into per-kind arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Second field of a record, determined by its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    Value(Vec<u8>),
    RangeEnd(Vec<u8>),
}

/// One parsed workload line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Key, or range start for range kinds
    pub key: Vec<u8>,
    pub payload: Payload,
}

impl Operation {
    /// Value payload for Insert/Update/Merge
    pub fn value(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Exclusive range end for RangeDelete/RangeQuery
    pub fn range_end(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::RangeEnd(end) => Some(end),
            _ => None,
        }
    }

    /// Whether the payload carries the fields `kind` expects
    pub fn is_well_formed(&self) -> bool {
        matches!(
            (self.kind.fields(), &self.payload),
            (Fields::Key, Payload::None)
                | (Fields::KeyValue, Payload::Value(_))
                | (Fields::KeyRange, Payload::RangeEnd(_))
        )
    }

    /// Render the record back into workload line form (without newline)
    pub fn to_line(&self) -> Vec<u8> {
        let mut line = Vec::with_capacity(2 + self.key.len() + 1 + self.payload_len());
        line.extend_from_slice(self.kind.opcode().as_bytes());
        line.push(b' ');
        line.extend_from_slice(&self.key);
        match &self.payload {
            Payload::None => {}
            Payload::Value(bytes) | Payload::RangeEnd(bytes) => {
                line.push(b' ');
                line.extend_from_slice(bytes);
            }
        }
        line
    }

    fn payload_len(&self) -> usize {
        match &self.payload {
            Payload::None => 0,
            Payload::Value(bytes) | Payload::RangeEnd(bytes) => bytes.len(),
        }
    }
}

/// Why a workload line could not be turned into an operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown operation in workload file: {0}")]
    UnknownOpcode(String),

    #[error("{kind} record is missing its {field}")]
    MissingField {
        kind: OperationKind,
        field: &'static str,
    },
}

/// Split at the first space; the space itself belongs to neither half
fn split_first_space(bytes: &[u8]) -> (&[u8], Option<&[u8]>) {
    match bytes.iter().position(|&b| b == b' ') {
        Some(pos) => (&bytes[..pos], Some(&bytes[pos + 1..])),
        None => (bytes, None),
    }
}

/// Parse one workload line (without its line terminator)
pub fn parse_line(line: &[u8]) -> Result<Operation, ParseError> {
    let (opcode, rest) = split_first_space(line);
    let kind = OperationKind::from_opcode(opcode)
        .ok_or_else(|| ParseError::UnknownOpcode(String::from_utf8_lossy(opcode).into_owned()))?;

    let rest = match rest {
        Some(rest) if !rest.is_empty() => rest,
        _ => return Err(ParseError::MissingField { kind, field: "key" }),
    };

    let (key, payload) = match kind.fields() {
        Fields::Key => (rest, Payload::None),
        Fields::KeyValue => {
            let (key, value) = split_first_space(rest);
            let value = value.ok_or(ParseError::MissingField { kind, field: "value" })?;
            (key, Payload::Value(value.to_vec()))
        }
        Fields::KeyRange => {
            let (start, end) = split_first_space(rest);
            let end = end.ok_or(ParseError::MissingField { kind, field: "range end" })?;
            (start, Payload::RangeEnd(end.to_vec()))
        }
    };

    if key.is_empty() {
        return Err(ParseError::MissingField { kind, field: "key" });
    }

    Ok(Operation {
        kind,
        key: key.to_vec(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_value_keeps_embedded_spaces() {
        let op = parse_line(b"I k1 hello world").unwrap();
        assert_eq!(op.kind, OperationKind::Insert);
        assert_eq!(op.key, b"k1".to_vec());
        assert_eq!(op.value(), Some(&b"hello world"[..]));
    }

    #[test]
    fn test_point_query_has_no_value() {
        let op = parse_line(b"P mykey").unwrap();
        assert_eq!(op.kind, OperationKind::PointQuery);
        assert_eq!(op.key, b"mykey".to_vec());
        assert_eq!(op.payload, Payload::None);
        assert_eq!(op.value(), None);
    }

    #[test]
    fn test_point_query_key_is_whole_remainder() {
        let op = parse_line(b"P my key").unwrap();
        assert_eq!(op.key, b"my key".to_vec());
    }

    #[test]
    fn test_update_is_symmetric_with_insert() {
        let op = parse_line(b"U a 9").unwrap();
        assert_eq!(op.kind, OperationKind::Update);
        assert_eq!(op.key, b"a".to_vec());
        assert_eq!(op.value(), Some(&b"9"[..]));
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let op = parse_line(b"I k ").unwrap();
        assert_eq!(op.value(), Some(&b""[..]));
    }

    #[test]
    fn test_range_kinds() {
        let op = parse_line(b"S a f").unwrap();
        assert_eq!(op.kind, OperationKind::RangeQuery);
        assert_eq!(op.key, b"a".to_vec());
        assert_eq!(op.range_end(), Some(&b"f"[..]));

        let op = parse_line(b"R k10 k20").unwrap();
        assert_eq!(op.kind, OperationKind::RangeDelete);
        assert_eq!(op.range_end(), Some(&b"k20"[..]));
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            parse_line(b"X foo bar"),
            Err(ParseError::UnknownOpcode("X".to_string()))
        );
        assert_eq!(
            parse_line(b"insert foo bar"),
            Err(ParseError::UnknownOpcode("insert".to_string()))
        );
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            parse_line(b"I k1"),
            Err(ParseError::MissingField {
                kind: OperationKind::Insert,
                field: "value"
            })
        );
        assert_eq!(
            parse_line(b"P"),
            Err(ParseError::MissingField {
                kind: OperationKind::PointQuery,
                field: "key"
            })
        );
        assert_eq!(
            parse_line(b"S a"),
            Err(ParseError::MissingField {
                kind: OperationKind::RangeQuery,
                field: "range end"
            })
        );
    }

    #[test]
    fn test_parsed_records_are_well_formed() {
        for line in [&b"I k v"[..], b"P k", b"D k", b"M k v", b"R a z", b"S a z"] {
            assert!(parse_line(line).unwrap().is_well_formed());
        }

        let mut op = parse_line(b"S a z").unwrap();
        op.payload = Payload::None;
        assert!(!op.is_well_formed());
    }

    #[test]
    fn test_opcode_table_covers_every_kind() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_opcode(kind.opcode().as_bytes()), Some(kind));
        }
        assert_eq!(OperationKind::COUNT, 7);
    }

    #[test]
    fn test_to_line_reparses() {
        for line in [&b"I k v w"[..], b"P key", b"R a b", b"M k +1"] {
            let op = parse_line(line).unwrap();
            assert_eq!(op.to_line(), line.to_vec());
        }
    }
}
