// LogTrim - core/dataflash.rs
//
// ArduPilot DataFlash (.BIN) framing and payload decoding.
//
// Every message is framed `0xA3 0x95 <msg_id>` followed by a fixed-length
// payload. Message lengths come from FMT definitions (msg_id 0x80), which
// the log emits before first use of each message type. FMT self-describes,
// so its own definition is seeded a priori.
//
// This module owns the static knowledge of the format; the streaming and
// offset bookkeeping live in core/reader.rs.

use crate::core::model::{FieldValue, Record};
use std::collections::HashMap;

/// First sync byte of every message header.
pub const HEAD1: u8 = 0xA3;

/// Second sync byte of every message header.
pub const HEAD2: u8 = 0x95;

/// Header length in bytes: two sync bytes plus the message id.
pub const HEADER_LEN: usize = 3;

/// Message id of the self-describing FMT message.
pub const FMT_MSG_ID: u8 = 0x80;

/// Total FMT message length including the header.
pub const FMT_MSG_LEN: usize = HEADER_LEN + 86;

// FMT payload layout offsets.
const FMT_TYPE: usize = 0;
const FMT_LENGTH: usize = 1;
const FMT_NAME: std::ops::Range<usize> = 2..6;
const FMT_FORMAT: std::ops::Range<usize> = 6..22;
const FMT_COLUMNS: std::ops::Range<usize> = 22..86;

// =============================================================================
// Message definitions
// =============================================================================

/// One FMT-declared message type.
#[derive(Debug, Clone)]
pub struct MessageDef {
    /// Binary message id.
    pub msg_id: u8,

    /// Total message length in bytes, header included. This is the framing
    /// authority: the stream advances by exactly this many bytes.
    pub length: usize,

    /// Message name, e.g. "GPS".
    pub name: String,

    /// Format characters, one per column.
    pub format: String,

    /// Column names.
    pub columns: Vec<String>,
}

/// Registry of message definitions accumulated from FMT messages.
#[derive(Debug)]
pub struct FormatTable {
    defs: HashMap<u8, MessageDef>,
}

impl FormatTable {
    /// New table pre-seeded with the FMT definition itself.
    pub fn new() -> Self {
        let mut defs = HashMap::new();
        defs.insert(
            FMT_MSG_ID,
            MessageDef {
                msg_id: FMT_MSG_ID,
                length: FMT_MSG_LEN,
                name: "FMT".to_string(),
                format: "BBnNZ".to_string(),
                columns: ["Type", "Length", "Name", "Format", "Columns"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        );
        Self { defs }
    }

    pub fn get(&self, msg_id: u8) -> Option<&MessageDef> {
        self.defs.get(&msg_id)
    }

    /// Framing length for a message id, `None` when no FMT definition has
    /// been seen for it.
    pub fn length_of(&self, msg_id: u8) -> Option<usize> {
        self.defs.get(&msg_id).map(|d| d.length)
    }

    pub fn register(&mut self, def: MessageDef) {
        tracing::trace!(
            msg_id = def.msg_id,
            name = %def.name,
            length = def.length,
            "FMT definition registered"
        );
        self.defs.insert(def.msg_id, def);
    }
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an FMT payload (86 bytes) into a message definition.
pub fn parse_fmt_payload(payload: &[u8]) -> MessageDef {
    let name = cstr(&payload[FMT_NAME]);
    let format = cstr(&payload[FMT_FORMAT]);
    let columns: Vec<String> = cstr(&payload[FMT_COLUMNS])
        .split(',')
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect();

    MessageDef {
        msg_id: payload[FMT_TYPE],
        length: payload[FMT_LENGTH] as usize,
        name,
        format,
        columns,
    }
}

// =============================================================================
// Payload decoding
// =============================================================================

/// Payload byte width of one format character, `None` for characters this
/// decoder does not know.
fn format_char_size(c: u8) -> Option<usize> {
    match c {
        b'b' | b'B' | b'M' => Some(1),
        b'h' | b'H' | b'c' | b'C' => Some(2),
        b'i' | b'I' | b'f' | b'e' | b'E' | b'L' => Some(4),
        b'd' | b'q' | b'Q' => Some(8),
        b'n' => Some(4),
        b'N' => Some(16),
        b'Z' => Some(64),
        b'a' => Some(64), // int16[32]
        _ => None,
    }
}

/// Decode a message payload into named fields per its FMT definition.
///
/// Decoding is best-effort below the framing layer: an unknown format
/// character or a format string that overruns the declared payload stops
/// field extraction for this record but never affects the byte framing,
/// which is governed solely by `MessageDef::length`.
pub fn decode_fields(def: &MessageDef, payload: &[u8]) -> Vec<(String, FieldValue)> {
    let mut fields = Vec::with_capacity(def.columns.len());
    let mut cursor = 0usize;

    for (i, c) in def.format.bytes().enumerate() {
        let Some(size) = format_char_size(c) else {
            tracing::trace!(
                msg = %def.name,
                format_char = %(c as char),
                "Unknown format character, remaining columns skipped"
            );
            break;
        };
        if cursor + size > payload.len() {
            tracing::trace!(
                msg = %def.name,
                column = i,
                "Format string overruns declared payload, remaining columns skipped"
            );
            break;
        }
        let raw = &payload[cursor..cursor + size];
        cursor += size;

        let Some(column) = def.columns.get(i) else {
            break;
        };

        if let Some(value) = decode_value(c, raw) {
            fields.push((column.clone(), value));
        }
    }

    fields
}

/// Decode one column. Returns `None` for array columns, which are consumed
/// for sizing but carry no scalar value.
fn decode_value(c: u8, raw: &[u8]) -> Option<FieldValue> {
    let v = match c {
        b'b' => (raw[0] as i8) as f64,
        b'B' | b'M' => raw[0] as f64,
        b'h' => i16::from_le_bytes([raw[0], raw[1]]) as f64,
        b'H' => u16::from_le_bytes([raw[0], raw[1]]) as f64,
        b'i' => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
        b'I' => u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
        b'f' => f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
        b'd' => f64::from_le_bytes(raw.try_into().ok()?),
        b'q' => i64::from_le_bytes(raw.try_into().ok()?) as f64,
        b'Q' => u64::from_le_bytes(raw.try_into().ok()?) as f64,
        // Centi-scaled integers.
        b'c' => i16::from_le_bytes([raw[0], raw[1]]) as f64 * 0.01,
        b'C' => u16::from_le_bytes([raw[0], raw[1]]) as f64 * 0.01,
        b'e' => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64 * 0.01,
        b'E' => u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64 * 0.01,
        // Latitude/longitude stored as degrees * 1e7.
        b'L' => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64 * 1e-7,
        b'n' | b'N' | b'Z' => return Some(FieldValue::Text(cstr(raw))),
        b'a' => return None,
        _ => return None,
    };
    Some(FieldValue::Float(v))
}

/// Build a decoded record from a definition and payload.
pub fn decode_record(def: &MessageDef, payload: &[u8]) -> Record {
    Record {
        msg_id: def.msg_id,
        name: def.name.clone(),
        fields: decode_fields(def, payload),
    }
}

/// NUL-trimmed, lossy-UTF-8 string from a fixed-width char column.
fn cstr(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(s: &str, width: usize) -> Vec<u8> {
        let mut out = s.as_bytes().to_vec();
        out.resize(width, 0);
        out
    }

    fn fmt_payload(msg_id: u8, length: u8, name: &str, format: &str, columns: &str) -> Vec<u8> {
        let mut payload = vec![msg_id, length];
        payload.extend(fixed(name, 4));
        payload.extend(fixed(format, 16));
        payload.extend(fixed(columns, 64));
        payload
    }

    #[test]
    fn test_parse_fmt_payload() {
        let payload = fmt_payload(7, 15, "TEST", "Qf", "TimeUS,Value");
        let def = parse_fmt_payload(&payload);
        assert_eq!(def.msg_id, 7);
        assert_eq!(def.length, 15);
        assert_eq!(def.name, "TEST");
        assert_eq!(def.format, "Qf");
        assert_eq!(def.columns, vec!["TimeUS", "Value"]);
    }

    #[test]
    fn test_format_table_seeds_fmt() {
        let table = FormatTable::new();
        assert_eq!(table.length_of(FMT_MSG_ID), Some(FMT_MSG_LEN));
        assert_eq!(table.get(FMT_MSG_ID).unwrap().name, "FMT");
        assert_eq!(table.length_of(0x42), None);
    }

    #[test]
    fn test_decode_scalar_fields() {
        let def = MessageDef {
            msg_id: 1,
            length: 3 + 8 + 4 + 2,
            name: "TEST".to_string(),
            format: "Qfc".to_string(),
            columns: vec!["TimeUS".into(), "Value".into(), "Centi".into()],
        };
        let mut payload = Vec::new();
        payload.extend(1_500_000u64.to_le_bytes());
        payload.extend(2.5f32.to_le_bytes());
        payload.extend(250i16.to_le_bytes());

        let rec = decode_record(&def, &payload);
        assert_eq!(rec.numeric("TimeUS"), Some(1_500_000.0));
        assert_eq!(rec.numeric("Value"), Some(2.5));
        assert_eq!(rec.numeric("Centi"), Some(2.5));
    }

    #[test]
    fn test_decode_text_field() {
        let def = MessageDef {
            msg_id: 2,
            length: 3 + 16,
            name: "MSG".to_string(),
            format: "N".to_string(),
            columns: vec!["Message".into()],
        };
        let payload = fixed("armed", 16);
        let rec = decode_record(&def, &payload);
        assert_eq!(
            rec.field("Message"),
            Some(&FieldValue::Text("armed".to_string()))
        );
    }

    #[test]
    fn test_unknown_format_char_degrades_not_fails() {
        let def = MessageDef {
            msg_id: 3,
            length: 3 + 8 + 4,
            name: "ODD".to_string(),
            format: "Q?f".to_string(),
            columns: vec!["TimeUS".into(), "Mystery".into(), "Value".into()],
        };
        let mut payload = Vec::new();
        payload.extend(9u64.to_le_bytes());
        payload.extend(1.0f32.to_le_bytes());

        // Decoding stops at the unknown character but the leading fields
        // survive; framing is unaffected either way.
        let fields = decode_fields(&def, &payload);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "TimeUS");
    }

    #[test]
    fn test_latlon_scaling() {
        let def = MessageDef {
            msg_id: 4,
            length: 3 + 4,
            name: "POS".to_string(),
            format: "L".to_string(),
            columns: vec!["Lat".into()],
        };
        let payload = 473_977_420i32.to_le_bytes().to_vec();
        let rec = decode_record(&def, &payload);
        let lat = rec.numeric("Lat").unwrap();
        assert!((lat - 47.397742).abs() < 1e-9);
    }
}
