//! Positional text encodings of temporal, binary and UUID values.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Timelike,
};
use structdoc_error::{CodecError, CodecResult};
use uuid::Uuid;

/// `YYYY-MM-DD`
pub fn encode_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// `HH:MM:SS`, plus `.nnnnnnnnn` when the time has a sub-second part.
pub fn encode_time(t: &NaiveTime) -> String {
    let mut s = t.format("%H:%M:%S").to_string();
    let nanos = t.nanosecond();
    if nanos != 0 {
        s.push_str(&format!(".{nanos:09}"));
    }
    s
}

/// `YYYY-MM-DDTHH:MM:SS.nnnnnnnnn`, always nine fraction digits.
pub fn encode_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.9f").to_string()
}

/// RFC 3339 with `Z` for a zero offset.
pub fn encode_offset_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn decode_date(s: &str) -> CodecResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| CodecError::invalid_literal("date", s, e))
}

pub fn decode_time(s: &str) -> CodecResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f").map_err(|e| CodecError::invalid_literal("time", s, e))
}

/// Accepts `T` or a space between date and time.
pub fn decode_timestamp(s: &str) -> CodecResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| CodecError::invalid_literal("timestamp", s, e))
}

pub fn decode_offset_timestamp(s: &str) -> CodecResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).map_err(|e| CodecError::invalid_literal("timestamp with offset", s, e))
}

/// Hex pairs to bytes; an odd-length input is read as if left-padded with
/// `'0'`.
pub fn decode_hex(s: &str) -> CodecResult<Vec<u8>> {
    let digits = s.as_bytes();
    let mut out = Vec::with_capacity(digits.len().div_ceil(2));
    let mut i = 0;
    if digits.len() % 2 == 1 {
        out.push(hex_value(s, digits[0])?);
        i = 1;
    }
    while i < digits.len() {
        out.push((hex_value(s, digits[i])? << 4) | hex_value(s, digits[i + 1])?);
        i += 2;
    }
    Ok(out)
}

fn hex_value(
    literal: &str,
    c: u8,
) -> CodecResult<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(CodecError::invalid_literal(
            "binary",
            literal,
            format!("'{}' is not a hex digit", c as char),
        )),
    }
}

/// Reads a UUID as 16 hex bytes after removing every `-`.
pub fn decode_uuid(s: &str) -> CodecResult<Uuid> {
    let compact: String = s.chars().filter(|c| *c != '-').collect();
    if compact.len() != 32 {
        return Err(CodecError::invalid_literal("uuid", s, "expected 32 hex digits"));
    }
    let bytes = decode_hex(&compact).map_err(|_| CodecError::invalid_literal("uuid", s, "bad hex digit"))?;
    let bytes: [u8; 16] = bytes
        .try_into()
        .map_err(|_| CodecError::invalid_literal("uuid", s, "expected 16 bytes"))?;
    Ok(Uuid::from_bytes(bytes))
}
