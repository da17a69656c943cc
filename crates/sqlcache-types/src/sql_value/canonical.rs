//! Canonical byte encoding for SqlValue
//!
//! Produces a platform-independent encoding used when deriving cache keys:
//! - A one-byte type tag first, so `Integer(1)` and `Bigint(1)` never collide
//! - Fixed-width little-endian numbers
//! - Length-prefixed strings and byte arrays
//! - All NaN payloads collapse to one bit pattern

use crate::sql_value::SqlValue;

impl SqlValue {
    /// Append the canonical encoding of this value to `out`
    pub fn write_canonical(&self, out: &mut Vec<u8>) {
        out.push(self.type_tag());

        match self {
            SqlValue::Null => {}
            SqlValue::Boolean(b) => out.push(u8::from(*b)),
            SqlValue::Smallint(i) => out.extend_from_slice(&i.to_le_bytes()),
            SqlValue::Integer(i) => out.extend_from_slice(&i.to_le_bytes()),
            SqlValue::Bigint(i) => out.extend_from_slice(&i.to_le_bytes()),
            SqlValue::Double(f) => {
                let bits = if f.is_nan() { f64::NAN.to_bits() } else { f.to_bits() };
                out.extend_from_slice(&bits.to_le_bytes());
            }
            SqlValue::Numeric(s)
            | SqlValue::Varchar(s)
            | SqlValue::Date(s)
            | SqlValue::Timestamp(s) => write_len_prefixed(out, s.as_bytes()),
            SqlValue::Bytes(b) => write_len_prefixed(out, b),
        }
    }

    fn type_tag(&self) -> u8 {
        match self {
            SqlValue::Null => 0,
            SqlValue::Boolean(_) => 1,
            SqlValue::Smallint(_) => 2,
            SqlValue::Integer(_) => 3,
            SqlValue::Bigint(_) => 4,
            SqlValue::Double(_) => 5,
            SqlValue::Numeric(_) => 6,
            SqlValue::Varchar(_) => 7,
            SqlValue::Bytes(_) => 8,
            SqlValue::Date(_) => 9,
            SqlValue::Timestamp(_) => 10,
        }
    }
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
}
