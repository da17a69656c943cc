//! Display implementation for SqlValue

use std::fmt;

use crate::sql_value::SqlValue;

/// Display implementation for SqlValue (how values are shown in logs)
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Boolean(true) => write!(f, "TRUE"),
            SqlValue::Boolean(false) => write!(f, "FALSE"),
            SqlValue::Smallint(i) => write!(f, "{}", i),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Bigint(i) => write!(f, "{}", i),
            SqlValue::Double(n) => write!(f, "{}", n),
            SqlValue::Numeric(s) => write!(f, "{}", s),
            SqlValue::Varchar(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Bytes(b) => {
                write!(f, "X'")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                write!(f, "'")
            }
            SqlValue::Date(s) => write!(f, "DATE '{}'", s),
            SqlValue::Timestamp(s) => write!(f, "TIMESTAMP '{}'", s),
        }
    }
}
