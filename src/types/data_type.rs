//! # Column Data Types
//!
//! The closed set of column types. Discriminants double as the on-disk
//! `type_tag` byte in the table file's schema block, so they must never be
//! renumbered. Type metadata (VARCHAR length, VECTOR dimension) lives on
//! [`crate::types::Column`], not in the enum.
//!
//! | Type | Tag | Encoded size |
//! |------|-----|--------------|
//! | Int | 1 | 4 bytes, little-endian two's complement |
//! | BigInt | 2 | 8 bytes |
//! | Text | 3 | u32 length + UTF-8 bytes |
//! | Varchar | 4 | u32 length + UTF-8 bytes (insert-time bound) |
//! | Float | 5 | 8 bytes IEEE-754 |
//! | Boolean | 6 | 1 byte |
//! | Vector | 7 | u32 dimension + dimension x 4 bytes f32 |

use crate::error::{Error, Result};
use std::fmt;

/// Column type tag. `#[repr(u8)]` so the discriminant is the schema-block
/// byte written to disk.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int = 1,
    BigInt = 2,
    Text = 3,
    Varchar = 4,
    Float = 5,
    Boolean = 6,
    Vector = 7,
}

impl DataType {
    /// Rehydrates a type from its on-disk tag.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(DataType::Int),
            2 => Ok(DataType::BigInt),
            3 => Ok(DataType::Text),
            4 => Ok(DataType::Varchar),
            5 => Ok(DataType::Float),
            6 => Ok(DataType::Boolean),
            7 => Ok(DataType::Vector),
            other => Err(Error::Corrupted(format!("unknown column type tag: {other}"))),
        }
    }

    /// Parses an SQL type name (already uppercased by the caller).
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "INT" => Ok(DataType::Int),
            "BIGINT" => Ok(DataType::BigInt),
            "TEXT" => Ok(DataType::Text),
            "VARCHAR" => Ok(DataType::Varchar),
            "FLOAT" => Ok(DataType::Float),
            "BOOLEAN" => Ok(DataType::Boolean),
            "VECTOR" => Ok(DataType::Vector),
            other => Err(Error::InvalidArgument(format!("unknown type: {other}"))),
        }
    }

    /// Returns the encoded byte size for fixed-width types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataType::Int => Some(4),
            DataType::BigInt => Some(8),
            DataType::Float => Some(8),
            DataType::Boolean => Some(1),
            DataType::Text | DataType::Varchar | DataType::Vector => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Text => "TEXT",
            DataType::Varchar => "VARCHAR",
            DataType::Float => "FLOAT",
            DataType::Boolean => "BOOLEAN",
            DataType::Vector => "VECTOR",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for dt in [
            DataType::Int,
            DataType::BigInt,
            DataType::Text,
            DataType::Varchar,
            DataType::Float,
            DataType::Boolean,
            DataType::Vector,
        ] {
            assert_eq!(DataType::from_tag(dt as u8).unwrap(), dt);
        }
    }

    #[test]
    fn unknown_tag_is_corrupted() {
        assert!(matches!(DataType::from_tag(0), Err(Error::Corrupted(_))));
        assert!(matches!(DataType::from_tag(42), Err(Error::Corrupted(_))));
    }

    #[test]
    fn unknown_name_is_invalid_argument() {
        assert!(matches!(
            DataType::from_name("BLOB"),
            Err(Error::InvalidArgument(_))
        ));
    }
}
