//! # Row Codec
//!
//! Deterministic little-endian encoding of a row against a column schema.
//!
//! ## Layout
//!
//! ```text
//! u16 column_count
//! for each column in schema order:
//!     u16 null_flag          (1 = null, 0 = present)
//!     if present, payload by type:
//!       INT       -> 4 bytes
//!       BIGINT    -> 8 bytes
//!       FLOAT     -> 8 bytes IEEE-754
//!       BOOLEAN   -> 1 byte (0 or 1)
//!       TEXT/VAR  -> u32 byte length + UTF-8 bytes
//!       VECTOR    -> u32 dimension + dimension x 4 bytes f32
//! ```
//!
//! Encoding is total for any value: numeric variants truncate into INT and
//! BIGINT columns the same way the comparison rule does, non-text values
//! render their canonical string into TEXT columns. Decoding fails with
//! `Corrupted` when the column count disagrees with the schema or any
//! declared field runs past the end of the buffer.

use crate::error::{Error, Result};
use crate::types::{Column, DataType, Row, Value, Vector};

/// Encodes `row` against `columns`; absent keys encode as null.
pub fn encode_row(columns: &[Column], row: &Row) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(&(columns.len() as u16).to_le_bytes());

    for col in columns {
        let value = row.get(&col.name).filter(|v| !v.is_null());
        let Some(value) = value else {
            buf.extend_from_slice(&1u16.to_le_bytes());
            continue;
        };
        buf.extend_from_slice(&0u16.to_le_bytes());

        match col.data_type {
            DataType::Int => buf.extend_from_slice(&value.to_i32().to_le_bytes()),
            DataType::BigInt => buf.extend_from_slice(&value.to_i64().to_le_bytes()),
            DataType::Float => {
                let f = value.to_f64().unwrap_or(0.0);
                buf.extend_from_slice(&f.to_le_bytes());
            }
            DataType::Boolean => buf.push(value.to_bool() as u8),
            DataType::Text | DataType::Varchar => {
                let s = match value {
                    Value::Text(s) => s.clone(),
                    other => other.canonical_string(),
                };
                buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
            DataType::Vector => {
                let Value::Vector(vec) = value else {
                    return Err(Error::InvalidArgument(format!(
                        "column {} expects a vector value",
                        col.name
                    )));
                };
                buf.extend_from_slice(&(vec.dimensions() as u32).to_le_bytes());
                for v in vec.values() {
                    buf.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
    }

    Ok(buf)
}

/// Decodes a row previously produced by [`encode_row`] with the same schema.
pub fn decode_row(columns: &[Column], data: &[u8]) -> Result<Row> {
    let mut reader = Reader::new(data);

    let col_count = reader.read_u16()? as usize;
    if col_count != columns.len() {
        return Err(Error::Corrupted(format!(
            "column count mismatch: expected {}, got {}",
            columns.len(),
            col_count
        )));
    }

    let mut row = Row::with_capacity(col_count);
    for col in columns {
        let null_flag = reader.read_u16()?;
        if null_flag == 1 {
            row.insert(col.name.clone(), Value::Null);
            continue;
        }

        let value = match col.data_type {
            DataType::Int => Value::Int(i32::from_le_bytes(reader.read_array()?)),
            DataType::BigInt => Value::BigInt(i64::from_le_bytes(reader.read_array()?)),
            DataType::Float => Value::Float(f64::from_le_bytes(reader.read_array()?)),
            DataType::Boolean => Value::Bool(reader.read_u8()? == 1),
            DataType::Text | DataType::Varchar => {
                let len = reader.read_u32()? as usize;
                let bytes = reader.read_bytes(len)?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|_| Error::Corrupted("invalid UTF-8 in string field".into()))?;
                Value::Text(s.to_string())
            }
            DataType::Vector => {
                let dims = reader.read_u32()? as usize;
                let mut values = Vec::with_capacity(dims);
                for _ in 0..dims {
                    values.push(f32::from_le_bytes(reader.read_array()?));
                }
                Value::Vector(Vector::new(values))
            }
        };
        row.insert(col.name.clone(), value);
    }

    Ok(row)
}

/// Cursor over an encoded row; every read is bounds-checked so truncated
/// buffers surface as `Corrupted` rather than panics.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&e| e <= self.data.len())
            .ok_or_else(|| Error::Corrupted("unexpected end of row data".into()))?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<Column> {
        vec![
            Column::new("id", DataType::Int),
            Column::new("big", DataType::BigInt),
            Column::new("score", DataType::Float),
            Column::new("active", DataType::Boolean),
            Column::new("name", DataType::Varchar).with_length(16),
            Column::new("bio", DataType::Text),
            Column::new("embedding", DataType::Vector).with_length(3),
        ]
    }

    fn sample_row() -> Row {
        let mut row = Row::new();
        row.insert("id".into(), Value::Int(7));
        row.insert("big".into(), Value::BigInt(1 << 40));
        row.insert("score".into(), Value::Float(0.25));
        row.insert("active".into(), Value::Bool(true));
        row.insert("name".into(), Value::Text("ada".into()));
        row.insert("bio".into(), Value::Null);
        row.insert(
            "embedding".into(),
            Value::Vector(Vector::new(vec![1.0, 0.5, -2.0])),
        );
        row
    }

    #[test]
    fn round_trip_preserves_values() {
        let cols = schema();
        let row = sample_row();
        let encoded = encode_row(&cols, &row).unwrap();
        let decoded = decode_row(&cols, &encoded).unwrap();

        assert_eq!(decoded["id"], Value::Int(7));
        assert_eq!(decoded["big"], Value::BigInt(1 << 40));
        assert_eq!(decoded["score"], Value::Float(0.25));
        assert_eq!(decoded["active"], Value::Bool(true));
        assert_eq!(decoded["name"], Value::Text("ada".into()));
        assert_eq!(decoded["bio"], Value::Null);
        assert_eq!(
            decoded["embedding"],
            Value::Vector(Vector::new(vec![1.0, 0.5, -2.0]))
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let cols = schema();
        let row = sample_row();
        assert_eq!(
            encode_row(&cols, &row).unwrap(),
            encode_row(&cols, &row).unwrap()
        );
    }

    #[test]
    fn absent_key_encodes_as_null() {
        let cols = vec![Column::new("a", DataType::Int), Column::new("b", DataType::Int)];
        let mut row = Row::new();
        row.insert("a".into(), Value::Int(1));

        let decoded = decode_row(&cols, &encode_row(&cols, &row).unwrap()).unwrap();
        assert_eq!(decoded["b"], Value::Null);
    }

    #[test]
    fn column_count_mismatch_is_corrupted() {
        let cols = vec![Column::new("a", DataType::Int)];
        let mut row = Row::new();
        row.insert("a".into(), Value::Int(1));
        let encoded = encode_row(&cols, &row).unwrap();

        let wider = vec![Column::new("a", DataType::Int), Column::new("b", DataType::Int)];
        assert!(matches!(
            decode_row(&wider, &encoded),
            Err(Error::Corrupted(_))
        ));
    }

    #[test]
    fn truncated_buffer_is_corrupted() {
        let cols = vec![Column::new("name", DataType::Text)];
        let mut row = Row::new();
        row.insert("name".into(), Value::Text("hello".into()));
        let encoded = encode_row(&cols, &row).unwrap();

        for cut in 1..encoded.len() {
            assert!(
                matches!(decode_row(&cols, &encoded[..cut]), Err(Error::Corrupted(_))),
                "cut at {cut} should fail"
            );
        }
    }

    #[test]
    fn length_prefix_past_buffer_is_corrupted() {
        // column count 1, not-null, declared string length 100 with 2 bytes present
        let mut bad = Vec::new();
        bad.extend_from_slice(&1u16.to_le_bytes());
        bad.extend_from_slice(&0u16.to_le_bytes());
        bad.extend_from_slice(&100u32.to_le_bytes());
        bad.extend_from_slice(b"ab");

        let cols = vec![Column::new("name", DataType::Text)];
        assert!(matches!(decode_row(&cols, &bad), Err(Error::Corrupted(_))));
    }

    #[test]
    fn numeric_coercion_truncates_into_int_column() {
        let cols = vec![Column::new("n", DataType::Int)];
        let mut row = Row::new();
        row.insert("n".into(), Value::Float(3.9));

        let decoded = decode_row(&cols, &encode_row(&cols, &row).unwrap()).unwrap();
        assert_eq!(decoded["n"], Value::Int(3));
    }
}
