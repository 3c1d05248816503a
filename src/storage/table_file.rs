//! # Table File Format
//!
//! Each table persists as `<name>.tbl`: a 64-byte zero-padded header, a
//! schema block, then the raw page images. The file is self-describing —
//! the schema block is enough to decode every row without the catalog.
//!
//! ## Header (64 bytes)
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0 | 4 | magic ASCII `GTBL` |
//! | 4 | 4 | u32 version (currently 1) |
//! | 8 | 2 | u16 num_columns |
//! | 10 | 4 | u32 num_pages |
//! | 14..63 | | reserved, zero |
//!
//! ## Schema block
//!
//! Per column: `u16 name_length` + UTF-8 name + `u8 type_tag` +
//! `u8 nullable`. The v1 block omits length and constraint metadata, so
//! reloaded columns carry `length = 0` and no PK/FK flags. A v2 format
//! should extend the block and bump the version while keeping the magic.
//!
//! Table metadata (purpose/description) lives in a sibling `<name>.meta`
//! file as two UTF-8 lines.

use crate::config::{PAGE_SIZE, TABLE_FILE_HEADER_SIZE, TABLE_FILE_MAGIC, TABLE_FILE_VERSION};
use crate::error::{Error, Result};
use crate::storage::page::SlottedPage;
use crate::storage::table::Table;
use crate::types::{Column, DataType, ObjectMetadata};
use std::fs;
use std::path::Path;
use zerocopy::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
struct TableFileHeader {
    magic: [u8; 4],
    version: U32,
    num_columns: U16,
    num_pages: U32,
    reserved: [u8; 50],
}

const _: () = assert!(std::mem::size_of::<TableFileHeader>() == TABLE_FILE_HEADER_SIZE);

impl TableFileHeader {
    fn new(num_columns: u16, num_pages: u32) -> Self {
        Self {
            magic: *TABLE_FILE_MAGIC,
            version: U32::new(TABLE_FILE_VERSION),
            num_columns: U16::new(num_columns),
            num_pages: U32::new(num_pages),
            reserved: [0u8; 50],
        }
    }

    fn parse(bytes: &[u8]) -> Result<&Self> {
        if bytes.len() < TABLE_FILE_HEADER_SIZE {
            return Err(Error::Corrupted("table file shorter than header".into()));
        }
        let header = Self::ref_from_bytes(&bytes[..TABLE_FILE_HEADER_SIZE])
            .map_err(|_| Error::Corrupted("unreadable table file header".into()))?;

        if &header.magic != TABLE_FILE_MAGIC {
            return Err(Error::Corrupted(format!(
                "invalid table file magic: {:?}",
                header.magic
            )));
        }
        if header.version.get() != TABLE_FILE_VERSION {
            return Err(Error::Corrupted(format!(
                "unsupported table file version: {}",
                header.version.get()
            )));
        }
        Ok(header)
    }
}

/// Rebuilds the table's pages from its rows and rewrites the whole file:
/// header, schema block, page images. The sibling `.meta` file is written
/// when the table carries metadata.
pub fn save_table(table: &mut Table, path: &Path) -> Result<()> {
    table.rebuild_pages()?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let columns = table.columns();
    let mut buf = Vec::with_capacity(TABLE_FILE_HEADER_SIZE + table.pages().len() * PAGE_SIZE);

    let header = TableFileHeader::new(columns.len() as u16, table.pages().len() as u32);
    buf.extend_from_slice(header.as_bytes());

    for col in columns {
        buf.extend_from_slice(&(col.name.len() as u16).to_le_bytes());
        buf.extend_from_slice(col.name.as_bytes());
        buf.push(col.data_type as u8);
        buf.push(col.nullable as u8);
    }

    for page in table.pages() {
        buf.extend_from_slice(page.as_bytes());
    }

    fs::write(path, &buf)?;

    if let Some(meta) = &table.metadata {
        let meta_path = path.with_extension("meta");
        fs::write(meta_path, format!("{}\n{}\n", meta.purpose, meta.description))?;
    }

    tracing::debug!(table = %table.name, pages = table.pages().len(), "saved table file");
    Ok(())
}

/// Loads a table file written by [`save_table`], rehydrating schema,
/// pages, and the in-memory row sequence.
pub fn load_table(name: &str, path: &Path) -> Result<Table> {
    let data = fs::read(path)?;
    let header = TableFileHeader::parse(&data)?;
    let num_columns = header.num_columns.get() as usize;
    let num_pages = header.num_pages.get() as usize;

    let mut offset = TABLE_FILE_HEADER_SIZE;
    let mut columns = Vec::with_capacity(num_columns);
    for _ in 0..num_columns {
        let name_len = read_u16(&data, &mut offset)? as usize;
        let name_bytes = read_bytes(&data, &mut offset, name_len)?;
        let col_name = std::str::from_utf8(name_bytes)
            .map_err(|_| Error::Corrupted("invalid UTF-8 in column name".into()))?
            .to_string();

        let type_tag = read_bytes(&data, &mut offset, 1)?[0];
        let nullable = read_bytes(&data, &mut offset, 1)?[0] == 1;

        let mut column = Column::new(col_name, DataType::from_tag(type_tag)?);
        column.nullable = nullable;
        columns.push(column);
    }

    let mut pages = Vec::with_capacity(num_pages);
    for _ in 0..num_pages {
        let image = read_bytes(&data, &mut offset, PAGE_SIZE)?;
        pages.push(SlottedPage::load(image)?);
    }

    let mut table = Table::new(name, columns, None);
    table.set_pages(pages);
    table.load_from_pages()?;

    let meta_path = path.with_extension("meta");
    if let Ok(meta_text) = fs::read_to_string(&meta_path) {
        let mut lines = meta_text.lines();
        table.metadata = Some(ObjectMetadata {
            purpose: lines.next().unwrap_or_default().to_string(),
            description: lines.next().unwrap_or_default().to_string(),
        });
    }

    tracing::debug!(table = %table.name, rows = table.rows().len(), "loaded table file");
    Ok(table)
}

fn read_bytes<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .filter(|&e| e <= data.len())
        .ok_or_else(|| Error::Corrupted("truncated table file".into()))?;
    let slice = &data[*offset..end];
    *offset = end;
    Ok(slice)
}

fn read_u16(data: &[u8], offset: &mut usize) -> Result<u16> {
    let bytes = read_bytes(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Row, Value};
    use tempfile::tempdir;

    fn sample_table() -> Table {
        let mut t = Table::new(
            "people",
            vec![
                Column::new("id", DataType::Int).not_null(),
                Column::new("name", DataType::Varchar).with_length(10),
            ],
            Some(ObjectMetadata {
                purpose: "test fixture".into(),
                description: "people rows".into(),
            }),
        );
        for (id, name) in [(1, "ada"), (2, "grace")] {
            let mut row = Row::new();
            row.insert("id".into(), Value::Int(id));
            row.insert("name".into(), Value::Text(name.into()));
            t.insert(row).unwrap();
        }
        t
    }

    #[test]
    fn save_then_load_round_trips_rows_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.tbl");

        let mut table = sample_table();
        save_table(&mut table, &path).unwrap();

        let loaded = load_table("people", &path).unwrap();
        assert_eq!(loaded.columns().len(), 2);
        assert_eq!(loaded.columns()[0].name, "id");
        assert!(!loaded.columns()[0].nullable);
        assert_eq!(loaded.columns()[1].data_type, DataType::Varchar);
        // v1 schema block drops the length bound
        assert_eq!(loaded.columns()[1].length, 0);

        assert_eq!(loaded.rows().len(), 2);
        assert_eq!(loaded.rows()[0]["name"], Value::Text("ada".into()));
        assert_eq!(loaded.rows()[1]["id"], Value::Int(2));

        let meta = loaded.metadata.unwrap();
        assert_eq!(meta.purpose, "test fixture");
        assert_eq!(meta.description, "people rows");
    }

    #[test]
    fn file_size_is_header_plus_schema_plus_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.tbl");
        let mut table = sample_table();
        save_table(&mut table, &path).unwrap();

        let schema_len: usize = table
            .columns()
            .iter()
            .map(|c| 2 + c.name.len() + 2)
            .sum();
        let expected = TABLE_FILE_HEADER_SIZE + schema_len + table.pages().len() * PAGE_SIZE;
        assert_eq!(fs::metadata(&path).unwrap().len() as usize, expected);
    }

    #[test]
    fn bad_magic_is_corrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("junk.tbl");
        fs::write(&path, vec![0u8; 200]).unwrap();
        assert!(matches!(load_table("junk", &path), Err(Error::Corrupted(_))));
    }

    #[test]
    fn unsupported_version_is_corrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v9.tbl");

        let mut table = sample_table();
        save_table(&mut table, &path).unwrap();

        let mut data = fs::read(&path).unwrap();
        data[4..8].copy_from_slice(&9u32.to_le_bytes());
        fs::write(&path, &data).unwrap();

        assert!(matches!(load_table("v9", &path), Err(Error::Corrupted(_))));
    }

    #[test]
    fn truncated_page_section_is_corrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cut.tbl");

        let mut table = sample_table();
        save_table(&mut table, &path).unwrap();

        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() - 100]).unwrap();

        assert!(matches!(load_table("cut", &path), Err(Error::Corrupted(_))));
    }
}
