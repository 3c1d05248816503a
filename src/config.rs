//! # Configuration Constants
//!
//! Central home for the on-disk format constants and the HNSW defaults.
//! Interdependent values are co-located and guarded by compile-time
//! assertions so a change to one cannot silently break another.
//!
//! ```text
//! PAGE_SIZE (16384 bytes)
//!       │
//!       ├─> PAGE_HEADER_SIZE (12 bytes: page_id u64 + num_slots u16 + free_start u16)
//!       │
//!       └─> SLOT_SIZE (4 bytes: row_offset u16 + row_length u16)
//!             Slot offsets address within one page, so PAGE_SIZE must fit in u16.
//!
//! TABLE_FILE_HEADER_SIZE (64 bytes, zero-padded)
//!       └─> magic "GTBL" + u32 version + u16 num_columns + u32 num_pages
//! ```

/// Size of every data page, serialized and in memory.
pub const PAGE_SIZE: usize = 16384;

/// Slotted-page header: `u64 page_id` + `u16 num_slots` + `u16 free_start`.
pub const PAGE_HEADER_SIZE: usize = 12;

/// Slot directory entry: `u16 row_offset` + `u16 row_length`.
pub const SLOT_SIZE: usize = 4;

/// Magic bytes at offset 0 of every table file.
pub const TABLE_FILE_MAGIC: &[u8; 4] = b"GTBL";

/// Current table file format version.
pub const TABLE_FILE_VERSION: u32 = 1;

/// Reserved size of the table file header; unused bytes are zero.
pub const TABLE_FILE_HEADER_SIZE: usize = 64;

/// Upper bound on HNSW graph layers.
pub const HNSW_MAX_LAYERS: usize = 16;

/// Default target degree when CREATE INDEX omits `m`.
pub const HNSW_DEFAULT_M: usize = 16;

/// Default build-time candidate budget when CREATE INDEX omits `ef_construction`.
pub const HNSW_DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Floor for the query-time candidate budget: `ef = max(50, 2k)`.
pub const HNSW_MIN_EF_SEARCH: usize = 50;

/// Default VARCHAR length when the declaration omits `(n)`.
pub const VARCHAR_DEFAULT_LENGTH: usize = 255;

/// Name of the database created on first startup when none exist.
pub const DEFAULT_DATABASE: &str = "ghostsql";

/// PID lock file at the data directory root.
pub const LOCK_FILE_NAME: &str = "ghostsql.pid";

// Slot offsets are u16, so a page must be addressable within one.
const _: () = assert!(PAGE_SIZE <= u16::MAX as usize + 1);
const _: () = assert!(PAGE_HEADER_SIZE + SLOT_SIZE < PAGE_SIZE);
