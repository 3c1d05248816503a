//! # Column and Schema Metadata
//!
//! A column carries its name, type, optional length (VARCHAR bound or
//! VECTOR dimension), nullability, a primary-key flag, an optional
//! foreign-key reference, and optional purpose/description metadata.
//!
//! Only name, type tag, and nullability survive the on-disk schema block;
//! columns reloaded from a v1 table file come back with `length = 0` and
//! no constraints. See the format notes in `storage::table_file`.

use super::DataType;

/// Foreign-key reference: the non-null values of this column must exist in
/// `ref_table.ref_column` at insert time. No cascades, no enforcement on
/// the referenced side.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub ref_table: String,
    pub ref_column: String,
}

/// Purpose/description pair attachable to tables and columns via
/// `METADATA [...]` and `COMMENT ON`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMetadata {
    pub purpose: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    /// VARCHAR byte bound, or VECTOR dimension (0 = pinned by first insert).
    pub length: usize,
    pub nullable: bool,
    pub is_primary: bool,
    pub foreign_key: Option<ForeignKey>,
    pub metadata: Option<ObjectMetadata>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: 0,
            nullable: true,
            is_primary: false,
            foreign_key: None,
            metadata: None,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary = true;
        self.nullable = false;
        self
    }
}
