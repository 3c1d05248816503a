//! # Table
//!
//! A table owns its ordered column schema, the in-memory row sequence
//! (the authoritative copy at runtime), the slotted-page list, optional
//! purpose/description metadata, and any per-column HNSW indexes.
//!
//! Pages mirror the row sequence: inserts append to the first page with
//! room, and before every save the whole page list is rebuilt from the
//! rows, so deletes and updates become visible on disk at the next flush
//! without page-level tombstoning.
//!
//! Mutations validate before touching any state — a failed insert leaves
//! both rows and pages untouched. UPDATE is the documented exception: it
//! assigns in place without re-running constraint checks.

use crate::config::PAGE_SIZE;
use crate::error::{Error, Result};
use crate::hnsw::HnswIndex;
use crate::storage::encoding::{decode_row, encode_row};
use crate::storage::page::SlottedPage;
use crate::types::{Column, DataType, ObjectMetadata, Row, Value, Vector};
use hashbrown::HashMap;
use std::cmp::Ordering;

/// Comparison operator usable in WHERE leaves, HAVING, and join conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl CompareOp {
    /// Applies the operator to an already-computed ordering.
    pub fn matches(&self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Like => false,
        }
    }
}

/// WHERE tree: a leaf plus an optional `and`/`or` continuation, evaluated
/// short-circuit left-to-right. The shape is left-deep by construction;
/// fully parenthesized boolean expressions are out of scope.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: String,
    pub op: CompareOp,
    pub value: Value,
    pub and: Option<Box<WhereClause>>,
    pub or: Option<Box<WhereClause>>,
}

impl WhereClause {
    pub fn leaf(column: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self {
            column: column.into(),
            op,
            value,
            and: None,
            or: None,
        }
    }
}

/// Evaluates a WHERE chain against one row. A leaf naming a column the
/// row does not carry is false.
pub fn evaluate_where(row: &Row, clause: &WhereClause) -> bool {
    let leaf = match row.get(&clause.column) {
        Some(value) => match clause.op {
            CompareOp::Like => like_match(&value.canonical_string(), &clause.value.canonical_string()),
            op => op.matches(value.compare(&clause.value)),
        },
        None => false,
    };

    if let Some(and) = &clause.and {
        return leaf && evaluate_where(row, and);
    }
    if let Some(or) = &clause.or {
        return leaf || evaluate_where(row, or);
    }
    leaf
}

/// Case-insensitive LIKE: `%` matches any run of bytes (including empty),
/// `_` matches exactly one byte.
pub fn like_match(value: &str, pattern: &str) -> bool {
    fn matches(s: &[u8], p: &[u8]) -> bool {
        match p.first() {
            None => s.is_empty(),
            Some(b'%') => matches(s, &p[1..]) || (!s.is_empty() && matches(&s[1..], p)),
            Some(b'_') => !s.is_empty() && matches(&s[1..], &p[1..]),
            Some(&c) => s.first() == Some(&c) && matches(&s[1..], &p[1..]),
        }
    }
    matches(
        value.to_lowercase().as_bytes(),
        pattern.to_lowercase().as_bytes(),
    )
}

pub struct Table {
    pub name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    pages: Vec<SlottedPage>,
    pub metadata: Option<ObjectMetadata>,
    vector_indexes: HashMap<String, HnswIndex>,
    index_names: HashMap<String, String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, metadata: Option<ObjectMetadata>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            pages: Vec::new(),
            metadata,
            vector_indexes: HashMap::new(),
            index_names: HashMap::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn pages(&self) -> &[SlottedPage] {
        &self.pages
    }

    pub fn vector_index(&self, column: &str) -> Option<&HnswIndex> {
        self.vector_indexes.get(column)
    }

    /// Registers an index under both its column and its CREATE INDEX name.
    pub fn set_vector_index(&mut self, index_name: String, column: String, index: HnswIndex) {
        self.index_names.insert(index_name, column.clone());
        self.vector_indexes.insert(column, index);
    }

    /// Removes the index registered under `index_name`, returning the
    /// column it covered.
    pub fn drop_vector_index(&mut self, index_name: &str) -> Option<String> {
        let column = self.index_names.remove(index_name)?;
        self.vector_indexes.remove(&column);
        Some(column)
    }

    /// Validates and appends one row. On any failure nothing is written.
    ///
    /// Checks, in order: vector literal parsing and dimension pinning,
    /// NOT NULL presence, VARCHAR byte-length bound, primary-key
    /// uniqueness. Foreign keys are checked by the executor, which can see
    /// the referenced table.
    pub fn insert(&mut self, mut row: Row) -> Result<()> {
        // VECTOR(0) columns pin their dimension on first insert; defer the
        // schema write until every check has passed.
        let mut dimension_pins: Vec<(usize, usize)> = Vec::new();

        for (idx, col) in self.columns.iter().enumerate() {
            if col.data_type != DataType::Vector {
                continue;
            }
            let Some(value) = row.get(&col.name).filter(|v| !v.is_null()) else {
                continue;
            };

            let vector = match value {
                Value::Vector(v) => v.clone(),
                Value::Text(s) => Vector::parse(s)?,
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "column {} expects a vector, got {}",
                        col.name,
                        other.canonical_string()
                    )))
                }
            };

            if col.length == 0 {
                dimension_pins.push((idx, vector.dimensions()));
            } else if vector.dimensions() != col.length {
                return Err(Error::InvalidArgument(format!(
                    "vector dimension mismatch for column {}: expected {}, got {}",
                    col.name,
                    col.length,
                    vector.dimensions()
                )));
            }

            row.insert(col.name.clone(), Value::Vector(vector));
        }

        for col in &self.columns {
            if !col.nullable && row.get(&col.name).map_or(true, Value::is_null) {
                return Err(Error::ConstraintViolation(format!(
                    "column {} cannot be NULL",
                    col.name
                )));
            }

            if col.data_type == DataType::Varchar && col.length > 0 {
                if let Some(Value::Text(s)) = row.get(&col.name) {
                    if s.len() > col.length {
                        return Err(Error::ConstraintViolation(format!(
                            "value too long for column {} (max {}, got {})",
                            col.name,
                            col.length,
                            s.len()
                        )));
                    }
                }
            }
        }

        for col in &self.columns {
            if !col.is_primary {
                continue;
            }
            let new_value = row.get(&col.name).cloned().unwrap_or(Value::Null);
            if new_value.is_null() {
                return Err(Error::ConstraintViolation(format!(
                    "PRIMARY KEY column {} cannot be NULL",
                    col.name
                )));
            }
            for existing in &self.rows {
                if let Some(existing_value) = existing.get(&col.name) {
                    if new_value.compare(existing_value) == Ordering::Equal {
                        return Err(Error::ConstraintViolation(format!(
                            "duplicate value for PRIMARY KEY column {}: {}",
                            col.name,
                            new_value.canonical_string()
                        )));
                    }
                }
            }
        }

        for (idx, dims) in dimension_pins {
            self.columns[idx].length = dims;
        }

        let encoded = encode_row(&self.columns, &row)?;
        if encoded.len() + crate::config::SLOT_SIZE > PAGE_SIZE - crate::config::PAGE_HEADER_SIZE {
            return Err(Error::InvalidArgument(format!(
                "row of {} bytes exceeds page capacity",
                encoded.len()
            )));
        }

        let page_idx = match self.pages.iter().position(|p| !p.is_full(encoded.len())) {
            Some(idx) => idx,
            None => {
                let page_id = self.pages.len() as u64;
                self.pages.push(SlottedPage::new(page_id));
                self.pages.len() - 1
            }
        };
        self.pages[page_idx].insert_row(&encoded)?;

        self.rows.push(row);
        Ok(())
    }

    /// Scans the row sequence, filters, projects. Output order is
    /// insertion order.
    pub fn select(&self, columns: &[String], filter: Option<&WhereClause>) -> Vec<Row> {
        let star = columns.len() == 1 && columns[0] == "*";
        let mut results = Vec::new();

        for row in &self.rows {
            if let Some(clause) = filter {
                if !evaluate_where(row, clause) {
                    continue;
                }
            }

            if star {
                results.push(row.clone());
            } else {
                let mut projected = Row::with_capacity(columns.len());
                for name in columns {
                    if let Some(value) = row.get(name) {
                        projected.insert(name.clone(), value.clone());
                    }
                }
                results.push(projected);
            }
        }

        results
    }

    /// Assigns columns on matching rows in place; returns the match count.
    /// Constraints are not re-validated (documented limitation).
    pub fn update(&mut self, assignments: &[(String, Value)], filter: Option<&WhereClause>) -> usize {
        let mut updated = 0;
        for row in &mut self.rows {
            if let Some(clause) = filter {
                if !evaluate_where(row, clause) {
                    continue;
                }
            }
            for (name, value) in assignments {
                row.insert(name.clone(), value.clone());
            }
            updated += 1;
        }
        updated
    }

    /// Removes matching rows; returns the removed count. Pages keep the
    /// old images until the next save rewrites them.
    pub fn delete(&mut self, filter: Option<&WhereClause>) -> usize {
        let before = self.rows.len();
        match filter {
            None => self.rows.clear(),
            Some(clause) => self.rows.retain(|row| !evaluate_where(row, clause)),
        }
        before - self.rows.len()
    }

    pub fn truncate(&mut self) {
        self.rows.clear();
        self.pages.clear();
    }

    /// Appends a column to the schema, backfilling NULL on existing rows.
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.find_column(&column.name).is_some() {
            return Err(Error::AlreadyExists(format!(
                "column {} already exists",
                column.name
            )));
        }

        let name = column.name.clone();
        self.columns.push(column);
        for row in &mut self.rows {
            row.insert(name.clone(), Value::Null);
        }
        Ok(())
    }

    /// Re-encodes every row into a fresh page list. Called before save so
    /// the file mirrors the current logical content.
    pub fn rebuild_pages(&mut self) -> Result<()> {
        let mut pages: Vec<SlottedPage> = Vec::new();
        for row in &self.rows {
            let encoded = encode_row(&self.columns, row)?;
            let fits = pages.last().map(|p| !p.is_full(encoded.len())).unwrap_or(false);
            if !fits {
                pages.push(SlottedPage::new(pages.len() as u64));
            }
            let idx = pages.len() - 1;
            pages[idx].insert_row(&encoded)?;
        }
        self.pages = pages;
        Ok(())
    }

    /// Rebuilds the in-memory row sequence by decoding every page.
    pub fn load_from_pages(&mut self) -> Result<()> {
        let mut rows = Vec::new();
        for page in &self.pages {
            for encoded in page.all_rows() {
                rows.push(decode_row(&self.columns, encoded)?);
            }
        }
        self.rows = rows;
        Ok(())
    }

    /// Replaces the page list wholesale (used by the file loader).
    pub fn set_pages(&mut self, pages: Vec<SlottedPage>) {
        self.pages = pages;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_table() -> Table {
        Table::new(
            "t",
            vec![
                Column::new("a", DataType::Int),
                Column::new("b", DataType::Int),
            ],
            None,
        )
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn insert_preserves_order_and_pages() {
        let mut t = two_column_table();
        for i in 0..3 {
            t.insert(row(&[("a", Value::Int(i)), ("b", Value::Int(i * 10))]))
                .unwrap();
        }

        let rows = t.select(&["*".into()], None);
        assert_eq!(rows.len(), 3);
        for (i, r) in rows.iter().enumerate() {
            assert_eq!(r["a"], Value::Int(i as i32));
        }
        assert_eq!(t.pages().len(), 1);
        assert_eq!(t.pages()[0].num_slots(), 3);
    }

    #[test]
    fn not_null_violation_writes_nothing() {
        let mut t = Table::new(
            "t",
            vec![
                Column::new("a", DataType::Int).not_null(),
                Column::new("b", DataType::Int),
            ],
            None,
        );

        let err = t.insert(row(&[("b", Value::Int(1))])).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
        assert!(t.rows().is_empty());
        assert!(t.pages().is_empty());
    }

    #[test]
    fn varchar_overflow_is_rejected_by_bytes() {
        let mut t = Table::new(
            "t",
            vec![Column::new("name", DataType::Varchar).with_length(5)],
            None,
        );

        t.insert(row(&[("name", Value::Text("abcde".into()))])).unwrap();
        let err = t
            .insert(row(&[("name", Value::Text("abcdef".into()))]))
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
    }

    #[test]
    fn primary_key_rejects_duplicates_across_types() {
        let mut t = Table::new(
            "t",
            vec![
                Column::new("id", DataType::Int).primary_key(),
                Column::new("n", DataType::Text),
            ],
            None,
        );

        t.insert(row(&[("id", Value::Int(1)), ("n", Value::Text("x".into()))]))
            .unwrap();
        let err = t
            .insert(row(&[("id", Value::BigInt(1)), ("n", Value::Text("y".into()))]))
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
        assert_eq!(t.rows().len(), 1);
    }

    #[test]
    fn vector_dimension_pins_on_first_insert() {
        let mut t = Table::new(
            "t",
            vec![Column::new("v", DataType::Vector)],
            None,
        );

        t.insert(row(&[("v", Value::Text("[1, 2, 3]".into()))])).unwrap();
        assert_eq!(t.find_column("v").unwrap().length, 3);

        let err = t
            .insert(row(&[("v", Value::Text("[1, 2]".into()))]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(t.rows().len(), 1);
    }

    #[test]
    fn where_and_or_chains() {
        let mut t = two_column_table();
        for (a, b) in [(1, 10), (2, 20), (3, 30)] {
            t.insert(row(&[("a", Value::Int(a)), ("b", Value::Int(b))]))
                .unwrap();
        }

        let mut and = WhereClause::leaf("b", CompareOp::Ge, Value::Int(20));
        and.and = Some(Box::new(WhereClause::leaf("a", CompareOp::Ne, Value::Int(2))));
        let rows = t.select(&["a".into()], Some(&and));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], Value::Int(3));

        let mut or = WhereClause::leaf("b", CompareOp::Eq, Value::Int(10));
        or.or = Some(Box::new(WhereClause::leaf("b", CompareOp::Eq, Value::Int(30))));
        let rows = t.select(&["a".into()], Some(&or));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["a"], Value::Int(1));
        assert_eq!(rows[1]["a"], Value::Int(3));
    }

    #[test]
    fn update_counts_and_assigns_in_place() {
        let mut t = two_column_table();
        for (a, b) in [(1, 10), (2, 20)] {
            t.insert(row(&[("a", Value::Int(a)), ("b", Value::Int(b))]))
                .unwrap();
        }

        let clause = WhereClause::leaf("a", CompareOp::Eq, Value::Int(2));
        let n = t.update(&[("b".into(), Value::Int(99))], Some(&clause));
        assert_eq!(n, 1);
        assert_eq!(t.rows()[1]["b"], Value::Int(99));
    }

    #[test]
    fn delete_and_truncate() {
        let mut t = two_column_table();
        for a in 1..=4 {
            t.insert(row(&[("a", Value::Int(a)), ("b", Value::Int(a))]))
                .unwrap();
        }

        let clause = WhereClause::leaf("a", CompareOp::Le, Value::Int(2));
        assert_eq!(t.delete(Some(&clause)), 2);
        assert_eq!(t.rows().len(), 2);
        assert_eq!(t.delete(None), 2);

        t.insert(row(&[("a", Value::Int(1)), ("b", Value::Int(1))])).unwrap();
        t.truncate();
        assert!(t.rows().is_empty());
        assert!(t.pages().is_empty());
    }

    #[test]
    fn add_column_backfills_null_and_rejects_collisions() {
        let mut t = two_column_table();
        t.insert(row(&[("a", Value::Int(1)), ("b", Value::Int(2))])).unwrap();

        t.add_column(Column::new("c", DataType::Text)).unwrap();
        assert_eq!(t.rows()[0]["c"], Value::Null);

        assert!(matches!(
            t.add_column(Column::new("a", DataType::Int)),
            Err(Error::AlreadyExists(_))
        ));
    }

    #[test]
    fn rebuild_pages_then_load_round_trips() {
        let mut t = two_column_table();
        for a in 0..100 {
            t.insert(row(&[("a", Value::Int(a)), ("b", Value::Int(a * 2))]))
                .unwrap();
        }
        t.delete(Some(&WhereClause::leaf("a", CompareOp::Lt, Value::Int(50))));

        t.rebuild_pages().unwrap();
        t.load_from_pages().unwrap();

        assert_eq!(t.rows().len(), 50);
        assert_eq!(t.rows()[0]["a"], Value::Int(50));
    }

    #[test]
    fn like_matcher_semantics() {
        assert!(like_match("hello", "hello"));
        assert!(like_match("HELLO", "hello"));
        assert!(like_match("hello", "h%"));
        assert!(like_match("hello", "%llo"));
        assert!(like_match("hello", "%"));
        assert!(like_match("hello", "h_llo"));
        assert!(!like_match("hello", "h_"));
        assert!(!like_match("hello", "world%"));
        assert!(like_match("", "%"));
        assert!(!like_match("", "_"));
    }
}
