//! # SQL Executor
//!
//! Dispatches parsed statements against the database manager. Dispatch is
//! a single match over the closed statement set; adding a statement means
//! adding a variant and an arm, not an extension point.
//!
//! ## SELECT pipeline
//!
//! 1. Resolve the left table from the current database.
//! 2. Apply WHERE against it to get the working row set.
//! 3. Fold each JOIN clause over the set (nested loop); merged rows use
//!    `table.column` keys.
//! 4. A vector ORDER BY re-routes to the vector search path.
//! 5. Aggregates route to aggregation / GROUP BY.
//! 6. Otherwise: stable ORDER BY, then OFFSET, then LIMIT, then `*`
//!    expansion and projection.
//!
//! Every mutation rewrites the affected table's file before returning,
//! while still holding that table's writer lock.

use super::aggregates::{compute_aggregates, group_rows};
use super::ast::*;
use crate::error::{Error, Result};
use crate::hnsw::HnswIndex;
use crate::storage::{evaluate_where, Database, WhereClause};
use crate::types::{Column, Row, Value, Vector};
use std::cmp::Ordering;

/// Uniform execution result: a status message, or a result set with an
/// explicit column order.
#[derive(Debug, Default)]
pub struct QueryResult {
    pub message: Option<String>,
    pub rows: Vec<Row>,
    pub columns: Vec<String>,
}

impl QueryResult {
    fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    fn with_rows(rows: Vec<Row>, columns: Vec<String>) -> Self {
        Self {
            message: None,
            rows,
            columns,
        }
    }
}

pub struct Executor<'a> {
    db: &'a Database,
}

impl<'a> Executor<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn execute(&self, stmt: Statement) -> Result<QueryResult> {
        match stmt {
            Statement::CreateDatabase { name, .. } => {
                self.db.create_database(&name)?;
                Ok(QueryResult::with_message(format!("CREATE DATABASE {name}")))
            }
            Statement::UseDatabase { name } => {
                self.db.use_database(&name)?;
                Ok(QueryResult::with_message(format!("Database changed to {name}")))
            }
            Statement::Show(kind) => self.execute_show(kind),
            Statement::CreateTable {
                name,
                columns,
                metadata,
            } => self.execute_create_table(name, columns, metadata),
            Statement::Insert {
                table,
                columns,
                values,
            } => self.execute_insert(&table, columns, values),
            Statement::Select(stmt) => self.execute_select(stmt),
            Statement::Update {
                table,
                assignments,
                where_clause,
            } => self.execute_update(&table, &assignments, where_clause.as_ref()),
            Statement::Delete {
                table,
                where_clause,
            } => self.execute_delete(&table, where_clause.as_ref()),
            Statement::DropTable { table } => {
                self.db.drop_table(&table)?;
                Ok(QueryResult::with_message(format!("DROP TABLE {table}")))
            }
            Statement::DropDatabase { name } => {
                self.db.drop_database(&name)?;
                Ok(QueryResult::with_message(format!("DROP DATABASE {name}")))
            }
            Statement::Truncate { table } => self.execute_truncate(&table),
            Statement::AlterTableAddColumn { table, column } => {
                self.execute_alter_add_column(&table, column)
            }
            Statement::Comment { target, comment } => self.execute_comment(target, &comment),
            Statement::CreateIndex(stmt) => self.execute_create_index(stmt),
            Statement::DropIndex { name } => self.execute_drop_index(&name),
        }
    }

    fn execute_show(&self, kind: ShowKind) -> Result<QueryResult> {
        match kind {
            ShowKind::Databases => {
                let current = self.db.current_database();
                let rows = self
                    .db
                    .list_databases()
                    .into_iter()
                    .map(|name| {
                        let marker = if name == current { "*" } else { "" };
                        let mut row = Row::new();
                        row.insert("Database".into(), Value::Text(name));
                        row.insert("Current".into(), Value::Text(marker.into()));
                        row
                    })
                    .collect();
                Ok(QueryResult::with_rows(
                    rows,
                    vec!["Database".into(), "Current".into()],
                ))
            }
            ShowKind::Tables => {
                let rows = self
                    .db
                    .table_names()?
                    .into_iter()
                    .map(|name| {
                        let mut row = Row::new();
                        row.insert("Table".into(), Value::Text(name));
                        row
                    })
                    .collect();
                Ok(QueryResult::with_rows(rows, vec!["Table".into()]))
            }
            ShowKind::Columns { table } => {
                let handle = self.db.table_handle(&table)?;
                let table = handle.read();
                let rows = table
                    .columns()
                    .iter()
                    .map(|col| {
                        let mut row = Row::new();
                        row.insert("Column".into(), Value::Text(col.name.clone()));
                        row.insert("Type".into(), Value::Text(col.data_type.to_string()));
                        row.insert(
                            "Nullable".into(),
                            Value::Text(if col.nullable { "YES" } else { "NO" }.into()),
                        );
                        row.insert(
                            "Comment".into(),
                            Value::Text(
                                col.metadata
                                    .as_ref()
                                    .map(|m| m.description.clone())
                                    .unwrap_or_default(),
                            ),
                        );
                        row
                    })
                    .collect();
                Ok(QueryResult::with_rows(
                    rows,
                    vec![
                        "Column".into(),
                        "Type".into(),
                        "Nullable".into(),
                        "Comment".into(),
                    ],
                ))
            }
        }
    }

    fn execute_create_table(
        &self,
        name: String,
        defs: Vec<ColumnDef>,
        metadata: Vec<String>,
    ) -> Result<QueryResult> {
        let mut columns = Vec::with_capacity(defs.len());
        for def in defs {
            if columns.iter().any(|c: &Column| c.name == def.name) {
                return Err(Error::AlreadyExists(format!(
                    "column {} already exists",
                    def.name
                )));
            }
            columns.push(Column {
                name: def.name,
                data_type: def.data_type,
                length: def.length,
                nullable: def.nullable,
                is_primary: def.is_primary,
                foreign_key: def.foreign_key,
                metadata: None,
            });
        }

        let table = crate::storage::Table::new(name.clone(), columns, object_metadata(metadata));
        self.db.create_table(table)?;
        Ok(QueryResult::with_message(format!("CREATE TABLE {name}")))
    }

    fn execute_insert(
        &self,
        table_name: &str,
        columns: Vec<String>,
        values: Vec<Vec<Value>>,
    ) -> Result<QueryResult> {
        let handle = self.db.table_handle(table_name)?;
        let schema: Vec<Column> = handle.read().columns().to_vec();

        let column_names: Vec<String> = if columns.is_empty() {
            schema.iter().map(|c| c.name.clone()).collect()
        } else {
            columns
        };
        for name in &column_names {
            if !schema.iter().any(|c| &c.name == name) {
                return Err(Error::NotFound(format!(
                    "column {name} does not exist in table {table_name}"
                )));
            }
        }

        let mut rows = Vec::with_capacity(values.len());
        for tuple in &values {
            if tuple.len() != column_names.len() {
                return Err(Error::InvalidArgument(format!(
                    "column count mismatch: expected {}, got {}",
                    column_names.len(),
                    tuple.len()
                )));
            }
            let mut row = Row::with_capacity(tuple.len());
            for (name, value) in column_names.iter().zip(tuple) {
                row.insert(name.clone(), value.clone());
            }
            rows.push(row);
        }

        for col in &schema {
            let Some(fk) = &col.foreign_key else { continue };
            for row in &rows {
                let value = row.get(&col.name).cloned().unwrap_or(Value::Null);
                if value.is_null() && col.nullable {
                    continue;
                }

                let ref_handle = self.db.table_handle(&fk.ref_table).map_err(|_| {
                    Error::NotFound(format!(
                        "referenced table {} does not exist",
                        fk.ref_table
                    ))
                })?;
                let ref_table = ref_handle.read();
                let found = ref_table.rows().iter().any(|ref_row| {
                    ref_row
                        .get(&fk.ref_column)
                        .is_some_and(|v| v.compare(&value) == Ordering::Equal)
                });
                if !found {
                    return Err(Error::ConstraintViolation(format!(
                        "foreign key constraint failed: value {} not found in {}.{}",
                        value.canonical_string(),
                        fk.ref_table,
                        fk.ref_column
                    )));
                }
            }
        }

        let inserted = rows.len();
        let mut table = handle.write();
        for row in rows {
            table.insert(row)?;
        }
        self.db.save_table(&mut table)?;

        Ok(QueryResult::with_message(format!("INSERT {inserted} row(s)")))
    }

    fn execute_select(&self, stmt: SelectStmt) -> Result<QueryResult> {
        let handle = self.db.table_handle(&stmt.table)?;
        let (mut rows, table_columns) = {
            let table = handle.read();
            (
                table.select(&["*".to_string()], stmt.where_clause.as_ref()),
                table.column_names(),
            )
        };

        if !stmt.joins.is_empty() {
            rows = self.execute_joins(&stmt.table, rows, &stmt.joins)?;
        }

        if let Some(vo) = &stmt.vector_order_by {
            return self.execute_vector_search(&stmt, vo, rows, table_columns);
        }

        if !stmt.aggregates.is_empty() {
            return self.execute_aggregate_select(&stmt, rows);
        }

        sort_rows(&mut rows, &stmt.order_by);
        apply_offset_limit(&mut rows, stmt.offset, stmt.limit);

        let columns = self.expand_columns(&stmt, &table_columns)?;
        let star = stmt.columns.len() == 1 && stmt.columns[0] == "*" && stmt.joins.is_empty();
        if !star {
            rows = rows
                .into_iter()
                .map(|row| project(&row, &columns))
                .collect();
        }

        Ok(QueryResult::with_rows(rows, columns))
    }

    /// Expands `*` to the full column list: schema order without joins,
    /// prefixed concatenation of all tables' columns with joins.
    fn expand_columns(&self, stmt: &SelectStmt, table_columns: &[String]) -> Result<Vec<String>> {
        if !(stmt.columns.len() == 1 && stmt.columns[0] == "*") {
            return Ok(stmt.columns.clone());
        }

        if stmt.joins.is_empty() {
            return Ok(table_columns.to_vec());
        }

        let mut columns: Vec<String> = table_columns
            .iter()
            .map(|c| format!("{}.{c}", stmt.table))
            .collect();
        for join in &stmt.joins {
            let join_handle = self.db.table_handle(&join.table)?;
            let join_columns = join_handle.read().column_names();
            columns.extend(join_columns.into_iter().map(|c| format!("{}.{c}", join.table)));
        }
        Ok(columns)
    }

    fn execute_joins(
        &self,
        left_table: &str,
        mut rows: Vec<Row>,
        joins: &[JoinClause],
    ) -> Result<Vec<Row>> {
        let mut left_name = left_table.to_string();

        for join in joins {
            let right_handle = self.db.table_handle(&join.table)?;
            let right_rows = right_handle.read().select(&["*".to_string()], None);

            rows = match join.join_type {
                JoinType::Inner => inner_join(
                    &left_name,
                    &rows,
                    &join.table,
                    &right_rows,
                    join.condition.as_ref(),
                ),
                JoinType::Left => left_join(
                    &left_name,
                    &rows,
                    &join.table,
                    &right_rows,
                    join.condition.as_ref(),
                ),
                JoinType::Right => right_join(
                    &left_name,
                    &rows,
                    &join.table,
                    &right_rows,
                    join.condition.as_ref(),
                ),
                JoinType::Full => full_join(
                    &left_name,
                    &rows,
                    &join.table,
                    &right_rows,
                    join.condition.as_ref(),
                ),
                JoinType::Cross => cross_join(&left_name, &rows, &join.table, &right_rows),
            };
            left_name = join.table.clone();
        }

        Ok(rows)
    }

    /// Vector search: HNSW when the target column carries an index,
    /// brute-force scan otherwise. Results gain a `_distance` column
    /// formatted to six decimal places.
    fn execute_vector_search(
        &self,
        stmt: &SelectStmt,
        vo: &VectorOrderBy,
        rows: Vec<Row>,
        table_columns: Vec<String>,
    ) -> Result<QueryResult> {
        let query = Vector::new(vo.query.clone());
        let limit = stmt.limit.unwrap_or(rows.len());
        let offset = stmt.offset.unwrap_or(0);

        let handle = self.db.table_handle(&stmt.table)?;
        let table = handle.read();

        let mut scored: Vec<(Row, f64)> = if let Some(index) = table.vector_index(&vo.column) {
            // Row ids resolve against the WHERE-derived working set.
            let mut hits: Vec<(Row, f64)> = index
                .search(&query, limit, HnswIndex::default_ef(limit))
                .into_iter()
                .filter(|hit| hit.row_id < rows.len())
                .map(|hit| (rows[hit.row_id].clone(), hit.distance))
                .collect();
            if vo.descending {
                hits.reverse();
            }
            if offset > 0 {
                hits.drain(..offset.min(hits.len()));
            }
            hits
        } else {
            // Rows without the column or with a mismatched dimension are
            // skipped silently.
            let mut all: Vec<(Row, f64)> = rows
                .iter()
                .filter_map(|row| {
                    let Value::Vector(v) = row.get(&vo.column)? else {
                        return None;
                    };
                    let distance = vo.metric.distance(&query, v).ok()?;
                    Some((row.clone(), distance))
                })
                .collect();
            all.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            if vo.descending {
                all.reverse();
            }
            let end = offset.saturating_add(limit).min(all.len());
            all.drain(..offset.min(all.len()));
            all.truncate(end.saturating_sub(offset));
            all
        };
        drop(table);

        let star = stmt.columns.len() == 1 && stmt.columns[0] == "*";
        let mut columns = if star {
            table_columns
        } else {
            stmt.columns.clone()
        };

        let result_rows = scored
            .drain(..)
            .map(|(row, distance)| {
                let mut out = if star { row } else { project(&row, &columns) };
                out.insert("_distance".into(), Value::Text(format!("{distance:.6}")));
                out
            })
            .collect();

        columns.push("_distance".into());
        Ok(QueryResult::with_rows(result_rows, columns))
    }

    fn execute_aggregate_select(&self, stmt: &SelectStmt, rows: Vec<Row>) -> Result<QueryResult> {
        if !stmt.group_by.is_empty() {
            return self.execute_group_by(stmt, rows);
        }

        let results = compute_aggregates(&rows, &stmt.aggregates)?;

        let mut columns = Vec::new();
        let mut row = Row::new();
        // Bare columns alongside aggregates evaluate on the first input
        // row (accepted under-specification).
        for col in &stmt.columns {
            if col.is_empty() || col == "*" {
                continue;
            }
            columns.push(col.clone());
            if let Some(first) = rows.first() {
                if let Some(value) = first.get(col) {
                    row.insert(col.clone(), value.clone());
                }
            }
        }
        for (alias, value) in results {
            columns.push(alias.clone());
            row.insert(alias, value);
        }

        Ok(QueryResult::with_rows(vec![row], columns))
    }

    fn execute_group_by(&self, stmt: &SelectStmt, rows: Vec<Row>) -> Result<QueryResult> {
        let groups = group_rows(&rows, &stmt.group_by);

        let mut columns = stmt.group_by.clone();
        columns.extend(stmt.aggregates.iter().map(|a| a.alias.clone()));

        let having = stmt
            .having
            .as_ref()
            .map(|clause| resolve_having(clause, &stmt.aggregates));

        let mut result_rows = Vec::with_capacity(groups.len());
        for group in groups {
            let mut row = Row::new();
            for (name, value) in &group.key_values {
                row.insert(name.clone(), value.clone());
            }
            for (alias, value) in compute_aggregates(&group.rows, &stmt.aggregates)? {
                row.insert(alias, value);
            }

            if let Some(clause) = &having {
                if !evaluate_where(&row, clause) {
                    continue;
                }
            }
            result_rows.push(row);
        }

        sort_rows(&mut result_rows, &stmt.order_by);
        apply_offset_limit(&mut result_rows, stmt.offset, stmt.limit);

        Ok(QueryResult::with_rows(result_rows, columns))
    }

    fn execute_update(
        &self,
        table_name: &str,
        assignments: &[(String, Value)],
        where_clause: Option<&WhereClause>,
    ) -> Result<QueryResult> {
        let handle = self.db.table_handle(table_name)?;
        let mut table = handle.write();
        let count = table.update(assignments, where_clause);
        self.db.save_table(&mut table)?;
        Ok(QueryResult::with_message(format!("UPDATE {count} row(s)")))
    }

    fn execute_delete(
        &self,
        table_name: &str,
        where_clause: Option<&WhereClause>,
    ) -> Result<QueryResult> {
        let handle = self.db.table_handle(table_name)?;
        let mut table = handle.write();
        let count = table.delete(where_clause);
        self.db.save_table(&mut table)?;
        Ok(QueryResult::with_message(format!("DELETE {count} row(s)")))
    }

    fn execute_truncate(&self, table_name: &str) -> Result<QueryResult> {
        let handle = self.db.table_handle(table_name)?;
        let mut table = handle.write();
        table.truncate();
        self.db.save_table(&mut table)?;
        Ok(QueryResult::with_message(format!("TRUNCATE TABLE {table_name}")))
    }

    fn execute_alter_add_column(&self, table_name: &str, def: ColumnDef) -> Result<QueryResult> {
        let handle = self.db.table_handle(table_name)?;
        let mut table = handle.write();
        let column_name = def.name.clone();
        table.add_column(Column {
            name: def.name,
            data_type: def.data_type,
            length: def.length,
            nullable: def.nullable,
            is_primary: def.is_primary,
            foreign_key: def.foreign_key,
            metadata: None,
        })?;
        self.db.save_table(&mut table)?;
        Ok(QueryResult::with_message(format!(
            "ALTER TABLE {table_name} ADD COLUMN {column_name}"
        )))
    }

    fn execute_comment(&self, target: CommentTarget, comment: &str) -> Result<QueryResult> {
        match target {
            CommentTarget::Database(name) => Ok(QueryResult::with_message(format!(
                "COMMENT ON DATABASE {name}"
            ))),
            CommentTarget::Table(name) => {
                let handle = self.db.table_handle(&name)?;
                let mut table = handle.write();
                match &mut table.metadata {
                    Some(meta) => meta.description = comment.to_string(),
                    None => {
                        table.metadata = Some(crate::types::ObjectMetadata {
                            purpose: "User comment".into(),
                            description: comment.to_string(),
                        })
                    }
                }
                self.db.save_table(&mut table)?;
                Ok(QueryResult::with_message(format!("COMMENT ON TABLE {name}")))
            }
            CommentTarget::Column { table, column } => {
                let handle = self.db.table_handle(&table)?;
                let mut t = handle.write();
                let col = t
                    .columns_mut()
                    .iter_mut()
                    .find(|c| c.name == column)
                    .ok_or_else(|| {
                        Error::NotFound(format!("column {column} not found in table {table}"))
                    })?;
                match &mut col.metadata {
                    Some(meta) => meta.description = comment.to_string(),
                    None => {
                        col.metadata = Some(crate::types::ObjectMetadata {
                            purpose: "User comment".into(),
                            description: comment.to_string(),
                        })
                    }
                }
                self.db.save_table(&mut t)?;
                Ok(QueryResult::with_message(format!(
                    "COMMENT ON COLUMN {table}.{column}"
                )))
            }
        }
    }

    fn execute_create_index(&self, stmt: CreateIndexStmt) -> Result<QueryResult> {
        if stmt.index_type != IndexType::Hnsw {
            return Err(Error::InvalidArgument(
                "unsupported index type: only HNSW is available".into(),
            ));
        }

        let handle = self.db.table_handle(&stmt.table)?;
        let mut table = handle.write();

        let column = table
            .find_column(&stmt.column)
            .ok_or_else(|| Error::NotFound(format!("column {} not found", stmt.column)))?;
        if column.data_type != crate::types::DataType::Vector {
            return Err(Error::InvalidArgument(
                "HNSW index only supported on VECTOR columns".into(),
            ));
        }

        let mut index = HnswIndex::new(
            stmt.m,
            stmt.ef_construction,
            crate::hnsw::DistanceMetric::Cosine,
        );
        for (row_id, row) in table.rows().iter().enumerate() {
            if let Some(Value::Vector(v)) = row.get(&stmt.column) {
                index.insert(v.clone(), row_id)?;
            }
        }
        table.set_vector_index(stmt.name.clone(), stmt.column.clone(), index);

        Ok(QueryResult::with_message(format!(
            "CREATE INDEX {} ON {} USING HNSW (m={}, ef_construction={})",
            stmt.name, stmt.table, stmt.m, stmt.ef_construction
        )))
    }

    fn execute_drop_index(&self, name: &str) -> Result<QueryResult> {
        for table_name in self.db.table_names()? {
            let handle = self.db.table_handle(&table_name)?;
            let mut table = handle.write();
            if table.drop_vector_index(name).is_some() {
                return Ok(QueryResult::with_message(format!("DROP INDEX {name}")));
            }
        }
        Err(Error::NotFound(format!("index {name} does not exist")))
    }
}

fn object_metadata(entries: Vec<String>) -> Option<crate::types::ObjectMetadata> {
    let mut iter = entries.into_iter();
    let purpose = iter.next()?;
    Some(crate::types::ObjectMetadata {
        purpose,
        description: iter.next().unwrap_or_default(),
    })
}

fn project(row: &Row, columns: &[String]) -> Row {
    let mut out = Row::with_capacity(columns.len());
    for name in columns {
        if let Some(value) = row.get(name) {
            out.insert(name.clone(), value.clone());
        }
    }
    out
}

/// Stable multi-key sort with the shared comparison; missing keys compare
/// as NULL.
fn sort_rows(rows: &mut [Row], order_by: &[OrderByExpr]) {
    if order_by.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for key in order_by {
            let va = a.get(&key.column).unwrap_or(&Value::Null);
            let vb = b.get(&key.column).unwrap_or(&Value::Null);
            let ord = va.compare(vb);
            if ord != Ordering::Equal {
                return if key.descending { ord.reverse() } else { ord };
            }
        }
        Ordering::Equal
    });
}

fn apply_offset_limit(rows: &mut Vec<Row>, offset: Option<usize>, limit: Option<usize>) {
    if let Some(offset) = offset {
        rows.drain(..offset.min(rows.len()));
    }
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
}

/// Looks a join-condition column up in a row: merged rows carry
/// `table.column` keys, pre-join rows carry bare names.
fn join_value<'r>(row: &'r Row, table: &str, column: &str) -> Option<&'r Value> {
    row.get(column).or_else(|| row.get(&format!("{table}.{column}")))
}

/// Null on either side never matches, for any operator.
fn join_condition_holds(
    left_row: &Row,
    left_table: &str,
    right_row: &Row,
    right_table: &str,
    condition: Option<&JoinCondition>,
) -> bool {
    let Some(cond) = condition else {
        return true;
    };
    let (Some(left), Some(right)) = (
        join_value(left_row, left_table, &cond.left_column),
        join_value(right_row, right_table, &cond.right_column),
    ) else {
        return false;
    };
    if left.is_null() || right.is_null() {
        return false;
    }
    cond.op.matches(left.compare(right))
}

/// Merges a left/right row pair under `table.column` keys. Keys already
/// prefixed by an earlier join in the chain are kept as they are.
fn merge_rows(left_row: &Row, left_table: &str, right_row: Option<(&Row, &str)>) -> Row {
    let mut merged = Row::with_capacity(left_row.len());
    for (key, value) in left_row {
        let merged_key = if key.contains('.') {
            key.clone()
        } else {
            format!("{left_table}.{key}")
        };
        merged.insert(merged_key, value.clone());
    }
    if let Some((row, table)) = right_row {
        for (key, value) in row {
            merged.insert(format!("{table}.{key}"), value.clone());
        }
    }
    merged
}

fn inner_join(
    left_table: &str,
    left_rows: &[Row],
    right_table: &str,
    right_rows: &[Row],
    condition: Option<&JoinCondition>,
) -> Vec<Row> {
    let mut result = Vec::new();
    for left in left_rows {
        for right in right_rows {
            if join_condition_holds(left, left_table, right, right_table, condition) {
                result.push(merge_rows(left, left_table, Some((right, right_table))));
            }
        }
    }
    result
}

fn left_join(
    left_table: &str,
    left_rows: &[Row],
    right_table: &str,
    right_rows: &[Row],
    condition: Option<&JoinCondition>,
) -> Vec<Row> {
    let mut result = Vec::new();
    for left in left_rows {
        let mut matched = false;
        for right in right_rows {
            if join_condition_holds(left, left_table, right, right_table, condition) {
                result.push(merge_rows(left, left_table, Some((right, right_table))));
                matched = true;
            }
        }
        if !matched {
            result.push(merge_rows(left, left_table, None));
        }
    }
    result
}

fn right_join(
    left_table: &str,
    left_rows: &[Row],
    right_table: &str,
    right_rows: &[Row],
    condition: Option<&JoinCondition>,
) -> Vec<Row> {
    let mut result = Vec::new();
    for right in right_rows {
        let mut matched = false;
        for left in left_rows {
            if join_condition_holds(left, left_table, right, right_table, condition) {
                result.push(merge_rows(left, left_table, Some((right, right_table))));
                matched = true;
            }
        }
        if !matched {
            result.push(merge_rows(right, right_table, None));
        }
    }
    result
}

fn full_join(
    left_table: &str,
    left_rows: &[Row],
    right_table: &str,
    right_rows: &[Row],
    condition: Option<&JoinCondition>,
) -> Vec<Row> {
    let mut result = Vec::new();
    let mut right_matched = vec![false; right_rows.len()];

    for left in left_rows {
        let mut matched = false;
        for (i, right) in right_rows.iter().enumerate() {
            if join_condition_holds(left, left_table, right, right_table, condition) {
                result.push(merge_rows(left, left_table, Some((right, right_table))));
                matched = true;
                right_matched[i] = true;
            }
        }
        if !matched {
            result.push(merge_rows(left, left_table, None));
        }
    }

    for (i, right) in right_rows.iter().enumerate() {
        if !right_matched[i] {
            result.push(merge_rows(right, right_table, None));
        }
    }
    result
}

fn cross_join(
    left_table: &str,
    left_rows: &[Row],
    right_table: &str,
    right_rows: &[Row],
) -> Vec<Row> {
    let mut result = Vec::new();
    for left in left_rows {
        for right in right_rows {
            result.push(merge_rows(left, left_table, Some((right, right_table))));
        }
    }
    result
}

/// Rewrites HAVING leaves written as aggregate calls (`COUNT(*)`) to the
/// alias of the matching SELECT aggregate, so they resolve against the
/// produced row.
fn resolve_having(clause: &WhereClause, aggregates: &[AggregateExpr]) -> WhereClause {
    let mut resolved = clause.clone();
    resolve_leaves(&mut resolved, aggregates);
    resolved
}

fn resolve_leaves(clause: &mut WhereClause, aggregates: &[AggregateExpr]) {
    if let Some((function, column)) = parse_aggregate_ref(&clause.column) {
        if let Some(agg) = aggregates.iter().find(|a| {
            a.function.name() == function && a.column.eq_ignore_ascii_case(&column)
        }) {
            clause.column = agg.alias.clone();
        }
    }
    if let Some(and) = &mut clause.and {
        resolve_leaves(and, aggregates);
    }
    if let Some(or) = &mut clause.or {
        resolve_leaves(or, aggregates);
    }
}

fn parse_aggregate_ref(text: &str) -> Option<(String, String)> {
    let open = text.find('(')?;
    let inner = text.strip_suffix(')')?;
    Some((
        text[..open].to_ascii_uppercase(),
        inner[open + 1..].to_string(),
    ))
}
