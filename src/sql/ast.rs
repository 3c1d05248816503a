//! # Statement AST
//!
//! The closed set of statements the executor dispatches on, plus the
//! supporting nodes (column definitions, where chains, joins, aggregates,
//! vector ORDER BY). Fields are plain data: names, operators, tagged
//! values, and nested clauses. Adding a statement means adding a variant
//! here and an arm in the executor — there is no extension point.

use crate::hnsw::DistanceMetric;
use crate::storage::{CompareOp, WhereClause};
use crate::types::{DataType, ForeignKey};

/// Column definition as written in CREATE TABLE / ALTER TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    /// VARCHAR bound or VECTOR dimension.
    pub length: usize,
    pub nullable: bool,
    pub is_primary: bool,
    pub foreign_key: Option<ForeignKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }

    /// Default alias when the query has no `AS`: `<func>_<col>` lowercased.
    pub fn default_alias(&self, column: &str) -> String {
        format!("{}_{}", self.name().to_lowercase(), column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub function: AggregateFunction,
    /// Column name, or `*` (COUNT only).
    pub column: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub column: String,
    pub descending: bool,
}

/// `ORDER BY <distance_fn>(<column>, <vector>)` re-routes the SELECT into
/// the vector search path.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorOrderBy {
    pub metric: DistanceMetric,
    pub column: String,
    pub query: Vec<f32>,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// Join condition over one unprefixed column per side.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub left_column: String,
    pub op: CompareOp,
    pub right_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub condition: Option<JoinCondition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub columns: Vec<String>,
    pub aggregates: Vec<AggregateExpr>,
    pub table: String,
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<WhereClause>,
    pub group_by: Vec<String>,
    pub having: Option<WhereClause>,
    pub order_by: Vec<OrderByExpr>,
    pub vector_order_by: Option<VectorOrderBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowKind {
    Databases,
    Tables,
    Columns { table: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentTarget {
    Database(String),
    Table(String),
    Column { table: String, column: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Hnsw,
    Btree,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    pub name: String,
    pub table: String,
    pub column: String,
    pub index_type: IndexType,
    pub m: usize,
    pub ef_construction: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateDatabase {
        name: String,
        metadata: Vec<String>,
    },
    UseDatabase {
        name: String,
    },
    Show(ShowKind),
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
        metadata: Vec<String>,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Vec<crate::types::Value>>,
    },
    Select(SelectStmt),
    Update {
        table: String,
        assignments: Vec<(String, crate::types::Value)>,
        where_clause: Option<WhereClause>,
    },
    Delete {
        table: String,
        where_clause: Option<WhereClause>,
    },
    DropTable {
        table: String,
    },
    DropDatabase {
        name: String,
    },
    Truncate {
        table: String,
    },
    AlterTableAddColumn {
        table: String,
        column: ColumnDef,
    },
    Comment {
        target: CommentTarget,
        comment: String,
    },
    CreateIndex(CreateIndexStmt),
    DropIndex {
        name: String,
    },
}
