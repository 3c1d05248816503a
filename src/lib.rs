//! # GhostSQL - Embedded SQL + Vector Search
//!
//! A small embedded relational database with first-class vector
//! similarity search: binary row storage in 16 KiB slotted pages, named
//! databases persisted as directories, a tree-walking SQL executor, and
//! an in-memory HNSW index for approximate nearest-neighbor queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │        Shell / driver (cli)          │
//! ├──────────────────────────────────────┤
//! │   SQL layer (lexer/parser/executor)  │
//! ├──────────────────────────────────────┤
//! │  Database manager │ HNSW vector index│
//! ├───────────────────┴──────────────────┤
//! │  Table: rows + slotted pages + codec │
//! ├──────────────────────────────────────┤
//! │    Table files under data/databases  │
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use ghostsql::{Database, Executor, Parser};
//!
//! let db = Database::initialize_at("./data")?;
//! let exec = Executor::new(&db);
//!
//! let stmt = Parser::new("CREATE TABLE t (id INT PRIMARY KEY, v VECTOR(4))").parse()?;
//! exec.execute(stmt)?;
//!
//! db.shutdown()?;
//! ```
//!
//! ## On-Disk Layout
//!
//! ```text
//! data/
//!   ghostsql.pid
//!   databases/<db>/tables/<table>.tbl    header + schema + pages
//!   databases/<db>/tables/<table>.meta   purpose + description
//!   databases/<db>/{indexes,vectors}/    reserved
//!   metadata/ wal/ temp/ vectors/        reserved
//! ```
//!
//! Writes to a single table are totally ordered by its writer lock and
//! durable when the writer returns; there are no cross-table transactions
//! and no WAL content in this revision. HNSW indexes are in-memory only
//! and rebuilt with `CREATE INDEX` after a restart.

pub mod cli;
pub mod config;
pub mod error;
pub mod hnsw;
pub mod sql;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use hnsw::{DistanceMetric, HnswIndex};
pub use sql::{Executor, Parser, QueryResult, Statement};
pub use storage::{Database, Table};
pub use types::{Column, DataType, Row, Value, Vector};
