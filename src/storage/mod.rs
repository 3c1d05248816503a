//! # Storage Layer
//!
//! The durable side of the system: the row codec, slotted pages, the
//! table structure with its operations, the self-describing table file
//! format, the data-directory layout, and the database manager that owns
//! it all.

pub mod datadir;
pub mod database;
pub mod encoding;
pub mod page;
pub mod table;
pub mod table_file;

pub use datadir::DataDir;
pub use database::{Database, DatabaseInstance, TableHandle};
pub use page::SlottedPage;
pub use table::{evaluate_where, like_match, CompareOp, Table, WhereClause};
