//! # Type System
//!
//! The closed column-type set, the runtime value union with the system's
//! single cross-type comparison, column/schema metadata, and the dense
//! float vector representation.

mod column;
mod data_type;
mod value;
mod vector;

pub use column::{Column, ForeignKey, ObjectMetadata};
pub use data_type::DataType;
pub use value::Value;
pub use vector::Vector;

/// A row maps column names to values. Column order is owned by the table
/// schema; a row's keys are always a subset of that schema.
pub type Row = hashbrown::HashMap<String, Value>;
