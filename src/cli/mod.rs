//! # Command-Line Interface
//!
//! The interactive shell and the ASCII result formatter.

pub mod repl;
pub mod table;

pub use repl::{execute_line, Repl};
pub use table::TableFormatter;
