//! # Data Directory Layout
//!
//! ```text
//! <root>/
//!   ghostsql.pid                              ASCII PID + newline
//!   databases/<db>/tables/<table>.tbl         header + schema + pages
//!   databases/<db>/tables/<table>.meta        "<purpose>\n<description>\n"
//!   databases/<db>/{indexes,vectors}/         reserved, empty
//!   metadata/  wal/  temp/  vectors/          reserved
//! ```
//!
//! The default root is `data/` next to the executable; tests and tools
//! pass an explicit root instead.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
    databases: PathBuf,
}

impl DataDir {
    /// Creates the directory tree under `root` (idempotent).
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let databases = root.join("databases");

        for dir in [
            &root,
            &databases,
            &root.join("wal"),
            &root.join("vectors"),
            &root.join("metadata"),
            &root.join("temp"),
        ] {
            fs::create_dir_all(dir)?;
        }

        Ok(Self { root, databases })
    }

    /// The default root: `data/` relative to the running executable.
    pub fn default_root() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let exe_dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(exe_dir.join("data"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn databases_path(&self) -> &Path {
        &self.databases
    }

    pub fn database_path(&self, db: &str) -> PathBuf {
        self.databases.join(db)
    }

    /// Creates `databases/<db>/{tables,indexes,vectors}` and returns the
    /// database directory.
    pub fn create_database_dirs(&self, db: &str) -> Result<PathBuf> {
        let db_path = self.database_path(db);
        for dir in ["tables", "indexes", "vectors"] {
            fs::create_dir_all(db_path.join(dir))?;
        }
        Ok(db_path)
    }

    pub fn table_file_path(&self, db: &str, table: &str) -> PathBuf {
        self.database_path(db).join("tables").join(format!("{table}.tbl"))
    }
}
