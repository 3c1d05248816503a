//! # Database Manager
//!
//! The owned root object of the server: a data directory, the map of
//! named databases, and the current-database selector. Constructed once at
//! startup and threaded by reference into the executor — no process
//! globals.
//!
//! ## Concurrency Model
//!
//! Single-writer per table, overlapping readers. Every table sits behind
//! its own `RwLock`; Insert/Update/Delete/Truncate/AddColumn hold the
//! writer lock for the full operation including the file rewrite, Select
//! holds the reader lock. The manager's own `RwLock` guards the
//! `(current_database, databases)` pair; it is held across catalog-level
//! file operations (create/drop) but never across row mutations.
//!
//! ## Lifecycle
//!
//! Startup: create the data directory tree, acquire the PID lock
//! (`O_CREATE|O_EXCL`; a stale lock after a crash must be removed
//! manually), scan `databases/` loading every `.tbl`, make the first
//! discovered database current, and create the default `ghostsql`
//! database when none exist. Shutdown: flush every table in every
//! database, then remove the lock.

use crate::config::{DEFAULT_DATABASE, LOCK_FILE_NAME};
use crate::error::{Error, Result};
use crate::storage::datadir::DataDir;
use crate::storage::table::Table;
use crate::storage::table_file;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

pub type TableHandle = Arc<RwLock<Table>>;

pub struct DatabaseInstance {
    pub name: String,
    pub base_path: PathBuf,
    pub tables: HashMap<String, TableHandle>,
}

impl DatabaseInstance {
    fn new(name: impl Into<String>, base_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            base_path,
            tables: HashMap::new(),
        }
    }
}

struct ManagerState {
    current: String,
    databases: HashMap<String, DatabaseInstance>,
}

pub struct Database {
    data_dir: DataDir,
    state: RwLock<ManagerState>,
    lock_path: PathBuf,
}

impl Database {
    /// Initializes against the default exe-relative `data/` root.
    pub fn initialize() -> Result<Self> {
        Self::initialize_at(DataDir::default_root()?)
    }

    /// Initializes against an explicit root (tests, tools).
    pub fn initialize_at(root: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = DataDir::init(root)?;
        let lock_path = data_dir.root().join(LOCK_FILE_NAME);

        let db = Self {
            data_dir,
            state: RwLock::new(ManagerState {
                current: String::new(),
                databases: HashMap::new(),
            }),
            lock_path,
        };

        db.acquire_lock()?;
        db.load_all_databases()?;

        if db.state.read().databases.is_empty() {
            info!("no databases found, creating default database");
            db.create_database(DEFAULT_DATABASE)?;
        }

        let state = db.state.read();
        info!(
            root = %db.data_dir.root().display(),
            databases = state.databases.len(),
            current = %state.current,
            "database manager initialized"
        );
        drop(state);

        Ok(db)
    }

    fn acquire_lock(&self) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    Error::AlreadyExists(format!(
                        "database is already running (lock file exists: {})",
                        self.lock_path.display()
                    ))
                } else {
                    Error::Io(e)
                }
            })?;
        writeln!(file, "{}", std::process::id())?;
        Ok(())
    }

    fn load_all_databases(&self) -> Result<()> {
        let entries = fs::read_dir(self.data_dir.databases_path())?;

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();

        let mut state = self.state.write();
        for name in names {
            let base_path = self.data_dir.database_path(&name);
            let mut instance = DatabaseInstance::new(name.clone(), base_path.clone());

            if let Err(e) = self.load_tables_into(&mut instance) {
                error!(database = %name, "failed to load tables: {e}");
                continue;
            }

            info!(database = %name, tables = instance.tables.len(), "loaded database");
            if state.current.is_empty() {
                state.current = name.clone();
            }
            state.databases.insert(name, instance);
        }

        Ok(())
    }

    fn load_tables_into(&self, instance: &mut DatabaseInstance) -> Result<()> {
        let tables_dir = instance.base_path.join("tables");
        if !tables_dir.is_dir() {
            return Ok(());
        }

        for entry in fs::read_dir(&tables_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("tbl") {
                continue;
            }
            let Some(table_name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match table_file::load_table(table_name, &path) {
                Ok(table) => {
                    instance
                        .tables
                        .insert(table_name.to_string(), Arc::new(RwLock::new(table)));
                }
                Err(e) => {
                    error!(table = %table_name, "failed to load table: {e}");
                }
            }
        }

        Ok(())
    }

    pub fn data_dir(&self) -> &DataDir {
        &self.data_dir
    }

    pub fn current_database(&self) -> String {
        self.state.read().current.clone()
    }

    pub fn create_database(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.databases.contains_key(name) {
            return Err(Error::AlreadyExists(format!("database {name} already exists")));
        }

        let base_path = self.data_dir.create_database_dirs(name)?;
        state
            .databases
            .insert(name.to_string(), DatabaseInstance::new(name, base_path));
        if state.current.is_empty() {
            state.current = name.to_string();
        }

        info!(database = %name, "created database");
        Ok(())
    }

    pub fn use_database(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        if !state.databases.contains_key(name) {
            return Err(Error::NotFound(format!("database {name} does not exist")));
        }
        state.current = name.to_string();
        info!(database = %name, "switched current database");
        Ok(())
    }

    pub fn list_databases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().databases.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drops a database: refused for the current one; removes the
    /// directory tree and the in-memory instance.
    pub fn drop_database(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        if name == state.current {
            return Err(Error::InvalidArgument(
                "cannot drop currently selected database".into(),
            ));
        }
        let Some(instance) = state.databases.remove(name) else {
            return Err(Error::NotFound(format!("database {name} does not exist")));
        };

        fs::remove_dir_all(&instance.base_path)?;
        info!(database = %name, "dropped database");
        Ok(())
    }

    /// Sorted table names of the current database.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let state = self.state.read();
        let instance = current_instance(&state)?;
        let mut names: Vec<String> = instance.tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Handle to a table of the current database.
    pub fn table_handle(&self, name: &str) -> Result<TableHandle> {
        let state = self.state.read();
        let instance = current_instance(&state)?;
        instance
            .tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("table {name} does not exist")))
    }

    /// Registers a new table in the current database and writes its file.
    pub fn create_table(&self, mut table: Table) -> Result<TableHandle> {
        let mut state = self.state.write();
        let db_name = state.current.clone();
        let instance = state
            .databases
            .get_mut(&db_name)
            .ok_or_else(|| Error::NotFound("no database selected".into()))?;

        if instance.tables.contains_key(&table.name) {
            return Err(Error::AlreadyExists(format!(
                "table {} already exists",
                table.name
            )));
        }

        let path = self.data_dir.table_file_path(&db_name, &table.name);
        table_file::save_table(&mut table, &path)?;

        let name = table.name.clone();
        let handle: TableHandle = Arc::new(RwLock::new(table));
        instance.tables.insert(name, handle.clone());
        Ok(handle)
    }

    /// Removes a table from the current database, deleting its files.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        let db_name = state.current.clone();
        let instance = state
            .databases
            .get_mut(&db_name)
            .ok_or_else(|| Error::NotFound("no database selected".into()))?;

        if instance.tables.remove(name).is_none() {
            return Err(Error::NotFound(format!("table {name} does not exist")));
        }

        let path = self.data_dir.table_file_path(&db_name, name);
        remove_if_exists(&path)?;
        remove_if_exists(&path.with_extension("meta"))?;
        info!(table = %name, "dropped table");
        Ok(())
    }

    /// Rewrites a table's file in the current database. Callers hold the
    /// table's writer lock across the mutation and this flush, so writes
    /// to one table are totally ordered and durable on return.
    pub fn save_table(&self, table: &mut Table) -> Result<()> {
        let db_name = {
            let state = self.state.read();
            current_instance(&state)?.name.clone()
        };
        let path = self.data_dir.table_file_path(&db_name, &table.name);
        table_file::save_table(table, &path)
    }

    /// Flushes every table of every database and releases the PID lock.
    pub fn shutdown(&self) -> Result<()> {
        info!("shutting down: flushing all databases");

        let state = self.state.read();
        for instance in state.databases.values() {
            for handle in instance.tables.values() {
                let mut table = handle.write();
                let path = self.data_dir.table_file_path(&instance.name, &table.name);
                if let Err(e) = table_file::save_table(&mut table, &path) {
                    error!(table = %table.name, "failed to save table on shutdown: {e}");
                }
            }
        }
        drop(state);

        if let Err(e) = fs::remove_file(&self.lock_path) {
            warn!("failed to remove lock file: {e}");
        }

        info!("shutdown complete");
        Ok(())
    }
}

fn current_instance<'a>(state: &'a parking_lot::RwLockReadGuard<'_, ManagerState>) -> Result<&'a DatabaseInstance> {
    if state.current.is_empty() {
        return Err(Error::NotFound("no database selected".into()));
    }
    state
        .databases
        .get(&state.current)
        .ok_or_else(|| Error::NotFound(format!("current database {} does not exist", state.current)))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}
