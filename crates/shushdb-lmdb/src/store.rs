use lmdb::{Database, DatabaseFlags, Environment, EnvironmentFlags};
use shushdb_core::{observe, Result, Schema, SchemaEntry, ShushError, StoreConfig, SyncMode};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::engine::{self, engine_err};
use crate::txn::{ReadTxn, WriteTxn};

/// LMDB-backed object store
///
/// Owns the environment, the schema, and one database handle per schema
/// entry. Handles are created when the store opens and live as long as it
/// does, so a lookup inside a transaction never has to create one.
///
/// Transactions borrow the store, which means it cannot be closed (or
/// dropped) while any of them is still alive.
pub struct Store {
    env: Environment,
    schema: Schema,
    // Parallel to `schema.entries()`
    dbs: Vec<Database>,
    config: StoreConfig,
}

fn env_flags(cfg: &StoreConfig) -> EnvironmentFlags {
    let mut flags = EnvironmentFlags::empty();
    if !cfg.subdir {
        flags.insert(EnvironmentFlags::NO_SUB_DIR);
    }
    match cfg.sync_mode {
        SyncMode::Full => {}
        SyncMode::NoMetaSync => flags.insert(EnvironmentFlags::NO_META_SYNC),
        SyncMode::NoSync => flags.insert(EnvironmentFlags::NO_SYNC),
    }
    let passthrough = [
        (cfg.read_only, EnvironmentFlags::READ_ONLY),
        (cfg.no_tls, EnvironmentFlags::NO_TLS),
        (cfg.no_readahead, EnvironmentFlags::NO_READAHEAD),
        (cfg.write_map, EnvironmentFlags::WRITE_MAP),
        (cfg.map_async, EnvironmentFlags::MAP_ASYNC),
        (cfg.no_lock, EnvironmentFlags::NO_LOCK),
        (cfg.no_mem_init, EnvironmentFlags::NO_MEM_INIT),
    ];
    for (enabled, flag) in passthrough {
        if enabled {
            flags.insert(flag);
        }
    }
    flags
}

impl Store {
    /// Open (or create) a store at `path` with default configuration
    pub fn open<P: AsRef<Path>>(path: P, schema: Schema) -> Result<Self> {
        Self::open_with_config(schema, StoreConfig::new(path.as_ref()))
    }

    /// Open (or create) a store with a custom configuration
    ///
    /// Fails with `EngineOpen` if the path is inaccessible, the environment
    /// cannot be opened with these options, or the schema declares more
    /// sub-stores than `max_sub_dbs` allows.
    pub fn open_with_config(schema: Schema, cfg: StoreConfig) -> Result<Self> {
        let open_err = |reason: String| ShushError::EngineOpen {
            path: cfg.path.clone(),
            reason,
        };

        // Create the environment directory (or the data file's parent)
        if !cfg.read_only {
            let dir = if cfg.subdir {
                Some(cfg.path.as_path())
            } else {
                cfg.path.parent().filter(|p| !p.as_os_str().is_empty())
            };
            if let Some(dir) = dir {
                std::fs::create_dir_all(dir).map_err(|e| open_err(e.to_string()))?;
            }
        }

        let max_dbs = match cfg.max_sub_dbs {
            Some(max) => max,
            None => u32::try_from(schema.len())
                .map_err(|_| open_err(format!("too many sub-stores: {}", schema.len())))?,
        };

        let mut env_builder = Environment::new();
        env_builder.set_max_dbs(max_dbs);
        env_builder.set_map_size(cfg.map_size);
        env_builder.set_max_readers(cfg.max_readers);
        env_builder.set_flags(env_flags(&cfg));

        let env = env_builder
            .open(&cfg.path)
            .map_err(|e| open_err(e.to_string()))?;

        // Eagerly create every declared sub-database
        let mut dbs = Vec::with_capacity(schema.len());
        for entry in schema.entries() {
            let db = if cfg.read_only {
                env.open_db(Some(entry.name()))
            } else {
                env.create_db(Some(entry.name()), DatabaseFlags::empty())
            }
            .map_err(|e| open_err(format!("sub-store {:?}: {}", entry.name(), e)))?;
            dbs.push(db);
        }

        let cleared = engine::reader_check(&env).map_err(|e| open_err(e.to_string()))?;
        if cleared > 0 {
            debug!(cleared, "cleared stale reader slots");
            observe::record_stale_readers(cleared);
        }

        info!(
            path = %cfg.path.display(),
            sub_stores = schema.len(),
            map_size = cfg.map_size,
            "store opened"
        );

        Ok(Self {
            env,
            schema,
            dbs,
            config: cfg,
        })
    }

    /// Close the store, releasing the environment
    ///
    /// Every transaction must have finished; the borrow checker enforces this
    /// since transactions borrow the store.
    pub fn close(self) -> Result<()> {
        info!(
            path = %self.config.path.display(),
            sub_stores = self.schema.len(),
            map_size = self.config.map_size,
            "store closed"
        );
        // The environment and its handles are released on drop
        Ok(())
    }

    /// Schema the store was opened with
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Environment path (directory, or data file in single-file mode)
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Configuration the store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Begin a read-only transaction
    pub fn begin_read(&self) -> Result<ReadTxn<'_>> {
        let txn = self
            .env
            .begin_ro_txn()
            .map_err(engine_err("begin read transaction"))?;
        observe::record_read_txn();
        debug!("read transaction opened");
        Ok(ReadTxn::new(self, txn))
    }

    /// Begin a write transaction
    ///
    /// Blocks while another write transaction is open anywhere in the
    /// environment.
    pub fn begin_write(&self) -> Result<WriteTxn<'_>> {
        let txn = self
            .env
            .begin_rw_txn()
            .map_err(engine_err("begin write transaction"))?;
        debug!("write transaction opened");
        Ok(WriteTxn::new(self, txn))
    }

    /// Run `f` inside a read transaction
    ///
    /// The snapshot is released on every exit path.
    pub fn for_reading<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&ReadTxn<'_>) -> std::result::Result<T, E>,
        E: From<ShushError>,
    {
        let mut txn = self.begin_read()?;
        let result = f(&txn);
        txn.close();
        result
    }

    /// Run `f` inside a write transaction
    ///
    /// Commits when `f` returns `Ok`, aborts when it returns `Err` (or
    /// panics). If `f` finalizes the transaction itself, it is left as is.
    pub fn for_writing<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut WriteTxn<'_>) -> std::result::Result<T, E>,
        E: From<ShushError>,
    {
        let mut txn = self.begin_write()?;
        match f(&mut txn) {
            Ok(value) => {
                if txn.is_open() {
                    txn.commit()?;
                }
                Ok(value)
            }
            Err(e) => {
                if txn.is_open() {
                    warn!("write transaction failed, aborting");
                    txn.abort_with_reason("error");
                }
                Err(e)
            }
        }
    }

    /// Clear reader slots left by dead processes or threads
    ///
    /// Returns the number of slots cleared. Also run once at open.
    pub fn reader_check(&self) -> Result<usize> {
        let cleared = engine::reader_check(&self.env)?;
        observe::record_stale_readers(cleared);
        Ok(cleared)
    }

    /// Flush buffers to disk
    ///
    /// Only needed with a relaxed [`SyncMode`]; `force` syncs even when the
    /// environment was opened with `NoSync`.
    pub fn sync(&self, force: bool) -> Result<()> {
        self.env.sync(force).map_err(engine_err("sync"))
    }

    /// Schema entry and database handle for a sub-store
    pub(crate) fn handle(&self, name: &str) -> Result<(&SchemaEntry, Database)> {
        let index = self
            .schema
            .position(name)
            .ok_or_else(|| ShushError::UnknownSubStore(name.to_string()))?;
        Ok((&self.schema.entries()[index], self.dbs[index]))
    }

    /// Path of the data file for this configuration
    pub fn data_file(&self) -> PathBuf {
        if self.config.subdir {
            self.config.path.join("data.mdb")
        } else {
            self.config.path.clone()
        }
    }
}
