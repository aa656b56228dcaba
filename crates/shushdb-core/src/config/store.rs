use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for opening a store
///
/// Mirrors the engine's environment options. Anything not listed here keeps
/// the engine's own default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the environment (a directory when `subdir` is true, otherwise
    /// the data file itself)
    pub path: PathBuf,

    /// Store the environment as a directory holding `data.mdb` and `lock.mdb`
    /// (default: true). When false, `path` names the data file and the lock
    /// file is `path` with a `-lock` suffix.
    #[serde(default = "default_true")]
    pub subdir: bool,

    /// Map size ceiling in bytes
    ///
    /// Default: 1TB on 64-bit targets, 10MB otherwise. The engine reserves
    /// address space but does not allocate it, so a huge value costs nothing
    /// on 64-bit.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Maximum number of named sub-databases
    ///
    /// `None` (the default) derives it from the schema size.
    #[serde(default)]
    pub max_sub_dbs: Option<u32>,

    /// Maximum number of concurrent reader slots
    /// Default: 126
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,

    /// Sync mode for durability
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Open the environment read-only
    #[serde(default)]
    pub read_only: bool,

    /// Tie reader slots to transactions instead of threads
    #[serde(default)]
    pub no_tls: bool,

    /// Turn off OS readahead
    #[serde(default)]
    pub no_readahead: bool,

    /// Use a writeable memory map
    #[serde(default)]
    pub write_map: bool,

    /// Flush the writeable map asynchronously (only meaningful with `write_map`)
    #[serde(default)]
    pub map_async: bool,

    /// Skip the engine's locking entirely; the caller serializes access
    #[serde(default)]
    pub no_lock: bool,

    /// Do not zero-initialize malloc'd memory before writing it to disk
    #[serde(default)]
    pub no_mem_init: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Full durability – flushes data and meta pages on every commit (default).
    #[default]
    Full,

    /// Skips syncing the meta-page on each commit.
    ///
    /// An OS crash may lose the last transaction, but the database remains
    /// consistent.
    NoMetaSync,

    /// Disables `fsync()` entirely – the OS page cache decides when to flush.
    ///
    /// **WARNING**: A power failure or OS crash can lose an unbounded number of
    /// recent transactions. Only use this for ephemeral or test workloads.
    NoSync,
}

#[cfg(target_pointer_width = "64")]
fn default_map_size() -> usize {
    1024 * 1024 * 1024 * 1024 // 1TB
}

#[cfg(not(target_pointer_width = "64"))]
fn default_map_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_max_readers() -> u32 {
    126
}

fn default_true() -> bool {
    true
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            subdir: default_true(),
            map_size: default_map_size(),
            max_sub_dbs: None,
            max_readers: default_max_readers(),
            sync_mode: SyncMode::default(),
            read_only: false,
            no_tls: false,
            no_readahead: false,
            write_map: false,
            map_async: false,
            no_lock: false,
            no_mem_init: false,
        }
    }

    /// The platform-dependent default map size
    pub fn default_map_size() -> usize {
        default_map_size()
    }

    pub fn with_subdir(mut self, subdir: bool) -> Self {
        self.subdir = subdir;
        self
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    /// Override the sub-database limit derived from the schema
    pub fn with_max_sub_dbs(mut self, max_sub_dbs: u32) -> Self {
        self.max_sub_dbs = Some(max_sub_dbs);
        self
    }

    pub fn with_max_readers(mut self, max_readers: u32) -> Self {
        self.max_readers = max_readers;
        self
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_no_tls(mut self, no_tls: bool) -> Self {
        self.no_tls = no_tls;
        self
    }

    pub fn with_no_readahead(mut self, no_readahead: bool) -> Self {
        self.no_readahead = no_readahead;
        self
    }

    pub fn with_write_map(mut self, write_map: bool) -> Self {
        self.write_map = write_map;
        self
    }

    pub fn with_map_async(mut self, map_async: bool) -> Self {
        self.map_async = map_async;
        self
    }

    pub fn with_no_lock(mut self, no_lock: bool) -> Self {
        self.no_lock = no_lock;
        self
    }

    pub fn with_no_mem_init(mut self, no_mem_init: bool) -> Self {
        self.no_mem_init = no_mem_init;
        self
    }
}
