use crate::Store;
use serde::{Deserialize, Serialize};
use shushdb_core::{BincodeCodec, JsonCodec, Schema, StoreConfig};
use std::path::Path;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct User {
    pub(crate) name: String,
}

impl User {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

pub(crate) fn schema() -> Schema {
    Schema::builder()
        .sub_store::<User, _>("users", JsonCodec)
        .sub_store::<u64, _>("counters", BincodeCodec)
        .build()
        .unwrap()
}

/// Small map so tests don't reserve a terabyte of address space each
pub(crate) fn test_config(path: &Path) -> StoreConfig {
    StoreConfig::new(path).with_map_size(10 * 1024 * 1024)
}

pub(crate) fn open_store() -> (Store, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = Store::open_with_config(schema(), test_config(temp_dir.path())).unwrap();
    (store, temp_dir)
}
