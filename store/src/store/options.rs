use std::path::PathBuf;

use uuid::Uuid;

use crate::persistence::{journal::JournalWriteMode, storage::StorageEngine};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub restore: bool,
    pub write_mode: JournalWriteMode,
    pub storage_engine: StorageEngine,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl StoreOptions {
    /// Defines whether we should attempt to restore the store from a snapshot
    /// and journal on startup
    pub fn set_restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    /// Defines whether we should sync the journal write to disk before
    /// marking the statement as committed. This is useful for durability but
    /// can be slow ~3ms per sync
    pub fn set_write_mode(mut self, write_mode: JournalWriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn set_storage_engine(mut self, storage_engine: StorageEngine) -> Self {
        self.storage_engine = storage_engine;
        self
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            write_mode: JournalWriteMode::Sync,
            storage_engine: StorageEngine::File(PathBuf::from("data")),
            restore: true,
        }
    }
}

impl StoreOptions {
    /// In-memory store with no restore, every test gets a blank slate
    pub fn new_test() -> Self {
        StoreOptions::default()
            .set_storage_engine(StorageEngine::Memory)
            .set_restore(false)
            .set_write_mode(JournalWriteMode::Off)
    }

    pub fn new_test_file() -> Self {
        let store_dir: PathBuf = ["/", "tmp", "contactdb", &Uuid::new_v4().to_string()]
            .iter()
            .collect();

        StoreOptions::default()
            .set_storage_engine(StorageEngine::File(store_dir))
            .set_restore(true)
            .set_write_mode(JournalWriteMode::Sync)
    }

    pub fn new_benchmark() -> Self {
        let store_dir: PathBuf = ["/", "tmp", "contactdb", &Uuid::new_v4().to_string()]
            .iter()
            .collect();

        StoreOptions::default()
            .set_storage_engine(StorageEngine::File(store_dir))
            .set_restore(false)
            .set_write_mode(JournalWriteMode::Off)
    }
}
