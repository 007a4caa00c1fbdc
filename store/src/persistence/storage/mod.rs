pub mod file;
pub mod memory;

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use thiserror::Error;

use self::{file::FileStorage, memory::MemoryStorage};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    File(PathBuf),
    Memory,
}

impl StorageEngine {
    pub fn build(&self) -> Arc<Mutex<dyn Storage + Sync + Send>> {
        match self {
            StorageEngine::File(base_path) => {
                Arc::new(Mutex::new(FileStorage::new(base_path.clone())))
            }
            StorageEngine::Memory => Arc::new(Mutex::new(MemoryStorage::new())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Unable to initialize storage: {0}")]
    UnableToInitializePersistence(String),
    #[error("Unable to write blob: {0}")]
    UnableToWriteBlob(String),
    #[error("Unable to read blob: {0}")]
    UnableToReadBlob(String),
    #[error("Unable to append to the journal: {0}")]
    UnableToWriteJournal(String),
    #[error("Unable to sync the journal to persistent storage: {0}")]
    UnableToSyncJournal(String),
    #[error("Unable to truncate the journal: {0}")]
    UnableToTruncateJournal(String),
    #[error("Unable to load the journal: {0}")]
    UnableToLoadJournal(String),
    #[error("Corrupt {file}: {reason}")]
    CorruptFile { file: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadBlobState {
    Found(Vec<u8>),
    /// Not an error, blobs are absent until the first snapshot
    NotFound,
}

pub(crate) fn io_to_generic_error(err: std::io::Error) -> String {
    err.to_string()
}

/// Byte-level persistence for the store. Blobs hold snapshots, the journal
/// is an append-only log of committed mutations.
pub trait Storage {
    // Snapshot
    fn write_blob(&self, path: String, bytes: Vec<u8>) -> StorageResult<()>;
    fn read_blob(&self, path: String) -> StorageResult<ReadBlobState>;
    fn init(&self) -> StorageResult<()>;
    fn reset_store(&self) -> StorageResult<()>;

    // Journal
    fn journal_write(&mut self, entry: &[u8]) -> StorageResult<()>;
    fn journal_sync(&self) -> StorageResult<()>;
    fn journal_truncate(&mut self) -> StorageResult<()>;
    fn journal_load(&mut self) -> StorageResult<String>;
}
