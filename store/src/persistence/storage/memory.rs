use std::{collections::HashMap, sync::Mutex};

use super::{ReadBlobState, Storage, StorageError, StorageResult};

/// Keeps everything in process memory. Restores still work within a single
/// process lifetime, which is all the tests and benches need.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    journal: Mutex<Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn write_blob(&self, path: String, bytes: Vec<u8>) -> StorageResult<()> {
        self.blobs.lock().unwrap().insert(path, bytes);

        Ok(())
    }

    fn read_blob(&self, path: String) -> StorageResult<ReadBlobState> {
        match self.blobs.lock().unwrap().get(&path) {
            Some(bytes) => Ok(ReadBlobState::Found(bytes.clone())),
            None => Ok(ReadBlobState::NotFound),
        }
    }

    fn init(&self) -> StorageResult<()> {
        Ok(())
    }

    fn reset_store(&self) -> StorageResult<()> {
        self.blobs.lock().unwrap().clear();
        self.journal.lock().unwrap().clear();

        Ok(())
    }

    fn journal_write(&mut self, entry: &[u8]) -> StorageResult<()> {
        self.journal.lock().unwrap().extend_from_slice(entry);

        Ok(())
    }

    fn journal_sync(&self) -> StorageResult<()> {
        Ok(())
    }

    fn journal_truncate(&mut self) -> StorageResult<()> {
        self.journal.lock().unwrap().clear();

        Ok(())
    }

    fn journal_load(&mut self) -> StorageResult<String> {
        String::from_utf8(self.journal.lock().unwrap().clone()).map_err(|_| {
            StorageError::CorruptFile {
                file: "journal".to_string(),
                reason: "journal bytes are not valid utf-8".to_string(),
            }
        })
    }
}
