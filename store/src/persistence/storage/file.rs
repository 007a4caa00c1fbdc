use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Write},
    path::PathBuf,
};

use super::{io_to_generic_error, ReadBlobState, Storage, StorageError, StorageResult};

const JOURNAL_FILE: &str = "journal.json";

pub struct FileStorage {
    base_path: PathBuf,
    journal_file: File,
    journal_file_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        let journal_file_path = base_path.join(JOURNAL_FILE);

        std::fs::create_dir_all(&base_path).expect("Cannot create directory");

        let journal_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(journal_file_path.clone())
            .expect("Cannot open file");

        Self {
            base_path,
            journal_file,
            journal_file_path,
        }
    }

    fn get_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for FileStorage {
    fn write_blob(&self, path: String, bytes: Vec<u8>) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.get_path(&path))
            .map_err(|e| StorageError::UnableToWriteBlob(io_to_generic_error(e)))?;

        file.write_all(&bytes)
            .map_err(|e| StorageError::UnableToWriteBlob(io_to_generic_error(e)))
    }

    fn read_blob(&self, path: String) -> StorageResult<ReadBlobState> {
        let mut file = match File::open(self.get_path(&path)) {
            Ok(file) => file,
            Err(err) => match err.kind() {
                std::io::ErrorKind::NotFound => return Ok(ReadBlobState::NotFound),
                _ => return Err(StorageError::UnableToReadBlob(io_to_generic_error(err))),
            },
        };

        let mut buf = Vec::new();

        file.read_to_end(&mut buf)
            .map_err(|e| StorageError::UnableToReadBlob(io_to_generic_error(e)))?;

        Ok(ReadBlobState::Found(buf))
    }

    // Called on store start-up, should be idempotent
    fn init(&self) -> StorageResult<()> {
        std::fs::create_dir_all(&self.base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        Ok(())
    }

    // Called when the store gets cleared (via user)
    fn reset_store(&self) -> StorageResult<()> {
        fs::remove_dir_all(&self.base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        self.init()
    }

    fn journal_write(&mut self, entry: &[u8]) -> StorageResult<()> {
        // Buffered OS write, is not 'durable' without the fsync
        self.journal_file
            .write_all(entry)
            .map_err(|e| StorageError::UnableToWriteJournal(io_to_generic_error(e)))
    }

    fn journal_sync(&self) -> StorageResult<()> {
        self.journal_file
            .sync_all()
            .map_err(|e| StorageError::UnableToSyncJournal(io_to_generic_error(e)))?;

        Ok(())
    }

    fn journal_truncate(&mut self) -> StorageResult<()> {
        // The journal may already be gone after a reset, removal is best effort
        let _ = fs::remove_file(self.journal_file_path.clone());

        self.journal_file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&self.journal_file_path)
            .map_err(|e| StorageError::UnableToTruncateJournal(io_to_generic_error(e)))?;

        Ok(())
    }

    // File may or may not exist
    fn journal_load(&mut self) -> StorageResult<String> {
        let mut contents = String::new();

        let mut file = match OpenOptions::new().read(true).open(&self.journal_file_path) {
            Ok(file) => file,
            Err(err) => match err.kind() {
                std::io::ErrorKind::NotFound => return Ok(contents),
                _ => return Err(StorageError::UnableToLoadJournal(io_to_generic_error(err))),
            },
        };

        file.read_to_string(&mut contents)
            .map_err(|e| StorageError::UnableToLoadJournal(io_to_generic_error(e)))?;

        Ok(contents)
    }
}
