use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::consts::consts::TransactionId;
use crate::model::statement::Statement;

use super::storage::{Storage, StorageError, StorageResult};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum CommitStatus {
    Committed,
}

/// One committed mutation, stored as a single JSON line.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JournalEntry {
    pub id: TransactionId,
    pub statement: Statement,
    pub status: CommitStatus,
}

/// Controls how eagerly committed entries reach persistent storage.
#[derive(Clone, Debug, PartialEq)]
pub enum JournalWriteMode {
    /// fsync after every entry, a crash loses nothing
    Sync,
    /// let the operating system decide when to flush
    OsBuffered,
    /// skip the journal, snapshots become the only durability
    Off,
}

pub struct Journal {
    storage: Arc<Mutex<dyn Storage + Sync + Send>>,
    write_mode: JournalWriteMode,
    current_transaction_id: TransactionId,
    unsnapshotted_entries: usize,
}

impl Journal {
    pub fn new(storage: Arc<Mutex<dyn Storage + Sync + Send>>, write_mode: JournalWriteMode) -> Self {
        Self {
            storage,
            write_mode,
            current_transaction_id: TransactionId::new_first_transaction(),
            unsnapshotted_entries: 0,
        }
    }

    pub fn get_current_transaction_id(&self) -> &TransactionId {
        &self.current_transaction_id
    }

    pub fn set_current_transaction_id(&mut self, transaction_id: TransactionId) {
        self.current_transaction_id = transaction_id;
    }

    pub fn size(&self) -> usize {
        self.unsnapshotted_entries
    }

    // TODO: Batch fsyncs, e.g. wake every 5ms and sync every entry committed
    //  in the window before acknowledging the callers. A single fsync is ~3ms,
    //  which caps a Sync mode store at a few hundred writes per second.
    pub fn commit(&mut self, id: TransactionId, statement: Statement) -> StorageResult<()> {
        if self.write_mode == JournalWriteMode::Off {
            return Ok(());
        }

        let entry = JournalEntry {
            id,
            statement,
            status: CommitStatus::Committed,
        };

        let json_line = format!(
            "{}\n",
            serde_json::to_string(&entry).map_err(|e| StorageError::CorruptFile {
                file: "journal".to_string(),
                reason: e.to_string(),
            })?
        );

        let mut storage = self.storage.lock().unwrap();

        storage.journal_write(json_line.as_bytes())?;

        if self.write_mode == JournalWriteMode::Sync {
            storage.journal_sync()?;
        }

        self.unsnapshotted_entries += 1;

        Ok(())
    }

    pub fn restore(&self) -> StorageResult<Vec<JournalEntry>> {
        let contents = self.storage.lock().unwrap().journal_load()?;

        let mut entries: Vec<JournalEntry> = vec![];

        for line in contents.split('\n') {
            if line.is_empty() {
                continue;
            }

            let entry: JournalEntry =
                serde_json::from_str(line).map_err(|e| StorageError::CorruptFile {
                    file: "journal".to_string(),
                    reason: e.to_string(),
                })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Drops every journaled entry. Callers snapshot first, the snapshot
    /// carries the state the dropped entries described.
    pub fn truncate(&mut self) -> StorageResult<()> {
        self.storage.lock().unwrap().journal_truncate()?;

        self.unsnapshotted_entries = 0;

        Ok(())
    }
}
