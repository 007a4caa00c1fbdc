use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    consts::consts::TransactionId,
    store::table::{ContactRow, ContactTable},
};

use super::storage::{ReadBlobState, Storage, StorageError, StorageResult};

#[derive(Debug)]
enum FileType {
    Metadata,
    Snapshot,
}

impl FileType {
    fn as_str(&self) -> &'static str {
        match self {
            FileType::Metadata => "metadata.json",
            FileType::Snapshot => "snapshot.json",
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Metadata {
    pub current_transaction_id: TransactionId,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            current_transaction_id: TransactionId::new_first_transaction(),
        }
    }
}

pub struct SnapshotManager {
    storage: Arc<Mutex<dyn Storage + Sync + Send>>,
}

impl SnapshotManager {
    pub fn new(storage: Arc<Mutex<dyn Storage + Sync + Send>>) -> Self {
        Self { storage }
    }

    /// Missing files restore to an empty table, the store may simply never
    /// have snapshotted before.
    #[tracing::instrument(skip(self, table))]
    pub fn restore_snapshot(&self, table: &mut ContactTable) -> StorageResult<(usize, Metadata)> {
        let rows: Vec<ContactRow> = self.read_file(FileType::Snapshot)?;

        let snapshot_count = rows.len();

        table.restore_table(rows);

        let metadata: Metadata = self.read_file(FileType::Metadata)?;

        Ok((snapshot_count, metadata))
    }

    #[tracing::instrument(skip(self, table))]
    pub fn create_snapshot(
        &self,
        table: &ContactTable,
        transaction_id: TransactionId,
    ) -> StorageResult<()> {
        self.write_file(FileType::Snapshot, table.rows_snapshot())?;

        self.write_file(
            FileType::Metadata,
            &Metadata {
                current_transaction_id: transaction_id,
            },
        )?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn read_file<T: DeserializeOwned + Default>(&self, file_type: FileType) -> StorageResult<T> {
        let result = self
            .storage
            .lock()
            .unwrap()
            .read_blob(file_type.as_str().to_string());

        match result {
            Ok(ReadBlobState::Found(file_contents)) => {
                serde_json::from_slice(&file_contents).map_err(|e| StorageError::CorruptFile {
                    file: file_type.as_str().to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(ReadBlobState::NotFound) => Ok(T::default()),
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(skip(self, data))]
    fn write_file<T: Serialize>(&self, file_type: FileType, data: T) -> StorageResult<()> {
        let serialized_data =
            serde_json::to_string::<T>(&data).map_err(|e| StorageError::CorruptFile {
                file: file_type.as_str().to_string(),
                reason: e.to_string(),
            })?;

        self.storage
            .lock()
            .unwrap()
            .write_blob(file_type.as_str().to_string(), serialized_data.into_bytes())
    }
}
