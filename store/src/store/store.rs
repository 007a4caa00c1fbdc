use std::{
    sync::{
        mpsc::{self, Receiver},
        Arc, Mutex,
    },
    thread,
    time::Instant,
};

use num_format::{Locale, ToFormattedString};

use crate::{
    consts::consts::TransactionId,
    model::statement::{Statement, StatementResult},
    persistence::{
        journal::{Journal, JournalEntry},
        snapshot::SnapshotManager,
        storage::{Storage, StorageResult},
    },
};

use super::{
    commands::{CommitError, Control, StoreCommand, StoreCommandRequest, StoreCommandResponse},
    handle::StoreHandle,
    options::StoreOptions,
    table::ContactTable,
};

pub struct Store {
    contact_table: ContactTable,
    journal: Journal,
    snapshot_manager: SnapshotManager,
    storage: Arc<Mutex<dyn Storage + Sync + Send>>,
    store_receiver: Receiver<StoreCommandRequest>,
    options: StoreOptions,
}

impl Store {
    pub fn new(store_receiver: Receiver<StoreCommandRequest>, options: StoreOptions) -> Self {
        let storage = options.storage_engine.build();

        Self {
            contact_table: ContactTable::new(),
            journal: Journal::new(storage.clone(), options.write_mode.clone()),
            snapshot_manager: SnapshotManager::new(storage.clone()),
            storage,
            store_receiver,
            options,
        }
    }

    /// Spawns the worker thread and returns a cloneable handle to it. The
    /// worker owns the table, callers only ever talk through the channel.
    pub fn spawn(options: StoreOptions) -> StoreHandle {
        let (store_sender, store_receiver) = mpsc::channel::<StoreCommandRequest>();

        thread::spawn(move || {
            Store::new(store_receiver, options).run();
        });

        StoreHandle::new(store_sender)
    }

    pub fn new_test() -> Self {
        let (_, store_receiver) = mpsc::channel::<StoreCommandRequest>();

        Store::new(store_receiver, StoreOptions::new_test())
    }

    pub fn run(&mut self) {
        if self.options.restore {
            if let Err(restore_error) = self.restore() {
                log::error!("Unable to restore store: {}", restore_error);
                return;
            }
        }

        // Process incoming requests from the channel, one at a time. This
        // loop is the serialization point for every statement.
        loop {
            let StoreCommandRequest { resolver, command } = match self.store_receiver.recv() {
                Ok(request) => request,
                // Every handle has been dropped, nothing further can arrive
                Err(_) => return,
            };

            log::debug!("Received request: {}", command.log_format());

            let control = match command {
                StoreCommand::Statement(statement) => {
                    let response =
                        StoreCommandResponse::Statement(self.process_statement(statement));

                    // The caller may have timed out and dropped the receiver,
                    // the statement is still committed
                    let _ = resolver.send(response);

                    continue;
                }
                StoreCommand::Control(control) => control,
            };

            match control {
                Control::Shutdown => {
                    let response = match self.snapshot_then_trim() {
                        Ok(_) => StoreCommandResponse::control_success("Successfully shutdown store"),
                        Err(e) => StoreCommandResponse::control_error(&format!(
                            "Shutdown could not snapshot: {}",
                            e
                        )),
                    };

                    let _ = resolver.send(response);

                    log::info!("🛑 Store has shutdown");

                    return;
                }
                Control::Snapshot => {
                    let response = match self.snapshot_then_trim() {
                        Ok(_) => {
                            StoreCommandResponse::control_success("Successfully snapshotted store")
                        }
                        Err(e) => StoreCommandResponse::control_error(&format!("{}", e)),
                    };

                    let _ = resolver.send(response);
                }
                Control::Reset => {
                    let response = match self.reset() {
                        Ok(_) => StoreCommandResponse::control_success("Successfully reset store"),
                        Err(e) => StoreCommandResponse::control_error(&format!("{}", e)),
                    };

                    let _ = resolver.send(response);
                }
            }
        }
    }

    /// Rebuilds the table from the latest snapshot, then replays every
    /// journal entry committed after it.
    fn restore(&mut self) -> StorageResult<()> {
        let now = Instant::now();

        let (snapshot_count, metadata) = self
            .snapshot_manager
            .restore_snapshot(&mut self.contact_table)?;

        // If there was a snapshot to restore from we pick up its counter
        self.journal
            .set_current_transaction_id(metadata.current_transaction_id);

        let journal_entries = self.journal.restore()?;
        let replayed_count = journal_entries.len();

        for JournalEntry { id, statement, .. } in journal_entries {
            if let Err(apply_error) = self.contact_table.apply(statement, id.clone()) {
                panic!(
                    "Should not be able to fail a statement replayed from the journal: {}",
                    apply_error
                );
            }

            self.journal.set_current_transaction_id(id);
        }

        log::info!(
            "✅ Successful Restore [Duration: {}ms]",
            now.elapsed().as_millis(),
        );

        log::info!(
            "📀 Data               [RowsFromSnapshot: {}, JournalEntriesReplayed: {}, CurrentTxId: {}]",
            snapshot_count,
            replayed_count,
            self.journal
                .get_current_transaction_id()
                .clone()
                .to_number()
                .to_formatted_string(&Locale::en)
        );

        Ok(())
    }

    pub fn process_statement(
        &mut self,
        statement: Statement,
    ) -> Result<StatementResult, CommitError> {
        let applying_transaction_id = self.journal.get_current_transaction_id().increment();

        let apply_result = self
            .contact_table
            .apply(statement.clone(), applying_transaction_id.clone());

        let statement_result = match apply_result {
            Ok(statement_result) => statement_result,
            Err(apply_error) => {
                // A failed statement does not consume a transaction id
                log::info!("⚠️  Rolled back: [TX: {}]", &applying_transaction_id);

                return Err(apply_error.into());
            }
        };

        if statement.is_mutation() {
            if let Err(journal_error) = self
                .journal
                .commit(applying_transaction_id.clone(), statement.clone())
            {
                log::error!("Journal write failed, rolling back: {}", journal_error);

                self.contact_table.apply_rollback(
                    statement,
                    statement_result,
                    applying_transaction_id,
                );

                return Err(CommitError::JournalWrite(journal_error));
            }

            log::info!("✅ Committed: [TX: {}]", &applying_transaction_id);
        }

        self.journal
            .set_current_transaction_id(applying_transaction_id);

        Ok(statement_result)
    }

    fn snapshot_then_trim(&mut self) -> StorageResult<()> {
        self.snapshot_manager.create_snapshot(
            &self.contact_table,
            self.journal.get_current_transaction_id().clone(),
        )?;

        // The snapshot carries the state, the journaled entries are now redundant
        self.journal.truncate()
    }

    fn reset(&mut self) -> StorageResult<()> {
        self.storage.lock().unwrap().reset_store()?;

        self.contact_table = ContactTable::new();

        // Reopens the journal file the reset removed
        self.journal.truncate()?;

        self.journal
            .set_current_transaction_id(TransactionId::new_first_transaction());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::store_test;
    use super::*;
    use crate::consts::consts::ContactId;
    use crate::model::contact::{Contact, ContactDraft};
    use crate::store::handle::StoreError;

    mod statements {
        use super::*;

        #[test]
        fn insert_happy_path() {
            let mut store = Store::new_test();

            let contact = Contact::new_test();

            let result = store.process_statement(Statement::Insert(contact.clone()));

            assert_eq!(result, Ok(StatementResult::Single(contact)));
        }

        #[test]
        fn failed_statement_does_not_consume_a_transaction_id() {
            // Given a store that rejects an invalid record
            let mut store = Store::new_test();

            let mut invalid = Contact::new_test();
            invalid.email = "not-an-email".to_string();

            store
                .process_statement(Statement::Insert(invalid))
                .expect_err("insert should fail validation");

            // Then the transaction counter has not moved
            assert_eq!(
                store.journal.get_current_transaction_id(),
                &TransactionId::new_first_transaction()
            );

            // And the next statement gets the first transaction id
            store
                .process_statement(Statement::Insert(Contact::new_test()))
                .expect("insert should succeed");

            assert_eq!(
                store.journal.get_current_transaction_id(),
                &TransactionId(1)
            );
        }

        #[test]
        fn queries_advance_the_transaction_counter() {
            let mut store = Store::new_test();

            store
                .process_statement(Statement::List)
                .expect("list should succeed");

            assert_eq!(
                store.journal.get_current_transaction_id(),
                &TransactionId(1)
            );
        }
    }

    mod worker {
        use super::*;

        #[test]
        fn spawned_store_round_trips_an_insert() {
            // Given a running store
            let handle = Store::spawn(StoreOptions::new_test());

            // When we insert a draft
            let inserted = handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            // Then the materialized record is listed
            let listed = handle.list().expect("list should succeed");

            assert_eq!(listed, vec![inserted]);
        }

        #[test]
        fn insert_assigns_id_and_timestamps() {
            let handle = Store::spawn(StoreOptions::new_test());

            let draft = ContactDraft::new(
                "  Ada Lovelace  ".to_string(),
                "ada@example.com".to_string(),
                "415-555-1234".to_string(),
                " Hello ".to_string(),
            );

            let inserted = handle.insert(draft).expect("insert should succeed");

            // Surrounding whitespace is trimmed, the phone keeps its separators
            assert_eq!(inserted.name, "Ada Lovelace");
            assert_eq!(inserted.phone, "415-555-1234");
            assert_eq!(inserted.message, "Hello");
            assert!(!inserted.id.0.is_empty());
            assert_eq!(inserted.created_at, inserted.updated_at);
        }

        #[test]
        fn invalid_draft_is_rejected_with_field_errors() {
            let handle = Store::spawn(StoreOptions::new_test());

            let draft = ContactDraft::new(
                "A".to_string(),
                "ada@example.com".to_string(),
                "415-555-1234".to_string(),
                String::new(),
            );

            let result = handle.insert(draft);

            assert!(matches!(result, Err(StoreError::ValidationFailed(_))));
        }

        #[test]
        fn deleting_twice_reports_not_found() {
            let handle = Store::spawn(StoreOptions::new_test());

            let inserted = handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            handle
                .delete(inserted.id.clone())
                .expect("first delete should succeed");

            let second = handle.delete(inserted.id.clone());

            assert_eq!(second, Err(StoreError::NotFound(inserted.id)));
        }

        #[test]
        fn get_returns_the_inserted_record() {
            let handle = Store::spawn(StoreOptions::new_test());

            let inserted = handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            let fetched = handle
                .get(inserted.id.clone())
                .expect("get should succeed");

            assert_eq!(fetched, inserted);
        }

        #[test]
        fn get_missing_record_reports_not_found() {
            let handle = Store::spawn(StoreOptions::new_test());

            let id = ContactId::new();

            assert_eq!(handle.get(id.clone()), Err(StoreError::NotFound(id)));
        }

        #[test]
        fn requests_after_shutdown_report_the_store_offline() {
            let handle = Store::spawn(StoreOptions::new_test());

            let shutdown_response = handle
                .send_shutdown_request()
                .expect("shutdown should succeed");

            assert_eq!(shutdown_response, "Successfully shutdown store");

            // The worker is gone, later requests fail fast
            assert_eq!(handle.list(), Err(StoreError::Offline));
        }

        #[test]
        fn reset_drops_every_record() {
            let handle = Store::spawn(StoreOptions::new_test());

            handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            let reset_response = handle.send_reset_request().expect("reset should succeed");

            assert_eq!(reset_response, "Successfully reset store");
            assert_eq!(handle.list(), Ok(vec![]));
        }
    }

    mod restore {
        use super::*;

        #[test_log::test]
        fn restart_replays_journaled_records() {
            // Given a store over a file directory with a committed record
            let options = StoreOptions::new_test_file();

            let handle = Store::spawn(options.clone());

            let inserted = handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            drop(handle);

            // When a new store starts over the same directory
            let handle = Store::spawn(options);

            // Then the journal replay brings the record back
            let listed = handle.list().expect("list should succeed");

            assert_eq!(listed, vec![inserted]);

            handle
                .send_shutdown_request()
                .expect("shutdown should succeed");
        }

        #[test_log::test]
        fn restart_after_snapshot_restores_from_the_snapshot() {
            // Given a store that has snapshotted two records
            let options = StoreOptions::new_test_file();

            let handle = Store::spawn(options.clone());

            let first = handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            let second = handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            let snapshot_response = handle
                .send_snapshot_request()
                .expect("snapshot should succeed");

            assert_eq!(snapshot_response, "Successfully snapshotted store");

            drop(handle);

            // When a new store starts over the same directory
            let handle = Store::spawn(options);

            // Then both records are restored, newest first
            let listed = handle.list().expect("list should succeed");

            assert_eq!(listed.len(), 2);
            assert!(listed.contains(&first));
            assert!(listed.contains(&second));

            // And the transaction counter continues from the snapshot
            let next = handle
                .insert(ContactDraft::new_test())
                .expect("insert should succeed");

            assert!(listed.iter().all(|contact| contact.id != next.id));

            handle
                .send_shutdown_request()
                .expect("shutdown should succeed");
        }
    }

    mod bulk {
        use super::*;

        // ~10k inserts/s with the journal off, enough to prove the channel
        // fan-in works from multiple sender threads
        #[test]
        fn insert_from_multiple_threads() {
            let draft_generator = |thread_id: i32, index: u32| {
                ContactDraft::new(
                    format!("Contact {}-{}", thread_id, index),
                    format!("contact.{}.{}@example.com", thread_id, index),
                    "4155551234".to_string(),
                    String::new(),
                )
            };

            store_test(2, 5, draft_generator);
        }
    }
}

pub mod test_utils {
    use std::thread::{self, JoinHandle};

    use crate::model::contact::ContactDraft;

    use super::{Store, StoreOptions};

    pub fn store_test(
        sender_threads: i32,
        inserts_per_thread: u32,
        draft_generator: fn(i32, u32) -> ContactDraft,
    ) {
        let handle = Store::spawn(StoreOptions::new_test());

        let mut threads: Vec<JoinHandle<()>> = vec![];

        for thread_id in 0..sender_threads {
            let thread_handle = handle.clone();

            let sender_thread = thread::spawn(move || {
                for index in 0..inserts_per_thread {
                    let draft = draft_generator(thread_id, index);

                    thread_handle
                        .insert(draft)
                        .expect("insert should not fail or time out");
                }
            });

            threads.push(sender_thread);
        }

        for thread in threads {
            thread.join().unwrap();
        }

        let listed = handle.list().expect("list should succeed");

        assert_eq!(
            listed.len(),
            (sender_threads as usize) * (inserts_per_thread as usize)
        );

        // Allows the store thread to exit cleanly
        let shutdown_response = handle
            .send_shutdown_request()
            .expect("Should not timeout");

        assert_eq!(shutdown_response, "Successfully shutdown store".to_string());
    }
}
