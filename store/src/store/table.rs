use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    consts::consts::{ContactId, TransactionId},
    model::{
        contact::Contact,
        statement::{Statement, StatementResult},
        validate::{self, FieldErrors},
    },
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    // CRUD - GET / DELETE
    #[error("Not found, record does not exist: {0}")]
    NotFound(ContactId),

    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    AlreadyExists(ContactId),

    // Field rules
    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContactRow {
    pub contact: Contact,
    pub transaction_id: TransactionId,
}

pub struct ContactTable {
    pub contact_rows: HashMap<ContactId, ContactRow>,
}

impl ContactTable {
    pub fn new() -> Self {
        Self {
            contact_rows: HashMap::new(),
        }
    }

    // Each mutation is broken up into two steps
    //  - Verifying validity / constraints (field rules, primary key)
    //  - Applying the statement
    pub fn apply(
        &mut self,
        statement: Statement,
        transaction_id: TransactionId,
    ) -> Result<StatementResult, ApplyError> {
        let statement_result = match statement {
            Statement::Insert(contact) => {
                // The same rules the form runs, applied again here so that no
                // path into the table can store an invalid record
                if let Err(errors) =
                    validate::validate(&contact.name, &contact.email, &contact.phone)
                {
                    return Err(ApplyError::ValidationFailed(errors));
                }

                if self.contact_rows.contains_key(&contact.id) {
                    return Err(ApplyError::AlreadyExists(contact.id.clone()));
                }

                self.contact_rows.insert(
                    contact.id.clone(),
                    ContactRow {
                        contact: contact.clone(),
                        transaction_id,
                    },
                );

                StatementResult::Single(contact)
            }
            Statement::Remove(id) => {
                let removed_row = self
                    .contact_rows
                    .remove(&id)
                    .ok_or(ApplyError::NotFound(id))?;

                StatementResult::Single(removed_row.contact)
            }
            Statement::Get(id) => {
                let row = self
                    .contact_rows
                    .get(&id)
                    .ok_or_else(|| ApplyError::NotFound(id.clone()))?;

                StatementResult::Single(row.contact.clone())
            }
            Statement::List => StatementResult::List(self.list_newest_first()),
        };

        Ok(statement_result)
    }

    /// Undoes a mutation that applied cleanly but failed to journal. The
    /// caller hands back the result so a removed row can be reinstated.
    pub fn apply_rollback(
        &mut self,
        statement: Statement,
        result: StatementResult,
        transaction_id: TransactionId,
    ) {
        match statement {
            Statement::Insert(contact) => {
                self.contact_rows.remove(&contact.id);
            }
            Statement::Remove(_) => {
                let contact = result.single();

                self.contact_rows.insert(
                    contact.id.clone(),
                    ContactRow {
                        contact,
                        transaction_id,
                    },
                );
            }
            Statement::Get(_) | Statement::List => {}
        }
    }

    /// Newest first. Records created in the same millisecond fall back to
    /// their transaction order, so arrival order still decides.
    #[tracing::instrument(skip(self))]
    fn list_newest_first(&self) -> Vec<Contact> {
        let mut rows: Vec<&ContactRow> = self.contact_rows.values().collect();

        rows.sort_by(|a, b| {
            b.contact
                .created_at
                .cmp(&a.contact.created_at)
                .then_with(|| b.transaction_id.cmp(&a.transaction_id))
        });

        rows.into_iter().map(|row| row.contact.clone()).collect()
    }

    pub fn rows_snapshot(&self) -> Vec<ContactRow> {
        let mut rows: Vec<ContactRow> = self.contact_rows.values().cloned().collect();

        rows.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));

        rows
    }

    pub fn restore_table(&mut self, rows: Vec<ContactRow>) {
        self.contact_rows = rows
            .into_iter()
            .map(|row| (row.contact.id.clone(), row))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.contact_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contact_rows.is_empty()
    }
}

impl Default for ContactTable {
    fn default() -> Self {
        ContactTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::validate::{Field, Reason};
    use chrono::{Duration, Utc};

    fn test_contact(name: &str) -> Contact {
        let mut contact = Contact::new_test();

        contact.id = ContactId::new();
        contact.name = name.to_string();

        contact
    }

    fn test_contact_created_at(name: &str, created_at: chrono::DateTime<Utc>) -> Contact {
        let mut contact = test_contact(name);

        contact.created_at = created_at;
        contact.updated_at = created_at;

        contact
    }

    mod inserting {
        use super::*;

        #[test]
        fn inserting_returns_the_stored_record() {
            // Given an empty table
            let mut table = ContactTable::new();

            // When we insert a record
            let contact = test_contact("Ada Lovelace");

            let result = table
                .apply(Statement::Insert(contact.clone()), TransactionId(1))
                .expect("insert should succeed");

            // Then the record comes back and the row carries the transaction id
            assert_eq!(result, StatementResult::Single(contact.clone()));

            let row = table
                .contact_rows
                .get(&contact.id)
                .expect("should have a row");

            assert_eq!(row.transaction_id, TransactionId(1));
        }

        #[test]
        fn inserting_the_same_id_twice_fails() {
            // Given a table with a record
            let mut table = ContactTable::new();
            let contact = test_contact("Ada Lovelace");

            table
                .apply(Statement::Insert(contact.clone()), TransactionId(1))
                .expect("insert should succeed");

            // When we insert a record with the same id
            let result = table.apply(Statement::Insert(contact.clone()), TransactionId(2));

            // Then the insert is refused
            assert_eq!(result, Err(ApplyError::AlreadyExists(contact.id)));
        }

        #[test]
        fn invalid_email_is_rejected_and_not_stored() {
            // Given an empty table
            let mut table = ContactTable::new();

            // When we insert a record with a malformed email
            let mut contact = test_contact("Ada Lovelace");
            contact.email = "not-an-email".to_string();

            let result = table.apply(Statement::Insert(contact), TransactionId(1));

            // Then the insert fails on the email rule and nothing is stored
            let Err(ApplyError::ValidationFailed(errors)) = result else {
                panic!("expected a validation failure");
            };

            assert_eq!(
                errors.for_field(Field::Email).map(|error| error.reason),
                Some(Reason::InvalidFormat)
            );

            assert!(table.is_empty());
        }

        #[test]
        fn single_character_name_is_rejected() {
            let mut table = ContactTable::new();

            let mut contact = test_contact("A");

            // Trimming happens before the length rule
            contact.name = " A ".to_string();

            let result = table.apply(Statement::Insert(contact), TransactionId(1));

            let Err(ApplyError::ValidationFailed(errors)) = result else {
                panic!("expected a validation failure");
            };

            assert_eq!(
                errors.for_field(Field::Name).map(|error| error.reason),
                Some(Reason::TooShort)
            );
        }
    }

    mod getting {
        use super::*;

        #[test]
        fn get_returns_the_inserted_record() {
            // Given a table with a record
            let mut table = ContactTable::new();
            let contact = test_contact("Ada Lovelace");

            table
                .apply(Statement::Insert(contact.clone()), TransactionId(1))
                .expect("insert should succeed");

            // When we get it by id
            let result = table
                .apply(Statement::Get(contact.id.clone()), TransactionId(2))
                .expect("get should succeed");

            // Then we get the record back
            assert_eq!(result, StatementResult::Single(contact));
        }

        #[test]
        fn getting_a_missing_record_fails() {
            let mut table = ContactTable::new();

            let id = ContactId::new();

            let result = table.apply(Statement::Get(id.clone()), TransactionId(1));

            assert_eq!(result, Err(ApplyError::NotFound(id)));
        }
    }

    mod removing {
        use super::*;

        #[test]
        fn remove_returns_the_removed_record() {
            // Given a table with a record
            let mut table = ContactTable::new();
            let contact = test_contact("Ada Lovelace");

            table
                .apply(Statement::Insert(contact.clone()), TransactionId(1))
                .expect("insert should succeed");

            // When we remove it
            let result = table
                .apply(Statement::Remove(contact.id.clone()), TransactionId(2))
                .expect("remove should succeed");

            // Then the removed record comes back and the row is gone
            assert_eq!(result, StatementResult::Single(contact));
            assert!(table.is_empty());
        }

        #[test]
        fn removing_twice_fails_with_not_found() {
            // Given a table with a record
            let mut table = ContactTable::new();
            let contact = test_contact("Ada Lovelace");

            table
                .apply(Statement::Insert(contact.clone()), TransactionId(1))
                .expect("insert should succeed");

            // When we remove it twice
            table
                .apply(Statement::Remove(contact.id.clone()), TransactionId(2))
                .expect("first remove should succeed");

            let result = table.apply(Statement::Remove(contact.id.clone()), TransactionId(3));

            // Then the second remove reports the record as missing
            assert_eq!(result, Err(ApplyError::NotFound(contact.id)));
        }
    }

    mod listing {
        use super::*;

        #[test]
        fn list_returns_newest_first() {
            // Given records created at increasing timestamps, inserted in
            // creation order
            let mut table = ContactTable::new();
            let base = Utc::now();

            let first = test_contact_created_at("First", base);
            let second = test_contact_created_at("Second", base + Duration::milliseconds(10));
            let third = test_contact_created_at("Third", base + Duration::milliseconds(20));

            for (index, contact) in [&first, &second, &third].into_iter().enumerate() {
                table
                    .apply(Statement::Insert(contact.clone()), TransactionId(index + 1))
                    .expect("insert should succeed");
            }

            // When we list
            let listed = table
                .apply(Statement::List, TransactionId(4))
                .expect("list should succeed")
                .list();

            // Then the newest record comes first
            assert_eq!(listed, vec![third, second, first]);
        }

        #[test]
        fn records_created_in_the_same_millisecond_list_in_reverse_arrival_order() {
            // Given three records sharing a creation timestamp
            let mut table = ContactTable::new();
            let created_at = Utc::now();

            let first = test_contact_created_at("First", created_at);
            let second = test_contact_created_at("Second", created_at);
            let third = test_contact_created_at("Third", created_at);

            for (index, contact) in [&first, &second, &third].into_iter().enumerate() {
                table
                    .apply(Statement::Insert(contact.clone()), TransactionId(index + 1))
                    .expect("insert should succeed");
            }

            // When we list
            let listed = table
                .apply(Statement::List, TransactionId(4))
                .expect("list should succeed")
                .list();

            // Then the latest transaction wins the tie
            assert_eq!(listed, vec![third, second, first]);
        }

        #[test]
        fn listing_an_empty_table_returns_no_records() {
            let mut table = ContactTable::new();

            let listed = table
                .apply(Statement::List, TransactionId(1))
                .expect("list should succeed")
                .list();

            assert!(listed.is_empty());
        }
    }

    mod rollback {
        use super::*;

        #[test]
        fn rolled_back_insert_leaves_no_row() {
            // Given a table where an insert has applied
            let mut table = ContactTable::new();
            let contact = test_contact("Ada Lovelace");

            let result = table
                .apply(Statement::Insert(contact.clone()), TransactionId(1))
                .expect("insert should succeed");

            // When the insert rolls back
            table.apply_rollback(Statement::Insert(contact), result, TransactionId(1));

            // Then the table is empty again
            assert!(table.is_empty());
        }

        #[test]
        fn rolled_back_remove_reinstates_the_row() {
            // Given a table where a remove has applied
            let mut table = ContactTable::new();
            let contact = test_contact("Ada Lovelace");

            table
                .apply(Statement::Insert(contact.clone()), TransactionId(1))
                .expect("insert should succeed");

            let result = table
                .apply(Statement::Remove(contact.id.clone()), TransactionId(2))
                .expect("remove should succeed");

            // When the remove rolls back
            table.apply_rollback(
                Statement::Remove(contact.id.clone()),
                result,
                TransactionId(2),
            );

            // Then the record is back
            let row = table
                .contact_rows
                .get(&contact.id)
                .expect("should have a row");

            assert_eq!(row.contact, contact);
        }
    }
}
