use serde::{Deserialize, Serialize};

use crate::consts::consts::ContactId;

use super::contact::Contact;

/// A single operation against the contact table. Inserts carry the fully
/// materialized record so that replaying the journal reproduces identical
/// ids and timestamps.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Statement {
    Insert(Contact),
    Remove(ContactId),
    Get(ContactId),
    List,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        !self.is_mutation()
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Insert(_) | Statement::Remove(_) => true,
            Statement::Get(_) | Statement::List => false,
        }
    }

    pub fn log_format(&self) -> String {
        match self {
            Statement::Insert(contact) => format!("INSERT [{}]", contact.id),
            Statement::Remove(id) => format!("REMOVE [{}]", id),
            Statement::Get(id) => format!("GET [{}]", id),
            Statement::List => "LIST".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StatementResult {
    /// Used for store status messages
    SuccessStatus(String),
    Single(Contact),
    List(Vec<Contact>),
}

impl StatementResult {
    pub fn single(self) -> Contact {
        if let StatementResult::Single(contact) = self {
            contact
        } else {
            panic!("Statement result is not of type Single")
        }
    }

    pub fn list(self) -> Vec<Contact> {
        if let StatementResult::List(contacts) = self {
            contacts
        } else {
            panic!("Statement result is not of type List")
        }
    }

    #[allow(dead_code)]
    pub fn success_status(self) -> String {
        if let StatementResult::SuccessStatus(status) = self {
            status
        } else {
            panic!("Statement result is not of type SuccessStatus")
        }
    }
}
