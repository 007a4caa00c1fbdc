use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Types
pub type ErrorString = String;

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionId(pub usize);

impl TransactionId {
    pub fn new_first_transaction() -> TransactionId {
        TransactionId(0)
    }

    pub fn to_number(self) -> usize {
        self.0
    }

    pub fn increment(&self) -> TransactionId {
        TransactionId(self.0 + 1)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContactId(pub String);

impl ContactId {
    pub fn new() -> ContactId {
        ContactId(Uuid::new_v4().to_string())
    }
}

impl Default for ContactId {
    fn default() -> Self {
        ContactId::new()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContactId {
    fn from(value: String) -> Self {
        ContactId(value)
    }
}
