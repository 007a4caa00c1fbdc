use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::consts::ContactId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Materializes a draft into a full record. The id and timestamps are
    /// assigned here, once, so the record is stable across journal replays.
    pub fn from_draft(draft: ContactDraft) -> Self {
        let draft = draft.normalized();
        let now = Utc::now();

        Contact {
            id: ContactId::new(),
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            message: draft.message,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_test() -> Self {
        let now = Utc::now();

        Contact {
            id: ContactId("1".to_string()),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+14155551234".to_string(),
            message: "".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// User-submitted contact fields, before the store assigns an id and
/// timestamps.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactDraft {
    pub fn new(name: String, email: String, phone: String, message: String) -> Self {
        ContactDraft {
            name,
            email,
            phone,
            message,
        }
    }

    /// Trims surrounding whitespace from every field. Phone digits are kept
    /// exactly as submitted, internal separators included.
    pub fn normalized(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    pub fn new_test() -> Self {
        ContactDraft {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+14155551234".to_string(),
            message: "Looking forward to hearing back".to_string(),
        }
    }
}
