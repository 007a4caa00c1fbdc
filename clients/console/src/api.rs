use serde::Deserialize;
use store::consts::consts::ContactId;
use store::model::contact::{Contact, ContactDraft};
use thiserror::Error;

/// Wire shape shared by every endpoint.
#[derive(Deserialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered and refused
    #[error("{0}")]
    Server(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiClient {
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn create_contact(&self, draft: &ContactDraft) -> Result<Contact, ApiError> {
        let envelope: Envelope<Contact> = self
            .client
            .post(format!("{}/api/contacts", self.base_url))
            .json(draft)
            .send()?
            .json()?;

        Self::unwrap_envelope(envelope, "Failed to add contact")
    }

    pub fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let envelope: Envelope<Vec<Contact>> = self
            .client
            .get(format!("{}/api/contacts", self.base_url))
            .send()?
            .json()?;

        Self::unwrap_envelope(envelope, "Failed to fetch contacts")
    }

    pub fn delete_contact(&self, id: &ContactId) -> Result<Contact, ApiError> {
        let envelope: Envelope<Contact> = self
            .client
            .delete(format!("{}/api/contacts/{}", self.base_url, id))
            .send()?
            .json()?;

        Self::unwrap_envelope(envelope, "Failed to delete contact")
    }

    fn unwrap_envelope<T>(envelope: Envelope<T>, fallback: &str) -> Result<T, ApiError> {
        match envelope.data {
            Some(data) if envelope.success => Ok(data),
            _ => Err(ApiError::Server(
                envelope.message.unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}
