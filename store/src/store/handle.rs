use std::{sync::mpsc::Sender, time::Duration};
use thiserror::Error;

use crate::{
    consts::consts::ContactId,
    model::{
        contact::{Contact, ContactDraft},
        statement::{Statement, StatementResult},
        validate::FieldErrors,
    },
};

use super::{
    commands::{CommitError, Control, ControlResponse, StoreCommand, StoreCommandRequest,
        StoreCommandResponse},
    table::ApplyError,
};

const RESPONSE_DEADLINE: Duration = Duration::from_secs(2);

/// Failures surfaced to callers. Validation and missing records are the
/// caller's problem, the rest mean the store itself is in trouble.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("Not found, record does not exist: {0}")]
    NotFound(ContactId),

    #[error("Store took too long to respond to the request")]
    Timeout,

    #[error("Store worker is offline")]
    Offline,

    #[error("Store fault: {0}")]
    Fault(String),
}

impl From<CommitError> for StoreError {
    fn from(error: CommitError) -> Self {
        match error {
            CommitError::Apply(ApplyError::ValidationFailed(errors)) => {
                StoreError::ValidationFailed(errors)
            }
            CommitError::Apply(ApplyError::NotFound(id)) => StoreError::NotFound(id),
            // Ids are store assigned uuids, a collision is a store bug
            CommitError::Apply(other @ ApplyError::AlreadyExists(_)) => {
                StoreError::Fault(other.to_string())
            }
            CommitError::JournalWrite(journal_error) => {
                StoreError::Fault(journal_error.to_string())
            }
        }
    }
}

/// Goal of the handle is to provide a simple interface for interacting with
/// the store worker
///
/// The handle provides the following APIs. These are sorted by the easiest
/// to use to the most complex
/// 1. CRUD operations on a single contact -- these are completely type safe
/// 2. Control operations (snapshot, reset, shutdown) -- type safe, respond
///    with a status message
/// 3. Generic statement based API -- not type safe because you need to know
///    what Statement maps to what StatementResult (e.g. Statement::Insert
///    maps -> StatementResult::Single)
#[derive(Clone)]
pub struct StoreHandle {
    store_sender: Sender<StoreCommandRequest>,
}

impl StoreHandle {
    pub fn new(store_sender: Sender<StoreCommandRequest>) -> Self {
        Self { store_sender }
    }

    /// Materializes the draft and stores it. The store assigns the id and
    /// timestamps, callers only ever supply the draft fields.
    pub fn insert(&self, draft: ContactDraft) -> Result<Contact, StoreError> {
        let contact = Contact::from_draft(draft);

        Ok(self.send_statement(Statement::Insert(contact))?.single())
    }

    pub fn get(&self, id: ContactId) -> Result<Contact, StoreError> {
        Ok(self.send_statement(Statement::Get(id))?.single())
    }

    /// Every stored contact, newest first
    pub fn list(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.send_statement(Statement::List)?.list())
    }

    /// Deletes and returns the removed record
    pub fn delete(&self, id: ContactId) -> Result<Contact, StoreError> {
        Ok(self.send_statement(Statement::Remove(id))?.single())
    }

    /// Writes a snapshot and trims the journal, the next startup skips the replay
    pub fn send_snapshot_request(&self) -> Result<String, StoreError> {
        self.send_control(Control::Snapshot)
    }

    /// Drops every record and resets persistent state
    pub fn send_reset_request(&self) -> Result<String, StoreError> {
        self.send_control(Control::Reset)
    }

    /// Sends a shutdown request to the store and returns the store's response
    pub fn send_shutdown_request(&self) -> Result<String, StoreError> {
        self.send_control(Control::Shutdown)
    }

    pub fn send_statement(&self, statement: Statement) -> Result<StatementResult, StoreError> {
        match self.send_command(StoreCommand::Statement(statement))? {
            StoreCommandResponse::Statement(Ok(statement_result)) => Ok(statement_result),
            StoreCommandResponse::Statement(Err(commit_error)) => Err(commit_error.into()),
            StoreCommandResponse::Control(_) => {
                panic!("Statement command should always produce a statement response")
            }
        }
    }

    fn send_control(&self, control: Control) -> Result<String, StoreError> {
        match self.send_command(StoreCommand::Control(control))? {
            StoreCommandResponse::Control(ControlResponse::Success(message)) => Ok(message),
            StoreCommandResponse::Control(ControlResponse::Error(message)) => {
                Err(StoreError::Fault(message))
            }
            StoreCommandResponse::Statement(_) => {
                panic!("Control command should always produce a control response")
            }
        }
    }

    fn send_command(&self, command: StoreCommand) -> Result<StoreCommandResponse, StoreError> {
        let (resolver, response_receiver) = oneshot::channel::<StoreCommandResponse>();

        let request = StoreCommandRequest { resolver, command };

        // Sends the request to the store worker, the worker will respond
        //  on the response_receiver once it has finished processing
        if self.store_sender.send(request).is_err() {
            return Err(StoreError::Offline);
        }

        match response_receiver.recv_timeout(RESPONSE_DEADLINE) {
            Ok(response) => Ok(response),
            Err(oneshot::RecvTimeoutError::Timeout) => Err(StoreError::Timeout),
            Err(oneshot::RecvTimeoutError::Disconnected) => Err(StoreError::Offline),
        }
    }
}
