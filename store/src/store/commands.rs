use thiserror::Error;

use crate::consts::consts::ErrorString;
use crate::model::statement::{Statement, StatementResult};
use crate::persistence::storage::StorageError;
use crate::store::table::ApplyError;

/// Store commands are how we interact with the store, they are how we ask it
/// to run a statement, shutdown, etc
///
/// The majority of interactions happen via statements (insert, get, remove,
/// list), but there are also commands that control the store itself
/// (shutdown, snapshot, reset).
#[derive(Debug)]
pub enum StoreCommand {
    /// Runs a single statement against the contact table
    Statement(Statement),

    /// Commands that control the store
    Control(Control),
}

impl StoreCommand {
    pub fn log_format(&self) -> String {
        match self {
            StoreCommand::Statement(statement) => statement.log_format(),
            StoreCommand::Control(control) => format!("{:?}", control),
        }
    }
}

#[derive(Debug)]
pub enum Control {
    /// Performs a safe shutdown of the store, requests before the shutdown
    /// will be run / committed, requests after the shutdown will be ignored
    Shutdown,
    /// Writes the current state of the store to disk, removes the need for a
    /// journal replay on next startup
    Snapshot,
    /// Resets the store to the initial state, removes all records, resets
    /// transaction ids, etc
    Reset,
}

/// Why a statement did not commit. Apply failures are the caller's problem,
/// a journal failure is the store's.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum CommitError {
    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("Journal write failed, statement rolled back: {0}")]
    JournalWrite(StorageError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreCommandResponse {
    Statement(Result<StatementResult, CommitError>),
    Control(ControlResponse),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlResponse {
    /// Successfully performed the control
    Success(String),
    /// Command has failed, returns a message for why it failed
    Error(ErrorString),
}

impl StoreCommandResponse {
    pub fn control_success(message: &str) -> Self {
        StoreCommandResponse::Control(ControlResponse::Success(message.to_string()))
    }

    pub fn control_error(message: &str) -> Self {
        StoreCommandResponse::Control(ControlResponse::Error(message.to_string()))
    }

    pub fn statement_committed(result: StatementResult) -> Self {
        StoreCommandResponse::Statement(Ok(result))
    }

    pub fn statement_failed(error: CommitError) -> Self {
        StoreCommandResponse::Statement(Err(error))
    }
}

pub struct StoreCommandRequest {
    pub resolver: oneshot::Sender<StoreCommandResponse>,
    pub command: StoreCommand,
}
