use crate::types::{ActionIndex, Identity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MsigError {
    #[error("not initialized: run 'msig init'")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("action {0} does not exist")]
    NotFound(ActionIndex),

    #[error("action {0} already executed")]
    AlreadyExecuted(ActionIndex),

    #[error("action {index} already confirmed by {owner}")]
    AlreadyConfirmed { index: ActionIndex, owner: Identity },

    #[error("action {index} not confirmed by {owner}")]
    NotConfirmed { index: ActionIndex, owner: Identity },

    #[error("action {index} has {confirmations} of {threshold} required confirmations")]
    QuorumNotMet {
        index: ActionIndex,
        confirmations: usize,
        threshold: u32,
    },

    #[error("action {index} failed: {reason}")]
    ExecutionFailed { index: ActionIndex, reason: String },

    #[error("owner already registered: {0}")]
    DuplicateOwner(Identity),

    #[error("not an owner: {0}")]
    UnknownOwner(Identity),

    #[error("invalid threshold {requested}: must be between 1 and {owners}")]
    InvalidThreshold { requested: u32, owners: usize },

    #[error("cannot remove {0}: the registry must keep at least one owner")]
    LastOwner(Identity),

    #[error("invalid identity '{0}': must be 1-128 characters of [A-Za-z0-9._:@-], starting alphanumeric")]
    InvalidIdentity(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("corrupt wallet state: {0}")]
    CorruptState(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("wallet lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MsigError>;
