use crate::types::{ActionIndex, Payload, Target};
use crate::wallet::Wallet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The effect an approved action asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub index: ActionIndex,
    pub target: Target,
    pub amount: u64,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DispatchError(pub String);

impl DispatchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Performs the external effect of an executed action.
///
/// Called at most once per action, synchronously, after the action has been
/// marked executed. The wallet is handed back so an implementation may call
/// into it; a nested `execute` of the same index fails with
/// `AlreadyExecuted`.
pub trait Dispatcher {
    fn invoke(&mut self, wallet: &mut Wallet, call: &Call) -> Result<(), DispatchError>;
}

impl<F> Dispatcher for F
where
    F: FnMut(&mut Wallet, &Call) -> Result<(), DispatchError>,
{
    fn invoke(&mut self, wallet: &mut Wallet, call: &Call) -> Result<(), DispatchError> {
        self(wallet, call)
    }
}

/// Records every call and optionally fails them all. Useful for hosts that
/// only need to observe what would be dispatched.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub calls: Vec<Call>,
    pub fail_with: Option<String>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            calls: Vec::new(),
            fail_with: Some(reason.into()),
        }
    }
}

impl Dispatcher for RecordingDispatcher {
    fn invoke(&mut self, _wallet: &mut Wallet, call: &Call) -> Result<(), DispatchError> {
        self.calls.push(call.clone());
        match &self.fail_with {
            Some(reason) => Err(DispatchError::new(reason.clone())),
            None => Ok(()),
        }
    }
}
