use crate::types::{ActionIndex, Identity, Payload, Target};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification for external observers. Not needed for correctness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn now(kind: EventKind) -> Self {
        Self {
            at: Utc::now(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    ActionSubmitted {
        proposer: Identity,
        index: ActionIndex,
        target: Target,
        amount: u64,
        payload: Payload,
    },
    ActionConfirmed {
        caller: Identity,
        index: ActionIndex,
    },
    ConfirmationRevoked {
        caller: Identity,
        index: ActionIndex,
    },
    ActionExecuted {
        caller: Identity,
        index: ActionIndex,
    },
    ExecutionFailed {
        caller: Identity,
        index: ActionIndex,
        reason: String,
    },
    OwnerAdded {
        owner: Identity,
    },
    OwnerRemoved {
        owner: Identity,
    },
    ThresholdChanged {
        threshold: u32,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::ActionSubmitted { .. } => "action_submitted",
            EventKind::ActionConfirmed { .. } => "action_confirmed",
            EventKind::ConfirmationRevoked { .. } => "confirmation_revoked",
            EventKind::ActionExecuted { .. } => "action_executed",
            EventKind::ExecutionFailed { .. } => "execution_failed",
            EventKind::OwnerAdded { .. } => "owner_added",
            EventKind::OwnerRemoved { .. } => "owner_removed",
            EventKind::ThresholdChanged { .. } => "threshold_changed",
        }
    }
}
