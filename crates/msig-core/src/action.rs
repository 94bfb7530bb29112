use crate::error::{MsigError, Result};
use crate::governance::GovernanceCall;
use crate::types::{ActionIndex, Identity, Payload, Target};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome / ActionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Executed,
    Failed,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Executed => "executed",
            ActionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One proposal in the queue.
///
/// `index`, `proposer`, `target`, `amount`, `payload` and `submitted_at` are
/// fixed at submission. `confirmed_by` changes only while `executed` is false.
/// `executed` flips to true once and `outcome` is recorded by the same
/// execute call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub index: ActionIndex,
    pub proposer: Identity,
    pub target: Target,
    pub amount: u64,
    #[serde(default)]
    pub payload: Payload,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub confirmed_by: Vec<Identity>,
    #[serde(default)]
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl Action {
    pub fn new(
        index: ActionIndex,
        proposer: Identity,
        target: Target,
        amount: u64,
        payload: Payload,
    ) -> Self {
        Self {
            index,
            proposer,
            target,
            amount,
            payload,
            submitted_at: Utc::now(),
            confirmed_by: Vec::new(),
            executed: false,
            outcome: None,
        }
    }

    pub fn confirmation_count(&self) -> usize {
        self.confirmed_by.len()
    }

    pub fn is_confirmed_by(&self, owner: &Identity) -> bool {
        self.confirmed_by.contains(owner)
    }

    pub fn status(&self) -> ActionStatus {
        match (&self.outcome, self.executed) {
            (Some(Outcome::Failed { .. }), _) => ActionStatus::Failed,
            (_, true) => ActionStatus::Executed,
            (_, false) => ActionStatus::Pending,
        }
    }

    /// The decoded governance call, if this action targets the registry and
    /// its payload decodes.
    pub fn governance_call(&self) -> Option<GovernanceCall> {
        if !self.target.is_registry() {
            return None;
        }
        GovernanceCall::decode(&self.payload).ok()
    }

    pub(crate) fn ensure_pending(&self) -> Result<()> {
        if self.executed {
            return Err(MsigError::AlreadyExecuted(self.index));
        }
        Ok(())
    }

    pub(crate) fn add_confirmation(&mut self, owner: &Identity) -> Result<()> {
        self.ensure_pending()?;
        if self.is_confirmed_by(owner) {
            return Err(MsigError::AlreadyConfirmed {
                index: self.index,
                owner: owner.clone(),
            });
        }
        self.confirmed_by.push(owner.clone());
        Ok(())
    }

    pub(crate) fn remove_confirmation(&mut self, owner: &Identity) -> Result<()> {
        self.ensure_pending()?;
        let Some(pos) = self.confirmed_by.iter().position(|o| o == owner) else {
            return Err(MsigError::NotConfirmed {
                index: self.index,
                owner: owner.clone(),
            });
        };
        self.confirmed_by.remove(pos);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn sample() -> Action {
        Action::new(
            0,
            id("o1"),
            Target::Account(id("o2")),
            123,
            Payload::new(vec![0xff]),
        )
    }

    #[test]
    fn new_action_is_pending_and_unconfirmed() {
        let action = sample();
        assert!(!action.executed);
        assert_eq!(action.confirmation_count(), 0);
        assert_eq!(action.status(), ActionStatus::Pending);
        assert!(action.outcome.is_none());
    }

    #[test]
    fn confirm_then_revoke() {
        let mut action = sample();
        action.add_confirmation(&id("o1")).unwrap();
        action.add_confirmation(&id("o2")).unwrap();
        assert_eq!(action.confirmation_count(), 2);

        action.remove_confirmation(&id("o1")).unwrap();
        assert_eq!(action.confirmed_by, vec![id("o2")]);
        assert!(matches!(
            action.remove_confirmation(&id("o1")),
            Err(MsigError::NotConfirmed { index: 0, .. })
        ));
    }

    #[test]
    fn double_confirm_fails_even_after_others_confirm() {
        let mut action = sample();
        action.add_confirmation(&id("o1")).unwrap();
        action.add_confirmation(&id("o2")).unwrap();
        assert!(matches!(
            action.add_confirmation(&id("o1")),
            Err(MsigError::AlreadyConfirmed { .. })
        ));
        assert_eq!(action.confirmation_count(), 2);
    }

    #[test]
    fn executed_action_rejects_confirmation_changes() {
        let mut action = sample();
        action.add_confirmation(&id("o1")).unwrap();
        action.executed = true;
        assert!(matches!(
            action.add_confirmation(&id("o2")),
            Err(MsigError::AlreadyExecuted(0))
        ));
        assert!(matches!(
            action.remove_confirmation(&id("o1")),
            Err(MsigError::AlreadyExecuted(0))
        ));
        assert_eq!(action.confirmed_by, vec![id("o1")]);
    }

    #[test]
    fn status_reflects_outcome() {
        let mut action = sample();
        action.executed = true;
        action.outcome = Some(Outcome::Succeeded);
        assert_eq!(action.status(), ActionStatus::Executed);
        action.outcome = Some(Outcome::Failed {
            reason: "boom".to_string(),
        });
        assert_eq!(action.status(), ActionStatus::Failed);
    }

    #[test]
    fn governance_call_only_for_registry_target() {
        let call = GovernanceCall::SetThreshold { threshold: 2 };
        let gov = Action::new(1, id("o1"), Target::Registry, 0, call.encode().unwrap());
        assert_eq!(gov.governance_call(), Some(call.clone()));

        let external = Action::new(2, id("o1"), Target::Account(id("o2")), 0, call.encode().unwrap());
        assert_eq!(external.governance_call(), None);
    }
}
