use crate::action::{Action, Outcome};
use crate::dispatch::{Call, Dispatcher};
use crate::error::{MsigError, Result};
use crate::event::{Event, EventKind};
use crate::governance::GovernanceCall;
use crate::paths;
use crate::registry::{Authority, OwnerRegistry, SelfCall};
use crate::types::{ActionIndex, Identity, Payload, Target};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// The owner registry and the action queue as one aggregate.
///
/// Every operation reads and writes through `&mut self`, so a single wallet
/// value is always mutated by one operation at a time. Wrap it in
/// [`crate::shared::SharedWallet`] to share it across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default = "default_version")]
    pub version: u32,
    registry: OwnerRegistry,
    #[serde(default)]
    actions: Vec<Action>,
    #[serde(skip)]
    events: Vec<Event>,
}

fn default_version() -> u32 {
    1
}

impl Wallet {
    pub fn new(creator: Identity) -> Self {
        tracing::debug!(creator = %creator, "wallet created");
        Self {
            version: 1,
            registry: OwnerRegistry::new(creator),
            actions: Vec::new(),
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Create and persist a new wallet. Fails if one already exists at `root`.
    pub fn init(root: &Path, creator: Identity) -> Result<Self> {
        let path = paths::wallet_path(root);
        if path.exists() {
            return Err(MsigError::AlreadyInitialized(path.display().to_string()));
        }
        let wallet = Wallet::new(creator);
        wallet.save(root)?;
        Ok(wallet)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::wallet_path(root);
        if !path.exists() {
            return Err(MsigError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let wallet: Wallet = serde_yaml::from_str(&data)?;
        wallet.validate()?;
        Ok(wallet)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::wallet_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Check the registry invariants and the shape of the action log.
    pub fn validate(&self) -> Result<()> {
        self.registry.validate()?;
        for (pos, action) in self.actions.iter().enumerate() {
            if action.index != pos as ActionIndex {
                return Err(MsigError::CorruptState(format!(
                    "action at position {pos} has index {}",
                    action.index
                )));
            }
            for (i, owner) in action.confirmed_by.iter().enumerate() {
                if action.confirmed_by[..i].contains(owner) {
                    return Err(MsigError::CorruptState(format!(
                        "action {} confirmed twice by {owner}",
                        action.index
                    )));
                }
            }
            if action.outcome.is_some() && !action.executed {
                return Err(MsigError::CorruptState(format!(
                    "action {} has an outcome but is not executed",
                    action.index
                )));
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Registry reads
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    pub fn is_owner(&self, identity: &Identity) -> bool {
        self.registry.is_owner(identity)
    }

    pub fn list_owners(&self) -> Vec<Identity> {
        self.registry.list_owners()
    }

    pub fn owner_at(&self, position: usize) -> Option<&Identity> {
        self.registry.owner_at(position)
    }

    pub fn threshold(&self) -> u32 {
        self.registry.threshold()
    }

    // -----------------------------------------------------------------------
    // Queue reads
    // -----------------------------------------------------------------------

    pub fn count(&self) -> u64 {
        self.actions.len() as u64
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, index: ActionIndex) -> Result<&Action> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.actions.get(i))
            .ok_or(MsigError::NotFound(index))
    }

    /// Owned snapshot of one action.
    pub fn get_action(&self, index: ActionIndex) -> Result<Action> {
        self.action(index).cloned()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| !a.executed)
    }

    /// Whether `execute` would pass the quorum gate right now.
    pub fn is_ready(&self, index: ActionIndex) -> Result<bool> {
        let action = self.action(index)?;
        Ok(!action.executed && action.confirmation_count() >= self.threshold() as usize)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, kind: EventKind) {
        self.events.push(Event::now(kind));
    }

    // -----------------------------------------------------------------------
    // Queue operations
    // -----------------------------------------------------------------------

    pub fn submit(
        &mut self,
        proposer: &Identity,
        target: Target,
        amount: u64,
        payload: Payload,
    ) -> Result<ActionIndex> {
        self.require_owner(proposer)?;
        let index = self.count();
        self.actions.push(Action::new(
            index,
            proposer.clone(),
            target.clone(),
            amount,
            payload.clone(),
        ));
        tracing::info!(proposer = %proposer, index, to = %target, amount, "action submitted");
        self.emit(EventKind::ActionSubmitted {
            proposer: proposer.clone(),
            index,
            target,
            amount,
            payload,
        });
        Ok(index)
    }

    /// Submit a governance action targeting the registry itself.
    pub fn propose(&mut self, proposer: &Identity, call: &GovernanceCall) -> Result<ActionIndex> {
        self.submit(proposer, GovernanceCall::target(), 0, call.encode()?)
    }

    pub fn confirm(&mut self, caller: &Identity, index: ActionIndex) -> Result<()> {
        self.require_owner(caller)?;
        self.action_mut(index)?.add_confirmation(caller)?;
        tracing::info!(caller = %caller, index, "action confirmed");
        self.emit(EventKind::ActionConfirmed {
            caller: caller.clone(),
            index,
        });
        Ok(())
    }

    pub fn revoke(&mut self, caller: &Identity, index: ActionIndex) -> Result<()> {
        self.require_owner(caller)?;
        self.action_mut(index)?.remove_confirmation(caller)?;
        tracing::info!(caller = %caller, index, "confirmation revoked");
        self.emit(EventKind::ConfirmationRevoked {
            caller: caller.clone(),
            index,
        });
        Ok(())
    }

    /// Run an approved action.
    ///
    /// The quorum gate uses the threshold live at this call. The action is
    /// marked executed before its effect runs and stays executed even when
    /// the effect fails, in which case this returns `ExecutionFailed`.
    /// Registry-targeted actions are applied here; all others go to
    /// `dispatcher`.
    pub fn execute<D>(
        &mut self,
        caller: &Identity,
        index: ActionIndex,
        dispatcher: &mut D,
    ) -> Result<()>
    where
        D: Dispatcher + ?Sized,
    {
        self.require_owner(caller)?;
        let threshold = self.threshold();
        let action = self.action_mut(index)?;
        action.ensure_pending()?;
        let confirmations = action.confirmation_count();
        if confirmations < threshold as usize {
            return Err(MsigError::QuorumNotMet {
                index,
                confirmations,
                threshold,
            });
        }

        action.executed = true;
        let call = Call {
            index,
            target: action.target.clone(),
            amount: action.amount,
            payload: action.payload.clone(),
        };
        tracing::info!(caller = %caller, index, to = %call.target, "executing action");

        let result = if call.target.is_registry() {
            self.apply_governance(&call.payload)
                .map_err(|e| e.to_string())
        } else {
            dispatcher.invoke(self, &call).map_err(|e| e.to_string())
        };

        match result {
            Ok(()) => {
                self.record_outcome(index, Outcome::Succeeded);
                self.emit(EventKind::ActionExecuted {
                    caller: caller.clone(),
                    index,
                });
                Ok(())
            }
            Err(reason) => {
                tracing::warn!(index, reason = %reason, "action failed; it stays consumed");
                self.record_outcome(
                    index,
                    Outcome::Failed {
                        reason: reason.clone(),
                    },
                );
                self.emit(EventKind::ExecutionFailed {
                    caller: caller.clone(),
                    index,
                    reason: reason.clone(),
                });
                Err(MsigError::ExecutionFailed { index, reason })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Governance primitives
    // -----------------------------------------------------------------------

    pub fn add_owner(&mut self, authority: &Authority, owner: Identity) -> Result<()> {
        self.registry.add_owner(authority, owner.clone())?;
        self.emit(EventKind::OwnerAdded { owner });
        Ok(())
    }

    pub fn remove_owner(&mut self, authority: &Authority, owner: &Identity) -> Result<()> {
        let clamped = self.registry.remove_owner(authority, owner)?;
        self.emit(EventKind::OwnerRemoved {
            owner: owner.clone(),
        });
        if let Some(threshold) = clamped {
            self.emit(EventKind::ThresholdChanged { threshold });
        }
        Ok(())
    }

    pub fn set_threshold(&mut self, authority: &Authority, threshold: u32) -> Result<()> {
        self.registry.set_threshold(authority, threshold)?;
        self.emit(EventKind::ThresholdChanged { threshold });
        Ok(())
    }

    fn apply_governance(&mut self, payload: &Payload) -> Result<()> {
        let call = GovernanceCall::decode(payload)?;
        let authority = Authority::SelfCall(SelfCall::mint());
        tracing::debug!(call = %call, "applying governance call");
        match call {
            GovernanceCall::AddOwner { owner } => self.add_owner(&authority, owner),
            GovernanceCall::RemoveOwner { owner } => self.remove_owner(&authority, &owner),
            GovernanceCall::SetThreshold { threshold } => self.set_threshold(&authority, threshold),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn require_owner(&self, caller: &Identity) -> Result<()> {
        if !self.registry.is_owner(caller) {
            return Err(MsigError::Unauthorized(format!("{caller} is not an owner")));
        }
        Ok(())
    }

    fn action_mut(&mut self, index: ActionIndex) -> Result<&mut Action> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.actions.get_mut(i))
            .ok_or(MsigError::NotFound(index))
    }

    fn record_outcome(&mut self, index: ActionIndex, outcome: Outcome) {
        if let Ok(action) = self.action_mut(index) {
            if action.outcome.is_none() {
                action.outcome = Some(outcome);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
