use crate::error::{MsigError, Result};
use crate::types::Identity;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Authority
// ---------------------------------------------------------------------------

/// Proof that a registry mutation originates from the execute step of an
/// approved governance action. Only this crate can mint one.
#[derive(Debug)]
pub struct SelfCall {
    _private: (),
}

impl SelfCall {
    pub(crate) fn mint() -> Self {
        Self { _private: () }
    }
}

/// Who is asking for a registry mutation.
#[derive(Debug)]
pub enum Authority {
    /// An external caller. Never sufficient, even for a current owner.
    Caller(Identity),
    /// The wallet's own execute path.
    SelfCall(SelfCall),
}

impl Authority {
    fn require_self_call(&self) -> Result<()> {
        match self {
            Authority::SelfCall(_) => Ok(()),
            Authority::Caller(id) => Err(MsigError::Unauthorized(format!(
                "{id} called a governance primitive directly; it must be executed as an approved action"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// OwnerRegistry
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free owner set plus the approval threshold.
///
/// Invariant: `owners` is non-empty and distinct, and
/// `1 <= threshold <= owners.len()`. A deserialized registry is unchecked
/// until `validate()` runs; `Wallet::load` always runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRegistry {
    owners: Vec<Identity>,
    threshold: u32,
}

impl OwnerRegistry {
    /// A fresh registry: the creator is the only owner and the threshold is 1.
    pub fn new(creator: Identity) -> Self {
        Self {
            owners: vec![creator],
            threshold: 1,
        }
    }

    pub fn is_owner(&self, identity: &Identity) -> bool {
        // Owner sets stay small.
        self.owners.contains(identity)
    }

    pub fn owners(&self) -> &[Identity] {
        &self.owners
    }

    /// The owner at `position` in insertion order.
    pub fn owner_at(&self, position: usize) -> Option<&Identity> {
        self.owners.get(position)
    }

    /// Snapshot of the owners in insertion order.
    pub fn list_owners(&self) -> Vec<Identity> {
        self.owners.clone()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.owners.is_empty() {
            return Err(MsigError::CorruptState("owner set is empty".to_string()));
        }
        for (i, owner) in self.owners.iter().enumerate() {
            if self.owners[..i].contains(owner) {
                return Err(MsigError::CorruptState(format!("duplicate owner {owner}")));
            }
        }
        if self.threshold < 1 || self.threshold as usize > self.owners.len() {
            return Err(MsigError::CorruptState(format!(
                "threshold {} outside 1..={}",
                self.threshold,
                self.owners.len()
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutations (self-call only)
    // -----------------------------------------------------------------------

    pub fn add_owner(&mut self, authority: &Authority, owner: Identity) -> Result<()> {
        authority.require_self_call()?;
        self.validate()?;
        if self.is_owner(&owner) {
            return Err(MsigError::DuplicateOwner(owner));
        }
        tracing::info!(owner = %owner, "owner added");
        self.owners.push(owner);
        debug_assert!(self.validate().is_ok());
        Ok(())
    }

    /// Removes `owner`. If the threshold would exceed the remaining owner
    /// count it is clamped down; the new threshold is returned in that case.
    pub fn remove_owner(&mut self, authority: &Authority, owner: &Identity) -> Result<Option<u32>> {
        authority.require_self_call()?;
        self.validate()?;
        let Some(pos) = self.owners.iter().position(|o| o == owner) else {
            return Err(MsigError::UnknownOwner(owner.clone()));
        };
        if self.owners.len() == 1 {
            return Err(MsigError::LastOwner(owner.clone()));
        }
        self.owners.remove(pos);
        tracing::info!(owner = %owner, "owner removed");

        let remaining = self.owners.len() as u32;
        let clamped = if self.threshold > remaining {
            tracing::info!(from = self.threshold, to = remaining, "threshold clamped to owner count");
            self.threshold = remaining;
            Some(remaining)
        } else {
            None
        };
        debug_assert!(self.validate().is_ok());
        Ok(clamped)
    }

    pub fn set_threshold(&mut self, authority: &Authority, threshold: u32) -> Result<()> {
        authority.require_self_call()?;
        self.validate()?;
        if threshold < 1 || threshold as usize > self.owners.len() {
            return Err(MsigError::InvalidThreshold {
                requested: threshold,
                owners: self.owners.len(),
            });
        }
        tracing::info!(from = self.threshold, to = threshold, "threshold changed");
        self.threshold = threshold;
        debug_assert!(self.validate().is_ok());
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

    fn internal() -> Authority {
        Authority::SelfCall(SelfCall::mint())
    }

    #[test]
    fn new_registry_has_creator_and_threshold_one() {
        let reg = OwnerRegistry::new(id("o1"));
        assert_eq!(reg.list_owners(), vec![id("o1")]);
        assert_eq!(reg.threshold(), 1);
        assert!(reg.is_owner(&id("o1")));
        assert!(!reg.is_owner(&id("anon")));
    }

    #[test]
    fn add_owner_appends_in_order() {
        let mut reg = OwnerRegistry::new(id("o1"));
        reg.add_owner(&internal(), id("o2")).unwrap();
        reg.add_owner(&internal(), id("o3")).unwrap();
        assert_eq!(reg.list_owners(), vec![id("o1"), id("o2"), id("o3")]);
        assert_eq!(reg.threshold(), 1);
    }

    #[test]
    fn add_duplicate_owner_fails() {
        let mut reg = OwnerRegistry::new(id("o1"));
        let err = reg.add_owner(&internal(), id("o1")).unwrap_err();
        assert!(matches!(err, MsigError::DuplicateOwner(o) if o == id("o1")));
        assert_eq!(reg.owner_count(), 1);
    }

    #[test]
    fn remove_unknown_owner_fails() {
        let mut reg = OwnerRegistry::new(id("o1"));
        let err = reg.remove_owner(&internal(), &id("ghost")).unwrap_err();
        assert!(matches!(err, MsigError::UnknownOwner(_)));
    }

    #[test]
    fn remove_last_owner_fails() {
        let mut reg = OwnerRegistry::new(id("o1"));
        let err = reg.remove_owner(&internal(), &id("o1")).unwrap_err();
        assert!(matches!(err, MsigError::LastOwner(_)));
        assert!(reg.is_owner(&id("o1")));
    }

    #[test]
    fn remove_clamps_threshold_down() {
        let mut reg = OwnerRegistry::new(id("o1"));
        reg.add_owner(&internal(), id("o2")).unwrap();
        reg.set_threshold(&internal(), 2).unwrap();

        let clamped = reg.remove_owner(&internal(), &id("o1")).unwrap();
        assert_eq!(clamped, Some(1));
        assert_eq!(reg.list_owners(), vec![id("o2")]);
        assert_eq!(reg.threshold(), 1);
    }

    #[test]
    fn remove_keeps_threshold_when_still_reachable() {
        let mut reg = OwnerRegistry::new(id("o1"));
        reg.add_owner(&internal(), id("o2")).unwrap();
        reg.add_owner(&internal(), id("o3")).unwrap();
        reg.set_threshold(&internal(), 2).unwrap();

        assert_eq!(reg.remove_owner(&internal(), &id("o2")).unwrap(), None);
        assert_eq!(reg.threshold(), 2);
        assert_eq!(reg.list_owners(), vec![id("o1"), id("o3")]);
    }

    #[test]
    fn set_threshold_bounds() {
        let mut reg = OwnerRegistry::new(id("o1"));
        assert!(matches!(
            reg.set_threshold(&internal(), 0),
            Err(MsigError::InvalidThreshold { requested: 0, owners: 1 })
        ));
        assert!(matches!(
            reg.set_threshold(&internal(), 2),
            Err(MsigError::InvalidThreshold { requested: 2, owners: 1 })
        ));
        assert_eq!(reg.threshold(), 1);
    }

    #[test]
    fn external_callers_are_rejected() {
        let mut reg = OwnerRegistry::new(id("o1"));
        let owner = Authority::Caller(id("o1"));
        let stranger = Authority::Caller(id("anon"));

        for auth in [&owner, &stranger] {
            assert!(matches!(
                reg.add_owner(auth, id("o2")),
                Err(MsigError::Unauthorized(_))
            ));
            assert!(matches!(
                reg.remove_owner(auth, &id("o1")),
                Err(MsigError::Unauthorized(_))
            ));
            assert!(matches!(
                reg.set_threshold(auth, 1),
                Err(MsigError::Unauthorized(_))
            ));
        }
        assert_eq!(reg, OwnerRegistry::new(id("o1")));
    }

    #[test]
    fn validate_flags_broken_records() {
        let ok = "owners: [a, b]\nthreshold: 2\n";
        let reg: OwnerRegistry = serde_yaml::from_str(ok).unwrap();
        assert!(reg.validate().is_ok());

        for bad in [
            "owners: []\nthreshold: 1\n",
            "owners: [a, a]\nthreshold: 1\n",
            "owners: [a]\nthreshold: 0\n",
            "owners: [a, b]\nthreshold: 3\n",
        ] {
            let reg: OwnerRegistry = serde_yaml::from_str(bad).unwrap();
            assert!(
                matches!(reg.validate(), Err(MsigError::CorruptState(_))),
                "expected rejection: {bad}"
            );
        }
    }

    #[test]
    fn owner_at_follows_insertion_order() {
        let mut reg = OwnerRegistry::new(id("o1"));
        reg.add_owner(&internal(), id("o2")).unwrap();
        assert_eq!(reg.owner_at(0), Some(&id("o1")));
        assert_eq!(reg.owner_at(1), Some(&id("o2")));
        assert_eq!(reg.owner_at(2), None);

        reg.remove_owner(&internal(), &id("o1")).unwrap();
        assert_eq!(reg.owner_at(0), Some(&id("o2")));
    }
}
