use crate::error::{MsigError, Result};
use crate::types::{Identity, Payload, Target};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mutation of the owner set or threshold, carried as the payload of an
/// action whose target is [`Target::Registry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GovernanceCall {
    AddOwner { owner: Identity },
    RemoveOwner { owner: Identity },
    SetThreshold { threshold: u32 },
}

impl GovernanceCall {
    pub fn target() -> Target {
        Target::Registry
    }

    pub fn encode(&self) -> Result<Payload> {
        Ok(Payload::new(serde_json::to_vec(self)?))
    }

    pub fn decode(payload: &Payload) -> Result<Self> {
        serde_json::from_slice(payload.as_bytes())
            .map_err(|e| MsigError::InvalidPayload(format!("not a governance call: {e}")))
    }
}

impl fmt::Display for GovernanceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GovernanceCall::AddOwner { owner } => write!(f, "add_owner({owner})"),
            GovernanceCall::RemoveOwner { owner } => write!(f, "remove_owner({owner})"),
            GovernanceCall::SetThreshold { threshold } => write!(f, "set_threshold({threshold})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_payload_is_tagged_json() {
        let call = GovernanceCall::AddOwner {
            owner: Identity::new("bob").unwrap(),
        };
        let payload = call.encode().unwrap();
        let text = std::str::from_utf8(payload.as_bytes()).unwrap();
        assert_eq!(text, r#"{"op":"add_owner","owner":"bob"}"#);
        assert_eq!(GovernanceCall::decode(&payload).unwrap(), call);
    }

    #[test]
    fn decode_rejects_arbitrary_bytes() {
        let err = GovernanceCall::decode(&Payload::new(vec![0xff])).unwrap_err();
        assert!(matches!(err, MsigError::InvalidPayload(_)));

        let unknown = Payload::new(br#"{"op":"self_destruct"}"#.to_vec());
        assert!(GovernanceCall::decode(&unknown).is_err());
    }

    #[test]
    fn decode_rejects_invalid_owner() {
        let bad = Payload::new(br#"{"op":"remove_owner","owner":"has space"}"#.to_vec());
        assert!(GovernanceCall::decode(&bad).is_err());
    }

    #[test]
    fn display_names_the_primitive() {
        let call = GovernanceCall::SetThreshold { threshold: 2 };
        assert_eq!(call.to_string(), "set_threshold(2)");
    }
}
