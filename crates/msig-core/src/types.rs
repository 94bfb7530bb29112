use crate::error::MsigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Sequence position of an action in the queue. Assigned at submission.
pub type ActionIndex = u64;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

static IDENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn identity_re() -> &'static Regex {
    IDENTITY_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:@\-]{0,127}$").expect("identity pattern is valid")
    })
}

/// An authenticated principal. Authentication happens outside this crate;
/// the registry only compares identities for set membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Result<Self, MsigError> {
        let value = value.into();
        if !identity_re().is_match(&value) {
            return Err(MsigError::InvalidIdentity(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = MsigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identity::new(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = MsigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identity::new(value)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// Where an executed action's effect lands.
///
/// `Registry` addresses the wallet itself: the payload is a governance call
/// applied by the execute step. Text form is `registry` (or `self`); every
/// other string is an external account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Target {
    Registry,
    Account(Identity),
}

impl Target {
    pub fn is_registry(&self) -> bool {
        matches!(self, Target::Registry)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Registry => f.write_str("registry"),
            Target::Account(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl std::str::FromStr for Target {
    type Err = MsigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registry" | "self" => Ok(Target::Registry),
            other => Ok(Target::Account(Identity::new(other)?)),
        }
    }
}

impl TryFrom<String> for Target {
    type Error = MsigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.to_string()
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Opaque call data carried by an action. Rendered as `0x`-prefixed hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl std::str::FromStr for Payload {
    type Err = MsigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        hex::decode(digits)
            .map(Payload)
            .map_err(|e| MsigError::InvalidPayload(format!("'{s}': {e}")))
    }
}

impl TryFrom<String> for Payload {
    type Error = MsigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Payload> for String {
    fn from(payload: Payload) -> Self {
        payload.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_identities() {
        for id in ["alice", "O1", "0xAbC123", "ops@treasury", "team.lead-2", "did:key:z6Mk"] {
            Identity::new(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_identities() {
        let too_long = "a".repeat(129);
        for id in ["", "-dash", "has space", "tab\there", "ünicode", too_long.as_str()] {
            assert!(Identity::new(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn target_parses_registry_aliases() {
        assert_eq!("registry".parse::<Target>().unwrap(), Target::Registry);
        assert_eq!("self".parse::<Target>().unwrap(), Target::Registry);
        assert_eq!(
            "bob".parse::<Target>().unwrap(),
            Target::Account(Identity::new("bob").unwrap())
        );
        assert!("not valid".parse::<Target>().is_err());
    }

    #[test]
    fn payload_hex_forms() {
        assert_eq!("0x".parse::<Payload>().unwrap(), Payload::empty());
        assert_eq!("".parse::<Payload>().unwrap(), Payload::empty());
        assert_eq!("0xff".parse::<Payload>().unwrap().as_bytes(), &[0xff]);
        assert_eq!("DEAD".parse::<Payload>().unwrap().to_string(), "0xdead");
        assert!("0xf".parse::<Payload>().is_err());
        assert!("0xzz".parse::<Payload>().is_err());
    }

    #[test]
    fn serialized_as_plain_strings() {
        #[derive(Serialize, Deserialize)]
        struct Row {
            who: Identity,
            to: Target,
            data: Payload,
        }
        let row = Row {
            who: Identity::new("alice").unwrap(),
            to: Target::Registry,
            data: Payload::new(vec![0xab, 0x01]),
        };
        let yaml = serde_yaml::to_string(&row).unwrap();
        assert!(yaml.contains("who: alice"));
        assert!(yaml.contains("to: registry"));
        assert!(yaml.contains("data: '0xab01'") || yaml.contains("data: 0xab01"));

        let parsed: Row = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.data.as_bytes(), &[0xab, 0x01]);
        assert!(parsed.to.is_registry());
    }

    #[test]
    fn deserialize_rejects_bad_identity() {
        let result = serde_json::from_str::<Identity>("\"no spaces allowed\"");
        assert!(result.is_err());
    }
}
