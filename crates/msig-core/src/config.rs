use crate::error::{MsigError, Result};
use crate::paths;
use crate::types::{Identity, Target};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// WalletConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// File under `.msig/` that receives one JSON line per dispatched call.
    #[serde(default = "default_outbox")]
    pub outbox: String,
    /// Targets the host refuses to dispatch to. Executing an action aimed at
    /// one of them consumes the action and reports a failure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_targets: Vec<String>,
}

fn default_outbox() -> String {
    "outbox.jsonl".to_string()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            outbox: default_outbox(),
            blocked_targets: Vec::new(),
        }
    }
}

impl DispatchConfig {
    pub fn is_blocked(&self, target: &Target) -> bool {
        let name = target.to_string();
        self.blocked_targets.iter().any(|b| *b == name)
    }

    /// The outbox file under `.msig/`. Names that would resolve anywhere
    /// else are rejected.
    pub fn outbox_path(&self, root: &Path) -> Result<PathBuf> {
        if let Some(problem) = outbox_problem(&self.outbox) {
            return Err(MsigError::InvalidConfig(problem));
        }
        Ok(paths::outbox_path(root, self.outbox.trim()))
    }
}

fn outbox_problem(outbox: &str) -> Option<String> {
    let outbox = outbox.trim();
    if outbox.is_empty() {
        Some("dispatch.outbox is empty".to_string())
    } else if outbox.contains('/') || outbox.contains('\\') || outbox == "." || outbox == ".." {
        Some(format!("dispatch.outbox '{outbox}' must be a plain file name"))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub wallet: WalletConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(wallet_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            wallet: WalletConfig {
                name: wallet_name.into(),
                description: None,
            },
            dispatch: DispatchConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(MsigError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(message) = outbox_problem(&self.dispatch.outbox) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            });
        }

        for blocked in &self.dispatch.blocked_targets {
            match blocked.parse::<Target>() {
                Ok(Target::Registry) => warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "blocked target '{blocked}' has no effect: governance actions are never dispatched"
                    ),
                }),
                Ok(Target::Account(_)) => {}
                Err(_) => warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("blocked target '{blocked}' is not a valid identity"),
                }),
            }
        }

        if self.wallet.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "wallet.name is empty".to_string(),
            });
        }

        warnings
    }
}

/// Wallet name used when `init` is not given one.
pub fn default_wallet_name(creator: &Identity) -> String {
    format!("{creator}-wallet")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
