use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const MSIG_DIR: &str = ".msig";

pub const WALLET_FILE: &str = ".msig/wallet.yaml";
pub const CONFIG_FILE: &str = ".msig/config.yaml";
pub const EVENTS_FILE: &str = ".msig/events.jsonl";
pub const LOCK_FILE: &str = ".msig/wallet.lock";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn msig_dir(root: &Path) -> PathBuf {
    root.join(MSIG_DIR)
}

pub fn wallet_path(root: &Path) -> PathBuf {
    root.join(WALLET_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn events_path(root: &Path) -> PathBuf {
    root.join(EVENTS_FILE)
}

pub fn lock_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

/// Outbox files are named relative to the `.msig/` directory.
pub fn outbox_path(root: &Path, name: &str) -> PathBuf {
    msig_dir(root).join(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/vault");
        assert_eq!(
            wallet_path(root),
            PathBuf::from("/tmp/vault/.msig/wallet.yaml")
        );
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/vault/.msig/config.yaml")
        );
        assert_eq!(
            lock_path(root),
            PathBuf::from("/tmp/vault/.msig/wallet.lock")
        );
        assert_eq!(
            outbox_path(root, "outbox.jsonl"),
            PathBuf::from("/tmp/vault/.msig/outbox.jsonl")
        );
    }
}
