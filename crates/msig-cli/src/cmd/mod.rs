pub mod action;
pub mod config;
pub mod events;
pub mod init;
pub mod owner;
pub mod propose;

use anyhow::Context;
use fs2::FileExt;
use msig_core::{io, paths, types::Identity, wallet::Wallet, MsigError};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// The identity the command runs as.
pub fn caller(raw: Option<&str>) -> anyhow::Result<Identity> {
    let raw = raw.context("no caller identity: pass --as <identity> or set MSIG_CALLER")?;
    Identity::new(raw).with_context(|| format!("invalid caller '{raw}'"))
}

pub fn load_wallet(root: &Path) -> anyhow::Result<Wallet> {
    Wallet::load(root).context("failed to load wallet")
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A wallet loaded under an exclusive lock on `.msig/wallet.lock`.
///
/// Another `msig` process blocks in [`Session::open`] until this one is
/// dropped, so load, apply, and save never interleave across processes.
pub struct Session {
    root: PathBuf,
    pub wallet: Wallet,
    _lock: File,
}

impl Session {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        if !paths::msig_dir(root).is_dir() {
            return Err(anyhow::Error::new(MsigError::NotInitialized).context("failed to load wallet"));
        }
        let lock_path = paths::lock_path(root);
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("failed to open {}", lock_path.display()))?;
        lock.lock_exclusive()
            .with_context(|| format!("failed to lock {}", lock_path.display()))?;
        tracing::debug!(lock = %lock_path.display(), "wallet lock acquired");

        let wallet = load_wallet(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            wallet,
            _lock: lock,
        })
    }

    /// Persist the wallet, then journal the events it buffered.
    pub fn commit(&mut self) -> anyhow::Result<()> {
        self.wallet
            .save(&self.root)
            .context("failed to save wallet")?;
        let events = self.wallet.drain_events();
        io::append_json_lines(&paths::events_path(&self.root), &events)
            .context("failed to append events")
    }
}

/// Apply one operation in a session and commit it.
///
/// The wallet is saved even when the operation fails: a failed execution
/// still consumes its action.
pub fn mutate<T>(
    root: &Path,
    op: impl FnOnce(&mut Wallet) -> msig_core::Result<T>,
) -> anyhow::Result<T> {
    let mut session = Session::open(root)?;
    let result = op(&mut session.wallet);
    session.commit()?;
    Ok(result?)
}
