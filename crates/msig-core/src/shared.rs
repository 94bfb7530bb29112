use crate::error::{MsigError, Result};
use crate::wallet::Wallet;
use std::sync::{Arc, Mutex};

/// A wallet shared between threads.
///
/// The registry and the queue sit behind one lock, so each closure passed to
/// [`SharedWallet::with`] runs as a single uninterrupted operation over both.
#[derive(Debug, Clone)]
pub struct SharedWallet {
    inner: Arc<Mutex<Wallet>>,
}

impl SharedWallet {
    pub fn new(wallet: Wallet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(wallet)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Wallet) -> R) -> Result<R> {
        let mut guard = self.inner.lock().map_err(|_| MsigError::Poisoned)?;
        Ok(f(&mut guard))
    }

    /// Copy of the current state, without pending events.
    pub fn snapshot(&self) -> Result<Wallet> {
        self.with(|w| {
            let mut copy = w.clone();
            copy.drain_events();
            copy
        })
    }
}
