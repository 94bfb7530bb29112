use msig_core::config::DispatchConfig;
use msig_core::dispatch::{Call, DispatchError, Dispatcher};
use msig_core::wallet::Wallet;
use std::path::{Path, PathBuf};

/// Hands approved calls to whatever drains the outbox file.
///
/// `invoke` only queues the call. [`OutboxDispatcher::flush`] appends the
/// queue as JSON lines and must run after the wallet that marked those
/// actions executed has been saved, so a crash in between loses the effect
/// instead of repeating it. Targets listed in `dispatch.blocked_targets`
/// are refused.
pub struct OutboxDispatcher {
    path: PathBuf,
    config: DispatchConfig,
    queued: Vec<Call>,
}

impl OutboxDispatcher {
    pub fn new(root: &Path, config: DispatchConfig) -> msig_core::Result<Self> {
        Ok(Self {
            path: config.outbox_path(root)?,
            config,
            queued: Vec::new(),
        })
    }

    pub fn queued(&self) -> &[Call] {
        &self.queued
    }

    /// Append every queued call to the outbox. Returns how many were written.
    pub fn flush(&mut self) -> msig_core::Result<usize> {
        let calls = std::mem::take(&mut self.queued);
        msig_core::io::append_json_lines(&self.path, &calls)?;
        if !calls.is_empty() {
            tracing::debug!(outbox = %self.path.display(), calls = calls.len(), "outbox flushed");
        }
        Ok(calls.len())
    }
}

impl Dispatcher for OutboxDispatcher {
    fn invoke(&mut self, _wallet: &mut Wallet, call: &Call) -> Result<(), DispatchError> {
        if self.config.is_blocked(&call.target) {
            tracing::warn!(to = %call.target, index = call.index, "dispatch refused: blocked target");
            return Err(DispatchError::new(format!(
                "target {} is blocked by dispatch.blocked_targets",
                call.target
            )));
        }
        self.queued.push(call.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msig_core::types::{Identity, Payload, Target};
    use msig_core::MsigError;
    use tempfile::TempDir;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn call(target: &str) -> Call {
        Call {
            index: 0,
            target: target.parse().unwrap(),
            amount: 5,
            payload: Payload::new(vec![0xab]),
        }
    }

    fn outbox_lines(dir: &TempDir) -> Vec<Call> {
        msig_core::io::read_json_lines(&dir.path().join(".msig/outbox.jsonl")).unwrap()
    }

    #[test]
    fn writes_one_line_per_call_on_flush() {
        let dir = TempDir::new().unwrap();
        let mut wallet = Wallet::new(id("o1"));
        let mut outbox = OutboxDispatcher::new(dir.path(), DispatchConfig::default()).unwrap();

        outbox.invoke(&mut wallet, &call("bob")).unwrap();
        outbox.invoke(&mut wallet, &call("carol")).unwrap();
        assert_eq!(outbox.queued().len(), 2);
        assert!(outbox_lines(&dir).is_empty());

        assert_eq!(outbox.flush().unwrap(), 2);
        assert!(outbox.queued().is_empty());
        let calls = outbox_lines(&dir);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].target, Target::Account(id("carol")));
    }

    #[test]
    fn refuses_blocked_targets() {
        let dir = TempDir::new().unwrap();
        let mut wallet = Wallet::new(id("o1"));
        let config = DispatchConfig {
            blocked_targets: vec!["mallory".to_string()],
            ..DispatchConfig::default()
        };
        let mut outbox = OutboxDispatcher::new(dir.path(), config).unwrap();

        let err = outbox.invoke(&mut wallet, &call("mallory")).unwrap_err();
        assert!(err.to_string().contains("blocked"));
        assert_eq!(outbox.flush().unwrap(), 0);
        assert!(!dir.path().join(".msig/outbox.jsonl").exists());
    }

    #[test]
    fn rejects_outbox_outside_msig_dir() {
        let dir = TempDir::new().unwrap();
        let config = DispatchConfig {
            outbox: "../escape.jsonl".to_string(),
            ..DispatchConfig::default()
        };
        assert!(matches!(
            OutboxDispatcher::new(dir.path(), config),
            Err(MsigError::InvalidConfig(_))
        ));
        assert!(!dir.path().join("escape.jsonl").exists());
    }

    #[test]
    fn unsaved_execution_never_reaches_the_outbox() {
        let dir = TempDir::new().unwrap();
        let o1 = id("o1");
        let mut wallet = Wallet::init(dir.path(), o1.clone()).unwrap();
        let index = wallet
            .submit(&o1, "bob".parse().unwrap(), 5, Payload::empty())
            .unwrap();
        wallet.confirm(&o1, index).unwrap();
        wallet.save(dir.path()).unwrap();

        // The process dies after execute but before the wallet is saved.
        let mut outbox = OutboxDispatcher::new(dir.path(), DispatchConfig::default()).unwrap();
        wallet.execute(&o1, index, &mut outbox).unwrap();
        drop(outbox);
        drop(wallet);
        assert!(outbox_lines(&dir).is_empty());

        // The retry is the only delivery.
        let mut wallet = Wallet::load(dir.path()).unwrap();
        let mut outbox = OutboxDispatcher::new(dir.path(), DispatchConfig::default()).unwrap();
        wallet.execute(&o1, index, &mut outbox).unwrap();
        wallet.save(dir.path()).unwrap();
        assert_eq!(outbox.flush().unwrap(), 1);

        let mut wallet = Wallet::load(dir.path()).unwrap();
        let mut outbox = OutboxDispatcher::new(dir.path(), DispatchConfig::default()).unwrap();
        assert!(matches!(
            wallet.execute(&o1, index, &mut outbox),
            Err(MsigError::AlreadyExecuted(_))
        ));
        assert_eq!(outbox.flush().unwrap(), 0);
        assert_eq!(outbox_lines(&dir).len(), 1);
    }
}
