//! Round-wide cancellation.
//!
//! One `AbortSignal` is shared by every task that belongs to a round. Triggering it wakes
//! every `triggered().await`, including waiters that subscribe after the fact.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Fires the signal. Only the first reason is kept.
    pub fn trigger(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
    }

    pub fn is_triggered(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn reason(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Resolves once the signal has fired and returns the first reason.
    pub async fn triggered(&self) -> String {
        let mut rx = self.tx.subscribe();
        let reason = match rx.wait_for(|value| value.is_some()).await {
            Ok(value) => value.clone().unwrap_or_default(),
            // The sender lives in `self`, so the channel cannot close while we wait.
            Err(_) => String::new(),
        };
        reason
    }
}
