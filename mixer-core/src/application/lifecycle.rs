use crate::foundation::{SessionId, TransactionId};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Round lifecycle hooks. Every method defaults to a no-op.
pub trait SessionObserver: Send + Sync {
    fn on_admitted(&self, _session_id: &SessionId, _index: usize) {}
    fn on_input_accepted(&self, _session_id: &SessionId, _index: usize) {}
    fn on_constructed(&self, _session_id: &SessionId, _inputs: usize) {}
    fn on_signature_accepted(&self, _session_id: &SessionId, _index: usize) {}
    fn on_finalized(&self, _session_id: &SessionId, _tx_id: &TransactionId) {}
    fn on_aborted(&self, _session_id: &SessionId, _reason: &str) {}
}

pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

pub struct CompositeObserver {
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for CompositeObserver {
    fn on_admitted(&self, session_id: &SessionId, index: usize) {
        trace!("on_admitted dispatch observer_count={} session_id={} index={}", self.observers.len(), session_id.short(), index);
        for observer in &self.observers {
            observer.on_admitted(session_id, index);
        }
    }

    fn on_input_accepted(&self, session_id: &SessionId, index: usize) {
        debug!("input accepted session_id={} index={}", session_id.short(), index);
        for observer in &self.observers {
            observer.on_input_accepted(session_id, index);
        }
    }

    fn on_constructed(&self, session_id: &SessionId, inputs: usize) {
        info!("joint transaction broadcast for signing session_id={} inputs={}", session_id.short(), inputs);
        for observer in &self.observers {
            observer.on_constructed(session_id, inputs);
        }
    }

    fn on_signature_accepted(&self, session_id: &SessionId, index: usize) {
        debug!("signature accepted session_id={} index={}", session_id.short(), index);
        for observer in &self.observers {
            observer.on_signature_accepted(session_id, index);
        }
    }

    fn on_finalized(&self, session_id: &SessionId, tx_id: &TransactionId) {
        info!("round finalized session_id={} tx_id={}", session_id.short(), tx_id);
        for observer in &self.observers {
            observer.on_finalized(session_id, tx_id);
        }
    }

    fn on_aborted(&self, session_id: &SessionId, reason: &str) {
        warn!("round aborted session_id={} reason={}", session_id.short(), reason);
        for observer in &self.observers {
            observer.on_aborted(session_id, reason);
        }
    }
}
