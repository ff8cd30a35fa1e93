//! TCP front end for one coordinator round.

use log::{info, warn};
use mixer_core::application::{CoordinatorHandle, CoordinatorSession, CoordinatorSettings, SessionObserver, SessionOutcome};
use mixer_core::domain::Ledger;
use mixer_core::foundation::MixError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A bound listener plus the round it will serve.
pub struct CoordinatorServer {
    listener: TcpListener,
    session: CoordinatorSession,
    handle: CoordinatorHandle,
}

impl CoordinatorServer {
    pub fn new(listener: TcpListener, settings: CoordinatorSettings, ledger: Arc<dyn Ledger>, observer: Arc<dyn SessionObserver>) -> Self {
        let (session, handle) = CoordinatorSession::new(settings, ledger, observer);
        Self { listener, session, handle }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, MixError> {
        self.listener.local_addr().map_err(|err| MixError::connection("local_addr", err))
    }

    /// Handle for aborting the round from outside, e.g. on Ctrl-C.
    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub async fn run(self) -> Result<SessionOutcome, MixError> {
        serve_round(self.listener, self.session, self.handle).await
    }
}

/// Accepts connections into `session` until the round finalizes or aborts.
///
/// Connections beyond the player count are closed right after accept. The listener is
/// dropped with the round, so a second round needs a fresh server.
pub async fn serve_round(listener: TcpListener, session: CoordinatorSession, handle: CoordinatorHandle) -> Result<SessionOutcome, MixError> {
    let session_id = session.session_id();
    let _accept = AbortOnDrop(tokio::spawn(accept_loop(listener, handle)));
    let mut round = AbortOnDrop(tokio::spawn(session.run()));
    let outcome = (&mut round.0).await.map_err(|err| MixError::Message(format!("coordinator task failed: {err}")))?;
    match &outcome {
        Ok(outcome) => info!("round complete session_id={} tx_id={} participants={}", session_id.short(), outcome.tx_id, outcome.participants),
        Err(err) => warn!("round failed session_id={} code={} error={}", session_id.short(), err.code(), err),
    }
    outcome
}

async fn accept_loop(listener: TcpListener, handle: CoordinatorHandle) {
    let shutdown = handle.shutdown_signal();
    loop {
        let accepted = tokio::select! {
            _ = shutdown.triggered() => return,
            accepted = listener.accept() => accepted,
        };
        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!("accept failed error={}", err);
                continue;
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            warn!("set_nodelay failed peer={} error={}", peer, err);
        }
        match handle.admit(stream).await {
            Ok(index) => info!("participant connected peer={} index={}", peer, index),
            Err(err) => info!("connection refused peer={} error={}", peer, err),
        }
    }
}
