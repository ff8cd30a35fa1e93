#![allow(dead_code)]

use crate::harness::AMOUNT;
use mixer_core::application::{CompositeObserver, CoordinatorSettings, ParticipantSession, ParticipantSettings};
use mixer_core::domain::{RoundParams, Wallet};
use mixer_core::foundation::{Address, MixError};
use mixer_core::infrastructure::ledger::DevLedger;
use mixer_core::infrastructure::transport::tcp;
use mixer_service::service::{run_participant, CoordinatorServer};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const STEP: Duration = Duration::from_secs(10);

pub fn settings(players: usize, input_timeout: Option<Duration>, signature_timeout: Option<Duration>) -> CoordinatorSettings {
    CoordinatorSettings { params: RoundParams { player_count: players, amount: AMOUNT }, input_timeout, signature_timeout }
}

/// Coordinator bound to an ephemeral loopback port.
pub async fn loopback_server(ledger: &Arc<DevLedger>, settings: CoordinatorSettings) -> (CoordinatorServer, SocketAddr) {
    let listener = tcp::bind("127.0.0.1:0".parse().expect("addr")).await.expect("bind");
    let server = CoordinatorServer::new(listener, settings, ledger.clone(), Arc::new(CompositeObserver::new()));
    let addr = server.local_addr().expect("local addr");
    (server, addr)
}

pub fn spawn_participant(
    addr: SocketAddr,
    ledger: &Arc<DevLedger>,
    wallet: Arc<dyn Wallet>,
    targets: &BTreeSet<Address>,
    final_timeout: Option<Duration>,
) -> tokio::task::JoinHandle<Result<mixer_core::application::ParticipantOutcome, MixError>> {
    let settings = ParticipantSettings { amount: AMOUNT, targets: targets.clone(), partial_timeout: Some(STEP), final_timeout };
    let session = ParticipantSession::new(ledger.clone(), wallet, settings);
    tokio::spawn(async move { run_participant(&addr.to_string(), Some(STEP), session).await })
}
