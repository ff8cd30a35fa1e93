use crate::harness::*;
use mixer_core::foundation::MixError;
use std::time::Duration;

#[tokio::test]
async fn missing_player_times_out_the_input_phase() {
    let wallets = WalletDir::new();
    let (_payees, targets) = wallets.payees(3);
    let (server, addr) = loopback_server(&wallets.ledger, settings(3, Some(Duration::from_secs(1)), Some(STEP))).await;
    let round = tokio::spawn(server.run());

    let early = spawn_participant(addr, &wallets.ledger, wallets.funded("early", 1500), &targets, Some(STEP));
    let late = spawn_participant(addr, &wallets.ledger, wallets.funded("late", 1500), &targets, Some(STEP));

    match round.await.expect("join") {
        Err(MixError::Timeout { phase, timeout_secs }) => {
            assert_eq!(phase, "inputs");
            assert_eq!(timeout_secs, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    for task in [early, late] {
        assert!(matches!(task.await.expect("join"), Err(MixError::ConnectionError { .. })));
    }
}

#[tokio::test]
async fn participant_gives_up_when_no_coordinator_listens() {
    let wallets = WalletDir::new();
    let (_payees, targets) = wallets.payees(1);
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let task = spawn_participant(addr, &wallets.ledger, wallets.funded("orphan", 1500), &targets, Some(STEP));
    assert!(matches!(task.await.expect("join"), Err(MixError::ConnectionError { .. })));
}
