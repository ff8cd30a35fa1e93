use crate::harness::*;
use mixer_core::foundation::MixError;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

#[tokio::test]
async fn connection_beyond_capacity_is_closed() {
    let wallets = WalletDir::new();
    let (server, addr) = loopback_server(&wallets.ledger, settings(2, None, None)).await;
    let handle = server.handle();
    let round = tokio::spawn(server.run());

    let _first = TcpStream::connect(addr).await.expect("connect");
    let _second = TcpStream::connect(addr).await.expect("connect");
    let mut extra = TcpStream::connect(addr).await.expect("connect");

    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(Duration::from_secs(5), extra.read(&mut buf)).await.expect("extra connection closed");
    assert!(matches!(read, Ok(0) | Err(_)));

    handle.abort("test finished");
    assert!(matches!(round.await.expect("join"), Err(MixError::SessionAborted { .. })));
}

#[tokio::test]
async fn disagreeing_targets_abort_every_player() {
    let wallets = WalletDir::new();
    let (_payees, targets) = wallets.payees(3);
    let mut skewed = targets.clone();
    let dropped = skewed.iter().next().cloned().expect("target");
    skewed.remove(&dropped);
    skewed.insert(wallets.funded("thief", 0).new_address().expect("address"));

    let (server, addr) = loopback_server(&wallets.ledger, settings(3, Some(STEP), Some(STEP))).await;
    let round = tokio::spawn(server.run());

    let honest_a = spawn_participant(addr, &wallets.ledger, wallets.funded("a", 1500), &targets, Some(STEP));
    let honest_b = spawn_participant(addr, &wallets.ledger, wallets.funded("b", 1500), &targets, Some(STEP));
    let cheater = spawn_participant(addr, &wallets.ledger, wallets.funded("c", 1500), &skewed, Some(STEP));

    assert!(matches!(round.await.expect("join"), Err(MixError::FairnessViolation { .. })));
    for task in [honest_a, honest_b, cheater] {
        assert!(task.await.expect("join").is_err());
    }
}

#[tokio::test]
async fn aborting_the_server_releases_waiting_participants() {
    let wallets = WalletDir::new();
    let (_payees, targets) = wallets.payees(2);
    let (server, addr) = loopback_server(&wallets.ledger, settings(2, None, None)).await;
    let handle = server.handle();
    let round = tokio::spawn(server.run());

    let lone = spawn_participant(addr, &wallets.ledger, wallets.funded("lone", 1500), &targets, Some(STEP));
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort("operator interrupt");

    match round.await.expect("join") {
        Err(MixError::SessionAborted { reason }) => assert_eq!(reason, "operator interrupt"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(matches!(lone.await.expect("join"), Err(MixError::ConnectionError { .. })));
}
