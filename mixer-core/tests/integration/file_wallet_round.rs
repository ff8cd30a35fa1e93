use crate::fixtures::{targets, test_ledger, TEST_AMOUNT};
use mixer_core::application::{CoordinatorSession, CoordinatorSettings, NoopObserver, ParticipantSession, ParticipantSettings};
use mixer_core::domain::{RoundParams, Wallet};
use mixer_core::infrastructure::ledger::FileWallet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn file_wallets_spend_inputs_and_record_the_round() {
    let ledger = test_ledger();
    let dir = tempfile::tempdir().expect("tempdir");
    let targets = targets(&ledger, 2);

    let mut wallets = Vec::new();
    for name in ["alice", "bob"] {
        let wallet = FileWallet::create(dir.path().join(format!("{name}.json")), ledger.clone()).expect("create");
        let address = wallet.new_address().expect("address");
        wallet.fund(&address, 1200).expect("fund");
        wallet.fund(&address, 5000).expect("fund");
        wallets.push(Arc::new(wallet));
    }

    let settings = CoordinatorSettings { params: RoundParams { player_count: 2, amount: TEST_AMOUNT }, input_timeout: None, signature_timeout: None };
    let (session, handle) = CoordinatorSession::new(settings, ledger.clone(), Arc::new(NoopObserver));
    let round = tokio::spawn(session.run());

    let mut participants = Vec::new();
    for wallet in &wallets {
        let (ours, theirs) = tokio::io::duplex(64 * 1024);
        handle.admit(ours).await.expect("admit");
        let settings =
            ParticipantSettings { amount: TEST_AMOUNT, targets: targets.clone(), partial_timeout: None, final_timeout: None };
        participants.push(tokio::spawn(ParticipantSession::new(ledger.clone(), wallet.clone(), settings).run(theirs)));
    }

    let step = Duration::from_secs(5);
    let outcome = tokio::time::timeout(step, round).await.expect("round").expect("join").expect("finalized");
    for participant in participants {
        tokio::time::timeout(step, participant).await.expect("participant").expect("join").expect("committed");
    }

    for wallet in &wallets {
        let reopened = FileWallet::open(wallet.path(), ledger.clone()).expect("reopen");
        assert_eq!(reopened.history().expect("history"), vec![outcome.tx_id]);
        let outputs = reopened.outputs().expect("outputs");
        assert_eq!(outputs.len(), 1, "closest output spent, larger one kept");
        assert_eq!(outputs[0].amount, 5000);
        assert!(reopened.select_funding_output(6000).is_err());
    }
}
