use crate::fixtures::{address, input, targets, test_ledger, KeyWallet, PARTICIPANT_SEEDS, STRANGER_SEED, TEST_AMOUNT, TEST_FUNDING};
use mixer_core::domain::{CoordinatorPhase, CoordinatorState, Ledger, RoundParams, Wallet};
use mixer_core::foundation::MixError;
use mixer_core::infrastructure::ledger::DevLedger;
use std::sync::Arc;

fn three_party(ledger: &Arc<DevLedger>) -> CoordinatorState {
    let mut state = CoordinatorState::new(RoundParams { player_count: 3, amount: TEST_AMOUNT }, ledger.clone());
    for expected in 0..3 {
        assert_eq!(state.admit().expect("admit"), expected);
    }
    state
}

#[test]
fn three_inputs_build_one_output_per_target_in_sorted_order() {
    let ledger = test_ledger();
    let targets = targets(&ledger, 3);
    let mut state = three_party(&ledger);
    assert_eq!(state.phase(), CoordinatorPhase::CollectingInputs);

    for (index, seed) in PARTICIPANT_SEEDS.iter().enumerate().take(2) {
        assert!(state.receive_input(index, input(&ledger, *seed, TEST_FUNDING, &targets)).expect("input").is_none());
    }
    let tx = state.receive_input(2, input(&ledger, PARTICIPANT_SEEDS[2], TEST_FUNDING, &targets)).expect("input").expect("constructed");
    assert_eq!(state.phase(), CoordinatorPhase::Constructed);

    let view = ledger.decode_transaction(&tx).expect("decode");
    let spent: Vec<_> = view.inputs.iter().map(|input| input.outpoint.tx_id.as_hash()[0]).collect();
    assert_eq!(spent, PARTICIPANT_SEEDS.to_vec());
    let paid: Vec<_> = view.outputs.iter().map(|output| output.address.clone()).collect();
    assert_eq!(paid, targets.iter().cloned().collect::<Vec<_>>());
    assert!(view.outputs.iter().all(|output| output.amount == TEST_AMOUNT));
}

#[test]
fn disagreeing_target_sets_are_a_fairness_violation() {
    let ledger = test_ledger();
    let agreed = targets(&ledger, 3);
    let mut other = agreed.clone();
    let last = other.iter().next_back().cloned().expect("non-empty");
    other.remove(&last);
    other.insert(address(&ledger, STRANGER_SEED));

    let mut state = three_party(&ledger);
    state.receive_input(0, input(&ledger, 1, TEST_FUNDING, &agreed)).expect("first");
    state.receive_input(1, input(&ledger, 2, TEST_FUNDING, &agreed)).expect("second");
    let err = state.receive_input(2, input(&ledger, 3, TEST_FUNDING, &other)).expect_err("disagreement");
    assert!(matches!(err, MixError::FairnessViolation { .. }));
    assert!(state.unsigned_tx().is_none());
}

#[test]
fn admission_stops_at_player_count() {
    let ledger = test_ledger();
    let mut state = three_party(&ledger);
    assert!(matches!(state.admit(), Err(MixError::CapacityExceeded { admitted: 3, capacity: 3 })));
    assert_eq!(state.admitted(), 3);
}

#[test]
fn malformed_inputs_are_rejected() {
    let ledger = test_ledger();
    let targets3 = targets(&ledger, 3);
    let mut state = three_party(&ledger);

    let short = input(&ledger, 1, TEST_FUNDING, &targets(&ledger, 2));
    assert!(matches!(state.receive_input(0, short), Err(MixError::InvalidInput { index: 0, .. })));

    let poor = input(&ledger, 1, TEST_AMOUNT - 1, &targets3);
    assert!(matches!(state.receive_input(0, poor), Err(MixError::InvalidInput { index: 0, .. })));

    state.receive_input(0, input(&ledger, 1, TEST_FUNDING, &targets3)).expect("valid");
    let reused = input(&ledger, 1, TEST_FUNDING, &targets3);
    assert!(matches!(state.receive_input(1, reused), Err(MixError::InvalidInput { index: 1, .. })));

    let again = input(&ledger, 2, TEST_FUNDING, &targets3);
    assert!(matches!(state.receive_input(0, again), Err(MixError::ProtocolViolation { index: Some(0), .. })));
    assert!(matches!(state.receive_input(7, input(&ledger, 2, TEST_FUNDING, &targets3)), Err(MixError::ProtocolViolation { .. })));
}

#[test]
fn signatures_are_placed_by_index_whatever_the_arrival_order() {
    let ledger = test_ledger();
    let targets = targets(&ledger, 3);
    let wallets: Vec<KeyWallet> = PARTICIPANT_SEEDS.iter().map(|seed| KeyWallet::new(ledger.clone(), *seed)).collect();
    let mut state = three_party(&ledger);

    let mut tx = None;
    for (index, wallet) in wallets.iter().enumerate() {
        let contributed = mixer_core::domain::ParticipantInput { source_output: wallet.output(), target_addresses: targets.clone() };
        tx = state.receive_input(index, contributed).expect("input");
    }
    let tx = tx.expect("constructed");
    assert!(matches!(state.receive_signature(0, vec![0; 96]), Err(MixError::ProtocolViolation { .. })));
    state.mark_partials_sent().expect("fan-out");

    let mut finalized = None;
    for index in [2usize, 0, 1] {
        let signature = wallets[index].sign_input(&tx, index, &wallets[index].output()).expect("sign");
        finalized = state.receive_signature(index, signature).expect("signature");
    }
    let finalized = finalized.expect("finalized");
    assert_eq!(state.phase(), CoordinatorPhase::Finalized);

    let unsigned = ledger.decode(&tx).expect("decode unsigned");
    let signed = ledger.decode(&finalized.final_tx).expect("decode final");
    for (index, wallet) in wallets.iter().enumerate() {
        assert!(ledger.verify_input_signature(&tx, index, &wallet.output(), &signed.inputs[index].unlock).is_ok());
        assert_eq!(signed.inputs[index].outpoint, unsigned.inputs[index].outpoint);
    }
    assert_eq!(finalized.tx_id, ledger.transaction_id(&tx).expect("txid"));
}

#[test]
fn second_and_foreign_signatures_are_refused() {
    let ledger = test_ledger();
    let targets = targets(&ledger, 3);
    let wallets: Vec<KeyWallet> = PARTICIPANT_SEEDS.iter().map(|seed| KeyWallet::new(ledger.clone(), *seed)).collect();
    let mut state = three_party(&ledger);
    let mut tx = None;
    for (index, wallet) in wallets.iter().enumerate() {
        tx = state
            .receive_input(index, mixer_core::domain::ParticipantInput { source_output: wallet.output(), target_addresses: targets.clone() })
            .expect("input");
    }
    let tx = tx.expect("constructed");
    state.mark_partials_sent().expect("fan-out");

    let foreign = wallets[1].sign_input(&tx, 0, &wallets[0].output()).expect("sign");
    assert!(matches!(state.receive_signature(0, foreign), Err(MixError::InvalidSignature { input_index: 0 })));

    let wrong_index = wallets[0].sign_input(&tx, 1, &wallets[0].output()).expect("sign");
    assert!(matches!(state.receive_signature(0, wrong_index), Err(MixError::InvalidSignature { input_index: 0 })));

    let good = wallets[0].sign_input(&tx, 0, &wallets[0].output()).expect("sign");
    assert!(state.receive_signature(0, good.clone()).expect("accepted").is_none());
    assert!(matches!(state.receive_signature(0, good), Err(MixError::DoubleSignAttempt { index: 0 })));
    assert_eq!(state.signatures_received(), 1);
}

#[test]
fn abort_is_terminal() {
    let ledger = test_ledger();
    let mut state = three_party(&ledger);
    assert!(state.abort());
    assert!(!state.abort());
    assert_eq!(state.phase(), CoordinatorPhase::Aborted);
    assert!(matches!(state.admit(), Err(MixError::SessionAborted { .. })));
}
