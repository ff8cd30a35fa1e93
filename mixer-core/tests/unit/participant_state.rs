use crate::fixtures::{address, funding_output, targets, test_ledger, KeyWallet, STRANGER_SEED, TEST_AMOUNT, TEST_FUNDING};
use mixer_core::domain::{Ledger, OutputRef, ParticipantPhase, ParticipantState, TxOutput};
use mixer_core::foundation::{Address, MixError, TxBytes};
use mixer_core::infrastructure::ledger::DevLedger;
use std::collections::{BTreeMap, BTreeSet};

fn build(ledger: &DevLedger, inputs: &[OutputRef], outputs: &BTreeSet<Address>) -> TxBytes {
    let outputs: Vec<TxOutput> = outputs.iter().map(|address| TxOutput { address: address.clone(), amount: TEST_AMOUNT }).collect();
    ledger.build_unsigned_transaction(inputs, &outputs).expect("build")
}

fn ready(wallet: &KeyWallet, targets: &BTreeSet<Address>) -> ParticipantState {
    let mut state = ParticipantState::new(TEST_AMOUNT, targets.clone(), wallet.output());
    let message = state.input_message().expect("input");
    assert_eq!(&message.target_addresses, targets);
    state.input_delivered().expect("delivered");
    state
}

#[test]
fn fair_partial_is_signed_once_and_only_once() {
    let ledger = test_ledger();
    let targets = targets(&ledger, 3);
    let wallet = KeyWallet::new(ledger.clone(), 2);
    let inputs = [funding_output(&ledger, 1, TEST_FUNDING), wallet.output(), funding_output(&ledger, 3, TEST_FUNDING)];
    let tx = build(&ledger, &inputs, &targets);

    let mut state = ready(&wallet, &targets);
    let signature = state.on_partial(ledger.as_ref(), &wallet, &tx, 1).expect("sign");
    assert_eq!(state.phase(), ParticipantPhase::Signed);
    assert_eq!(state.signing_index(), Some(1));
    assert!(ledger.verify_input_signature(&tx, 1, &wallet.output(), &signature).is_ok());

    let err = state.on_partial(ledger.as_ref(), &wallet, &tx, 1).expect_err("second partial");
    assert!(matches!(err, MixError::DoubleSignAttempt { index: 1 }));
    assert_eq!(state.phase(), ParticipantPhase::Aborted);
    assert_eq!(wallet.sign_count(), 1);
}

#[test]
fn unfair_outputs_abort_without_signing() {
    let ledger = test_ledger();
    let agreed = targets(&ledger, 3);
    let wallet = KeyWallet::new(ledger.clone(), 1);
    let inputs = [wallet.output(), funding_output(&ledger, 2, TEST_FUNDING), funding_output(&ledger, 3, TEST_FUNDING)];

    let mut swapped = agreed.clone();
    let first = swapped.iter().next().cloned().expect("non-empty");
    swapped.remove(&first);
    swapped.insert(address(&ledger, STRANGER_SEED));
    let tx = build(&ledger, &inputs, &swapped);

    let mut state = ready(&wallet, &agreed);
    let err = state.on_partial(ledger.as_ref(), &wallet, &tx, 0).expect_err("unfair");
    assert!(matches!(err, MixError::FairnessViolation { .. }));
    assert_eq!(state.phase(), ParticipantPhase::Aborted);
    assert_eq!(wallet.sign_count(), 0);
}

#[test]
fn wrong_amount_or_missing_target_is_unfair() {
    let ledger = test_ledger();
    let agreed = targets(&ledger, 3);
    let wallet = KeyWallet::new(ledger.clone(), 1);
    let inputs = [wallet.output(), funding_output(&ledger, 2, TEST_FUNDING)];

    let short: Vec<TxOutput> = agreed.iter().take(2).map(|address| TxOutput { address: address.clone(), amount: TEST_AMOUNT }).collect();
    let tx = ledger.build_unsigned_transaction(&inputs, &short).expect("build");
    let mut state = ready(&wallet, &agreed);
    assert!(matches!(state.on_partial(ledger.as_ref(), &wallet, &tx, 0), Err(MixError::FairnessViolation { .. })));

    let skewed: Vec<TxOutput> =
        agreed.iter().enumerate().map(|(i, address)| TxOutput { address: address.clone(), amount: TEST_AMOUNT - i as u64 }).collect();
    let tx = ledger.build_unsigned_transaction(&inputs, &skewed).expect("build");
    let mut state = ready(&wallet, &agreed);
    assert!(matches!(state.on_partial(ledger.as_ref(), &wallet, &tx, 0), Err(MixError::FairnessViolation { .. })));
    assert_eq!(wallet.sign_count(), 0);
}

#[test]
fn signing_index_must_point_at_own_input() {
    let ledger = test_ledger();
    let targets = targets(&ledger, 2);
    let wallet = KeyWallet::new(ledger.clone(), 1);
    let tx = build(&ledger, &[wallet.output(), funding_output(&ledger, 2, TEST_FUNDING)], &targets);

    let mut state = ready(&wallet, &targets);
    assert!(matches!(state.on_partial(ledger.as_ref(), &wallet, &tx, 5), Err(MixError::InvalidSigningIndex { index: 5, inputs: 2 })));

    let mut state = ready(&wallet, &targets);
    assert!(matches!(state.on_partial(ledger.as_ref(), &wallet, &tx, 1), Err(MixError::ProtocolViolation { .. })));
    assert_eq!(wallet.sign_count(), 0);
}

#[test]
fn final_transaction_must_match_what_was_signed() {
    let ledger = test_ledger();
    let targets = targets(&ledger, 2);
    let mine = KeyWallet::new(ledger.clone(), 1);
    let other = KeyWallet::new(ledger.clone(), 2);
    let tx = build(&ledger, &[mine.output(), other.output()], &targets);

    let mut state = ready(&mine, &targets);
    let mine_sig = state.on_partial(ledger.as_ref(), &mine, &tx, 0).expect("sign");
    state.signature_delivered().expect("delivered");

    let other_sig = mixer_core::domain::Wallet::sign_input(&other, &tx, 1, &other.output()).expect("sign");
    let signatures: BTreeMap<usize, Vec<u8>> = [(0, mine_sig), (1, other_sig)].into_iter().collect();
    let final_tx = ledger.assemble_transaction(&tx, &signatures).expect("assemble");

    let view = state.on_final(ledger.as_ref(), &final_tx).expect("final matches");
    assert!(view.is_fully_signed());
    state.mark_committed().expect("committed");
    assert_eq!(state.phase(), ParticipantPhase::Committed);

    let tampered = build(&ledger, &[other.output(), mine.output()], &targets);
    let mut state = ready(&mine, &targets);
    state.on_partial(ledger.as_ref(), &mine, &tx, 0).expect("sign");
    state.signature_delivered().expect("delivered");
    assert!(state.on_final(ledger.as_ref(), &tampered).is_err());
    assert_eq!(state.phase(), ParticipantPhase::Aborted);
}
