use mixer_core::domain::{check_agreement, is_uniform, FairnessPolicy, TxOutput};
use mixer_core::foundation::{Address, ErrorCode, MixError};
use std::collections::BTreeSet;

fn set(items: &[&str]) -> BTreeSet<Address> {
    items.iter().map(|item| Address::from(*item)).collect()
}

#[test]
fn uniformity_over_empty_and_absent_values() {
    assert!(is_uniform(Vec::<u64>::new()));
    assert!(is_uniform([Some(3), Some(3)]));
    assert!(!is_uniform([Some(3), None]));
    assert!(is_uniform([None::<u8>, None]));
}

#[test]
fn agreement_ignores_declaration_order() {
    let a = set(&["x", "y", "z"]);
    let b = set(&["z", "x", "y"]);
    assert!(check_agreement([&a, &b]).is_ok());
    let c = set(&["x", "y", "w"]);
    let err = check_agreement([&a, &b, &c]).expect_err("disagree");
    assert_eq!(err.code(), ErrorCode::FairnessViolation);
}

#[test]
fn expected_outputs_follow_set_order_and_pass_their_own_check() {
    let policy = FairnessPolicy::new(1000, set(&["z", "x", "y"]));
    let outputs = policy.expected_outputs();
    let order: Vec<&str> = outputs.iter().map(|output| output.address.as_str()).collect();
    assert_eq!(order, vec!["x", "y", "z"]);
    assert!(policy.check_outputs(&outputs).is_ok());
}

#[test]
fn duplicate_payee_fails_even_with_matching_count() {
    let policy = FairnessPolicy::new(1000, set(&["x", "y"]));
    let outputs = vec![
        TxOutput { address: Address::from("x"), amount: 1000 },
        TxOutput { address: Address::from("x"), amount: 1000 },
    ];
    assert!(matches!(policy.check_outputs(&outputs), Err(MixError::FairnessViolation { .. })));
    assert!(matches!(policy.check_outputs(&[]), Err(MixError::FairnessViolation { .. })));
}
