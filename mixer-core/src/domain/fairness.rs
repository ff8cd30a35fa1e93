//! Fairness rules shared by both sides of a round.
//!
//! The coordinator checks that every participant declared the same target set before
//! anything is built. Each participant independently checks that the proposed outputs pay
//! exactly the agreed amount to exactly its own target set.

use crate::domain::transaction::TxOutput;
use crate::domain::uniformity::is_uniform;
use crate::foundation::{Address, Amount, MixError, Result};
use std::collections::BTreeSet;

/// Fails with `FairnessViolation` unless every declared target set is identical.
pub fn check_agreement<'a, I>(sets: I) -> Result<()>
where
    I: IntoIterator<Item = &'a BTreeSet<Address>>,
{
    let sets: Vec<&BTreeSet<Address>> = sets.into_iter().collect();
    if is_uniform(sets.iter().copied()) {
        return Ok(());
    }
    Err(MixError::fairness(format!("target address sets disagree across {} participants", sets.len())))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FairnessPolicy {
    amount: Amount,
    targets: BTreeSet<Address>,
}

impl FairnessPolicy {
    pub fn new(amount: Amount, targets: BTreeSet<Address>) -> Self {
        Self { amount, targets }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn targets(&self) -> &BTreeSet<Address> {
        &self.targets
    }

    /// One output per target address, in the set's sort order.
    pub fn expected_outputs(&self) -> Vec<TxOutput> {
        self.targets.iter().map(|address| TxOutput { address: address.clone(), amount: self.amount }).collect()
    }

    /// Every output carries exactly the agreed amount and pays a distinct address from the
    /// target set; every target address is paid.
    pub fn check_outputs(&self, outputs: &[TxOutput]) -> Result<()> {
        if !is_uniform(outputs.iter().map(|output| output.amount).chain(std::iter::once(self.amount))) {
            let bad = outputs.iter().find(|output| output.amount != self.amount);
            return Err(MixError::fairness(match bad {
                Some(output) => format!("output to {} carries {} instead of {}", output.address, output.amount, self.amount),
                None => "output amounts disagree".to_string(),
            }));
        }

        let mut unpaid = self.targets.clone();
        for output in outputs {
            if !unpaid.remove(&output.address) {
                return Err(MixError::fairness(format!("unexpected or duplicate output address {}", output.address)));
            }
        }
        if let Some(missing) = unpaid.iter().next() {
            return Err(MixError::fairness(format!("target address {} is not paid ({} missing)", missing, unpaid.len())));
        }
        Ok(())
    }
}
