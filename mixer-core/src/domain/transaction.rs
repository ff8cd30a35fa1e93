use crate::foundation::{Address, Amount, SignatureBytes, TransactionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Location of a spendable output on the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_id: TransactionId,
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

/// A participant's funding output as announced in its Input message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRef {
    pub outpoint: OutPoint,
    pub amount: Amount,
    pub owner: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: Address,
    pub amount: Amount,
}

/// What a participant contributes to the round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub source_output: OutputRef,
    pub target_addresses: BTreeSet<Address>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputView {
    pub outpoint: OutPoint,
    pub signature: Option<SignatureBytes>,
}

/// Decoded shape of an opaque transaction, as far as the protocol cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionView {
    pub inputs: Vec<InputView>,
    pub outputs: Vec<TxOutput>,
}

impl TransactionView {
    /// Same inputs in the same order and same outputs, ignoring unlock data.
    pub fn same_body(&self, other: &TransactionView) -> bool {
        self.outputs == other.outputs
            && self.inputs.len() == other.inputs.len()
            && self.inputs.iter().zip(&other.inputs).all(|(a, b)| a.outpoint == b.outpoint)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.inputs.iter().all(|input| input.signature.is_some())
    }
}
