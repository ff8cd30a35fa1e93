//! Ledger collaborator interface consumed by both sides of a round.

use crate::domain::transaction::{OutputRef, TransactionView, TxOutput};
use crate::foundation::{Amount, Result, SignatureBytes, TransactionId, TxBytes};
use std::collections::BTreeMap;

/// Stateless transaction primitives.
pub trait Ledger: Send + Sync {
    fn build_unsigned_transaction(&self, inputs: &[OutputRef], outputs: &[TxOutput]) -> Result<TxBytes>;

    fn decode_transaction(&self, tx: &[u8]) -> Result<TransactionView>;

    /// Checks that `signature` unlocks `input`, spent at `index` of the unsigned `tx`.
    fn verify_input_signature(&self, tx: &[u8], index: usize, input: &OutputRef, signature: &[u8]) -> Result<()>;

    /// Places `signatures[i]` on input `i`. Every input must be covered exactly once.
    fn assemble_transaction(&self, tx: &[u8], signatures: &BTreeMap<usize, SignatureBytes>) -> Result<TxBytes>;

    fn transaction_id(&self, tx: &[u8]) -> Result<TransactionId>;
}

/// Key and output owner on the participant side.
pub trait Wallet: Send + Sync {
    /// Fails with `InsufficientFunds` when nothing of at least `amount` is spendable.
    fn select_funding_output(&self, amount: Amount) -> Result<OutputRef>;

    fn sign_input(&self, tx: &[u8], index: usize, input: &OutputRef) -> Result<SignatureBytes>;

    /// Records a final transaction and persists the wallet. May block on file I/O.
    fn commit(&self, tx: &[u8]) -> Result<TransactionId>;
}
