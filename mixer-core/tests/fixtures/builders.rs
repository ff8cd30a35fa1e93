#![allow(dead_code)]

use crate::fixtures::{funding_output, keypair, TEST_FUNDING};
use mixer_core::domain::{Ledger, OutputRef, Wallet};
use mixer_core::foundation::{Amount, MixError, Result, SignatureBytes, TransactionId};
use mixer_core::infrastructure::ledger::DevLedger;
use secp256k1::Keypair;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory wallet holding one key and one output. Counts signing requests.
pub struct KeyWallet {
    ledger: Arc<DevLedger>,
    keypair: Keypair,
    output: Option<OutputRef>,
    signed: AtomicUsize,
    committed: Mutex<Vec<TransactionId>>,
}

impl KeyWallet {
    pub fn new(ledger: Arc<DevLedger>, seed: u8) -> Self {
        Self::with_funding(ledger, seed, TEST_FUNDING)
    }

    pub fn with_funding(ledger: Arc<DevLedger>, seed: u8, amount: Amount) -> Self {
        let output = funding_output(&ledger, seed, amount);
        Self { ledger, keypair: keypair(seed), output: Some(output), signed: AtomicUsize::new(0), committed: Mutex::new(Vec::new()) }
    }

    pub fn empty(ledger: Arc<DevLedger>, seed: u8) -> Self {
        Self { output: None, ..Self::new(ledger, seed) }
    }

    pub fn output(&self) -> OutputRef {
        self.output.clone().expect("wallet has an output")
    }

    pub fn sign_count(&self) -> usize {
        self.signed.load(Ordering::SeqCst)
    }

    pub fn committed(&self) -> Vec<TransactionId> {
        self.committed.lock().expect("lock").clone()
    }
}

impl Wallet for KeyWallet {
    fn select_funding_output(&self, amount: Amount) -> Result<OutputRef> {
        self.output.clone().filter(|output| output.amount >= amount).ok_or(MixError::InsufficientFunds { amount })
    }

    fn sign_input(&self, tx: &[u8], index: usize, _input: &OutputRef) -> Result<SignatureBytes> {
        self.signed.fetch_add(1, Ordering::SeqCst);
        let decoded = self.ledger.decode(tx)?;
        self.ledger.sign(&decoded, index, &self.keypair)
    }

    fn commit(&self, tx: &[u8]) -> Result<TransactionId> {
        let tx_id = self.ledger.transaction_id(tx)?;
        self.committed.lock().map_err(|_| MixError::wallet("commit", "poisoned"))?.push(tx_id);
        Ok(tx_id)
    }
}
