//! Development ledger.
//!
//! A deliberately small transaction format so rounds can run end to end without a node:
//! bincode-encoded inputs and outputs, Schnorr unlocks over a blake3 signature hash, and
//! addresses derived from x-only public keys.

use crate::domain::{InputView, Ledger, OutPoint, OutputRef, TransactionView, TxOutput};
use crate::foundation::util::conversion::usize_to_u32;
use crate::foundation::{
    Address, MixError, Network, Result, SignatureBytes, TransactionId, TxBytes, ADDRESS_PAYLOAD_SIZE, SCHNORR_PUBKEY_SIZE,
    SCHNORR_SIGNATURE_SIZE,
};
use bincode::Options;
use secp256k1::{schnorr, Keypair, Message, Secp256k1, VerifyOnly, XOnlyPublicKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TX_VERSION: u16 = 1;
const SIGHASH_DOMAIN: &[u8] = b"mixer-sighash/v1";
const TXID_DOMAIN: &[u8] = b"mixer-txid/v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevTxInput {
    pub outpoint: OutPoint,
    /// `xonly_pubkey || schnorr_signature` once signed, empty before.
    pub unlock: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevTransaction {
    pub version: u16,
    pub inputs: Vec<DevTxInput>,
    pub outputs: Vec<TxOutput>,
}

impl DevTransaction {
    fn without_unlocks(&self) -> DevTransaction {
        let mut body = self.clone();
        for input in &mut body.inputs {
            input.unlock.clear();
        }
        body
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

pub struct DevLedger {
    network: Network,
    secp: Secp256k1<VerifyOnly>,
}

impl DevLedger {
    pub fn new(network: Network) -> Self {
        Self { network, secp: Secp256k1::verification_only() }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn encode(&self, tx: &DevTransaction) -> Result<TxBytes> {
        codec().serialize(tx).map_err(|err| crate::serde_err!("bincode", err))
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<DevTransaction> {
        let tx: DevTransaction = codec().deserialize(bytes).map_err(|err| crate::serde_err!("bincode", err))?;
        if tx.version != TX_VERSION {
            return Err(MixError::ledger("decode", format!("unsupported transaction version {}", tx.version)));
        }
        Ok(tx)
    }

    pub fn address_for(&self, key: &XOnlyPublicKey) -> Address {
        let digest = blake3::hash(&key.serialize());
        Address::new(format!("{}:{}", self.network.address_prefix(), hex::encode(&digest.as_bytes()[..ADDRESS_PAYLOAD_SIZE])))
    }

    /// Checks the network prefix and payload shape of an address.
    pub fn validate_address(&self, address: &Address) -> Result<()> {
        let (prefix, payload) =
            address.split_once(':').ok_or_else(|| MixError::InvalidAddress(format!("{address}: missing network prefix")))?;
        if prefix != self.network.address_prefix() {
            return Err(MixError::InvalidAddress(format!("{address}: expected prefix {}", self.network.address_prefix())));
        }
        let bytes = hex::decode(payload).map_err(|err| MixError::InvalidAddress(format!("{address}: {err}")))?;
        if bytes.len() != ADDRESS_PAYLOAD_SIZE {
            return Err(MixError::InvalidAddress(format!("{address}: payload is {} bytes", bytes.len())));
        }
        Ok(())
    }

    /// Digest signed for input `index`. Covers every outpoint and output, never any unlock.
    pub fn signature_hash(&self, tx: &DevTransaction, index: usize) -> Result<[u8; 32]> {
        let body = codec().serialize(&tx.without_unlocks()).map_err(|err| crate::serde_err!("bincode", err))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(SIGHASH_DOMAIN);
        hasher.update(&body);
        hasher.update(&usize_to_u32(index)?.to_le_bytes());
        Ok(*hasher.finalize().as_bytes())
    }

    /// Produces unlock data for input `index` with `keypair`.
    pub fn sign(&self, tx: &DevTransaction, index: usize, keypair: &Keypair) -> Result<SignatureBytes> {
        let digest = self.signature_hash(tx, index)?;
        let msg = Message::from_digest_slice(&digest)?;
        let signer = Secp256k1::signing_only();
        let sig = signer.sign_schnorr_no_aux_rand(&msg, keypair);
        let (xonly, _) = keypair.x_only_public_key();
        let mut unlock = Vec::with_capacity(SCHNORR_PUBKEY_SIZE + SCHNORR_SIGNATURE_SIZE);
        unlock.extend_from_slice(&xonly.serialize());
        unlock.extend_from_slice(&sig[..]);
        Ok(unlock)
    }

    fn check_unlock(&self, tx: &DevTransaction, index: usize, owner: &Address, unlock: &[u8]) -> Result<()> {
        if unlock.len() != SCHNORR_PUBKEY_SIZE + SCHNORR_SIGNATURE_SIZE {
            return Err(MixError::InvalidSignature { input_index: index });
        }
        let (key_bytes, sig_bytes) = unlock.split_at(SCHNORR_PUBKEY_SIZE);
        let key = XOnlyPublicKey::from_slice(key_bytes)?;
        if &self.address_for(&key) != owner {
            return Err(MixError::InvalidSignature { input_index: index });
        }
        let sig = schnorr::Signature::from_slice(sig_bytes)?;
        let msg = Message::from_digest_slice(&self.signature_hash(tx, index)?)?;
        self.secp.verify_schnorr(&sig, &msg, &key).map_err(|_| MixError::InvalidSignature { input_index: index })
    }
}

impl Ledger for DevLedger {
    fn build_unsigned_transaction(&self, inputs: &[OutputRef], outputs: &[TxOutput]) -> Result<TxBytes> {
        if inputs.is_empty() || outputs.is_empty() {
            return Err(MixError::ledger("build", "transaction needs at least one input and one output"));
        }
        if let Some(output) = outputs.iter().find(|output| output.amount == 0) {
            return Err(MixError::ledger("build", format!("zero-value output to {}", output.address)));
        }
        for output in outputs {
            self.validate_address(&output.address)?;
        }
        let funded = inputs.iter().try_fold(0u64, |acc, input| acc.checked_add(input.amount));
        let spent = outputs.iter().try_fold(0u64, |acc, output| acc.checked_add(output.amount));
        match (funded, spent) {
            (Some(funded), Some(spent)) if funded >= spent => {}
            _ => return Err(MixError::ledger("build", "outputs exceed inputs")),
        }
        let tx = DevTransaction {
            version: TX_VERSION,
            inputs: inputs.iter().map(|input| DevTxInput { outpoint: input.outpoint, unlock: Vec::new() }).collect(),
            outputs: outputs.to_vec(),
        };
        self.encode(&tx)
    }

    fn decode_transaction(&self, tx: &[u8]) -> Result<TransactionView> {
        let tx = self.decode(tx)?;
        Ok(TransactionView {
            inputs: tx
                .inputs
                .into_iter()
                .map(|input| InputView { outpoint: input.outpoint, signature: (!input.unlock.is_empty()).then_some(input.unlock) })
                .collect(),
            outputs: tx.outputs,
        })
    }

    fn verify_input_signature(&self, tx: &[u8], index: usize, input: &OutputRef, signature: &[u8]) -> Result<()> {
        let tx = self.decode(tx)?;
        let spent = tx.inputs.get(index).ok_or(MixError::InvalidSigningIndex { index, inputs: tx.inputs.len() })?;
        if spent.outpoint != input.outpoint {
            return Err(MixError::ledger("verify", format!("input {index} spends {} not {}", spent.outpoint, input.outpoint)));
        }
        self.check_unlock(&tx, index, &input.owner, signature)
    }

    fn assemble_transaction(&self, tx: &[u8], signatures: &BTreeMap<usize, SignatureBytes>) -> Result<TxBytes> {
        let mut tx = self.decode(tx)?;
        if signatures.len() != tx.inputs.len() || signatures.keys().any(|index| *index >= tx.inputs.len()) {
            return Err(MixError::ledger(
                "assemble",
                format!("{} signatures for {} inputs", signatures.len(), tx.inputs.len()),
            ));
        }
        for (index, input) in tx.inputs.iter_mut().enumerate() {
            let signature = signatures.get(&index).ok_or_else(|| MixError::ledger("assemble", format!("missing signature for input {index}")))?;
            input.unlock = signature.clone();
        }
        self.encode(&tx)
    }

    fn transaction_id(&self, tx: &[u8]) -> Result<TransactionId> {
        let tx = self.decode(tx)?;
        let body = codec().serialize(&tx.without_unlocks()).map_err(|err| crate::serde_err!("bincode", err))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(TXID_DOMAIN);
        hasher.update(&body);
        Ok(TransactionId::from(*hasher.finalize().as_bytes()))
    }
}
