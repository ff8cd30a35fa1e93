//! JSON-file wallet for the development ledger.

use crate::domain::{Ledger, OutPoint, OutputRef, Wallet};
use crate::foundation::util::conversion::usize_to_u32;
use crate::foundation::{Address, Amount, MixError, Network, Result, SignatureBytes, TransactionId};
use crate::infrastructure::ledger::dev::DevLedger;
use crate::storage_err;
use log::{debug, info};
use secp256k1::{Keypair, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use zeroize::Zeroize;

#[derive(Clone, Serialize, Deserialize)]
struct KeyEntry {
    secret_key: String,
    address: Address,
}

impl Drop for KeyEntry {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct WalletFile {
    network: Network,
    #[serde(default)]
    keys: Vec<KeyEntry>,
    #[serde(default)]
    outputs: Vec<OutputRef>,
    #[serde(default)]
    history: Vec<TransactionId>,
}

pub struct FileWallet {
    path: PathBuf,
    ledger: Arc<DevLedger>,
    state: Mutex<WalletFile>,
}

impl FileWallet {
    /// Creates an empty wallet file. Refuses to overwrite an existing one.
    pub fn create(path: impl Into<PathBuf>, ledger: Arc<DevLedger>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            return Err(MixError::wallet("create", format!("{} already exists", path.display())));
        }
        let wallet = Self { path, state: Mutex::new(WalletFile { network: ledger.network(), keys: Vec::new(), outputs: Vec::new(), history: Vec::new() }), ledger };
        wallet.save_blocking()?;
        info!("wallet created path={} network={}", wallet.path.display(), wallet.ledger.network());
        Ok(wallet)
    }

    pub fn open(path: impl Into<PathBuf>, ledger: Arc<DevLedger>) -> Result<Self> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path).map_err(|err| storage_err!("read_wallet", format!("{}: {err}", path.display())))?;
        let file: WalletFile = serde_json::from_str(&raw)?;
        if file.network != ledger.network() {
            return Err(MixError::wallet("open", format!("wallet is for {}, ledger is {}", file.network, ledger.network())));
        }
        debug!("wallet opened path={} keys={} outputs={}", path.display(), file.keys.len(), file.outputs.len());
        Ok(Self { path, ledger, state: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, WalletFile>> {
        self.state.lock().map_err(|_| MixError::wallet("lock", "wallet state poisoned"))
    }

    pub fn new_address(&self) -> Result<Address> {
        let secp = Secp256k1::new();
        let secret = SecretKey::new(&mut rand::thread_rng());
        let keypair = Keypair::from_secret_key(&secp, &secret);
        let address = self.ledger.address_for(&keypair.x_only_public_key().0);
        self.lock()?.keys.push(KeyEntry { secret_key: hex::encode(secret.secret_bytes()), address: address.clone() });
        self.save_blocking()?;
        Ok(address)
    }

    pub fn addresses(&self) -> Result<Vec<Address>> {
        Ok(self.lock()?.keys.iter().map(|key| key.address.clone()).collect())
    }

    pub fn outputs(&self) -> Result<Vec<OutputRef>> {
        Ok(self.lock()?.outputs.clone())
    }

    pub fn history(&self) -> Result<Vec<TransactionId>> {
        Ok(self.lock()?.history.clone())
    }

    pub fn balance(&self) -> Result<Amount> {
        Ok(self.lock()?.outputs.iter().map(|output| output.amount).sum())
    }

    /// Credits a synthetic output to one of this wallet's addresses.
    pub fn fund(&self, address: &Address, amount: Amount) -> Result<OutputRef> {
        if amount == 0 {
            return Err(MixError::wallet("fund", "amount must be positive"));
        }
        let output = {
            let mut state = self.lock()?;
            if !state.keys.iter().any(|key| &key.address == address) {
                return Err(MixError::wallet("fund", format!("{address} does not belong to this wallet")));
            }
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"mixer-faucet/v1");
            hasher.update(address.as_bytes());
            hasher.update(&amount.to_le_bytes());
            hasher.update(&rand::random::<[u8; 16]>());
            let output = OutputRef { outpoint: OutPoint { tx_id: TransactionId::from(*hasher.finalize().as_bytes()), index: 0 }, amount, owner: address.clone() };
            state.outputs.push(output.clone());
            output
        };
        self.save_blocking()?;
        info!("wallet funded address={} amount={} outpoint={}", address, amount, output.outpoint);
        Ok(output)
    }

    fn keypair_for(&self, owner: &Address) -> Result<Keypair> {
        let state = self.lock()?;
        let entry = state.keys.iter().find(|key| &key.address == owner).ok_or_else(|| MixError::wallet("sign", format!("no key for {owner}")))?;
        let mut bytes = hex::decode(&entry.secret_key)?;
        let secret = SecretKey::from_slice(&bytes);
        bytes.zeroize();
        Ok(Keypair::from_secret_key(&Secp256k1::new(), &secret?))
    }

    fn snapshot_json(&self) -> Result<String> {
        let state = self.lock()?;
        Ok(serde_json::to_string_pretty(&*state)?)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn save_blocking(&self) -> Result<()> {
        let json = self.snapshot_json()?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|err| storage_err!("write_wallet", err))?;
        std::fs::rename(&tmp, &self.path).map_err(|err| storage_err!("rename_wallet", err))
    }
}

impl Wallet for FileWallet {
    fn select_funding_output(&self, amount: Amount) -> Result<OutputRef> {
        let state = self.lock()?;
        state
            .outputs
            .iter()
            .filter(|output| output.amount >= amount)
            .min_by_key(|output| output.amount)
            .cloned()
            .ok_or(MixError::InsufficientFunds { amount })
    }

    fn sign_input(&self, tx: &[u8], index: usize, input: &OutputRef) -> Result<SignatureBytes> {
        let keypair = self.keypair_for(&input.owner)?;
        let decoded = self.ledger.decode(tx)?;
        self.ledger.sign(&decoded, index, &keypair)
    }

    fn commit(&self, tx: &[u8]) -> Result<TransactionId> {
        let decoded = self.ledger.decode(tx)?;
        let tx_id = self.ledger.transaction_id(tx)?;
        {
            let mut state = self.lock()?;
            let spent: Vec<OutPoint> = decoded.inputs.iter().map(|input| input.outpoint).collect();
            state.outputs.retain(|output| !spent.contains(&output.outpoint));
            let owned: Vec<Address> = state.keys.iter().map(|key| key.address.clone()).collect();
            for (index, output) in decoded.outputs.iter().enumerate() {
                if owned.contains(&output.address) {
                    let outpoint = OutPoint { tx_id, index: usize_to_u32(index)? };
                    state.outputs.push(OutputRef { outpoint, amount: output.amount, owner: output.address.clone() });
                }
            }
            if !state.history.contains(&tx_id) {
                state.history.push(tx_id);
            }
        }
        self.save_blocking()?;
        info!("transaction committed tx_id={} wallet={}", tx_id, self.path.display());
        Ok(tx_id)
    }
}
