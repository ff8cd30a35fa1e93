//! Development ledger and file wallet implementing the ledger collaborator traits.

pub mod dev;
pub mod wallet;

pub use dev::{DevLedger, DevTransaction, DevTxInput};
pub use wallet::FileWallet;
