//! Domain layer: pure round logic with no I/O.

pub mod coordination;
pub mod fairness;
pub mod latch;
pub mod ledger;
pub mod transaction;
pub mod uniformity;

pub use coordination::*;
pub use fairness::{check_agreement, FairnessPolicy};
pub use latch::{OneShot, OneShotLatch};
pub use ledger::{Ledger, Wallet};
pub use transaction::{InputView, OutPoint, OutputRef, ParticipantInput, TransactionView, TxOutput};
pub use uniformity::is_uniform;
