//! Infrastructure layer: I/O and external integrations.

pub mod config;
pub mod ledger;
pub mod logging;
pub mod transport;
