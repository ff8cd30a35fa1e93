use clap::{Parser, Subcommand};
use mixer_core::foundation::Network;
use mixer_core::infrastructure::config::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mixer-wallet")]
#[command(about = "Manages development-ledger wallet files", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// mainnet, testnet or devnet
    #[arg(long)]
    pub network: Option<Network>,

    /// Wallet file; defaults to `participant.wallet_path`
    #[arg(short, long)]
    pub wallet: Option<PathBuf>,

    /// Log level or filter list
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty wallet file
    Create,
    /// Generate a key and print its address
    NewAddress,
    /// Credit a synthetic output to an address of this wallet
    Fund {
        address: String,
        amount: u64,
    },
    /// Print addresses, spendable outputs and committed transactions
    Show,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(wallet) = &self.wallet {
            config.participant.wallet_path = wallet.display().to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
