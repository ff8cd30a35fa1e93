use clap::Parser;
use mixer_core::foundation::Network;
use mixer_core::infrastructure::config::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mixer-participant")]
#[command(about = "Joins one joint-payment round", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Apply `[profiles.<name>]` overrides from the config file
    #[arg(long, env = "MIXER_PROFILE")]
    pub profile: Option<String>,

    /// mainnet, testnet or devnet
    #[arg(long)]
    pub network: Option<Network>,

    /// Wallet file that funds the input and signs it
    #[arg(short, long)]
    pub wallet: Option<PathBuf>,

    /// Amount paid to every target address
    #[arg(short, long)]
    pub amount: Option<u64>,

    /// Coordinator `host:port`
    #[arg(long)]
    pub coordinator: Option<String>,

    /// Log level or filter list
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Target addresses; one per participant, identical across the round
    pub targets: Vec<String>,
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
        if let Some(amount) = self.amount {
            config.participant.amount = amount;
        }
        if let Some(coordinator) = &self.coordinator {
            config.participant.coordinator_addr = coordinator.clone();
        }
        if !self.targets.is_empty() {
            config.participant.target_addresses = self.targets.iter().map(|target| target.trim().to_string()).collect();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
