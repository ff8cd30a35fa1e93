use clap::Parser;
use mixer_core::foundation::Network;
use mixer_core::infrastructure::config::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mixer-coordinator")]
#[command(about = "Runs one joint-payment round as coordinator", long_about = None)]
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

    /// Amount paid to every target address
    #[arg(short, long)]
    pub amount: Option<u64>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Listen address
    #[arg(long)]
    pub listen: Option<String>,

    /// Number of participants in the round
    #[arg(long)]
    pub players: Option<usize>,

    /// Log level or filter list, e.g. `debug` or `info,mixer_core=trace`
    #[arg(short, long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(amount) = self.amount {
            config.coordinator.amount = amount;
        }
        if let Some(port) = self.port {
            config.coordinator.port = port;
        }
        if let Some(listen) = &self.listen {
            config.coordinator.listen_addr = listen.clone();
        }
        if let Some(players) = self.players {
            config.coordinator.player_count = players;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
