use crate::foundation::{
    Network, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_COORDINATOR_PORT, DEFAULT_FINAL_TIMEOUT_SECS, DEFAULT_INPUT_TIMEOUT_SECS,
    DEFAULT_SIGNATURE_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

/// Top-level configuration shared by the coordinator and participant launchers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub data_dir: String,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    #[serde(default)]
    pub participant: ParticipantConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_player_count")]
    pub player_count: usize,
    /// Fixed amount paid to every target address.
    #[serde(default)]
    pub amount: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { listen_addr: default_listen_addr(), port: default_port(), player_count: default_player_count(), amount: 0 }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// `host:port` of the coordinator.
    #[serde(default)]
    pub coordinator_addr: String,
    #[serde(default)]
    pub wallet_path: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub target_addresses: Vec<String>,
}

/// Per-phase deadlines in seconds. Zero disables a deadline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_input_timeout_secs")]
    pub input_timeout_secs: u64,
    #[serde(default = "default_signature_timeout_secs")]
    pub signature_timeout_secs: u64,
    #[serde(default = "default_final_timeout_secs")]
    pub final_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            input_timeout_secs: default_input_timeout_secs(),
            signature_timeout_secs: default_signature_timeout_secs(),
            final_timeout_secs: default_final_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter expression understood by `init_logger`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), log_dir: None }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_COORDINATOR_PORT
}

fn default_player_count() -> usize {
    3
}

fn default_input_timeout_secs() -> u64 {
    DEFAULT_INPUT_TIMEOUT_SECS
}

fn default_signature_timeout_secs() -> u64 {
    DEFAULT_SIGNATURE_TIMEOUT_SECS
}

fn default_final_timeout_secs() -> u64 {
    DEFAULT_FINAL_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}
