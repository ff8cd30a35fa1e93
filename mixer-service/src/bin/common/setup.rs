use log::{info, warn};
use mixer_core::foundation::MixError;
use mixer_core::infrastructure::config::{self, AppConfig, Role, CONFIG_PATH_ENV, DATA_DIR_ENV};
use mixer_core::infrastructure::ledger::DevLedger;
use mixer_core::infrastructure::logging::init_logger;
use std::path::Path;
use std::sync::Arc;

pub fn apply_path_overrides(config_path: Option<&Path>, data_dir: Option<&Path>) {
    if let Some(path) = config_path {
        std::env::set_var(CONFIG_PATH_ENV, path);
    }
    if let Some(dir) = data_dir {
        std::env::set_var(DATA_DIR_ENV, dir);
    }
}

pub fn load_app_config(role: Role, profile: Option<&str>, apply: impl FnOnce(&mut AppConfig)) -> Result<AppConfig, MixError> {
    let profile = profile.map(str::trim).filter(|profile| !profile.is_empty());
    if let Some(profile) = profile {
        info!("loading config profile profile={}", profile);
    }
    config::load_app_config(role, profile, apply)
}

pub fn init_logging(config: &AppConfig) -> Result<(), MixError> {
    init_logger(config.logging.log_dir.as_deref(), &config.logging.level)
}

pub fn dev_ledger(config: &AppConfig) -> Arc<DevLedger> {
    if config.network == mixer_core::foundation::Network::Mainnet {
        warn!("development ledger selected on mainnet; transactions are not broadcast anywhere");
    }
    Arc::new(DevLedger::new(config.network))
}
