//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Profile overrides from `[profiles.<name>]`
//! 4. Environment variables (MIXER_* prefix)

use crate::foundation::MixError;
use crate::infrastructure::config::types::{AppConfig, CoordinatorConfig, LoggingConfig, ParticipantConfig, RuntimeConfig};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::{Dict, Map};
use figment::{Figment, Profile};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix for config overrides.
///
/// Example: `MIXER_COORDINATOR__PLAYER_COUNT` -> `coordinator.player_count`
pub const ENV_PREFIX: &str = "MIXER_";

pub const CONFIG_FILE_NAME: &str = "mixer-config.toml";

#[derive(Clone, Debug, Default, Deserialize)]
struct AppConfigRaw {
    #[serde(default)]
    pub network: crate::foundation::Network,
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
    #[serde(default)]
    pub profiles: Option<Map<String, Dict>>,
}

impl From<AppConfigRaw> for AppConfig {
    fn from(raw: AppConfigRaw) -> Self {
        AppConfig {
            network: raw.network,
            data_dir: raw.data_dir,
            coordinator: raw.coordinator,
            participant: raw.participant,
            runtime: raw.runtime,
            logging: raw.logging,
        }
    }
}

/// Load configuration from the default file in `data_dir` (`mixer-config.toml`).
pub fn load_config(data_dir: &Path) -> Result<AppConfig, MixError> {
    load_config_from_file(&data_dir.join(CONFIG_FILE_NAME), data_dir)
}

/// Load configuration from a specific file path.
pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig, MixError> {
    info!("loading configuration path={} data_dir={}", path.display(), data_dir.display());
    let figment = figment_base(path).merge(env_provider());
    let raw: AppConfigRaw = figment.extract().map_err(|e| MixError::ConfigError(format!("config extraction failed: {e}")))?;
    let mut config = AppConfig::from(raw);
    postprocess(&mut config, data_dir);
    debug!("configuration loaded network={} players={} amount={}", config.network, config.coordinator.player_count, config.coordinator.amount);
    Ok(config)
}

/// Load configuration from a specific file path with `[profiles.<name>]` overrides.
pub fn load_config_from_file_with_profile(path: &Path, data_dir: &Path, profile: &str) -> Result<AppConfig, MixError> {
    info!("loading configuration path={} data_dir={} profile={}", path.display(), data_dir.display(), profile);

    // Extract once to access `profiles.<name>` overrides from the file.
    let base: AppConfigRaw = figment_base(path).extract().map_err(|e| MixError::ConfigError(format!("config extraction failed: {e}")))?;
    let overrides = profile_overrides(&base, profile)?;

    let figment = figment_base(path).merge(Serialized::from(overrides, Profile::Default)).merge(env_provider());
    let raw: AppConfigRaw =
        figment.extract().map_err(|e| MixError::ConfigError(format!("config extraction failed for profile '{profile}': {e}")))?;
    let mut config = AppConfig::from(raw);
    postprocess(&mut config, data_dir);
    Ok(config)
}

fn env_provider() -> Env {
    // Path-resolution variables share the prefix but are not config keys.
    Env::prefixed(ENV_PREFIX).ignore(&["CONFIG_PATH", "DATA_DIR", "PROFILE"]).split("__")
}

fn figment_base(path: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    figment
}

fn profile_overrides(config: &AppConfigRaw, profile: &str) -> Result<Dict, MixError> {
    let profiles = config.profiles.as_ref().ok_or_else(|| MixError::ConfigError("no profiles section in config".to_string()))?;
    profiles.get(profile).cloned().ok_or_else(|| MixError::ConfigError(format!("profile '{profile}' not found in config")))
}

fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.data_dir.trim().is_empty() {
        config.data_dir = data_dir.to_string_lossy().to_string();
    }
    config.participant.target_addresses = config
        .participant
        .target_addresses
        .iter()
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty())
        .collect();
}
