mod loader;
mod types;
pub mod env;
pub mod validation;

pub use env::{resolve_config_path, resolve_data_dir, CONFIG_PATH_ENV, DATA_DIR_ENV};
pub use loader::{load_config, load_config_from_file, load_config_from_file_with_profile, CONFIG_FILE_NAME, ENV_PREFIX};
pub use types::*;
pub use validation::Role;

use crate::foundation::MixError;
use std::path::Path;

fn validated(config: AppConfig, role: Role) -> Result<AppConfig, MixError> {
    config.validate_for(role).map_err(|errors| MixError::ConfigError(format!("validation failed: {}", errors.join("; "))))?;
    Ok(config)
}

/// Resolves data dir and config path from the environment, loads, and validates for `role`.
///
/// `apply` runs between loading and validation so CLI flags can override file values.
pub fn load_app_config(role: Role, profile: Option<&str>, apply: impl FnOnce(&mut AppConfig)) -> Result<AppConfig, MixError> {
    let data_dir = resolve_data_dir()?;
    let config_path = resolve_config_path(&data_dir);
    load_app_config_from_path(&config_path, &data_dir, role, profile, apply)
}

pub fn load_app_config_from_path(
    path: &Path,
    data_dir: &Path,
    role: Role,
    profile: Option<&str>,
    apply: impl FnOnce(&mut AppConfig),
) -> Result<AppConfig, MixError> {
    let mut config = match profile {
        Some(profile) => load_config_from_file_with_profile(path, data_dir, profile)?,
        None => load_config_from_file(path, data_dir)?,
    };
    apply(&mut config);
    validated(config, role)
}
