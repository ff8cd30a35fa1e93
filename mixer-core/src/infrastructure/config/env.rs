use crate::foundation::MixError;
use crate::infrastructure::config::loader::CONFIG_FILE_NAME;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "MIXER_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "MIXER_DATA_DIR";

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub fn resolve_config_path(data_dir: &Path) -> PathBuf {
    non_empty_env(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME))
}

pub fn resolve_data_dir() -> Result<PathBuf, MixError> {
    if let Some(dir) = non_empty_env(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let cwd = std::env::current_dir().map_err(|err| MixError::StorageError { operation: "env::current_dir".to_string(), details: err.to_string() })?;
    Ok(cwd.join(".mixer"))
}
