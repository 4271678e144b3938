use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".ciforge";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const CUSTOM_TEMPLATES_DIR: &str = "templates/custom";
pub const DEFAULT_OUTPUT_DIR: &str = ".github/workflows";

pub fn global_state_root() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(global_state_root()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

/// Custom template directory under the global state root, or a relative
/// `.ciforge/templates/custom` when no home directory is available.
pub fn default_custom_templates_dir() -> PathBuf {
    global_state_root()
        .unwrap_or_else(|_| PathBuf::from(GLOBAL_STATE_DIR))
        .join(CUSTOM_TEMPLATES_DIR)
}
