use super::{default_global_config_path, ConfigError, Settings};
use crate::orchestration::request::MultiWorkflowRequest;
use std::fs;
use std::path::Path;

/// Loads settings from `explicit` when given (the file must exist), else
/// from the global config path, falling back to defaults when that file is
/// absent.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::Missing {
                    path: path.display().to_string(),
                });
            }
            Settings::from_path(path)?
        }
        None => {
            let path = default_global_config_path()?;
            if path.exists() {
                Settings::from_path(&path)?
            } else {
                Settings::default()
            }
        }
    };
    settings.validate()?;
    Ok(settings)
}

pub fn load_request(path: &Path) -> Result<MultiWorkflowRequest, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let request: MultiWorkflowRequest =
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    if request.workflows.is_empty() {
        return Err(ConfigError::Request {
            path: path.display().to_string(),
            reason: "`workflows` must be non-empty".to_string(),
        });
    }
    Ok(request)
}
