use super::paths::{default_custom_templates_dir, CUSTOM_TEMPLATES_DIR, DEFAULT_OUTPUT_DIR};
use super::ConfigError;
use crate::shared::logging::DEFAULT_LOG_FILTER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub templates: TemplateSettings,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            templates: TemplateSettings::default(),
            output_dir: default_output_dir(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Template source locations. Built-in and organization directories are
/// optional; the custom directory also holds `customizations.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateSettings {
    #[serde(default)]
    pub builtin_dir: Option<PathBuf>,
    #[serde(default = "default_custom_templates_dir")]
    pub custom_dir: PathBuf,
    #[serde(default)]
    pub organization_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub include_default_templates: bool,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            builtin_dir: None,
            custom_dir: default_custom_templates_dir(),
            organization_dir: None,
            include_default_templates: true,
        }
    }
}

impl TemplateSettings {
    /// Settings with every writable location under `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            builtin_dir: None,
            custom_dir: root.join(CUSTOM_TEMPLATES_DIR),
            organization_dir: None,
            include_default_templates: true,
        }
    }

    pub fn with_organization_dir(mut self, dir: PathBuf) -> Self {
        self.organization_dir = Some(dir);
        self
    }

    pub fn without_default_templates(mut self) -> Self {
        self.include_default_templates = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates.custom_dir.as_os_str().is_empty() {
            return Err(ConfigError::Settings(
                "`templates.custom_dir` must be non-empty".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Settings(
                "`output_dir` must be non-empty".to_string(),
            ));
        }
        if let Some(organization_dir) = &self.templates.organization_dir {
            if *organization_dir == self.templates.custom_dir {
                return Err(ConfigError::Settings(
                    "`templates.organization_dir` must differ from `templates.custom_dir`"
                        .to_string(),
                ));
            }
        }
        if let Some(builtin_dir) = &self.templates.builtin_dir {
            if *builtin_dir == self.templates.custom_dir {
                return Err(ConfigError::Settings(
                    "`templates.builtin_dir` must differ from `templates.custom_dir`".to_string(),
                ));
            }
        }
        Ok(())
    }
}
