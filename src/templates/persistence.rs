use crate::shared::fs_atomic::{atomic_write_file, remove_file_if_exists};
use crate::templates::customization::TemplateCustomization;
use crate::templates::error::TemplateError;
use crate::templates::model::{Template, TemplateCategory};
use std::fs;
use std::path::{Path, PathBuf};

pub const CUSTOMIZATIONS_FILE_NAME: &str = "customizations.yaml";
pub const TEMPLATE_FILE_EXTENSION: &str = "yaml";

/// A template together with the file it was read from.
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub path: PathBuf,
    pub template: Template,
}

/// Templates read from one source directory. Files that fail to parse are
/// reported in `warnings` instead of failing the whole directory.
#[derive(Debug, Default)]
pub struct DirectoryLoad {
    pub templates: Vec<LoadedTemplate>,
    pub warnings: Vec<String>,
}

pub fn template_path(dir: &Path, template_id: &str) -> PathBuf {
    dir.join(format!("{template_id}.{TEMPLATE_FILE_EXTENSION}"))
}

pub fn customizations_path(custom_dir: &Path) -> PathBuf {
    custom_dir.join(CUSTOMIZATIONS_FILE_NAME)
}

fn is_template_file(path: &Path) -> bool {
    if path.file_name().and_then(|name| name.to_str()) == Some(CUSTOMIZATIONS_FILE_NAME) {
        return false;
    }
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

pub fn read_template_file(path: &Path) -> Result<Template, TemplateError> {
    let raw = fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        return serde_json::from_str(&raw).map_err(|source| TemplateError::ParseJson {
            path: path.display().to_string(),
            source,
        });
    }
    serde_yaml::from_str(&raw).map_err(|source| TemplateError::ParseYaml {
        path: path.display().to_string(),
        source,
    })
}

/// Reads every template record in `dir`, in file-name order. A missing
/// directory yields nothing; an unreadable one yields a warning.
pub fn read_template_dir(dir: &Path, category: TemplateCategory) -> DirectoryLoad {
    let mut load = DirectoryLoad::default();
    if !dir.exists() {
        return load;
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            load.warnings.push(format!(
                "{category} template directory {} is unreadable: {err}",
                dir.display()
            ));
            return load;
        }
    };

    let mut paths = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && is_template_file(path))
        .collect::<Vec<_>>();
    paths.sort();

    for path in paths {
        match read_template_file(&path) {
            Ok(mut template) => {
                template.category = category;
                load.templates.push(LoadedTemplate { path, template });
            }
            Err(err) => load.warnings.push(format!("skipped template file: {err}")),
        }
    }
    load
}

pub fn write_template_file(dir: &Path, template: &Template) -> Result<PathBuf, TemplateError> {
    let path = template_path(dir, &template.id);
    let body = serde_yaml::to_string(template).map_err(|source| TemplateError::EncodeYaml {
        path: path.display().to_string(),
        source,
    })?;
    atomic_write_file(&path, body.as_bytes()).map_err(|source| TemplateError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}

pub fn remove_template_file(path: &Path) -> Result<(), TemplateError> {
    remove_file_if_exists(path)
        .map(|_| ())
        .map_err(|source| TemplateError::Remove {
            path: path.display().to_string(),
            source,
        })
}

pub fn read_customizations(custom_dir: &Path) -> Result<Vec<TemplateCustomization>, TemplateError> {
    let path = customizations_path(custom_dir);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&raw).map_err(|source| TemplateError::ParseYaml {
        path: path.display().to_string(),
        source,
    })
}

pub fn write_customizations(
    custom_dir: &Path,
    customizations: &[TemplateCustomization],
) -> Result<PathBuf, TemplateError> {
    let path = customizations_path(custom_dir);
    let body =
        serde_yaml::to_string(customizations).map_err(|source| TemplateError::EncodeYaml {
            path: path.display().to_string(),
            source,
        })?;
    atomic_write_file(&path, body.as_bytes()).map_err(|source| TemplateError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}
