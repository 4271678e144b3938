use crate::templates::model::Template;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const BUNDLE_FORMAT_VERSION: &str = "1.0";

/// Export wire format. `checksums` maps template id to the SHA-256 hex
/// digest of its content.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBundle {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub templates: Vec<Template>,
    pub checksums: BTreeMap<String, String>,
}

/// Import side of the bundle. Records stay untyped until each one has been
/// checked for required fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemplateBundle {
    pub version: String,
    #[serde(default)]
    pub exported_at: Option<String>,
    #[serde(default)]
    pub templates: Vec<Value>,
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub exported: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}
