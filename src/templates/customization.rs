use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Saved overrides for one template. Only keys listed in
/// `preserve_on_update` are reapplied when the template is regenerated.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateCustomization {
    pub template_id: String,
    #[serde(default)]
    pub customizations: BTreeMap<String, Value>,
    #[serde(default)]
    pub preserve_on_update: Vec<String>,
    pub last_modified: DateTime<Utc>,
}

impl TemplateCustomization {
    pub fn new(template_id: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            customizations: BTreeMap::new(),
            preserve_on_update: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// Sets `key` and marks it to survive regeneration.
    pub fn preserve(mut self, key: &str, value: Value) -> Self {
        self.customizations.insert(key.to_string(), value);
        if !self.preserve_on_update.iter().any(|existing| existing == key) {
            self.preserve_on_update.push(key.to_string());
        }
        self
    }

    pub fn preserved_entries(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.preserve_on_update
            .iter()
            .map(|key| (key.as_str(), self.customizations.get(key)))
    }
}
