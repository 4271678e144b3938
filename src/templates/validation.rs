use crate::templates::model::Template;
use serde_json::Value;

const PLACEHOLDER_MASK: &str = "placeholder";
const REQUIRED_RECORD_FIELDS: [&str; 4] = ["id", "name", "content", "type"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Authoring,
    /// Authoring rules plus a mandatory trigger (`on`) section.
    Import,
}

/// Replaces every `{{...}}` span with a bare scalar so a template body can
/// be checked as YAML before its variables are known.
pub fn mask_placeholders(content: &str) -> String {
    let mut masked = String::with_capacity(content.len());
    let mut cursor = content;
    while let Some(start) = cursor.find("{{") {
        masked.push_str(&cursor[..start]);
        let after_open = &cursor[start + 2..];
        let Some(close_offset) = after_open.find("}}") else {
            masked.push_str(&cursor[start..]);
            return masked;
        };
        masked.push_str(PLACEHOLDER_MASK);
        cursor = &after_open[close_offset + 2..];
    }
    masked.push_str(cursor);
    masked
}

/// Checks for the fields a serialized template record must carry before it
/// is decoded. Used on import, where records come from outside the catalog.
pub fn missing_record_fields(record: &Value) -> Vec<String> {
    let Some(object) = record.as_object() else {
        return vec!["template record must be an object".to_string()];
    };
    REQUIRED_RECORD_FIELDS
        .iter()
        .filter(|field| match object.get(**field) {
            Some(Value::String(text)) => text.trim().is_empty(),
            Some(Value::Null) | None => true,
            Some(_) => false,
        })
        .map(|field| format!("missing required field `{field}`"))
        .collect()
}

pub fn validate_template(template: &Template, mode: ValidationMode) -> ValidationReport {
    let mut report = ValidationReport::default();

    if template.id.trim().is_empty() {
        report.error("missing required field `id`");
    }
    if template.name.trim().is_empty() {
        report.error("missing required field `name`");
    }
    if template.content.trim().is_empty() {
        report.error("missing required field `content`");
    } else {
        validate_content(&template.content, mode, &mut report);
    }

    for (index, variable) in template.variables.iter().enumerate() {
        if variable.name.trim().is_empty() {
            report.error(format!("variable #{} is missing `name`", index + 1));
            continue;
        }
        if variable.required && variable.default.is_none() {
            report.warning(format!(
                "required variable `{}` has no default value",
                variable.name
            ));
        }
    }

    report
}

fn validate_content(content: &str, mode: ValidationMode, report: &mut ValidationReport) {
    let masked = mask_placeholders(content);
    let document: serde_yaml::Value = match serde_yaml::from_str(&masked) {
        Ok(document) => document,
        Err(err) => {
            report.error(format!("content is not valid YAML: {err}"));
            return;
        }
    };
    if !document.is_mapping() {
        report.error("content must be a YAML mapping at the top level");
        return;
    }
    if document.get("jobs").is_none() {
        report.error("content must define a `jobs` section");
    }
    if document.get("name").is_none() {
        report.warning("content should define a workflow `name`");
    }
    if mode == ValidationMode::Import && document.get("on").is_none() {
        report.error("content must define a trigger (`on`) section");
    }
}
