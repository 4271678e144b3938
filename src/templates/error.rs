use crate::templates::model::TemplateCategory;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template `{template_id}` not found")]
    NotFound { template_id: String },
    #[error("template `{template_id}` is {category} and cannot be {action}")]
    Forbidden {
        template_id: String,
        category: TemplateCategory,
        action: &'static str,
    },
    #[error("template `{template_id}` already exists")]
    AlreadyExists { template_id: String },
    #[error("template `{template_id}` failed validation: {}", errors.join("; "))]
    ValidationFailed {
        template_id: String,
        errors: Vec<String>,
    },
    #[error("invalid template name: {0}")]
    InvalidName(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    ParseYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to encode yaml for {path}: {source}")]
    EncodeYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid json in {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode json for {path}: {source}")]
    EncodeJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TemplateError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
