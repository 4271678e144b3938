use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Ci,
    Cd,
    Release,
    Security,
    Performance,
    Maintenance,
}

impl WorkflowType {
    pub const ALL: [WorkflowType; 6] = [
        WorkflowType::Ci,
        WorkflowType::Cd,
        WorkflowType::Release,
        WorkflowType::Security,
        WorkflowType::Performance,
        WorkflowType::Maintenance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ci => "ci",
            Self::Cd => "cd",
            Self::Release => "release",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ci" => Ok(Self::Ci),
            "cd" => Ok(Self::Cd),
            "release" => Ok(Self::Release),
            "security" => Ok(Self::Security),
            "performance" => Ok(Self::Performance),
            "maintenance" => Ok(Self::Maintenance),
            _ => Err(
                "workflow type must be one of: ci, cd, release, security, performance, maintenance"
                    .to_string(),
            ),
        }
    }
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a template came from. Mutability and save location are decided by
/// the category alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum TemplateCategory {
    #[serde(rename = "built-in")]
    BuiltIn,
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "organization")]
    Organization,
}

impl TemplateCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuiltIn => "built-in",
            Self::Custom => "custom",
            Self::Organization => "organization",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "built-in" | "builtin" => Ok(Self::BuiltIn),
            "custom" => Ok(Self::Custom),
            "organization" => Ok(Self::Organization),
            _ => Err("template category must be one of: built-in, custom, organization".to_string()),
        }
    }

    /// Listing order: built-in first, then organization, then custom.
    pub fn rank(self) -> u8 {
        match self {
            Self::BuiltIn => 0,
            Self::Organization => 1,
            Self::Custom => 2,
        }
    }

    pub fn is_read_only(self) -> bool {
        match self {
            Self::BuiltIn | Self::Organization => true,
            Self::Custom => false,
        }
    }
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VariableSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub value_type: VariableType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub validation: Option<String>,
}

impl VariableSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            value_type: VariableType::String,
            required: false,
            default: None,
            validation: None,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub compatibility: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    pub category: TemplateCategory,
    #[serde(default = "default_template_version")]
    pub version: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub frameworks: BTreeSet<String>,
    pub content: String,
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default)]
    pub metadata: TemplateMetadata,
}

pub fn default_template_version() -> String {
    "1.0.0".to_string()
}

/// Fields accepted when authoring a new custom template. The id, category,
/// dependencies and metadata are derived.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    #[serde(default = "default_template_version")]
    pub version: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub frameworks: BTreeSet<String>,
    pub content: String,
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TemplatePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub workflow_type: Option<WorkflowType>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub frameworks: Option<BTreeSet<String>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub variables: Option<Vec<VariableSpec>>,
}

impl Template {
    pub fn apply_patch(&mut self, patch: TemplatePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(workflow_type) = patch.workflow_type {
            self.workflow_type = workflow_type;
        }
        if let Some(version) = patch.version {
            self.version = version;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(frameworks) = patch.frameworks {
            self.frameworks = frameworks;
        }
        if let Some(content) = patch.content {
            self.dependencies = extract_action_references(&content);
            self.content = content;
        }
        if let Some(variables) = patch.variables {
            self.variables = variables;
        }
    }
}

/// Collects `uses:` references (`actions/checkout@v4`, docker images, local
/// actions) from a workflow body.
pub fn extract_action_references(content: &str) -> BTreeSet<String> {
    let mut references = BTreeSet::new();
    for line in content.lines() {
        let trimmed = line.trim_start();
        let trimmed = trimmed.strip_prefix("- ").unwrap_or(trimmed).trim_start();
        let Some(rest) = trimmed.strip_prefix("uses:") else {
            continue;
        };
        let reference = rest
            .split('#')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|ch| ch == '"' || ch == '\'');
        if !reference.is_empty() {
            references.insert(reference.to_string());
        }
    }
    references
}

/// Filter for `TemplateStore::list`. List fields match on intersection;
/// empty lists and `None` impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub workflow_type: Option<WorkflowType>,
    pub category: Option<TemplateCategory>,
    pub frameworks: Vec<String>,
    pub tags: Vec<String>,
}

impl TemplateFilter {
    pub fn by_type(workflow_type: WorkflowType) -> Self {
        Self {
            workflow_type: Some(workflow_type),
            ..Self::default()
        }
    }

    pub fn matches(&self, template: &Template) -> bool {
        if let Some(workflow_type) = self.workflow_type {
            if template.workflow_type != workflow_type {
                return false;
            }
        }
        if let Some(category) = self.category {
            if template.category != category {
                return false;
            }
        }
        if !self.frameworks.is_empty()
            && !self
                .frameworks
                .iter()
                .any(|framework| template.frameworks.contains(framework))
        {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| template.tags.contains(tag)) {
            return false;
        }
        true
    }
}
