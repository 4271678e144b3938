use crate::templates::model::WorkflowType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Basic,
    #[default]
    Standard,
    Strict,
}

impl SecurityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationLevel {
    Basic,
    #[default]
    Standard,
    Aggressive,
}

impl OptimizationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Aggressive => "aggressive",
        }
    }
}

/// One requested workflow. The first entry of `workflow_types` doubles as
/// the workflow's identity token in dependency declarations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowConfiguration {
    pub workflow_types: Vec<WorkflowType>,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub deployment_targets: Vec<String>,
    #[serde(default)]
    pub security_level: SecurityLevel,
    #[serde(default)]
    pub optimization_level: OptimizationLevel,
    #[serde(default = "default_true")]
    pub include_comments: bool,
    #[serde(default)]
    pub custom_steps: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl WorkflowConfiguration {
    pub fn new(workflow_types: Vec<WorkflowType>) -> Self {
        Self {
            workflow_types,
            frameworks: Vec::new(),
            deployment_targets: Vec::new(),
            security_level: SecurityLevel::default(),
            optimization_level: OptimizationLevel::default(),
            include_comments: true,
            custom_steps: Vec::new(),
        }
    }

    pub fn with_frameworks(mut self, frameworks: &[&str]) -> Self {
        self.frameworks = frameworks.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn identity_token(&self) -> Option<&'static str> {
        self.workflow_types.first().map(|kind| kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowDependency {
    pub workflow: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub timeout_minutes: Option<u32>,
}

impl WorkflowDependency {
    pub fn new(workflow: &str, depends_on: &[&str]) -> Self {
        Self {
            workflow: workflow.to_string(),
            depends_on: depends_on.iter().map(|token| token.to_string()).collect(),
            condition: None,
            timeout_minutes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct CoordinationSettings {
    #[serde(default)]
    pub shared_secrets: Vec<String>,
    #[serde(default)]
    pub shared_variables: BTreeMap<String, String>,
}

impl CoordinationSettings {
    /// Shared secret names and shared variable keys, sorted and deduplicated.
    pub fn shared_resources(&self) -> Vec<String> {
        let mut resources = self
            .shared_secrets
            .iter()
            .chain(self.shared_variables.keys())
            .cloned()
            .collect::<Vec<_>>();
        resources.sort();
        resources.dedup();
        resources
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MultiWorkflowRequest {
    pub workflows: Vec<WorkflowConfiguration>,
    #[serde(default)]
    pub dependencies: Vec<WorkflowDependency>,
    #[serde(default)]
    pub coordination: CoordinationSettings,
    /// Restricts selection to these templates; empty means the whole catalog.
    #[serde(default)]
    pub template_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub input_path: Option<PathBuf>,
    pub output_directory: PathBuf,
    pub generated_at: DateTime<Utc>,
}

impl GenerationContext {
    pub fn new(output_directory: PathBuf) -> Self {
        Self {
            input_path: None,
            output_directory,
            generated_at: Utc::now(),
        }
    }

    pub fn with_input_path(mut self, input_path: PathBuf) -> Self {
        self.input_path = Some(input_path);
        self
    }

    pub fn at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}
