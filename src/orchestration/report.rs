use crate::orchestration::request::WorkflowDependency;
use crate::templates::model::WorkflowType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One generated workflow file. Built by the compiler, then amended by the
/// customization merge and the coordinator before being returned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowGenerationResult {
    pub workflow: String,
    pub template_id: String,
    pub filename: String,
    pub content: String,
    pub workflow_type: WorkflowType,
    pub frameworks: Vec<String>,
    pub customized: bool,
    pub warnings: Vec<String>,
    pub shared_secrets: Vec<String>,
    pub shared_variables: BTreeMap<String, String>,
    pub depends_on: Vec<String>,
    pub dependents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MultiWorkflowReport {
    pub success: bool,
    pub results: Vec<WorkflowGenerationResult>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub execution_order: Vec<String>,
    pub dependencies: Vec<WorkflowDependency>,
    pub shared_resources: Vec<String>,
}

impl MultiWorkflowReport {
    pub fn result_for(&self, workflow: &str) -> Option<&WorkflowGenerationResult> {
        self.results.iter().find(|result| result.workflow == workflow)
    }
}
