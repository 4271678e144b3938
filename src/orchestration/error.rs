use crate::templates::error::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    #[error("workflow configuration #{index} has no workflow types")]
    EmptyWorkflowTypes { index: usize },
    #[error("workflow `{workflow}` is configured more than once")]
    DuplicateWorkflow { workflow: String },
    #[error("workflow `{workflow}` depends on undeclared workflow `{token}`")]
    DanglingDependency { token: String, workflow: String },
    #[error("cyclic dependency detected at workflow `{workflow}`")]
    CyclicDependency { workflow: String },
    #[error("output file `{filename}` is already produced by workflow `{owner}`")]
    OutputCollision { filename: String, owner: String },
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl CoordinationError {
    /// Errors that describe a malformed request rather than a runtime fault.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::DanglingDependency { .. } | Self::CyclicDependency { .. }
        )
    }
}
