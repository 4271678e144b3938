pub mod compiler;
pub mod coordinator;
pub mod customization;
pub mod dependency_resolver;
pub mod error;
pub mod report;
pub mod request;
pub mod selector;

pub use compiler::{substitute_variables, WorkflowCompiler};
pub use coordinator::Coordinator;
pub use customization::CustomizationMerger;
pub use dependency_resolver::{execution_order, execution_waves, validate_dependencies};
pub use error::CoordinationError;
pub use report::{MultiWorkflowReport, WorkflowGenerationResult};
pub use request::{
    CoordinationSettings, GenerationContext, MultiWorkflowRequest, OptimizationLevel,
    SecurityLevel, WorkflowConfiguration, WorkflowDependency,
};
pub use selector::TemplateSelector;
