pub mod builtin;
pub mod bundle;
pub mod customization;
pub mod error;
pub mod model;
pub mod persistence;
pub mod store;
pub mod validation;

pub use bundle::{ExportReport, ImportReport, TemplateBundle, BUNDLE_FORMAT_VERSION};
pub use customization::TemplateCustomization;
pub use error::TemplateError;
pub use model::{
    extract_action_references, NewTemplate, Template, TemplateCategory, TemplateFilter,
    TemplateMetadata, TemplatePatch, VariableSpec, VariableType, WorkflowType,
};
pub use store::{LoadReport, TemplateStore};
pub use validation::{validate_template, ValidationMode, ValidationReport};
