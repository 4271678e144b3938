use crate::orchestration::request::WorkflowConfiguration;
use crate::templates::model::{Template, WorkflowType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub workflow_type: WorkflowType,
    pub template_id: Option<String>,
}

/// Picks one template per requested workflow type: the most used candidate
/// of that type, ties resolved by candidate order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSelector;

impl TemplateSelector {
    pub fn selections(config: &WorkflowConfiguration, candidates: &[Template]) -> Vec<Selection> {
        config
            .workflow_types
            .iter()
            .map(|workflow_type| Selection {
                workflow_type: *workflow_type,
                template_id: best_for_type(*workflow_type, candidates),
            })
            .collect()
    }

    pub fn select(config: &WorkflowConfiguration, candidates: &[Template]) -> Vec<String> {
        Self::selections(config, candidates)
            .into_iter()
            .filter_map(|selection| selection.template_id)
            .collect()
    }
}

fn best_for_type(workflow_type: WorkflowType, candidates: &[Template]) -> Option<String> {
    let mut matching = candidates
        .iter()
        .filter(|template| template.workflow_type == workflow_type)
        .collect::<Vec<_>>();
    matching.sort_by(|left, right| right.metadata.usage_count.cmp(&left.metadata.usage_count));
    matching.first().map(|template| template.id.clone())
}
