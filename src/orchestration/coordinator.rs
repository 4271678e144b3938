use crate::orchestration::compiler::{output_filename, WorkflowCompiler};
use crate::orchestration::customization::CustomizationMerger;
use crate::orchestration::dependency_resolver::{
    dependency_edges, dependents_of, execution_order, validate_dependencies,
};
use crate::orchestration::error::CoordinationError;
use crate::orchestration::report::{MultiWorkflowReport, WorkflowGenerationResult};
use crate::orchestration::request::{GenerationContext, MultiWorkflowRequest, WorkflowConfiguration};
use crate::orchestration::selector::TemplateSelector;
use crate::templates::model::{Template, TemplateFilter};
use crate::templates::store::TemplateStore;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub struct Coordinator<'a> {
    store: &'a TemplateStore,
}

impl<'a> Coordinator<'a> {
    pub fn new(store: &'a TemplateStore) -> Self {
        Self { store }
    }

    /// Generates every requested workflow. Malformed requests fail before
    /// anything is compiled; failures of a single workflow land in
    /// `errors` next to the successful results.
    pub fn generate_multi_workflow(
        &self,
        request: &MultiWorkflowRequest,
        context: &GenerationContext,
    ) -> Result<MultiWorkflowReport, CoordinationError> {
        let configs = index_workflows(&request.workflows)?;
        validate_dependencies(&request.dependencies)?;
        let order = execution_order(&request.workflows, &request.dependencies);
        info!(order = ?order, "execution order resolved");

        let mut warnings = Vec::new();
        let candidates = self.candidates(&request.template_ids, &mut warnings);
        let compiler = WorkflowCompiler::new(self.store);
        let mut results = Vec::new();
        let mut errors = Vec::new();
        // filename -> workflow token that produced it
        let mut claimed: BTreeMap<String, String> = BTreeMap::new();

        for token in &order {
            let Some(config) = configs.get(token.as_str()) else {
                continue;
            };
            for selection in TemplateSelector::selections(config, &candidates) {
                let Some(template_id) = selection.template_id else {
                    warnings.push(format!(
                        "{token}: no template available for workflow type `{}`",
                        selection.workflow_type
                    ));
                    continue;
                };
                let generated = self.generate_one(
                    &compiler,
                    token,
                    &template_id,
                    config,
                    request,
                    context,
                    &claimed,
                );
                match generated {
                    Ok(result) => {
                        info!(
                            workflow = %token,
                            template = %template_id,
                            filename = %result.filename,
                            warnings = result.warnings.len(),
                            "workflow generated"
                        );
                        claimed.insert(result.filename.clone(), token.clone());
                        results.push(result);
                    }
                    Err(err) => {
                        warn!(workflow = %token, template = %template_id, "workflow failed: {err}");
                        errors.push(format!("{token}: {err}"));
                    }
                }
            }
        }

        let edges = dependency_edges(&request.dependencies);
        for result in &mut results {
            result.shared_secrets = request.coordination.shared_secrets.clone();
            result.shared_variables = request.coordination.shared_variables.clone();
            result.depends_on = edges
                .get(result.workflow.as_str())
                .map(|deps| deps.iter().map(|dep| dep.to_string()).collect())
                .unwrap_or_default();
            result.dependents = dependents_of(&result.workflow, &request.dependencies);
        }

        Ok(MultiWorkflowReport {
            success: errors.is_empty(),
            results,
            errors,
            warnings,
            execution_order: order,
            dependencies: request.dependencies.clone(),
            shared_resources: request.coordination.shared_resources(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn generate_one(
        &self,
        compiler: &WorkflowCompiler<'_>,
        token: &str,
        template_id: &str,
        config: &WorkflowConfiguration,
        request: &MultiWorkflowRequest,
        context: &GenerationContext,
        claimed: &BTreeMap<String, String>,
    ) -> Result<WorkflowGenerationResult, CoordinationError> {
        let template = self.store.get(template_id)?;
        let filename = output_filename(template.workflow_type, &config.frameworks);
        if let Some(owner) = claimed.get(&filename) {
            return Err(CoordinationError::OutputCollision {
                filename,
                owner: owner.clone(),
            });
        }
        let mut result = compiler.compile(token, &template, config, &request.coordination, context)?;
        let customization = self.store.customization(template_id);
        CustomizationMerger::apply(&mut result, customization.as_ref());
        if result.customized {
            debug!(workflow = %token, template = %template_id, "customizations reapplied");
        }
        Ok(result)
    }

    fn candidates(&self, template_ids: &[String], warnings: &mut Vec<String>) -> Vec<Template> {
        if template_ids.is_empty() {
            return self.store.list(&TemplateFilter::default());
        }
        let mut candidates = Vec::new();
        for template_id in template_ids {
            match self.store.get(template_id) {
                Ok(template) => candidates.push(template),
                Err(err) => warnings.push(format!("requested template ignored: {err}")),
            }
        }
        candidates
    }
}

fn index_workflows(
    workflows: &[WorkflowConfiguration],
) -> Result<BTreeMap<&'static str, &WorkflowConfiguration>, CoordinationError> {
    let mut configs = BTreeMap::new();
    for (index, config) in workflows.iter().enumerate() {
        let Some(token) = config.identity_token() else {
            return Err(CoordinationError::EmptyWorkflowTypes { index });
        };
        if configs.insert(token, config).is_some() {
            return Err(CoordinationError::DuplicateWorkflow {
                workflow: token.to_string(),
            });
        }
    }
    Ok(configs)
}
