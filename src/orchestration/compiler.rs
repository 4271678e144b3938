use crate::orchestration::report::WorkflowGenerationResult;
use crate::orchestration::request::{CoordinationSettings, GenerationContext, WorkflowConfiguration};
use crate::shared::ids::slugify;
use crate::templates::error::TemplateError;
use crate::templates::model::{Template, WorkflowType};
use crate::templates::store::TemplateStore;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

pub const GENERATOR_NAME: &str = "ciforge";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub rendered: String,
    /// Placeholder names left verbatim, first occurrence order.
    pub unresolved: Vec<String>,
}

/// Replaces `{{name}}` placeholders that have a value. Unknown names, an
/// unterminated `{{` and `${{ ... }}` host expressions pass through as-is.
pub fn substitute_variables(content: &str, variables: &BTreeMap<String, String>) -> Substitution {
    let mut rendered = String::with_capacity(content.len());
    let mut unresolved: Vec<String> = Vec::new();
    let mut cursor = content;

    while let Some(start) = cursor.find("{{") {
        let before = &cursor[..start];
        rendered.push_str(before);
        let after_open = &cursor[start + 2..];
        let Some(close_offset) = after_open.find("}}") else {
            rendered.push_str(&cursor[start..]);
            cursor = "";
            break;
        };
        let raw = &cursor[start..start + 2 + close_offset + 2];
        cursor = &after_open[close_offset + 2..];

        if before.ends_with('$') {
            rendered.push_str(raw);
            continue;
        }
        let token = after_open[..close_offset].trim();
        match variables.get(token) {
            Some(value) => rendered.push_str(value),
            None => {
                rendered.push_str(raw);
                if !token.is_empty() && !unresolved.iter().any(|name| name == token) {
                    unresolved.push(token.to_string());
                }
            }
        }
    }

    rendered.push_str(cursor);
    Substitution {
        rendered,
        unresolved,
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Variable set for one compile, lowest precedence first: template defaults,
/// shared coordination variables, workflow-derived values, context values.
pub fn build_variables(
    template: &Template,
    config: &WorkflowConfiguration,
    coordination: &CoordinationSettings,
    context: &GenerationContext,
) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    for variable in &template.variables {
        if let Some(default) = &variable.default {
            variables.insert(variable.name.clone(), default.clone());
        }
    }
    variables.extend(coordination.shared_variables.clone());

    let derived = [
        ("workflow_type", template.workflow_type.as_str().to_string()),
        ("frameworks", config.frameworks.join(", ")),
        ("deployment_targets", config.deployment_targets.join(", ")),
        ("security_level", config.security_level.as_str().to_string()),
        (
            "optimization_level",
            config.optimization_level.as_str().to_string(),
        ),
        ("include_comments", config.include_comments.to_string()),
        ("custom_steps", config.custom_steps.join("\n")),
    ];
    for (key, value) in derived {
        variables.insert(key.to_string(), value);
    }

    if let Some(input_path) = &context.input_path {
        variables.insert("input_path".to_string(), input_path.display().to_string());
    }
    variables.insert(
        "output_directory".to_string(),
        context.output_directory.display().to_string(),
    );
    variables.insert("template_id".to_string(), template.id.clone());
    variables.insert("generated_at".to_string(), timestamp(&context.generated_at));
    variables
}

pub fn render_header(template: &Template, generated_at: &DateTime<Utc>) -> String {
    format!(
        "# Generated by {GENERATOR_NAME}\n# Template: {} ({})\n# Version: {}\n# Generated at: {}\n\n",
        template.name,
        template.id,
        template.version,
        timestamp(generated_at)
    )
}

/// `<type>.yml`, or `<type>-<framework>-...yml` in configuration order.
pub fn output_filename(workflow_type: WorkflowType, frameworks: &[String]) -> String {
    let mut stem = workflow_type.as_str().to_string();
    for framework in frameworks {
        let slug = slugify(framework);
        if !slug.is_empty() {
            stem.push('-');
            stem.push_str(&slug);
        }
    }
    format!("{stem}.yml")
}

pub struct WorkflowCompiler<'a> {
    store: &'a TemplateStore,
}

impl<'a> WorkflowCompiler<'a> {
    pub fn new(store: &'a TemplateStore) -> Self {
        Self { store }
    }

    /// Renders `template` for the workflow identified by `workflow` and bumps
    /// the template's usage counter. Coordination metadata is left empty.
    pub fn compile(
        &self,
        workflow: &str,
        template: &Template,
        config: &WorkflowConfiguration,
        coordination: &CoordinationSettings,
        context: &GenerationContext,
    ) -> Result<WorkflowGenerationResult, TemplateError> {
        let variables = build_variables(template, config, coordination, context);
        let substitution = substitute_variables(&template.content, &variables);

        let mut warnings = substitution
            .unresolved
            .iter()
            .map(|name| format!("unresolved placeholder `{{{{{name}}}}}` left in output"))
            .collect::<Vec<_>>();
        for variable in &template.variables {
            if variable.required && !variables.contains_key(&variable.name) {
                warnings.push(format!("required variable `{}` has no value", variable.name));
            }
        }

        let mut content = render_header(template, &context.generated_at);
        content.push_str(&substitution.rendered);

        self.store.record_usage(&template.id)?;

        Ok(WorkflowGenerationResult {
            workflow: workflow.to_string(),
            template_id: template.id.clone(),
            filename: output_filename(template.workflow_type, &config.frameworks),
            content,
            workflow_type: template.workflow_type,
            frameworks: config.frameworks.clone(),
            customized: false,
            warnings,
            shared_secrets: Vec::new(),
            shared_variables: BTreeMap::new(),
            depends_on: Vec::new(),
            dependents: Vec::new(),
        })
    }
}
