use chrono::{TimeZone, Utc};
use ciforge::config::TemplateSettings;
use ciforge::orchestration::compiler::{build_variables, substitute_variables};
use ciforge::orchestration::{
    CoordinationSettings, GenerationContext, SecurityLevel, WorkflowCompiler,
    WorkflowConfiguration,
};
use ciforge::templates::{
    Template, TemplateCategory, TemplateMetadata, TemplateStore, VariableSpec, WorkflowType,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

fn template(content: &str, variables: Vec<VariableSpec>) -> Template {
    Template {
        id: "web-ci".to_string(),
        name: "Web CI".to_string(),
        description: String::new(),
        workflow_type: WorkflowType::Ci,
        category: TemplateCategory::Custom,
        version: "3.2.1".to_string(),
        tags: BTreeSet::new(),
        frameworks: BTreeSet::new(),
        content: content.to_string(),
        variables,
        dependencies: BTreeSet::new(),
        metadata: TemplateMetadata::default(),
    }
}

fn context() -> GenerationContext {
    GenerationContext::new(PathBuf::from(".github/workflows"))
        .at(Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).single().expect("timestamp"))
}

#[test]
fn unmatched_placeholders_are_left_verbatim() {
    let variables = BTreeMap::from([("a".to_string(), "x".to_string())]);
    let substitution = substitute_variables("{{a}}-{{b}}", &variables);
    assert_eq!(substitution.rendered, "x-{{b}}");
    assert_eq!(substitution.unresolved, vec!["b"]);

    let spaced = substitute_variables("{{  a }}", &variables);
    assert_eq!(spaced.rendered, "x");
}

#[test]
fn variable_precedence_runs_from_defaults_to_context() {
    let template = template(
        "jobs: {}\n",
        vec![
            VariableSpec::new("registry", "").with_default("default-registry"),
            VariableSpec::new("security_level", "").with_default("none"),
            VariableSpec::new("region", "").with_default("eu-west-1"),
        ],
    );
    let mut config = WorkflowConfiguration::new(vec![WorkflowType::Ci]);
    config.security_level = SecurityLevel::Strict;
    let coordination = CoordinationSettings {
        shared_secrets: Vec::new(),
        shared_variables: BTreeMap::from([
            ("registry".to_string(), "shared-registry".to_string()),
            ("security_level".to_string(), "shared".to_string()),
            ("template_id".to_string(), "shared".to_string()),
        ]),
    };

    let variables = build_variables(&template, &config, &coordination, &context());
    assert_eq!(variables["region"], "eu-west-1");
    assert_eq!(variables["registry"], "shared-registry");
    assert_eq!(variables["security_level"], "strict");
    assert_eq!(variables["template_id"], "web-ci");
    assert_eq!(variables["generated_at"], "2026-03-04T05:06:07Z");
    assert!(!variables.contains_key("input_path"));
}

#[test]
fn compile_prepends_header_names_file_and_counts_usage() {
    let body = "name: {{title}}\non: push\njobs:\n  build:\n    runs-on: {{runner}}\n    steps:\n      - run: echo ${{ github.sha }} {{frameworks}}\n";
    let template = template(
        body,
        vec![
            VariableSpec::new("title", "").with_default("Web"),
            VariableSpec::new("token", "").required(),
        ],
    );
    let store = TemplateStore::from_templates(
        TemplateSettings::rooted_at(&PathBuf::from("/nonexistent")),
        vec![template.clone()],
    );
    let config =
        WorkflowConfiguration::new(vec![WorkflowType::Ci]).with_frameworks(&["React", "Vite"]);

    let result = WorkflowCompiler::new(&store)
        .compile("ci", &template, &config, &CoordinationSettings::default(), &context())
        .expect("compile");

    assert_eq!(result.filename, "ci-react-vite.yml");
    assert_eq!(result.workflow, "ci");
    assert_eq!(
        result.content,
        "# Generated by ciforge\n# Template: Web CI (web-ci)\n# Version: 3.2.1\n# Generated at: 2026-03-04T05:06:07Z\n\nname: Web\non: push\njobs:\n  build:\n    runs-on: {{runner}}\n    steps:\n      - run: echo ${{ github.sha }} React, Vite\n"
    );
    assert_eq!(
        result.warnings,
        vec![
            "unresolved placeholder `{{runner}}` left in output".to_string(),
            "required variable `token` has no value".to_string(),
        ]
    );
    assert!(!result.customized);
    assert_eq!(store.get("web-ci").expect("template").metadata.usage_count, 1);
}
