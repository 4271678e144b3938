use chrono::{TimeZone, Utc};
use ciforge::config::TemplateSettings;
use ciforge::orchestration::{
    CoordinationError, CoordinationSettings, Coordinator, GenerationContext, MultiWorkflowRequest,
    WorkflowConfiguration, WorkflowDependency,
};
use ciforge::templates::{
    NewTemplate, TemplateCustomization, TemplateStore, WorkflowType,
};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

fn context() -> GenerationContext {
    GenerationContext::new(PathBuf::from("out"))
        .with_input_path(PathBuf::from("request.yaml"))
        .at(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("timestamp"))
}

fn ci_then_release() -> MultiWorkflowRequest {
    MultiWorkflowRequest {
        workflows: vec![
            WorkflowConfiguration::new(vec![WorkflowType::Release]),
            WorkflowConfiguration::new(vec![WorkflowType::Ci]).with_frameworks(&["node"]),
        ],
        dependencies: vec![
            WorkflowDependency::new("ci", &[]),
            WorkflowDependency::new("release", &["ci"]),
        ],
        coordination: CoordinationSettings {
            shared_secrets: vec!["NPM_TOKEN".to_string(), "GH_TOKEN".to_string()],
            shared_variables: BTreeMap::from([("registry".to_string(), "npm".to_string())]),
        },
        template_ids: Vec::new(),
    }
}

#[test]
fn ci_and_release_are_generated_in_dependency_order_with_shared_metadata() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (store, _) = TemplateStore::open(TemplateSettings::rooted_at(temp.path()));
    let request = ci_then_release();

    let report = Coordinator::new(&store)
        .generate_multi_workflow(&request, &context())
        .expect("generate");

    assert!(report.success);
    assert!(report.errors.is_empty());
    assert_eq!(report.execution_order, vec!["ci", "release"]);
    assert_eq!(report.shared_resources, vec!["GH_TOKEN", "NPM_TOKEN", "registry"]);
    assert_eq!(report.dependencies, request.dependencies);
    assert_eq!(report.results.len(), 2);

    let ci = report.result_for("ci").expect("ci result");
    let release = report.result_for("release").expect("release result");
    assert_eq!(ci.template_id, "node-ci");
    assert_eq!(ci.filename, "ci-node.yml");
    assert_eq!(release.template_id, "github-release");
    assert_eq!(release.filename, "release.yml");
    assert_eq!(ci.shared_secrets, release.shared_secrets);
    assert_eq!(ci.shared_variables, release.shared_variables);
    assert!(ci.depends_on.is_empty());
    assert_eq!(ci.dependents, vec!["release"]);
    assert_eq!(release.depends_on, vec!["ci"]);
    assert!(ci.warnings.is_empty(), "warnings: {:?}", ci.warnings);
    assert!(ci.content.starts_with(
        "# Generated by ciforge\n# Template: Node.js CI (node-ci)\n# Version: 1.0.0\n# Generated at: 2026-01-02T03:04:05Z\n\nname: CI\n"
    ));
    assert!(ci.content.contains("node-version: ${{ env.NODE_VERSION }}"));
    assert_eq!(store.get("node-ci").expect("node-ci").metadata.usage_count, 1);
}

#[test]
fn graph_errors_abort_before_anything_is_compiled() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (store, _) = TemplateStore::open(TemplateSettings::rooted_at(temp.path()));
    let coordinator = Coordinator::new(&store);

    let mut dangling = ci_then_release();
    dangling.dependencies = vec![WorkflowDependency::new("release", &["ci"])];
    let err = coordinator
        .generate_multi_workflow(&dangling, &context())
        .expect_err("dangling");
    assert!(matches!(err, CoordinationError::DanglingDependency { ref token, .. } if token == "ci"));

    let mut cyclic = ci_then_release();
    cyclic.dependencies = vec![
        WorkflowDependency::new("ci", &["release"]),
        WorkflowDependency::new("release", &["ci"]),
    ];
    let err = coordinator
        .generate_multi_workflow(&cyclic, &context())
        .expect_err("cycle");
    assert!(matches!(err, CoordinationError::CyclicDependency { .. }));

    let mut duplicate = ci_then_release();
    duplicate
        .workflows
        .push(WorkflowConfiguration::new(vec![WorkflowType::Ci]));
    let err = coordinator
        .generate_multi_workflow(&duplicate, &context())
        .expect_err("duplicate");
    assert!(matches!(err, CoordinationError::DuplicateWorkflow { ref workflow } if workflow == "ci"));

    let mut empty = ci_then_release();
    empty.workflows.push(WorkflowConfiguration::new(Vec::new()));
    let err = coordinator
        .generate_multi_workflow(&empty, &context())
        .expect_err("empty types");
    assert!(matches!(err, CoordinationError::EmptyWorkflowTypes { index: 2 }));

    for template_id in ["node-ci", "github-release"] {
        assert_eq!(store.get(template_id).expect("template").metadata.usage_count, 0);
    }
}

#[test]
fn unmatched_types_become_warnings_next_to_successful_results() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (store, _) = TemplateStore::open(TemplateSettings::rooted_at(temp.path()));
    let request = MultiWorkflowRequest {
        workflows: vec![WorkflowConfiguration::new(vec![
            WorkflowType::Ci,
            WorkflowType::Performance,
        ])],
        dependencies: Vec::new(),
        coordination: CoordinationSettings::default(),
        template_ids: vec!["rust-ci".to_string(), "missing".to_string()],
    };

    let report = Coordinator::new(&store)
        .generate_multi_workflow(&request, &context())
        .expect("generate");

    assert!(report.success);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].template_id, "rust-ci");
    assert_eq!(report.results[0].filename, "ci.yml");
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings[0].contains("`missing`"));
    assert!(report.warnings[1].starts_with("ci: no template available for workflow type `performance`"));
}

#[test]
fn saved_customizations_are_reapplied_on_regeneration() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (store, _) = TemplateStore::open(TemplateSettings::rooted_at(temp.path()));
    store
        .create(NewTemplate {
            name: "Cluster Deploy".to_string(),
            description: String::new(),
            workflow_type: WorkflowType::Cd,
            version: "1.0.0".to_string(),
            tags: BTreeSet::new(),
            frameworks: BTreeSet::new(),
            content: "name: Deploy\non: push\nenv: production\nother: 1\njobs:\n  deploy:\n    runs-on: ubuntu-latest\n".to_string(),
            variables: Vec::new(),
        })
        .expect("create");
    let mut customization =
        TemplateCustomization::new("cluster-deploy").preserve("env", json!("staging"));
    customization
        .customizations
        .insert("other".to_string(), json!(2));
    store.save_customization(customization).expect("save");

    let request = MultiWorkflowRequest {
        workflows: vec![WorkflowConfiguration::new(vec![WorkflowType::Cd])],
        dependencies: Vec::new(),
        coordination: CoordinationSettings::default(),
        template_ids: Vec::new(),
    };
    let report = Coordinator::new(&store)
        .generate_multi_workflow(&request, &context())
        .expect("generate");

    let cd = report.result_for("cd").expect("cd result");
    assert!(cd.customized);
    assert!(cd.content.contains("\nenv: \"staging\"\nother: 1\n"));
}

#[test]
fn colliding_output_files_fail_only_the_later_workflow() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (store, _) = TemplateStore::open(TemplateSettings::rooted_at(temp.path()));
    let request = MultiWorkflowRequest {
        workflows: vec![
            WorkflowConfiguration::new(vec![WorkflowType::Ci, WorkflowType::Security]),
            WorkflowConfiguration::new(vec![WorkflowType::Security]),
        ],
        dependencies: Vec::new(),
        coordination: CoordinationSettings {
            shared_secrets: vec!["SCAN_TOKEN".to_string()],
            shared_variables: BTreeMap::new(),
        },
        template_ids: Vec::new(),
    };

    let report = Coordinator::new(&store)
        .generate_multi_workflow(&request, &context())
        .expect("generate");

    assert!(!report.success);
    assert_eq!(
        report.errors,
        vec!["security: output file `security.yml` is already produced by workflow `ci`"]
    );
    let filenames = report
        .results
        .iter()
        .map(|result| (result.workflow.as_str(), result.filename.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(filenames, vec![("ci", "ci.yml"), ("ci", "security.yml")]);
    assert!(report
        .results
        .iter()
        .all(|result| result.shared_secrets == vec!["SCAN_TOKEN".to_string()]));
    assert_eq!(
        store
            .get("codeql-security")
            .expect("codeql-security")
            .metadata
            .usage_count,
        1
    );
}
