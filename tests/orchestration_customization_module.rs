use ciforge::orchestration::{CustomizationMerger, WorkflowGenerationResult};
use ciforge::templates::{TemplateCustomization, WorkflowType};
use serde_json::json;
use std::collections::BTreeMap;

fn result(content: &str) -> WorkflowGenerationResult {
    WorkflowGenerationResult {
        workflow: "cd".to_string(),
        template_id: "deploy".to_string(),
        filename: "cd.yml".to_string(),
        content: content.to_string(),
        workflow_type: WorkflowType::Cd,
        frameworks: Vec::new(),
        customized: false,
        warnings: Vec::new(),
        shared_secrets: Vec::new(),
        shared_variables: BTreeMap::new(),
        depends_on: Vec::new(),
        dependents: Vec::new(),
    }
}

#[test]
fn only_preserved_keys_are_reapplied() {
    let mut customization = TemplateCustomization::new("deploy").preserve("env", json!("staging"));
    customization
        .customizations
        .insert("other".to_string(), json!(2));

    let mut generated = result("env: production\nother: 1\n");
    CustomizationMerger::apply(&mut generated, Some(&customization));

    assert_eq!(generated.content, "env: \"staging\"\nother: 1\n");
    assert!(generated.customized);
    assert!(generated.warnings.is_empty());
}

#[test]
fn missing_customization_is_a_no_op() {
    let mut generated = result("env: production\n");
    CustomizationMerger::apply(&mut generated, None);
    assert_eq!(generated.content, "env: production\n");
    assert!(!generated.customized);

    let foreign = TemplateCustomization::new("other-template").preserve("env", json!("qa"));
    CustomizationMerger::apply(&mut generated, Some(&foreign));
    assert_eq!(generated.content, "env: production\n");
}

#[test]
fn missing_region_warns_and_other_keys_still_apply() {
    let customization = TemplateCustomization::new("deploy")
        .preserve("concurrency", json!({"group": "deploy"}))
        .preserve("env", json!({"REGION": "eu"}));
    let mut generated = result("# header\n\nenv:\n  REGION: us\n  TIER: web\n\njobs:\n  go: {}\n");

    CustomizationMerger::apply(&mut generated, Some(&customization));

    assert_eq!(
        generated.content,
        "# header\n\nenv: {\"REGION\":\"eu\"}\n\njobs:\n  go: {}\n"
    );
    assert!(generated.customized);
    assert_eq!(generated.warnings.len(), 1);
    assert!(generated.warnings[0].contains("`concurrency`"));
}

#[test]
fn preserved_key_without_value_is_ignored() {
    let mut customization = TemplateCustomization::new("deploy");
    customization.preserve_on_update.push("env".to_string());
    let mut generated = result("env: production\n");
    CustomizationMerger::apply(&mut generated, Some(&customization));
    assert_eq!(generated.content, "env: production\n");
    assert!(!generated.customized);
    assert!(generated.warnings.is_empty());
}
