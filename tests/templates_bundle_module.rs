use ciforge::config::TemplateSettings;
use ciforge::shared::digest::content_checksum;
use ciforge::templates::persistence::template_path;
use ciforge::templates::{NewTemplate, TemplateCategory, TemplateStore, WorkflowType};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;

const NIGHTLY_BODY: &str = "name: Nightly\non:\n  schedule:\n    - cron: \"{{cron}}\"\njobs:\n  bench:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/checkout@v4\n";

fn nightly() -> NewTemplate {
    NewTemplate {
        name: "Nightly Bench".to_string(),
        description: String::new(),
        workflow_type: WorkflowType::Performance,
        version: "2.1.0".to_string(),
        tags: BTreeSet::new(),
        frameworks: BTreeSet::new(),
        content: NIGHTLY_BODY.to_string(),
        variables: Vec::new(),
    }
}

#[test]
fn export_rejects_built_in_and_unknown_ids_per_id() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (store, _) = TemplateStore::open(TemplateSettings::rooted_at(temp.path()));
    store.create(nightly()).expect("create");
    let destination = temp.path().join("bundles/out.json");

    let report = store
        .export(
            &[
                "node-ci".to_string(),
                "nightly-bench".to_string(),
                "ghost".to_string(),
            ],
            &destination,
        )
        .expect("export");
    assert_eq!(report.exported, vec!["nightly-bench"]);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].contains("built-in"));
    assert!(report.errors[1].contains("`ghost` not found"));

    let bundle: Value =
        serde_json::from_str(&fs::read_to_string(&destination).expect("read bundle"))
            .expect("bundle json");
    assert_eq!(bundle["version"], "1.0");
    assert!(bundle["exportedAt"].is_string());
    assert_eq!(bundle["templates"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        bundle["checksums"]["nightly-bench"],
        content_checksum(NIGHTLY_BODY).as_str()
    );
}

#[test]
fn import_registers_organization_templates_and_skips_existing_ids() {
    let source_root = tempfile::tempdir().expect("source");
    let (source, _) = TemplateStore::open(TemplateSettings::rooted_at(source_root.path()));
    source.create(nightly()).expect("create");
    let bundle = source_root.path().join("bundle.json");
    source
        .export(&["nightly-bench".to_string()], &bundle)
        .expect("export");

    let target_root = tempfile::tempdir().expect("target");
    let org_dir = target_root.path().join("org");
    let settings = TemplateSettings::rooted_at(target_root.path()).with_organization_dir(org_dir.clone());
    let (target, _) = TemplateStore::open(settings.clone());

    let report = target.import(&bundle).expect("import");
    assert_eq!(report.imported, vec!["nightly-bench"]);
    assert!(report.errors.is_empty());
    let imported = target.get("nightly-bench").expect("imported");
    assert_eq!(imported.category, TemplateCategory::Organization);
    assert_eq!(imported.version, "2.1.0");
    assert!(template_path(&org_dir, "nightly-bench").exists());

    let again = target.import(&bundle).expect("import again");
    assert!(again.imported.is_empty());
    assert_eq!(again.skipped, vec!["nightly-bench"]);

    let err = target.delete("nightly-bench").expect_err("organization is read-only");
    assert!(err.is_forbidden());

    let (reloaded, report) = TemplateStore::open(settings);
    assert_eq!(report.organization, 1);
    assert_eq!(
        reloaded.get("nightly-bench").expect("reloaded").category,
        TemplateCategory::Organization
    );
}

#[test]
fn import_reports_bad_records_without_aborting() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (store, _) = TemplateStore::open(TemplateSettings::rooted_at(temp.path()));
    let bundle = serde_json::json!({
        "version": "0.9",
        "exportedAt": "2026-01-01T00:00:00Z",
        "templates": [
            { "name": "No Id", "type": "ci", "category": "custom", "content": "jobs: {}" },
            {
                "id": "tampered",
                "name": "Tampered",
                "type": "ci",
                "category": "custom",
                "content": "name: T\non: push\njobs:\n  a:\n    runs-on: x\n"
            },
            {
                "id": "no-trigger",
                "name": "No Trigger",
                "type": "ci",
                "category": "custom",
                "content": "name: N\njobs:\n  a:\n    runs-on: x\n"
            },
            {
                "id": "good",
                "name": "Good",
                "type": "maintenance",
                "category": "custom",
                "content": "on: push\njobs:\n  a:\n    runs-on: x\n"
            }
        ],
        "checksums": { "tampered": "0000" }
    });
    let path = temp.path().join("bundle.json");
    fs::write(&path, bundle.to_string()).expect("write bundle");

    let report = store.import(&path).expect("import");
    assert_eq!(report.imported, vec!["good"]);
    assert_eq!(report.errors.len(), 3);
    assert!(report.errors[0].contains("missing required field `id`"));
    assert!(report.errors[1].contains("checksum mismatch"));
    assert!(report.errors[2].contains("`on`"));
    assert!(report.warnings.iter().any(|warning| warning.contains("0.9")));
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.contains("`good`") && warning.contains("`name`")));
}
