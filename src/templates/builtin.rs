use crate::templates::model::{
    extract_action_references, Template, TemplateCategory, TemplateMetadata, VariableSpec,
    WorkflowType,
};
use std::collections::BTreeSet;

const NODE_CI: &str = r#"name: {{workflow_name}}
on:
  push:
    branches: [{{default_branch}}]
  pull_request:
    branches: [{{default_branch}}]
env:
  NODE_VERSION: "{{node_version}}"
jobs:
  build:
    runs-on: {{runner}}
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-node@v4
        with:
          node-version: ${{ env.NODE_VERSION }}
          cache: npm
      - run: npm ci
      - run: npm run lint --if-present
      - run: npm test
"#;

const RUST_CI: &str = r#"name: {{workflow_name}}
on:
  push:
    branches: [{{default_branch}}]
  pull_request:
env:
  CARGO_TERM_COLOR: always
jobs:
  test:
    runs-on: {{runner}}
    steps:
      - uses: actions/checkout@v4
      - uses: dtolnay/rust-toolchain@stable
        with:
          components: clippy, rustfmt
      - uses: Swatinem/rust-cache@v2
      - run: cargo fmt --all -- --check
      - run: cargo clippy --all-targets -- -D warnings
      - run: cargo test --all-features
"#;

const GITHUB_RELEASE: &str = r#"name: {{workflow_name}}
on:
  push:
    tags: ["{{tag_pattern}}"]
permissions:
  contents: write
jobs:
  release:
    runs-on: {{runner}}
    steps:
      - uses: actions/checkout@v4
        with:
          fetch-depth: 0
      - uses: softprops/action-gh-release@v2
        with:
          generate_release_notes: true
          draft: {{draft}}
"#;

const CODEQL_SECURITY: &str = r#"name: {{workflow_name}}
on:
  push:
    branches: [{{default_branch}}]
  schedule:
    - cron: "{{scan_schedule}}"
permissions:
  security-events: write
  contents: read
jobs:
  analyze:
    runs-on: {{runner}}
    steps:
      - uses: actions/checkout@v4
      - uses: github/codeql-action/init@v3
        with:
          languages: {{languages}}
      - uses: github/codeql-action/analyze@v3
"#;

const DEPENDENCY_MAINTENANCE: &str = r#"name: {{workflow_name}}
on:
  schedule:
    - cron: "{{maintenance_schedule}}"
  workflow_dispatch:
jobs:
  stale:
    runs-on: {{runner}}
    steps:
      - uses: actions/stale@v9
        with:
          days-before-stale: {{stale_days}}
          stale-issue-message: This issue has been marked stale.
"#;

struct BuiltinSpec {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    workflow_type: WorkflowType,
    frameworks: &'static [&'static str],
    tags: &'static [&'static str],
    content: &'static str,
    variables: Vec<VariableSpec>,
}

fn common_variables(workflow_name: &str) -> Vec<VariableSpec> {
    vec![
        VariableSpec::new("workflow_name", "Display name of the workflow").with_default(workflow_name),
        VariableSpec::new("runner", "Runner label for every job").with_default("ubuntu-latest"),
    ]
}

fn builtin_template(spec: BuiltinSpec) -> Template {
    Template {
        id: spec.id.to_string(),
        name: spec.name.to_string(),
        description: spec.description.to_string(),
        workflow_type: spec.workflow_type,
        category: TemplateCategory::BuiltIn,
        version: "1.0.0".to_string(),
        tags: spec.tags.iter().map(|tag| tag.to_string()).collect::<BTreeSet<_>>(),
        frameworks: spec
            .frameworks
            .iter()
            .map(|framework| framework.to_string())
            .collect::<BTreeSet<_>>(),
        content: spec.content.to_string(),
        variables: spec.variables,
        dependencies: extract_action_references(spec.content),
        metadata: TemplateMetadata::default(),
    }
}

/// Templates shipped with the binary, registered ahead of every on-disk
/// source unless `include_default_templates` is off.
pub fn default_templates() -> Vec<Template> {
    vec![
        builtin_template(BuiltinSpec {
            id: "node-ci",
            name: "Node.js CI",
            description: "Install, lint and test a Node.js project on every push",
            workflow_type: WorkflowType::Ci,
            frameworks: &["node"],
            tags: &["ci", "javascript", "test"],
            content: NODE_CI,
            variables: {
                let mut variables = common_variables("CI");
                variables.push(
                    VariableSpec::new("default_branch", "Branch that triggers the workflow")
                        .with_default("main"),
                );
                variables.push(
                    VariableSpec::new("node_version", "Node.js version to install")
                        .with_default("20"),
                );
                variables
            },
        }),
        builtin_template(BuiltinSpec {
            id: "rust-ci",
            name: "Rust CI",
            description: "Format check, clippy and tests for a Cargo project",
            workflow_type: WorkflowType::Ci,
            frameworks: &["rust"],
            tags: &["ci", "rust", "test"],
            content: RUST_CI,
            variables: {
                let mut variables = common_variables("CI");
                variables.push(
                    VariableSpec::new("default_branch", "Branch that triggers the workflow")
                        .with_default("main"),
                );
                variables
            },
        }),
        builtin_template(BuiltinSpec {
            id: "github-release",
            name: "GitHub Release",
            description: "Publish a GitHub release with generated notes for version tags",
            workflow_type: WorkflowType::Release,
            frameworks: &[],
            tags: &["release", "tags"],
            content: GITHUB_RELEASE,
            variables: {
                let mut variables = common_variables("Release");
                variables.push(
                    VariableSpec::new("tag_pattern", "Tag glob that triggers a release")
                        .with_default("v*"),
                );
                variables.push(
                    VariableSpec::new("draft", "Create the release as a draft").with_default("false"),
                );
                variables
            },
        }),
        builtin_template(BuiltinSpec {
            id: "codeql-security",
            name: "CodeQL Security Scan",
            description: "Static analysis with CodeQL on push and on a schedule",
            workflow_type: WorkflowType::Security,
            frameworks: &[],
            tags: &["security", "codeql", "scan"],
            content: CODEQL_SECURITY,
            variables: {
                let mut variables = common_variables("Security");
                variables.push(
                    VariableSpec::new("default_branch", "Branch that triggers the workflow")
                        .with_default("main"),
                );
                variables.push(
                    VariableSpec::new("scan_schedule", "Cron expression for scheduled scans")
                        .with_default("0 3 * * 1"),
                );
                variables.push(
                    VariableSpec::new("languages", "CodeQL languages to analyze").required(),
                );
                variables
            },
        }),
        builtin_template(BuiltinSpec {
            id: "dependency-maintenance",
            name: "Stale Issue Maintenance",
            description: "Mark inactive issues and pull requests as stale",
            workflow_type: WorkflowType::Maintenance,
            frameworks: &[],
            tags: &["maintenance", "housekeeping"],
            content: DEPENDENCY_MAINTENANCE,
            variables: {
                let mut variables = common_variables("Maintenance");
                variables.push(
                    VariableSpec::new("maintenance_schedule", "Cron expression for the sweep")
                        .with_default("30 1 * * *"),
                );
                variables.push(
                    VariableSpec::new("stale_days", "Days of inactivity before marking stale")
                        .with_default("60"),
                );
                variables
            },
        }),
    ]
}
