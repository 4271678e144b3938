use crate::app::command_support::{load_cli_settings, open_store, parse_args, to_pretty_json};
use crate::templates::persistence::read_template_file;
use crate::templates::{
    validate_template, TemplateCategory, TemplateFilter, ValidationMode, WorkflowType,
};
use std::path::{Path, PathBuf};

pub fn cmd_templates(args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err(
            "usage: templates <list|show|validate|delete|export|import> ...".to_string(),
        );
    }

    match args[0].as_str() {
        "list" => {
            let parsed = parse_args(&args[1..], &["--type", "--category"], &[])?;
            if !parsed.positional.is_empty() {
                return Err("usage: templates list [--type <t>] [--category <c>]".to_string());
            }
            let filter = TemplateFilter {
                workflow_type: parsed.value("--type").map(WorkflowType::parse).transpose()?,
                category: parsed
                    .value("--category")
                    .map(TemplateCategory::parse)
                    .transpose()?,
                ..TemplateFilter::default()
            };
            let settings = load_cli_settings(parsed.config_path())?;
            let (store, _) = open_store(&settings);
            Ok(store
                .list(&filter)
                .iter()
                .map(|t| format!("{}\t{}\t{}\t{}", t.id, t.category, t.workflow_type, t.name))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        "show" => {
            let parsed = parse_args(&args[1..], &[], &[])?;
            if parsed.positional.len() != 1 {
                return Err("usage: templates show <template_id>".to_string());
            }
            let settings = load_cli_settings(parsed.config_path())?;
            let (store, _) = open_store(&settings);
            let template = store
                .get(&parsed.positional[0])
                .map_err(|e| e.to_string())?;
            serde_yaml::to_string(&template).map_err(|e| format!("failed to encode template: {e}"))
        }
        "validate" => {
            let parsed = parse_args(&args[1..], &[], &["--import"])?;
            if parsed.positional.len() != 1 {
                return Err("usage: templates validate <file> [--import]".to_string());
            }
            let mode = if parsed.switch("--import") {
                ValidationMode::Import
            } else {
                ValidationMode::Authoring
            };
            validate_file(Path::new(&parsed.positional[0]), mode)
        }
        "delete" => {
            let parsed = parse_args(&args[1..], &[], &[])?;
            if parsed.positional.len() != 1 {
                return Err("usage: templates delete <template_id>".to_string());
            }
            let settings = load_cli_settings(parsed.config_path())?;
            let (store, _) = open_store(&settings);
            let template_id = &parsed.positional[0];
            store.delete(template_id).map_err(|e| e.to_string())?;
            Ok(format!("deleted template `{template_id}`"))
        }
        "export" => {
            let parsed = parse_args(&args[1..], &[], &[])?;
            if parsed.positional.len() < 2 {
                return Err("usage: templates export <destination> <template_id>...".to_string());
            }
            let settings = load_cli_settings(parsed.config_path())?;
            let (store, _) = open_store(&settings);
            let destination = PathBuf::from(&parsed.positional[0]);
            let report = store
                .export(&parsed.positional[1..], &destination)
                .map_err(|e| e.to_string())?;
            to_pretty_json(&report)
        }
        "import" => {
            let parsed = parse_args(&args[1..], &[], &[])?;
            if parsed.positional.len() != 1 {
                return Err("usage: templates import <bundle>".to_string());
            }
            let settings = load_cli_settings(parsed.config_path())?;
            let (store, _) = open_store(&settings);
            let report = store
                .import(Path::new(&parsed.positional[0]))
                .map_err(|e| e.to_string())?;
            to_pretty_json(&report)
        }
        other => Err(format!("unknown templates subcommand `{other}`")),
    }
}

fn validate_file(path: &Path, mode: ValidationMode) -> Result<String, String> {
    let template = read_template_file(path).map_err(|e| e.to_string())?;
    let report = validate_template(&template, mode);
    if !report.is_valid() {
        return Err(format!(
            "template `{}` is invalid:\n{}",
            template.id,
            report
                .errors
                .iter()
                .map(|error| format!("  error: {error}"))
                .collect::<Vec<_>>()
                .join("\n")
        ));
    }
    let mut lines = vec![format!("template `{}` is valid", template.id)];
    lines.extend(
        report
            .warnings
            .iter()
            .map(|warning| format!("  warning: {warning}")),
    );
    Ok(lines.join("\n"))
}
