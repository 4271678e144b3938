use crate::app::command_support::{load_cli_settings, open_store, parse_args, to_pretty_json};
use crate::config::load_request;
use crate::orchestration::{Coordinator, GenerationContext, MultiWorkflowReport};
use crate::shared::fs_atomic::atomic_write_file;
use std::path::{Path, PathBuf};
use tracing::info;

const USAGE: &str = "usage: generate <request.yaml> [--output <dir>] [--dry-run] [--config <path>]";

pub fn cmd_generate(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &["--output"], &["--dry-run"])?;
    if parsed.positional.len() != 1 {
        return Err(USAGE.to_string());
    }
    let request_path = PathBuf::from(&parsed.positional[0]);
    let settings = load_cli_settings(parsed.config_path())?;
    let request = load_request(&request_path).map_err(|e| e.to_string())?;
    let output_dir = parsed
        .value("--output")
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.output_dir.clone());

    let (store, _) = open_store(&settings);
    let context = GenerationContext::new(output_dir.clone()).with_input_path(request_path);
    let report = Coordinator::new(&store)
        .generate_multi_workflow(&request, &context)
        .map_err(|e| e.to_string())?;

    if !parsed.switch("--dry-run") {
        write_results(&report, &output_dir)?;
    }

    let rendered = to_pretty_json(&report)?;
    if report.success {
        Ok(rendered)
    } else {
        Err(rendered)
    }
}

pub fn write_results(report: &MultiWorkflowReport, output_dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut written = Vec::new();
    for result in &report.results {
        let path = output_dir.join(&result.filename);
        atomic_write_file(&path, result.content.as_bytes())
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        info!(path = %path.display(), workflow = %result.workflow, "workflow file written");
        written.push(path);
    }
    Ok(written)
}
