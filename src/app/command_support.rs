use crate::config::{load_settings, ConfigError, Settings};
use crate::templates::{LoadReport, TemplateStore};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const CONFIG_FLAG: &str = "--config";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    pub values: BTreeMap<String, String>,
    pub switches: BTreeSet<String>,
}

impl ParsedArgs {
    pub fn value(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    pub fn switch(&self, flag: &str) -> bool {
        self.switches.contains(flag)
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.value(CONFIG_FLAG).map(Path::new)
    }
}

/// Splits `args` into positionals, `--flag <value>` pairs and bare switches.
/// `--config` is accepted everywhere.
pub fn parse_args(
    args: &[String],
    value_flags: &[&str],
    switch_flags: &[&str],
) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if !arg.starts_with("--") {
            parsed.positional.push(arg.clone());
            continue;
        }
        if arg == CONFIG_FLAG || value_flags.contains(&arg.as_str()) {
            let value = iter
                .next()
                .ok_or_else(|| format!("missing value for `{arg}`"))?;
            parsed.values.insert(arg.clone(), value.clone());
        } else if switch_flags.contains(&arg.as_str()) {
            parsed.switches.insert(arg.clone());
        } else {
            return Err(format!("unknown option `{arg}`"));
        }
    }
    Ok(parsed)
}

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn load_cli_settings(explicit: Option<&Path>) -> Result<Settings, String> {
    load_settings(explicit).map_err(map_config_err)
}

/// Log filter to install before running `args`. Falls back to the default
/// filter when settings cannot be read; the command reports that error.
pub fn logging_filter_for(args: &[String]) -> String {
    let explicit = args
        .iter()
        .position(|arg| arg == CONFIG_FLAG)
        .and_then(|index| args.get(index + 1))
        .map(PathBuf::from);
    load_settings(explicit.as_deref())
        .map(|settings| settings.logging.filter)
        .unwrap_or_else(|_| Settings::default().logging.filter)
}

pub fn open_store(settings: &Settings) -> (TemplateStore, LoadReport) {
    TemplateStore::open(settings.templates.clone())
}

pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode output: {e}"))
}
