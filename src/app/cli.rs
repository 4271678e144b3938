#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Generate,
    Templates,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "generate" => CliVerb::Generate,
        "templates" | "template" => CliVerb::Templates,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  generate <request.yaml> [--output <dir>] [--dry-run]".to_string(),
        "                                       Generate coordinated workflow files".to_string(),
        "  templates list [--type <t>] [--category <c>]".to_string(),
        "                                       List catalog templates".to_string(),
        "  templates show <id>                  Print a template as YAML".to_string(),
        "  templates validate <file>            Validate a template file".to_string(),
        "  templates delete <id>                Delete a custom template".to_string(),
        "  templates export <dest> <id>...      Export templates to a JSON bundle".to_string(),
        "  templates import <bundle>            Import a bundle as organization templates"
            .to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub fn option_help_lines() -> Vec<String> {
    vec![
        "Options:".to_string(),
        "  --config <path>                      Settings file (default ~/.ciforge/config.yaml)"
            .to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.extend(option_help_lines());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_and_aliases_parse() {
        assert_eq!(parse_cli_verb("generate"), CliVerb::Generate);
        assert_eq!(parse_cli_verb("template"), CliVerb::Templates);
        assert_eq!(parse_cli_verb("--help"), CliVerb::Help);
        assert_eq!(parse_cli_verb("deploy"), CliVerb::Unknown);
    }
}
