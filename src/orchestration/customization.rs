use crate::orchestration::report::WorkflowGenerationResult;
use crate::templates::customization::TemplateCustomization;
use serde_json::Value;

/// Reapplies preserved customizations to freshly compiled content.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomizationMerger;

impl CustomizationMerger {
    pub fn apply(result: &mut WorkflowGenerationResult, customization: Option<&TemplateCustomization>) {
        let Some(customization) = customization else {
            return;
        };
        if customization.template_id != result.template_id {
            return;
        }

        for (key, value) in customization.preserved_entries() {
            let Some(value) = value else {
                continue;
            };
            match replace_top_level_key(&result.content, key, value) {
                Ok(content) => {
                    result.content = content;
                    result.customized = true;
                }
                Err(reason) => result
                    .warnings
                    .push(format!("customization `{key}` not applied: {reason}")),
            }
        }
    }
}

/// A column-0 `name:` mapping line. Anything else belongs to the key above.
fn starts_top_level_key(line: &str) -> bool {
    !line.trim().is_empty()
        && !line.starts_with([' ', '\t', '-', '#'])
        && line.contains(':')
}

fn is_detached_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Rewrites the region owned by top-level `key:` as `key: <json>`. The region
/// runs from the key line up to the next top-level key; blank lines and
/// column-0 comments after its last content line stay in place.
pub fn replace_top_level_key(content: &str, key: &str, value: &Value) -> Result<String, String> {
    let rendered =
        serde_json::to_string(value).map_err(|err| format!("failed to encode value: {err}"))?;
    let prefix = format!("{key}:");
    let lines = content.split_inclusive('\n').collect::<Vec<_>>();

    let start = lines
        .iter()
        .position(|line| line.starts_with(&prefix))
        .ok_or_else(|| format!("top-level key `{key}` not found"))?;
    let mut end = start + 1;
    let mut scan = start + 1;
    while scan < lines.len() && !starts_top_level_key(lines[scan]) {
        if !lines[scan].trim().is_empty() && !is_detached_comment(lines[scan]) {
            end = scan + 1;
        }
        scan += 1;
    }

    let newline = if lines[end - 1].ends_with('\n') { "\n" } else { "" };
    let mut merged = String::with_capacity(content.len());
    for line in &lines[..start] {
        merged.push_str(line);
    }
    merged.push_str(&format!("{prefix} {rendered}{newline}"));
    for line in &lines[end..] {
        merged.push_str(line);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_region_is_replaced_and_trailing_blank_kept() {
        let content = "env:\n  A: 1\n  B: 2\n\njobs:\n  build: {}\n";
        let merged = replace_top_level_key(content, "env", &json!({"A": 3})).expect("merge");
        assert_eq!(merged, "env: {\"A\":3}\n\njobs:\n  build: {}\n");
    }

    #[test]
    fn column_zero_sequence_items_belong_to_their_key() {
        let content = "branches:\n- main\n# release lines\n- dev\n\n# jobs\njobs:\n  a: {}\n";
        let merged =
            replace_top_level_key(content, "branches", &json!(["release"])).expect("merge");
        assert_eq!(merged, "branches: [\"release\"]\n\n# jobs\njobs:\n  a: {}\n");
        let parsed: serde_yaml::Value = serde_yaml::from_str(&merged).expect("valid yaml");
        assert_eq!(parsed["branches"][0].as_str(), Some("release"));
    }

    #[test]
    fn key_prefix_does_not_match_longer_keys() {
        let content = "environment: prod\n";
        let err = replace_top_level_key(content, "env", &json!("x")).expect_err("missing");
        assert!(err.contains("`env` not found"));
    }

    #[test]
    fn last_line_without_newline_is_handled() {
        let merged = replace_top_level_key("a: 1\nenv: prod", "env", &json!("dev")).expect("merge");
        assert_eq!(merged, "a: 1\nenv: \"dev\"");
    }
}
