pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_request, load_settings};
pub use paths::{
    default_custom_templates_dir, default_global_config_path, global_state_root,
    DEFAULT_OUTPUT_DIR, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use settings::{LoggingSettings, Settings, TemplateSettings};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn explicit_settings_path_must_exist() {
        let temp = tempdir().expect("tempdir");
        let missing = temp.path().join("nope.yaml");
        let err = load_settings(Some(missing.as_path())).expect_err("missing file");
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn explicit_settings_path_is_parsed_and_validated() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "templates:\n  custom_dir: /srv/templates\n  include_default_templates: false\noutput_dir: out\n",
        )
        .expect("write config");

        let settings = load_settings(Some(path.as_path())).expect("load settings");
        assert_eq!(settings.templates.custom_dir, PathBuf::from("/srv/templates"));
        assert!(!settings.templates.include_default_templates);
        assert_eq!(settings.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn request_without_workflows_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("request.yaml");
        fs::write(&path, "workflows: []\n").expect("write request");
        let err = load_request(&path).expect_err("empty request");
        assert!(err.to_string().contains("`workflows` must be non-empty"));
    }
}
