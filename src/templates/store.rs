use crate::config::TemplateSettings;
use crate::shared::digest::content_checksum;
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::ids::{template_id_from_name, validate_identifier_value};
use crate::templates::builtin::default_templates;
use crate::templates::bundle::{
    ExportReport, ImportReport, RawTemplateBundle, TemplateBundle, BUNDLE_FORMAT_VERSION,
};
use crate::templates::customization::TemplateCustomization;
use crate::templates::error::TemplateError;
use crate::templates::model::{
    extract_action_references, NewTemplate, Template, TemplateCategory, TemplateFilter,
    TemplateMetadata, TemplatePatch,
};
use crate::templates::persistence::{
    read_customizations, read_template_dir, remove_template_file, template_path,
    write_customizations, write_template_file,
};
use crate::templates::validation::{
    missing_record_fields, validate_template, ValidationMode,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub builtin: usize,
    pub custom: usize,
    pub organization: usize,
    pub customizations: usize,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.builtin + self.custom + self.organization
    }
}

#[derive(Debug, Default)]
struct Catalog {
    templates: Vec<Template>,
    customizations: BTreeMap<String, TemplateCustomization>,
    /// Backing file of each template read from or written to disk.
    sources: BTreeMap<String, PathBuf>,
}

impl Catalog {
    fn position(&self, template_id: &str) -> Option<usize> {
        self.templates
            .iter()
            .position(|template| template.id == template_id)
    }

    fn contains(&self, template_id: &str) -> bool {
        self.position(template_id).is_some()
    }

    /// Registers `template` unless its id is taken; the first entry wins.
    fn insert_first_wins(&mut self, template: Template, warnings: &mut Vec<String>) -> bool {
        if let Err(err) = validate_identifier_value("template id", &template.id) {
            warnings.push(format!(
                "skipped {} template `{}`: {err}",
                template.category, template.id
            ));
            return false;
        }
        if let Some(index) = self.position(&template.id) {
            let kept = &self.templates[index];
            warnings.push(format!(
                "duplicate template id `{}` from {} source ignored; keeping {} entry",
                template.id, template.category, kept.category
            ));
            return false;
        }
        self.templates.push(template);
        true
    }
}

/// Template catalog shared by every generation call. Reads may run
/// concurrently; writes hold the lock across persistence.
#[derive(Debug)]
pub struct TemplateStore {
    settings: TemplateSettings,
    catalog: RwLock<Catalog>,
}

impl TemplateStore {
    pub fn new(settings: TemplateSettings) -> Self {
        Self {
            settings,
            catalog: RwLock::new(Catalog::default()),
        }
    }

    pub fn open(settings: TemplateSettings) -> (Self, LoadReport) {
        let store = Self::new(settings);
        let report = store.load();
        (store, report)
    }

    /// Builds a store from in-memory templates without touching disk.
    /// Duplicate ids keep the first entry.
    pub fn from_templates(settings: TemplateSettings, templates: Vec<Template>) -> Self {
        let mut catalog = Catalog::default();
        let mut warnings = Vec::new();
        for template in templates {
            catalog.insert_first_wins(template, &mut warnings);
        }
        for warning in &warnings {
            warn!("{warning}");
        }
        Self {
            settings,
            catalog: RwLock::new(catalog),
        }
    }

    pub fn settings(&self) -> &TemplateSettings {
        &self.settings
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(|err| err.into_inner())
    }

    pub fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();
        let mut catalog = Catalog::default();

        if self.settings.include_default_templates {
            for template in default_templates() {
                if catalog.insert_first_wins(template, &mut report.warnings) {
                    report.builtin += 1;
                }
            }
        }

        let mut sources = Vec::new();
        if let Some(dir) = &self.settings.builtin_dir {
            sources.push((dir.clone(), TemplateCategory::BuiltIn));
        }
        sources.push((self.settings.custom_dir.clone(), TemplateCategory::Custom));
        if let Some(dir) = &self.settings.organization_dir {
            sources.push((dir.clone(), TemplateCategory::Organization));
        }

        for (dir, category) in sources {
            let load = read_template_dir(&dir, category);
            report.warnings.extend(load.warnings);
            for loaded in load.templates {
                let template_id = loaded.template.id.clone();
                if catalog.insert_first_wins(loaded.template, &mut report.warnings) {
                    catalog.sources.insert(template_id, loaded.path);
                    match category {
                        TemplateCategory::BuiltIn => report.builtin += 1,
                        TemplateCategory::Custom => report.custom += 1,
                        TemplateCategory::Organization => report.organization += 1,
                    }
                }
            }
        }

        match read_customizations(&self.settings.custom_dir) {
            Ok(customizations) => {
                for customization in customizations {
                    catalog
                        .customizations
                        .insert(customization.template_id.clone(), customization);
                }
                report.customizations = catalog.customizations.len();
            }
            Err(err) => report
                .warnings
                .push(format!("customizations ignored: {err}")),
        }

        for warning in &report.warnings {
            warn!("{warning}");
        }
        info!(
            builtin = report.builtin,
            custom = report.custom,
            organization = report.organization,
            customizations = report.customizations,
            "template catalog loaded"
        );

        *self.write() = catalog;
        report
    }

    /// Matching templates in listing order: category rank, then usage
    /// (most used first), then name.
    pub fn list(&self, filter: &TemplateFilter) -> Vec<Template> {
        let mut templates = self
            .read()
            .templates
            .iter()
            .filter(|template| filter.matches(template))
            .cloned()
            .collect::<Vec<_>>();
        templates.sort_by(|left, right| {
            left.category
                .rank()
                .cmp(&right.category.rank())
                .then_with(|| right.metadata.usage_count.cmp(&left.metadata.usage_count))
                .then_with(|| left.name.cmp(&right.name))
                .then_with(|| left.id.cmp(&right.id))
        });
        templates
    }

    pub fn get(&self, template_id: &str) -> Result<Template, TemplateError> {
        let catalog = self.read();
        catalog
            .position(template_id)
            .map(|index| catalog.templates[index].clone())
            .ok_or_else(|| TemplateError::NotFound {
                template_id: template_id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.read().templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create(&self, fields: NewTemplate) -> Result<Template, TemplateError> {
        let id = template_id_from_name(&fields.name).map_err(TemplateError::InvalidName)?;
        let now = Utc::now();
        let template = Template {
            id,
            name: fields.name,
            description: fields.description,
            workflow_type: fields.workflow_type,
            category: TemplateCategory::Custom,
            version: fields.version,
            tags: fields.tags,
            frameworks: fields.frameworks,
            dependencies: extract_action_references(&fields.content),
            content: fields.content,
            variables: fields.variables,
            metadata: TemplateMetadata {
                created_at: Some(now),
                modified_at: Some(now),
                ..TemplateMetadata::default()
            },
        };
        ensure_valid(&template, ValidationMode::Authoring)?;

        let mut catalog = self.write();
        if catalog.contains(&template.id) {
            return Err(TemplateError::AlreadyExists {
                template_id: template.id,
            });
        }
        let path = write_template_file(&self.settings.custom_dir, &template)?;
        info!(template_id = %template.id, path = %path.display(), "custom template created");
        catalog.sources.insert(template.id.clone(), path);
        catalog.templates.push(template.clone());
        Ok(template)
    }

    pub fn update(&self, template_id: &str, patch: TemplatePatch) -> Result<Template, TemplateError> {
        let mut catalog = self.write();
        let index = catalog
            .position(template_id)
            .ok_or_else(|| TemplateError::NotFound {
                template_id: template_id.to_string(),
            })?;
        let existing = &catalog.templates[index];
        if existing.category.is_read_only() {
            return Err(TemplateError::Forbidden {
                template_id: template_id.to_string(),
                category: existing.category,
                action: "updated",
            });
        }

        let mut updated = existing.clone();
        updated.apply_patch(patch);
        updated.metadata.modified_at = Some(Utc::now());
        ensure_valid(&updated, ValidationMode::Authoring)?;

        let path = write_template_file(&self.settings.custom_dir, &updated)?;
        if let Some(previous) = catalog.sources.insert(template_id.to_string(), path.clone()) {
            if previous != path {
                remove_template_file(&previous)?;
                debug!(
                    template_id,
                    from = %previous.display(),
                    to = %path.display(),
                    "template file renamed"
                );
            }
        }
        catalog.templates[index] = updated.clone();
        info!(template_id, "custom template updated");
        Ok(updated)
    }

    pub fn delete(&self, template_id: &str) -> Result<(), TemplateError> {
        let mut catalog = self.write();
        let index = catalog
            .position(template_id)
            .ok_or_else(|| TemplateError::NotFound {
                template_id: template_id.to_string(),
            })?;
        let category = catalog.templates[index].category;
        if category.is_read_only() {
            return Err(TemplateError::Forbidden {
                template_id: template_id.to_string(),
                category,
                action: "deleted",
            });
        }

        let canonical = template_path(&self.settings.custom_dir, template_id);
        if let Some(source) = catalog.sources.get(template_id) {
            if *source != canonical {
                remove_template_file(source)?;
            }
        }
        remove_template_file(&canonical)?;
        if catalog.customizations.contains_key(template_id) {
            let remaining = catalog
                .customizations
                .values()
                .filter(|customization| customization.template_id != template_id)
                .cloned()
                .collect::<Vec<_>>();
            write_customizations(&self.settings.custom_dir, &remaining)?;
            catalog.customizations.remove(template_id);
        }
        catalog.templates.remove(index);
        catalog.sources.remove(template_id);
        info!(template_id, "custom template deleted");
        Ok(())
    }

    /// Bumps the in-memory usage counter and returns the new value.
    pub fn record_usage(&self, template_id: &str) -> Result<u64, TemplateError> {
        let mut catalog = self.write();
        let index = catalog
            .position(template_id)
            .ok_or_else(|| TemplateError::NotFound {
                template_id: template_id.to_string(),
            })?;
        let metadata = &mut catalog.templates[index].metadata;
        metadata.usage_count += 1;
        debug!(template_id, usage_count = metadata.usage_count, "template usage recorded");
        Ok(metadata.usage_count)
    }

    pub fn customization(&self, template_id: &str) -> Option<TemplateCustomization> {
        self.read().customizations.get(template_id).cloned()
    }

    pub fn save_customization(
        &self,
        mut customization: TemplateCustomization,
    ) -> Result<TemplateCustomization, TemplateError> {
        let mut catalog = self.write();
        if !catalog.contains(&customization.template_id) {
            return Err(TemplateError::NotFound {
                template_id: customization.template_id,
            });
        }
        customization.last_modified = Utc::now();

        let mut next = catalog.customizations.clone();
        next.insert(customization.template_id.clone(), customization.clone());
        write_customizations(
            &self.settings.custom_dir,
            &next.values().cloned().collect::<Vec<_>>(),
        )?;
        catalog.customizations = next;
        info!(template_id = %customization.template_id, "template customization saved");
        Ok(customization)
    }

    pub fn remove_customization(&self, template_id: &str) -> Result<bool, TemplateError> {
        let mut catalog = self.write();
        if !catalog.customizations.contains_key(template_id) {
            return Ok(false);
        }
        let remaining = catalog
            .customizations
            .values()
            .filter(|customization| customization.template_id != template_id)
            .cloned()
            .collect::<Vec<_>>();
        write_customizations(&self.settings.custom_dir, &remaining)?;
        catalog.customizations.remove(template_id);
        Ok(true)
    }

    /// Writes the requested non-built-in templates to a JSON bundle at
    /// `destination`. Unknown and built-in ids are reported per id.
    pub fn export(
        &self,
        template_ids: &[String],
        destination: &Path,
    ) -> Result<ExportReport, TemplateError> {
        let mut report = ExportReport {
            path: destination.to_path_buf(),
            ..ExportReport::default()
        };
        let mut templates = Vec::new();
        {
            let catalog = self.read();
            for template_id in template_ids {
                let Some(index) = catalog.position(template_id) else {
                    report
                        .errors
                        .push(format!("template `{template_id}` not found"));
                    continue;
                };
                let template = &catalog.templates[index];
                if template.category == TemplateCategory::BuiltIn {
                    report.errors.push(format!(
                        "template `{template_id}` is built-in and cannot be exported"
                    ));
                    continue;
                }
                templates.push(template.clone());
            }
        }

        let bundle = TemplateBundle {
            version: BUNDLE_FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            checksums: templates
                .iter()
                .map(|template| (template.id.clone(), content_checksum(&template.content)))
                .collect(),
            templates,
        };
        let body =
            serde_json::to_string_pretty(&bundle).map_err(|source| TemplateError::EncodeJson {
                path: destination.display().to_string(),
                source,
            })?;
        atomic_write_file(destination, body.as_bytes()).map_err(|source| TemplateError::Write {
            path: destination.display().to_string(),
            source,
        })?;

        report.exported = bundle.templates.into_iter().map(|template| template.id).collect();
        info!(
            path = %destination.display(),
            exported = report.exported.len(),
            rejected = report.errors.len(),
            "templates exported"
        );
        Ok(report)
    }

    /// Registers the templates of an exported bundle as `organization`
    /// templates. Existing ids are skipped, never overwritten.
    pub fn import(&self, source: &Path) -> Result<ImportReport, TemplateError> {
        let raw = fs::read_to_string(source).map_err(|err| TemplateError::Read {
            path: source.display().to_string(),
            source: err,
        })?;
        let bundle: RawTemplateBundle =
            serde_json::from_str(&raw).map_err(|err| TemplateError::ParseJson {
                path: source.display().to_string(),
                source: err,
            })?;

        let mut report = ImportReport::default();
        if bundle.version != BUNDLE_FORMAT_VERSION {
            report.warnings.push(format!(
                "bundle version `{}` differs from supported `{BUNDLE_FORMAT_VERSION}`",
                bundle.version
            ));
        }

        let mut accepted = Vec::new();
        for (position, record) in bundle.templates.into_iter().enumerate() {
            let label = record
                .get("id")
                .and_then(|id| id.as_str())
                .map(|id| format!("template `{id}`"))
                .unwrap_or_else(|| format!("template #{}", position + 1));

            let missing = missing_record_fields(&record);
            if !missing.is_empty() {
                report.errors.push(format!("{label}: {}", missing.join("; ")));
                continue;
            }
            let mut template: Template = match serde_json::from_value(record) {
                Ok(template) => template,
                Err(err) => {
                    report.errors.push(format!("{label}: {err}"));
                    continue;
                }
            };
            if let Some(expected) = bundle.checksums.get(&template.id) {
                if *expected != content_checksum(&template.content) {
                    report
                        .errors
                        .push(format!("{label}: content checksum mismatch"));
                    continue;
                }
            }
            template.category = TemplateCategory::Organization;
            let validation = validate_template(&template, ValidationMode::Import);
            if !validation.is_valid() {
                report
                    .errors
                    .push(format!("{label}: {}", validation.errors.join("; ")));
                continue;
            }
            report.warnings.extend(
                validation
                    .warnings
                    .into_iter()
                    .map(|warning| format!("{label}: {warning}")),
            );
            accepted.push(template);
        }

        let mut catalog = self.write();
        for template in accepted {
            if catalog.contains(&template.id) {
                report.skipped.push(template.id);
                continue;
            }
            if let Err(err) = validate_identifier_value("template id", &template.id) {
                report
                    .errors
                    .push(format!("template `{}`: {err}", template.id));
                continue;
            }
            if let Some(dir) = &self.settings.organization_dir {
                let path = write_template_file(dir, &template)?;
                catalog.sources.insert(template.id.clone(), path);
            }
            report.imported.push(template.id.clone());
            catalog.templates.push(template);
        }
        info!(
            path = %source.display(),
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            rejected = report.errors.len(),
            "template bundle imported"
        );
        Ok(report)
    }
}

fn ensure_valid(template: &Template, mode: ValidationMode) -> Result<(), TemplateError> {
    let report = validate_template(template, mode);
    if report.is_valid() {
        return Ok(());
    }
    Err(TemplateError::ValidationFailed {
        template_id: template.id.clone(),
        errors: report.errors,
    })
}
