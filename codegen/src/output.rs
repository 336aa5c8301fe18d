//! Writing generated files and formatting registries for display.

use std::path::{Path, PathBuf};

use model_query_core::{ModelDescriptor, Registry};
use tracing::{debug, info};

use crate::error::Result;
use crate::generate::GeneratedFile;

/// Outcome of [`write_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    /// Files whose contents already matched and were left untouched.
    pub unchanged: Vec<PathBuf>,
}

/// Writes `files` under `out_dir`, creating it if needed.
///
/// Files that already hold the same bytes are not rewritten, so their
/// modification times stay put and build scripts do not rerun.
pub fn write_files(out_dir: &Path, files: &[GeneratedFile]) -> Result<WriteReport> {
    std::fs::create_dir_all(out_dir)?;
    let mut report = WriteReport::default();
    for file in files {
        let path = out_dir.join(&file.path);
        let current = std::fs::read(&path).ok();
        if current.as_deref() == Some(file.contents.as_bytes()) {
            debug!(path = %path.display(), "unchanged");
            report.unchanged.push(path);
            continue;
        }
        std::fs::write(&path, &file.contents)?;
        debug!(path = %path.display(), "written");
        report.written.push(path);
    }
    info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        dir = %out_dir.display(),
        "wrote generated sources"
    );
    Ok(report)
}

/// Supported formats for `inspect`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Formats a registry in the requested output format.
pub fn format_registry(registry: &Registry, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(registry)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(registry)?),
        OutputFormat::Table => Ok(registry_to_table(registry)),
    }
}

fn registry_to_table(registry: &Registry) -> String {
    let mut out = String::new();
    for provider in registry.providers() {
        out.push_str(&format!("Provider: {}  Kind: {}", provider.name, provider.kind));
        if let Some(ref authority) = provider.authority {
            out.push_str(&format!("  Authority: {authority}"));
        }
        out.push('\n');
        for model in registry.models_for_provider(&provider.name) {
            model_to_table(&mut out, model);
        }
    }
    out
}

fn model_to_table(out: &mut String, model: &ModelDescriptor) {
    out.push_str(&format!("  {} -> {}\n", model.name, model.table_name));
    for field in &model.fields {
        let mut flags = Vec::new();
        if field.is_primary_key {
            flags.push("pk");
        }
        if field.is_auto_increment {
            flags.push("autoincrement");
        }
        if field.is_not_null {
            flags.push("not null");
        }
        if field.is_unique {
            flags.push("unique");
        }
        if field.is_indexed {
            flags.push("index");
        }
        out.push_str(&format!(
            "    {:<20} {:<8} {}\n",
            field.column_name,
            field.semantic_type.as_str(),
            flags.join(", ")
        ));
    }
    for fk in &model.foreign_keys {
        out.push_str(&format!(
            "    FK {} -> {}({})\n",
            fk.local_column, fk.target_table, fk.target_column
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_query_core::{FieldDescriptor, ProviderBinding, SemanticType};

    fn file(name: &str, contents: &str) -> GeneratedFile {
        GeneratedFile {
            path: PathBuf::from(name),
            provider: "App".into(),
            contents: contents.into(),
        }
    }

    #[test]
    fn test_unchanged_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gen");
        let files = vec![file("a.rs", "// a\n"), file("b.rs", "// b\n")];

        let first = write_files(&out, &files).unwrap();
        assert_eq!(first.written.len(), 2);
        assert!(first.unchanged.is_empty());

        let second = write_files(&out, &files).unwrap();
        assert!(second.written.is_empty());
        assert_eq!(second.unchanged, vec![out.join("a.rs"), out.join("b.rs")]);

        let third = write_files(&out, &[file("a.rs", "// changed\n")]).unwrap();
        assert_eq!(third.written, vec![out.join("a.rs")]);
        assert_eq!(std::fs::read_to_string(out.join("a.rs")).unwrap(), "// changed\n");
    }

    #[test]
    fn test_table_format() {
        let mut id = FieldDescriptor::new("id", SemanticType::Long, "i64");
        id.is_primary_key = true;
        id.column_name = "_id".into();
        let mut registry = Registry::new();
        registry.insert_model(ModelDescriptor {
            name: "User".into(),
            table_name: "users".into(),
            package_path: "crate::models".into(),
            fields: vec![id],
            foreign_keys: vec![],
            unique_groups: vec![],
            provider: ProviderBinding::local("App"),
            init_hooks: vec![],
        });

        let table = format_registry(&registry, OutputFormat::Table).unwrap();
        assert!(table.starts_with("Provider: App  Kind: local\n"));
        assert!(table.contains("  User -> users\n"));
        assert!(table.contains("_id"));
        assert!(table.contains("pk"));

        let json = format_registry(&registry, OutputFormat::Json).unwrap();
        let parsed: Registry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, registry);
    }
}
