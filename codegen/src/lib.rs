//! Build-time half of model-query: declarations in, Rust sources out.
//!
//! The pipeline has three stages:
//!
//! 1. [`DeclarationFile::load_all`] reads YAML or JSON model declarations.
//! 2. [`extract`] validates them and produces a [`Registry`] of
//!    descriptors, or every [`ExtractionError`] it found.
//! 3. [`generate`] renders one source file per provider;
//!    [`write_files`] puts them on disk, skipping unchanged files.
//!
//! [`generate_to_dir`] runs all three and is what build scripts call.
//!
//! # Example
//!
//! ```
//! use model_query_codegen::{DeclarationFile, GeneratorOptions, extract, generate};
//!
//! let file = DeclarationFile::from_yaml(r#"
//! providers:
//!   - { name: AppDatabase, extends: LocalDatabaseProvider }
//! models:
//!   - name: Tag
//!     package: crate::models
//!     provider: AppDatabase
//!     members:
//!       - { name: id, type: i64, field: { primary_key: true, auto_increment: true } }
//!       - { name: label, type: String, field: { not_null: true } }
//! "#).unwrap();
//!
//! let registry = extract(&file).unwrap();
//! let files = generate(&registry, &GeneratorOptions::default()).unwrap();
//! assert_eq!(files.len(), 1);
//! assert!(files[0].contents.contains("impl ::model_query_core::Model for Tag"));
//! ```
//!
//! [`Registry`]: model_query_core::Registry

mod config;
mod declaration;
mod error;
mod extract;
pub mod generate;
pub mod output;

use std::path::Path;

use model_query_core::Registry;
use tracing::info;

pub use config::{DEFAULT_HEADER, GeneratorConfig, GeneratorOptions};
pub use declaration::{
    CONTENT_ROOT, DeclarationFile, FieldAttrs, ForeignKeyDecl, LOCAL_ROOT, MemberDecl, ModelDecl,
    ProviderDecl,
};
pub use error::{CodegenError, ExtractionError, ExtractionErrors, Result};
pub use extract::{extract, rust_type_for, semantic_type_for};
pub use generate::{GeneratedFile, generate};
pub use output::{OutputFormat, WriteReport, format_registry, write_files};

/// Loads and extracts declaration files.
pub fn load_registry<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Registry> {
    let file = DeclarationFile::load_all(paths)?;
    Ok(extract(&file)?)
}

/// Loads declarations, generates sources and writes them to `out_dir`.
pub fn generate_to_dir<P: AsRef<Path>>(
    declarations: impl IntoIterator<Item = P>,
    out_dir: &Path,
    options: &GeneratorOptions,
) -> Result<WriteReport> {
    let registry = load_registry(declarations)?;
    let files = generate(&registry, options)?;
    write_files(out_dir, &files)
}

/// Runs the generator described by a configuration file.
pub fn run_config(path: &Path) -> Result<WriteReport> {
    let config = GeneratorConfig::load(path)?;
    if config.declarations.is_empty() {
        return Err(CodegenError::InvalidConfig(format!(
            "{} lists no declaration files",
            path.display()
        )));
    }
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let (declarations, out_dir) = config.resolve(base);
    info!(config = %path.display(), declarations = declarations.len(), "running generator");
    generate_to_dir(&declarations, &out_dir, &config.options)
}
