//! Generator configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! declarations:
//!   - models.yaml
//! output_dir: src/generated
//! options:
//!   if_not_exists: true
//!   emit_indexes: true
//!   emit_entry_points: true
//! ```
//!
//! Relative paths are resolved against the directory holding the
//! configuration file.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use model_query_core::DdlOptions;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Header written at the top of every generated file.
pub const DEFAULT_HEADER: &str = "@generated by model-query. Do not edit.";

fn default_true() -> bool {
    true
}

fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Knobs that change the generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// `CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF NOT EXISTS`.
    #[serde(default = "default_true")]
    pub if_not_exists: bool,
    /// Emit `CREATE INDEX` for indexed fields.
    #[serde(default = "default_true")]
    pub emit_indexes: bool,
    /// Emit `select` / `insert` / `update` / `delete` / `count` functions
    /// next to each model.
    #[serde(default = "default_true")]
    pub emit_entry_points: bool,
    /// Comment text for the first line of each file.
    #[serde(default = "default_header")]
    pub header: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            if_not_exists: true,
            emit_indexes: true,
            emit_entry_points: true,
            header: default_header(),
        }
    }
}

impl GeneratorOptions {
    pub fn ddl(&self) -> DdlOptions {
        DdlOptions {
            if_not_exists: self.if_not_exists,
            emit_indexes: self.emit_indexes,
        }
    }
}

/// Top-level configuration, usually `model-query.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_version")]
    pub version: String,
    /// Declaration files, relative to the configuration file.
    pub declarations: Vec<PathBuf>,
    /// Output directory, relative to the configuration file.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub options: GeneratorOptions,
}

impl GeneratorConfig {
    pub fn new(declarations: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: default_version(),
            declarations,
            output_dir: output_dir.into(),
            options: GeneratorOptions::default(),
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CodegenError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::CodegenError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Resolves declaration and output paths against `base`.
    pub fn resolve(&self, base: &Path) -> (Vec<PathBuf>, PathBuf) {
        let declarations = self.declarations.iter().map(|p| base.join(p)).collect();
        (declarations, base.join(&self.output_dir))
    }
}
