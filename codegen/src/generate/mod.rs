//! Source generation: one Rust file per provider.
//!
//! Each file starts with a header comment carrying a SHA-256 fingerprint
//! of the descriptors and options it was generated from, then the
//! provider's schema constants, then one module per model in name order.
//! Output is a pure function of its input: rendering the same registry
//! twice yields byte-identical files.

mod model;
mod writer;

pub(crate) use model::{is_keyword, is_unescapable};
pub use model::{module_name, render_model, snake_case};
pub use writer::CodeWriter;

use std::path::PathBuf;

use model_query_core::ddl::{create_index_sql, create_table_sql, creation_order};
use model_query_core::{ModelDescriptor, ProviderBinding, ProviderKind, Registry};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::GeneratorOptions;
use crate::error::Result;

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory.
    pub path: PathBuf,
    pub provider: String,
    pub contents: String,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    provider: &'a ProviderBinding,
    models: &'a [&'a ModelDescriptor],
    options: &'a GeneratorOptions,
}

/// Hex SHA-256 over the serialized provider, models and options.
pub fn fingerprint(
    provider: &ProviderBinding,
    models: &[&ModelDescriptor],
    options: &GeneratorOptions,
) -> Result<String> {
    let input = FingerprintInput {
        provider,
        models,
        options,
    };
    let bytes = serde_json::to_vec(&input)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// File name for a provider, e.g. `app_database.rs`.
pub fn file_name(provider: &str) -> String {
    format!("{}.rs", snake_case(provider))
}

/// Renders every provider that has at least one model.
pub fn generate(registry: &Registry, options: &GeneratorOptions) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    for provider in registry.providers() {
        let models = registry.models_for_provider(&provider.name);
        if models.is_empty() {
            debug!(provider = %provider.name, "no models bound, skipping");
            continue;
        }
        files.push(render_provider(provider, &models, options)?);
    }
    info!(files = files.len(), "rendered provider sources");
    Ok(files)
}

/// Renders one provider file.
pub fn render_provider(
    provider: &ProviderBinding,
    models: &[&ModelDescriptor],
    options: &GeneratorOptions,
) -> Result<GeneratedFile> {
    let digest = fingerprint(provider, models, options)?;
    let ordered = creation_order(models);
    let ddl = options.ddl();

    let mut schema: Vec<String> = ordered
        .iter()
        .map(|m| create_table_sql(m, &ddl))
        .collect();
    schema.extend(ordered.iter().flat_map(|m| create_index_sql(m, &ddl)));

    let modules: Vec<String> = models
        .par_iter()
        .map(|m| render_model(m, options))
        .collect();

    let mut w = CodeWriter::new();
    w.line(&format!("// {}", options.header));
    w.line(&format!("// provider: {} ({})", provider.name, provider.kind));
    w.line(&format!("// fingerprint: sha256:{digest}"));
    w.blank();

    w.line("/// Provider these models are bound to.");
    w.line(&format!("pub const PROVIDER: &str = {:?};", provider.name));
    if provider.kind == ProviderKind::Content {
        if let Some(authority) = &provider.authority {
            w.line(&format!("pub const AUTHORITY: &str = {authority:?};"));
        }
    }
    w.line("/// Tables in creation order.");
    let tables: Vec<String> = ordered.iter().map(|m| format!("{:?}", m.table_name)).collect();
    w.line(&format!("pub const TABLE_NAMES: &[&str] = &[{}];", tables.join(", ")));
    w.line("/// `CREATE TABLE` statements in creation order, then `CREATE INDEX`.");
    w.line("pub const SCHEMA: &[&str] = &[");
    w.inc_indent();
    for statement in &schema {
        w.line(&format!("{statement:?},"));
    }
    w.dec_indent();
    w.line("];");

    for module in &modules {
        w.blank();
        w.embed(module);
    }

    debug!(provider = %provider.name, models = models.len(), "rendered provider");
    Ok(GeneratedFile {
        path: PathBuf::from(file_name(&provider.name)),
        provider: provider.name.clone(),
        contents: w.finish(),
    })
}
