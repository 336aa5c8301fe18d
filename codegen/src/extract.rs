//! Metadata extraction: declarations in, validated descriptors out.
//!
//! The extractor resolves every provider's `extends` chain to a
//! [`ProviderKind`], flattens model inheritance (parent members first),
//! maps declared Rust types to semantic types, resolves foreign keys
//! against sibling models of the same provider and checks every
//! structural rule. All problems are collected and returned together; a
//! registry is only produced when there are none.
//!
//! Models and providers are keyed by name in ordered maps, so the order
//! of declarations never changes the result.

use std::collections::{BTreeMap, BTreeSet};

use model_query_core::ddl::is_valid_identifier;
use model_query_core::{
    CountStrategy, FieldDescriptor, ForeignKeyDescriptor, ModelDescriptor, ProviderBinding,
    ProviderKind, Registry, SemanticType,
};
use tracing::{debug, info};

use crate::declaration::{
    CONTENT_ROOT, DeclarationFile, FieldAttrs, LOCAL_ROOT, MemberDecl, ModelDecl, ProviderDecl,
};
use crate::error::{ExtractionError, ExtractionErrors};
use crate::generate::{is_keyword, is_unescapable, module_name, snake_case};

/// Builds the registry for a set of declarations.
///
/// # Errors
///
/// Returns every [`ExtractionError`] found. No partial registry is
/// returned.
pub fn extract(file: &DeclarationFile) -> Result<Registry, ExtractionErrors> {
    let mut extractor = Extractor::new(file);
    let bindings = extractor.resolve_providers();
    let descriptors = extractor.build_models(&bindings);
    extractor.check_tables(&descriptors);
    extractor.check_foreign_keys(&descriptors);
    extractor.check_generated_names(&descriptors);

    if !extractor.errors.is_empty() {
        return Err(ExtractionErrors(extractor.errors));
    }

    let mut registry = Registry::new();
    for binding in bindings.into_values() {
        registry.insert_provider(binding);
    }
    for descriptor in descriptors {
        registry.insert_model(descriptor);
    }
    info!(
        providers = registry.providers().count(),
        models = registry.len(),
        "extracted model descriptors"
    );
    Ok(registry)
}

/// Semantic type for a declared Rust type, without an `Option` wrapper.
pub fn semantic_type_for(ty: &str) -> Option<SemanticType> {
    match ty {
        "i8" | "i16" | "i32" | "u8" | "u16" => Some(SemanticType::Integer),
        "i64" | "u32" | "isize" => Some(SemanticType::Long),
        "f32" | "f64" => Some(SemanticType::Real),
        "String" => Some(SemanticType::Text),
        "bool" => Some(SemanticType::Boolean),
        "Vec<u8>" | "Bytes" => Some(SemanticType::Blob),
        "Uri" => Some(SemanticType::Uri),
        _ => None,
    }
}

/// Rust type used when a member only declares its semantic type.
pub fn rust_type_for(semantic: SemanticType) -> &'static str {
    match semantic {
        SemanticType::Integer => "i32",
        SemanticType::Long => "i64",
        SemanticType::Real => "f64",
        SemanticType::Text => "String",
        SemanticType::Boolean => "bool",
        SemanticType::Blob => "Vec<u8>",
        SemanticType::Uri => "Uri",
    }
}

/// Whether `path` can follow `use` as a module path: `crate`, `self`
/// and `super` only as a prefix, no other keywords.
fn is_module_path(path: &str) -> bool {
    let path = path.strip_prefix("::").unwrap_or(path);
    let mut prefix = true;
    path.split("::").enumerate().all(|(i, segment)| {
        let valid = match segment {
            "crate" | "self" => i == 0,
            "super" => prefix,
            s => is_valid_identifier(s) && !is_keyword(s) && !is_unescapable(s),
        };
        prefix = matches!(segment, "self" | "super");
        valid
    })
}

/// Splits `Option<T>` into `(T, true)`; whitespace is dropped.
fn parse_type(ty: &str) -> (String, bool) {
    let compact: String = ty.chars().filter(|c| !c.is_whitespace()).collect();
    match compact
        .strip_prefix("Option<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        Some(inner) => (inner.to_string(), true),
        None => (compact, false),
    }
}

struct Extractor<'a> {
    providers: BTreeMap<&'a str, &'a ProviderDecl>,
    models: BTreeMap<&'a str, &'a ModelDecl>,
    errors: Vec<ExtractionError>,
}

impl<'a> Extractor<'a> {
    fn new(file: &'a DeclarationFile) -> Self {
        let mut errors = Vec::new();

        let mut providers = BTreeMap::new();
        for provider in &file.providers {
            if provider.name.trim().is_empty() {
                errors.push(ExtractionError::EmptyName { kind: "provider" });
            } else if providers.insert(provider.name.as_str(), provider).is_some() {
                errors.push(ExtractionError::DuplicateProvider(provider.name.clone()));
            } else if !is_valid_identifier(&provider.name) {
                errors.push(ExtractionError::InvalidProviderName(provider.name.clone()));
            }
        }

        let mut models = BTreeMap::new();
        for model in &file.models {
            if model.name.trim().is_empty() {
                errors.push(ExtractionError::EmptyName { kind: "model" });
            } else if models.insert(model.name.as_str(), model).is_some() {
                errors.push(ExtractionError::DuplicateModel(model.name.clone()));
            }
        }

        Self {
            providers,
            models,
            errors,
        }
    }

    fn resolve_providers(&mut self) -> BTreeMap<String, ProviderBinding> {
        let names: Vec<&'a str> = self.providers.keys().copied().collect();
        names
            .into_iter()
            .filter_map(|name| {
                self.resolve_provider(name)
                    .map(|binding| (name.to_string(), binding))
            })
            .collect()
    }

    /// Walks `extends` to a root kind. Authority and count strategy are
    /// taken from the nearest provider in the chain that declares them.
    fn resolve_provider(&mut self, name: &'a str) -> Option<ProviderBinding> {
        let mut chain: Vec<&ProviderDecl> = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = *self.providers.get(name)?;

        let kind = loop {
            if !seen.insert(current.name.as_str()) {
                self.errors
                    .push(ExtractionError::ProviderCycle(name.to_string()));
                return None;
            }
            chain.push(current);
            match current.extends.as_str() {
                LOCAL_ROOT => break ProviderKind::Local,
                CONTENT_ROOT => break ProviderKind::Content,
                parent => match self.providers.get(parent) {
                    Some(next) => current = next,
                    None => {
                        self.errors.push(ExtractionError::UnknownProviderParent {
                            provider: current.name.clone(),
                            parent: parent.to_string(),
                        });
                        return None;
                    }
                },
            }
        };

        let binding = match kind {
            ProviderKind::Local => ProviderBinding::local(name),
            ProviderKind::Content => {
                let Some(authority) = chain.iter().find_map(|p| p.authority.clone()) else {
                    self.errors
                        .push(ExtractionError::MissingAuthority(name.to_string()));
                    return None;
                };
                let count = chain
                    .iter()
                    .find_map(|p| p.count)
                    .unwrap_or(CountStrategy::Projection);
                ProviderBinding::content(name, authority).with_count(count)
            }
        };
        debug!(provider = name, kind = %binding.kind, "resolved provider");
        Some(binding)
    }

    /// The model followed by its ancestors, nearest first.
    fn lineage(&mut self, model: &'a ModelDecl) -> Option<Vec<&'a ModelDecl>> {
        let mut lineage = vec![model];
        let mut seen = BTreeSet::from([model.name.as_str()]);
        let mut current = model;
        while let Some(parent) = current.extends.as_deref() {
            let Some(next) = self.models.get(parent).copied() else {
                self.errors.push(ExtractionError::UnknownParentModel {
                    model: current.name.clone(),
                    parent: parent.to_string(),
                });
                return None;
            };
            if !seen.insert(next.name.as_str()) {
                self.errors
                    .push(ExtractionError::InheritanceCycle(model.name.clone()));
                return None;
            }
            lineage.push(next);
            current = next;
        }
        Some(lineage)
    }

    fn build_models(&mut self, bindings: &BTreeMap<String, ProviderBinding>) -> Vec<ModelDescriptor> {
        let models: Vec<&'a ModelDecl> = self.models.values().copied().collect();
        models
            .into_iter()
            .filter(|model| !model.is_abstract)
            .filter_map(|model| self.build_model(model, bindings))
            .collect()
    }

    fn build_model(
        &mut self,
        model: &'a ModelDecl,
        bindings: &BTreeMap<String, ProviderBinding>,
    ) -> Option<ModelDescriptor> {
        let lineage = self.lineage(model)?;
        let name = model.name.clone();
        let error_count = self.errors.len();

        self.check_rust_name(&name, &name, false);

        let package = lineage.iter().find_map(|m| m.package.clone());
        match &package {
            None => self.errors.push(ExtractionError::MissingPackage(name.clone())),
            Some(path) if !is_module_path(path) => {
                self.errors.push(ExtractionError::InvalidPackage {
                    model: name.clone(),
                    package: path.clone(),
                });
            }
            Some(_) => {}
        }

        let provider = match lineage.iter().find_map(|m| m.provider.as_deref()) {
            None => {
                self.errors.push(ExtractionError::MissingProvider(name.clone()));
                None
            }
            Some(provider) => match bindings.get(provider) {
                Some(binding) => Some(binding.clone()),
                None => {
                    if !self.providers.contains_key(provider) {
                        self.errors.push(ExtractionError::UnknownProvider {
                            model: name.clone(),
                            provider: provider.to_string(),
                        });
                    }
                    None
                }
            },
        };

        let table_name = match &model.table {
            Some(table) => {
                self.check_identifier(&name, table);
                table.clone()
            }
            None => name.clone(),
        };

        let mut fields = Vec::new();
        let mut init_hooks = Vec::new();
        let mut member_names = BTreeSet::new();
        for member in lineage.iter().rev().flat_map(|m| m.members.iter()) {
            if !member_names.insert(member.name.as_str()) {
                self.errors.push(ExtractionError::DuplicateMember {
                    model: name.clone(),
                    member: member.name.clone(),
                });
                continue;
            }
            if member.init || member.field.is_some() {
                self.check_rust_name(&name, &member.name, true);
            }
            if member.init {
                init_hooks.push(member.name.clone());
            }
            match &member.field {
                Some(attrs) => {
                    if let Some(field) = self.build_field(&name, member, attrs) {
                        fields.push(field);
                    }
                }
                None if !member.init => {
                    debug!(model = %name, member = %member.name, "ignoring non-field member");
                }
                None => {}
            }
        }

        self.check_columns(&name, &fields);
        self.check_primary_key(&name, &fields);

        let columns: BTreeSet<&str> = fields.iter().map(|f| f.column_name.as_str()).collect();

        let mut unique_groups = Vec::new();
        for group in lineage.iter().rev().flat_map(|m| m.unique.iter()) {
            for column in group {
                if !columns.contains(column.as_str()) {
                    self.errors.push(ExtractionError::UnknownUniqueColumn {
                        model: name.clone(),
                        column: column.clone(),
                    });
                }
            }
            unique_groups.push(group.clone());
        }

        let mut foreign_keys = Vec::new();
        for fk in lineage.iter().rev().flat_map(|m| m.foreign_keys.iter()) {
            if !columns.contains(fk.local_column.as_str()) {
                self.errors.push(ExtractionError::UnknownForeignKeyColumn {
                    model: name.clone(),
                    column: fk.local_column.clone(),
                });
            }
            self.check_identifier(&name, &fk.target_table);
            self.check_identifier(&name, &fk.target_column);
            foreign_keys.push(ForeignKeyDescriptor {
                local_column: fk.local_column.clone(),
                target_table: fk.target_table.clone(),
                target_column: fk.target_column.clone(),
            });
        }

        if self.errors.len() > error_count {
            return None;
        }
        let provider = provider?;
        let package_path = package?;

        debug!(
            model = %name,
            table = %table_name,
            provider = %provider.name,
            fields = fields.len(),
            "extracted model"
        );
        Some(ModelDescriptor {
            name,
            table_name,
            package_path,
            fields,
            foreign_keys,
            unique_groups,
            provider,
            init_hooks,
        })
    }

    fn build_field(
        &mut self,
        model: &str,
        member: &MemberDecl,
        attrs: &FieldAttrs,
    ) -> Option<FieldDescriptor> {
        let field_error = |make: fn(String, String) -> ExtractionError| {
            make(model.to_string(), member.name.clone())
        };

        let column_name = attrs.column.clone().unwrap_or_else(|| member.name.clone());
        self.check_identifier(model, &column_name);

        let (semantic_type, rust_type, nullable) = match (&member.ty, attrs.semantic) {
            (None, None) => {
                self.errors.push(field_error(|model, field| {
                    ExtractionError::MissingType { model, field }
                }));
                return None;
            }
            (None, Some(semantic)) => (semantic, rust_type_for(semantic).to_string(), false),
            (Some(ty), semantic) => {
                let (base, nullable) = parse_type(ty);
                let Some(declared) = semantic_type_for(&base) else {
                    self.errors.push(ExtractionError::UnsupportedType {
                        model: model.to_string(),
                        field: member.name.clone(),
                        ty: ty.clone(),
                    });
                    return None;
                };
                let semantic = semantic.unwrap_or(declared);
                if declared == SemanticType::Blob && semantic != SemanticType::Blob {
                    self.errors.push(ExtractionError::BlobMismatch {
                        model: model.to_string(),
                        field: member.name.clone(),
                        semantic,
                    });
                    return None;
                }
                if semantic.affinity() != declared.affinity() {
                    self.errors.push(ExtractionError::UnsupportedType {
                        model: model.to_string(),
                        field: member.name.clone(),
                        ty: format!("{ty} as {semantic}"),
                    });
                    return None;
                }
                let rust_type = if nullable {
                    format!("Option<{base}>")
                } else {
                    base
                };
                (semantic, rust_type, nullable)
            }
        };

        if attrs.auto_increment && !attrs.primary_key {
            self.errors.push(field_error(|model, field| {
                ExtractionError::AutoIncrementWithoutPrimaryKey { model, field }
            }));
        }
        if attrs.auto_increment && !semantic_type.is_integral() {
            self.errors.push(field_error(|model, field| {
                ExtractionError::AutoIncrementNotInteger { model, field }
            }));
        }
        if let Some(default) = &attrs.default {
            if !default.fits(semantic_type) {
                self.errors.push(field_error(|model, field| {
                    ExtractionError::DefaultTypeMismatch { model, field }
                }));
            }
        }

        Some(FieldDescriptor {
            name: member.name.clone(),
            column_name,
            semantic_type,
            rust_type,
            nullable,
            is_primary_key: attrs.primary_key,
            is_auto_increment: attrs.auto_increment,
            is_indexed: attrs.index,
            is_unique: attrs.unique,
            is_not_null: attrs.not_null,
            default_value: attrs.default.clone(),
        })
    }

    fn check_identifier(&mut self, model: &str, identifier: &str) {
        if !is_valid_identifier(identifier) {
            self.errors.push(ExtractionError::InvalidIdentifier {
                model: model.to_string(),
                identifier: identifier.to_string(),
            });
        }
    }

    /// Model, member and hook names end up as Rust identifiers. Keywords
    /// are accepted where the generator can write them raw.
    fn check_rust_name(&mut self, model: &str, name: &str, raw_allowed: bool) {
        if !is_valid_identifier(name) {
            self.check_identifier(model, name);
        } else if is_unescapable(name) || (!raw_allowed && is_keyword(name)) {
            self.errors.push(ExtractionError::ReservedName {
                model: model.to_string(),
                name: name.to_string(),
            });
        }
    }

    fn check_columns(&mut self, model: &str, fields: &[FieldDescriptor]) {
        let mut seen = BTreeSet::new();
        for field in fields {
            if !seen.insert(field.column_name.as_str()) {
                self.errors.push(ExtractionError::DuplicateColumn {
                    model: model.to_string(),
                    column: field.column_name.clone(),
                });
            }
        }
    }

    fn check_primary_key(&mut self, model: &str, fields: &[FieldDescriptor]) {
        let keys: Vec<String> = fields
            .iter()
            .filter(|f| f.is_primary_key)
            .map(|f| f.name.clone())
            .collect();
        match keys.len() {
            1 => {}
            0 => self
                .errors
                .push(ExtractionError::NoPrimaryKey(model.to_string())),
            _ => self.errors.push(ExtractionError::MultiplePrimaryKeys {
                model: model.to_string(),
                fields: keys,
            }),
        }
    }

    fn check_tables(&mut self, descriptors: &[ModelDescriptor]) {
        let mut seen = BTreeSet::new();
        for descriptor in descriptors {
            let key = (descriptor.provider.name.as_str(), descriptor.table_name.as_str());
            if !seen.insert(key) {
                self.errors.push(ExtractionError::DuplicateTable {
                    provider: descriptor.provider.name.clone(),
                    table: descriptor.table_name.clone(),
                });
            }
        }
    }

    /// One output file per provider and one module per model: distinct
    /// names must not fold to the same file or module name.
    fn check_generated_names(&mut self, descriptors: &[ModelDescriptor]) {
        let providers: BTreeSet<&str> = descriptors
            .iter()
            .map(|d| d.provider.name.as_str())
            .collect();
        let mut files: BTreeMap<String, &str> = BTreeMap::new();
        for provider in providers {
            let file = snake_case(provider);
            if let Some(first) = files.insert(file.clone(), provider) {
                self.errors.push(ExtractionError::NameCollision {
                    kind: "provider",
                    first: first.to_string(),
                    second: provider.to_string(),
                    generated: format!("{file}.rs"),
                });
            }
        }

        let mut modules: BTreeMap<(&str, String), &str> = BTreeMap::new();
        for descriptor in descriptors {
            let provider = descriptor.provider.name.as_str();
            let module = module_name(&descriptor.name);
            if let Some(first) = modules.insert((provider, module.clone()), &descriptor.name) {
                self.errors.push(ExtractionError::NameCollision {
                    kind: "model",
                    first: first.to_string(),
                    second: descriptor.name.clone(),
                    generated: module,
                });
            }
        }
    }

    fn check_foreign_keys(&mut self, descriptors: &[ModelDescriptor]) {
        for descriptor in descriptors {
            for fk in &descriptor.foreign_keys {
                let target = descriptors.iter().find(|d| {
                    d.provider.name == descriptor.provider.name && d.table_name == fk.target_table
                });
                match target {
                    None => self.errors.push(ExtractionError::UnresolvedForeignKey {
                        model: descriptor.name.clone(),
                        table: fk.target_table.clone(),
                    }),
                    Some(target) if target.field_by_column(&fk.target_column).is_none() => {
                        self.errors.push(ExtractionError::UnknownForeignKeyTarget {
                            model: descriptor.name.clone(),
                            table: fk.target_table.clone(),
                            column: fk.target_column.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_yaml(text: &str) -> Result<Registry, ExtractionErrors> {
        extract(&DeclarationFile::from_yaml(text).unwrap())
    }

    const PROVIDERS: &str = r#"
providers:
  - name: SharedDatabase
    extends: LocalDatabaseProvider
  - name: AppDatabase
    extends: SharedDatabase
  - name: BaseContacts
    extends: ContentDatabaseProvider
    authority: com.example.contacts
    count: count_column
  - name: Contacts
    extends: BaseContacts
"#;

    fn with_providers(models: &str) -> String {
        format!("{PROVIDERS}{models}")
    }

    #[test]
    fn test_provider_chain_resolves_kind() {
        let registry = extract_yaml(PROVIDERS).unwrap();
        assert_eq!(registry.provider("AppDatabase").unwrap().kind, ProviderKind::Local);
        let contacts = registry.provider("Contacts").unwrap();
        assert_eq!(contacts.kind, ProviderKind::Content);
        assert_eq!(contacts.authority.as_deref(), Some("com.example.contacts"));
        assert_eq!(contacts.count, CountStrategy::CountColumn);
    }

    #[test]
    fn test_provider_cycle_and_unknown_root() {
        let errors = extract_yaml(
            r#"
providers:
  - { name: A, extends: B }
  - { name: B, extends: A }
  - { name: C, extends: SomethingElse }
"#,
        )
        .unwrap_err();
        assert!(errors.iter().any(|e| *e == ExtractionError::ProviderCycle("A".into())));
        assert!(errors.iter().any(|e| matches!(
            e,
            ExtractionError::UnknownProviderParent { provider, parent }
                if provider == "C" && parent == "SomethingElse"
        )));
    }

    #[test]
    fn test_inheritance_puts_parent_members_first() {
        let registry = extract_yaml(&with_providers(
            r#"
models:
  - name: Entity
    abstract: true
    package: crate::models
    members:
      - name: id
        type: i64
        field: { primary_key: true, auto_increment: true, column: _id }
  - name: Tag
    extends: Entity
    table: tags
    provider: AppDatabase
    members:
      - name: label
        type: Option<String>
        field: { index: true }
      - name: scratch
        type: Vec<String>
      - name: on_loaded
        init: true
"#,
        ))
        .unwrap();

        assert!(registry.model("Entity").is_none());
        let tag = registry.model("Tag").unwrap();
        assert_eq!(tag.package_path, "crate::models");
        assert_eq!(tag.columns(), vec!["_id", "label"]);
        assert_eq!(tag.fields[1].rust_type, "Option<String>");
        assert!(tag.fields[1].nullable);
        assert_eq!(tag.fields[1].semantic_type, SemanticType::Text);
        assert_eq!(tag.init_hooks, vec!["on_loaded".to_string()]);
        assert_eq!(tag.provider.kind, ProviderKind::Local);
    }

    #[test]
    fn test_two_primary_keys_names_both_fields() {
        let errors = extract_yaml(&with_providers(
            r#"
models:
  - name: Pair
    package: crate::models
    provider: AppDatabase
    members:
      - { name: left, type: i64, field: { primary_key: true } }
      - { name: right, type: i64, field: { primary_key: true } }
"#,
        ))
        .unwrap_err();
        assert_eq!(
            errors.0,
            vec![ExtractionError::MultiplePrimaryKeys {
                model: "Pair".into(),
                fields: vec!["left".into(), "right".into()],
            }]
        );
        let message = errors.to_string();
        assert!(message.contains("Pair") && message.contains("left") && message.contains("right"));
    }

    #[test]
    fn test_missing_primary_key() {
        let errors = extract_yaml(&with_providers(
            r#"
models:
  - name: Loose
    package: crate::models
    provider: Contacts
    members:
      - { name: note, type: String, field: {} }
"#,
        ))
        .unwrap_err();
        assert_eq!(errors.0, vec![ExtractionError::NoPrimaryKey("Loose".into())]);
    }

    #[test]
    fn test_foreign_key_resolution() {
        let models = r#"
models:
  - name: User
    package: crate::models
    table: users
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
  - name: Post
    package: crate::models
    table: posts
    provider: AppDatabase
    foreign_keys:
      - { local_column: user_id, target_table: users, target_column: id }
      - { local_column: user_id, target_table: accounts, target_column: id }
      - { local_column: user_id, target_table: users, target_column: uid }
    members:
      - { name: id, type: i64, field: { primary_key: true } }
      - { name: user_id, type: i64, field: {} }
"#;
        let errors = extract_yaml(&with_providers(models)).unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ExtractionError::UnresolvedForeignKey {
                    model: "Post".into(),
                    table: "accounts".into(),
                },
                ExtractionError::UnknownForeignKeyTarget {
                    model: "Post".into(),
                    table: "users".into(),
                    column: "uid".into(),
                },
            ]
        );
    }

    #[test]
    fn test_field_validations_are_collected() {
        let errors = extract_yaml(&with_providers(
            r#"
models:
  - name: Bad
    package: crate::models
    provider: AppDatabase
    members:
      - { name: id, type: String, field: { primary_key: true, auto_increment: true } }
      - { name: count, type: u64, field: {} }
      - { name: raw, type: Vec<u8>, field: { semantic: text } }
      - { name: flag, type: bool, field: { auto_increment: true } }
      - { name: score, type: f64, field: { default: "high" } }
      - { name: alias, type: String, field: { column: flag } }
      - { name: untyped, field: {} }
"#,
        ))
        .unwrap_err();

        let has = |pred: &dyn Fn(&ExtractionError) -> bool| errors.iter().any(pred);
        assert!(has(&|e| matches!(e, ExtractionError::AutoIncrementNotInteger { field, .. } if field == "id")));
        assert!(has(&|e| matches!(e, ExtractionError::UnsupportedType { ty, .. } if ty == "u64")));
        assert!(has(&|e| matches!(e, ExtractionError::BlobMismatch { semantic: SemanticType::Text, .. })));
        assert!(has(&|e| matches!(e, ExtractionError::AutoIncrementWithoutPrimaryKey { field, .. } if field == "flag")));
        assert!(has(&|e| matches!(e, ExtractionError::DefaultTypeMismatch { field, .. } if field == "score")));
        assert!(has(&|e| matches!(e, ExtractionError::DuplicateColumn { column, .. } if column == "flag")));
        assert!(has(&|e| matches!(e, ExtractionError::MissingType { field, .. } if field == "untyped")));
    }

    #[test]
    fn test_non_finite_default_rejected() {
        let errors = extract_yaml(&with_providers(
            r#"
models:
  - name: Reading
    package: crate::models
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
      - { name: low, type: f64, field: { default: .nan } }
      - { name: high, type: f64, field: { default: .inf } }
"#,
        ))
        .unwrap_err();
        let fields: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ExtractionError::DefaultTypeMismatch { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["low", "high"]);
    }

    #[test]
    fn test_binding_errors() {
        let errors = extract_yaml(&with_providers(
            r#"
models:
  - name: Orphan
    package: crate::models
    members:
      - { name: id, type: i64, field: { primary_key: true } }
  - name: Lost
    package: crate::models
    provider: Nowhere
    members:
      - { name: id, type: i64, field: { primary_key: true } }
  - name: Child
    extends: Missing
    provider: AppDatabase
  - name: Bad Table
    package: crate::models
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
"#,
        ))
        .unwrap_err();

        assert!(errors.iter().any(|e| *e == ExtractionError::MissingProvider("Orphan".into())));
        assert!(errors.iter().any(|e| matches!(
            e,
            ExtractionError::UnknownProvider { provider, .. } if provider == "Nowhere"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ExtractionError::UnknownParentModel { parent, .. } if parent == "Missing"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ExtractionError::InvalidIdentifier { identifier, .. } if identifier == "Bad Table"
        )));
    }

    #[test]
    fn test_duplicate_tables_per_provider() {
        let errors = extract_yaml(&with_providers(
            r#"
models:
  - name: A
    package: crate::models
    table: shared
    provider: AppDatabase
    members: [{ name: id, type: i64, field: { primary_key: true } }]
  - name: B
    package: crate::models
    table: shared
    provider: AppDatabase
    members: [{ name: id, type: i64, field: { primary_key: true } }]
  - name: C
    package: crate::models
    table: shared
    provider: Contacts
    members: [{ name: id, type: i64, field: { primary_key: true } }]
"#,
        ))
        .unwrap_err();
        assert_eq!(
            errors.0,
            vec![ExtractionError::DuplicateTable {
                provider: "AppDatabase".into(),
                table: "shared".into(),
            }]
        );
    }

    #[test]
    fn test_rust_names_checked_with_explicit_table() {
        let errors = extract_yaml(&with_providers(
            r#"
models:
  - name: my-model
    package: crate::models
    table: my_models
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
  - name: type
    package: crate::models
    table: types
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
  - name: Odd
    package: crate::models::type
    table: odds
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
      - { name: self, type: String, field: {} }
      - { name: _, type: String, field: { column: blank } }
      - { name: on-load, init: true }
      - { name: super, init: true }
"#,
        ))
        .unwrap_err();

        let reserved = |name: &str| ExtractionError::ReservedName {
            model: "Odd".into(),
            name: name.into(),
        };
        assert!(errors.iter().any(|e| matches!(
            e,
            ExtractionError::InvalidIdentifier { model, identifier }
                if model == "my-model" && identifier == "my-model"
        )));
        assert!(errors.iter().any(|e| *e
            == ExtractionError::ReservedName {
                model: "type".into(),
                name: "type".into(),
            }));
        assert!(errors.iter().any(|e| *e
            == ExtractionError::InvalidPackage {
                model: "Odd".into(),
                package: "crate::models::type".into(),
            }));
        assert!(errors.iter().any(|e| *e == reserved("self")));
        assert!(errors.iter().any(|e| *e == reserved("_")));
        assert!(errors.iter().any(|e| *e == reserved("super")));
        assert!(errors.iter().any(|e| matches!(
            e,
            ExtractionError::InvalidIdentifier { identifier, .. } if identifier == "on-load"
        )));
    }

    #[test]
    fn test_raw_member_names_and_path_prefixes_accepted() {
        let registry = extract_yaml(&with_providers(
            r#"
models:
  - name: Item
    package: super::super::items
    table: items
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
      - { name: type, type: String, field: {} }
      - { name: match, init: true }
  - name: Other
    package: ::shared::models
    table: others
    provider: AppDatabase
    members:
      - { name: id, type: i64, field: { primary_key: true } }
"#,
        ))
        .unwrap();
        let item = registry.model("Item").unwrap();
        assert_eq!(item.fields[1].name, "type");
        assert_eq!(item.init_hooks, vec!["match".to_string()]);

        assert!(is_module_path("crate"));
        assert!(is_module_path("self::super::models"));
        assert!(!is_module_path("models::crate"));
        assert!(!is_module_path("crate::super"));
        assert!(!is_module_path("crate::"));
        assert!(!is_module_path("crate::models::_"));
    }

    #[test]
    fn test_provider_name_must_be_identifier() {
        let errors = extract_yaml(
            r#"
providers:
  - { name: app-db, extends: LocalDatabaseProvider }
"#,
        )
        .unwrap_err();
        assert_eq!(
            errors.0,
            vec![ExtractionError::InvalidProviderName("app-db".into())]
        );
    }

    #[test]
    fn test_names_folding_to_same_output_rejected() {
        let errors = extract_yaml(
            r#"
providers:
  - { name: AppDb, extends: LocalDatabaseProvider }
  - { name: App_Db, extends: LocalDatabaseProvider }
models:
  - { name: Note, package: m, table: notes, provider: AppDb, members: [{ name: id, type: i64, field: { primary_key: true } }] }
  - { name: Memo, package: m, table: memos, provider: App_Db, members: [{ name: id, type: i64, field: { primary_key: true } }] }
  - { name: UserProfile, package: m, provider: AppDb, members: [{ name: id, type: i64, field: { primary_key: true } }] }
  - { name: User_Profile, package: m, provider: AppDb, members: [{ name: id, type: i64, field: { primary_key: true } }] }
  - { name: User_Profile2, package: m, provider: App_Db, members: [{ name: id, type: i64, field: { primary_key: true } }] }
"#,
        )
        .unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ExtractionError::NameCollision {
                    kind: "provider",
                    first: "AppDb".into(),
                    second: "App_Db".into(),
                    generated: "app_db.rs".into(),
                },
                ExtractionError::NameCollision {
                    kind: "model",
                    first: "UserProfile".into(),
                    second: "User_Profile".into(),
                    generated: "user_profile".into(),
                },
            ]
        );
        assert!(errors.to_string().contains("both generate 'app_db.rs'"));
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let forward = with_providers(
            r#"
models:
  - { name: A, package: m, provider: AppDatabase, members: [{ name: id, type: i64, field: { primary_key: true } }] }
  - { name: B, package: m, provider: AppDatabase, members: [{ name: id, type: i64, field: { primary_key: true } }] }
"#,
        );
        let backward = with_providers(
            r#"
models:
  - { name: B, package: m, provider: AppDatabase, members: [{ name: id, type: i64, field: { primary_key: true } }] }
  - { name: A, package: m, provider: AppDatabase, members: [{ name: id, type: i64, field: { primary_key: true } }] }
"#,
        );
        assert_eq!(extract_yaml(&forward).unwrap(), extract_yaml(&backward).unwrap());
    }
}
