//! Renders one model module.
//!
//! For a model `User` bound to a local provider the output looks like:
//!
//! ```text
//! pub mod user {
//!     use crate::models::User;
//!
//!     pub const TABLE_NAME: &str = "users";
//!     pub const ID: &str = "_id";
//!     ...
//!     impl ::model_query_core::Model for User { ... }
//!
//!     pub fn select<P: ::model_query_core::StorageProvider + ?Sized>(provider: &P)
//!         -> ::model_query_core::Select<'_, User, P> { ... }
//! }
//! ```
//!
//! Generated code only uses absolute paths, so it can be `include!`d
//! anywhere.

use std::collections::BTreeSet;

use model_query_core::ddl::{create_index_sql, create_table_sql};
use model_query_core::{FieldDescriptor, ModelDescriptor, ProviderKind};

use super::writer::CodeWriter;
use crate::config::GeneratorOptions;

const CORE: &str = "::model_query_core";

/// Constant names emitted by every model module.
const RESERVED: &[&str] = &[
    "TABLE_NAME",
    "PRIMARY_KEY",
    "COLUMNS",
    "CREATE_TABLE",
    "CREATE_INDEXES",
];

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Whether `name` is a Rust keyword, strict or reserved.
pub(crate) fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Keywords that cannot be written as raw identifiers, plus `_`.
pub(crate) fn is_unescapable(name: &str) -> bool {
    matches!(name, "self" | "super" | "crate" | "Self" | "_")
}

/// `UserProfile` -> `user_profile`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}

/// Module name for a model, escaping keywords.
pub fn module_name(model: &str) -> String {
    let snake = snake_case(model);
    match snake.as_str() {
        "self" | "super" | "crate" | "Self" => format!("{snake}_model"),
        s if is_keyword(s) => format!("r#{snake}"),
        _ => snake,
    }
}

/// Field name as it appears in a member access (`self.r#type`).
fn member(name: &str) -> String {
    if is_keyword(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Column constant names, one per field, never colliding with the fixed
/// constants or each other.
fn column_constants(fields: &[FieldDescriptor]) -> Vec<String> {
    let mut taken: BTreeSet<String> = RESERVED.iter().map(|s| s.to_string()).collect();
    fields
        .iter()
        .map(|field| {
            let mut name = snake_case(&field.name).to_ascii_uppercase();
            while !taken.insert(name.clone()) {
                name.push_str("_COLUMN");
            }
            name
        })
        .collect()
}

fn str_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("{s:?}")).collect();
    format!("&[{}]", quoted.join(", "))
}

/// Renders the module for `model`.
pub fn render_model(model: &ModelDescriptor, options: &GeneratorOptions) -> String {
    let mut w = CodeWriter::new();
    let name = &model.name;
    let constants = column_constants(&model.fields);
    let ddl = options.ddl();
    let create_table = create_table_sql(model, &ddl);
    let create_indexes = create_index_sql(model, &ddl);
    let pk_index = model.fields.iter().position(|f| f.is_primary_key);

    w.line(&format!("/// Table `{}` for `{}`.", model.table_name, name));
    w.block(&format!("pub mod {}", module_name(name)), |w| {
        w.line(&format!("use {}::{};", model.package_path, name));
        w.blank();

        w.line(&format!("pub const TABLE_NAME: &str = {:?};", model.table_name));
        for (field, constant) in model.fields.iter().zip(&constants) {
            w.line(&format!("pub const {constant}: &str = {:?};", field.column_name));
        }
        match pk_index {
            Some(i) => w.line(&format!("pub const PRIMARY_KEY: &str = {};", constants[i])),
            None => w.line("pub const PRIMARY_KEY: &str = \"\";"),
        }
        w.line(&format!("pub const COLUMNS: &[&str] = &[{}];", constants.join(", ")));
        w.line(&format!("pub const CREATE_TABLE: &str = {create_table:?};"));
        w.line(&format!(
            "pub const CREATE_INDEXES: &[&str] = {};",
            str_list(&create_indexes)
        ));
        w.blank();

        render_impl(w, model, &constants, pk_index);

        if options.emit_entry_points {
            w.blank();
            render_entry_points(w, name);
        }
    });
    w.finish()
}

fn render_impl(
    w: &mut CodeWriter,
    model: &ModelDescriptor,
    constants: &[String],
    pk_index: Option<usize>,
) {
    let kind = match model.provider.kind {
        ProviderKind::Local => "Local",
        ProviderKind::Content => "Content",
    };
    w.block(&format!("impl {CORE}::Model for {}", model.name), |w| {
        w.line(&format!("const NAME: &'static str = {:?};", model.name));
        w.line("const TABLE_NAME: &'static str = TABLE_NAME;");
        w.line("const COLUMNS: &'static [&'static str] = COLUMNS;");
        w.line("const PRIMARY_KEY: &'static str = PRIMARY_KEY;");
        w.line(&format!("const PROVIDER: &'static str = {:?};", model.provider.name));
        w.line(&format!(
            "const PROVIDER_KIND: {CORE}::ProviderKind = {CORE}::ProviderKind::{kind};"
        ));
        w.line("const CREATE_TABLE: &'static str = CREATE_TABLE;");
        w.line("const CREATE_INDEXES: &'static [&'static str] = CREATE_INDEXES;");
        w.blank();

        w.block(
            &format!(
                "fn from_row(row: &{CORE}::Row) -> ::std::result::Result<Self, {CORE}::MappingError>"
            ),
            |w| {
                w.line("let mut model = Self::default();");
                for (field, constant) in model.fields.iter().zip(constants) {
                    let target = member(&field.name);
                    if field.is_auto_increment {
                        w.line(&format!("let key = row.value({constant})?;"));
                        w.block("if !key.is_null()", |w| {
                            w.line(&format!(
                                "model.{target} = {CORE}::FromValue::from_value({constant}, key)?;"
                            ));
                        });
                    } else {
                        w.line(&format!("model.{target} = row.get({constant})?;"));
                    }
                }
                for hook in &model.init_hooks {
                    w.line(&format!("model.{}();", member(hook)));
                }
                w.line("Ok(model)");
            },
        );
        w.blank();

        w.block(&format!("fn to_values(&self) -> {CORE}::Values"), |w| {
            w.line(&format!("let mut values = {CORE}::Values::new();"));
            for (field, constant) in model.fields.iter().zip(constants) {
                let value = format!("{CORE}::ToValue::to_value(&self.{})", member(&field.name));
                if field.is_auto_increment {
                    w.line(&format!("let key = {value};"));
                    w.block("if !key.is_unset_key()", |w| {
                        w.line(&format!("values.put({constant}, key);"));
                    });
                } else if field.nullable && !field.is_required() {
                    w.block(&format!("if self.{}.is_some()", member(&field.name)), |w| {
                        w.line(&format!("values.put({constant}, {value});"));
                    });
                } else {
                    w.line(&format!("values.put({constant}, {value});"));
                }
            }
            w.line("values");
        });
        w.blank();

        let pk = pk_index.map(|i| &model.fields[i]);
        w.block(&format!("fn primary_key(&self) -> {CORE}::Value"), |w| match pk {
            Some(field) => w.line(&format!(
                "{CORE}::ToValue::to_value(&self.{})",
                member(&field.name)
            )),
            None => w.line(&format!("{CORE}::Value::Null")),
        });
        w.blank();

        w.block(
            &format!(
                "fn set_primary_key(&mut self, value: &{CORE}::Value) -> ::std::result::Result<(), {CORE}::MappingError>"
            ),
            |w| {
                if let Some(field) = pk {
                    w.line(&format!(
                        "self.{} = {CORE}::FromValue::from_value(PRIMARY_KEY, value)?;",
                        member(&field.name)
                    ));
                } else {
                    w.line("let _ = value;");
                }
                w.line("Ok(())");
            },
        );
    });
}

fn render_entry_points(w: &mut CodeWriter, name: &str) {
    // provider type parameter; must not shadow the model
    let p = if name == "P" { "Q" } else { "P" };
    for (function, builder) in [
        ("select", "Select"),
        ("insert", "Insert"),
        ("update", "Update"),
        ("delete", "Delete"),
        ("count", "Count"),
    ] {
        if function != "select" {
            w.blank();
        }
        w.block(
            &format!(
                "pub fn {function}<{p}: {CORE}::StorageProvider + ?Sized>(provider: &{p}) -> {CORE}::{builder}<'_, {name}, {p}>"
            ),
            |w| w.line(&format!("{CORE}::{builder}::new(provider)")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_query_core::{DefaultValue, ProviderBinding, SemanticType};

    fn user() -> ModelDescriptor {
        let mut id = FieldDescriptor::new("id", SemanticType::Long, "i64");
        id.column_name = "_id".into();
        id.is_primary_key = true;
        id.is_auto_increment = true;
        let mut name = FieldDescriptor::new("table_name", SemanticType::Text, "String");
        name.is_not_null = true;
        let mut bio = FieldDescriptor::new("bio", SemanticType::Text, "Option<String>");
        bio.nullable = true;
        let mut nick = FieldDescriptor::new("nick", SemanticType::Text, "Option<String>");
        nick.nullable = true;
        nick.is_not_null = true;
        let mut kind = FieldDescriptor::new("type", SemanticType::Integer, "i32");
        kind.default_value = Some(DefaultValue::Integer(1));
        kind.is_indexed = true;

        ModelDescriptor {
            name: "UserProfile".into(),
            table_name: "profiles".into(),
            package_path: "crate::models".into(),
            fields: vec![id, name, bio, nick, kind],
            foreign_keys: vec![],
            unique_groups: vec![],
            provider: ProviderBinding::local("App"),
            init_hooks: vec!["on_loaded".into()],
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(snake_case("UserProfile"), "user_profile");
        assert_eq!(snake_case("HTTPLog"), "httplog");
        assert_eq!(module_name("Type"), "r#type");
        assert_eq!(module_name("Self"), "self_model");
    }

    #[test]
    fn test_constants_avoid_reserved_names() {
        let constants = column_constants(&user().fields);
        assert_eq!(constants, vec!["ID", "TABLE_NAME_COLUMN", "BIO", "NICK", "TYPE"]);
    }

    #[test]
    fn test_render_model() {
        let text = render_model(&user(), &GeneratorOptions::default());
        assert!(text.starts_with("/// Table `profiles` for `UserProfile`.\npub mod user_profile {\n"));
        assert!(text.contains("    use crate::models::UserProfile;\n"));
        assert!(text.contains("pub const PRIMARY_KEY: &str = ID;"));
        assert!(text.contains("pub const COLUMNS: &[&str] = &[ID, TABLE_NAME_COLUMN, BIO, NICK, TYPE];"));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS profiles"));
        assert!(text.contains("idx_profiles_type"));
        // optional column left out when empty, required optional always sent
        assert!(text.contains("if self.bio.is_some() {"));
        assert!(!text.contains("if self.nick.is_some()"));
        assert!(text.contains("values.put(NICK, ::model_query_core::ToValue::to_value(&self.nick));"));
        assert!(text.contains("model.r#type = row.get(TYPE)?;"));
        assert!(text.contains("let key = row.value(ID)?;"));
        assert!(text.contains("if !key.is_unset_key() {"));
        assert!(text.contains("        model.on_loaded();\n"));
        assert!(text.contains(
            "pub fn count<P: ::model_query_core::StorageProvider + ?Sized>(provider: &P) -> ::model_query_core::Count<'_, UserProfile, P> {"
        ));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_entry_points_optional() {
        let options = GeneratorOptions {
            emit_entry_points: false,
            ..GeneratorOptions::default()
        };
        let text = render_model(&user(), &options);
        assert!(!text.contains("pub fn select"));
    }
}
