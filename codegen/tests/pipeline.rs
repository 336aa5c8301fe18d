//! End-to-end tests: declaration files on disk through to generated sources.

use std::fs;
use std::path::{Path, PathBuf};

use model_query_codegen::{
    CodegenError, ExtractionError, GeneratorConfig, GeneratorOptions, generate, generate_to_dir,
    load_registry, run_config,
};
use model_query_core::{CountStrategy, ProviderKind};

const MODELS: &str = r#"
providers:
  - name: SharedDatabase
    extends: LocalDatabaseProvider
  - name: AppDatabase
    extends: SharedDatabase
  - name: Contacts
    extends: ContentDatabaseProvider
    authority: com.example.contacts
    count: count_column
models:
  - name: Entity
    abstract: true
    package: crate::models
    members:
      - name: id
        type: i64
        field: { primary_key: true, auto_increment: true, column: _id }
  - name: User
    extends: Entity
    table: users
    provider: AppDatabase
    members:
      - { name: username, type: String, field: { not_null: true, unique: true } }
      - { name: rating, type: f64, field: { default: 2.5 } }
      - { name: avatar, type: Option<Vec<u8>>, field: {} }
      - { name: after_load, init: true }
  - name: Post
    package: crate::models
    table: posts
    provider: AppDatabase
    foreign_keys:
      - { local_column: user_id, target_table: users, target_column: _id }
    members:
      - { name: slug, type: String, field: { primary_key: true } }
      - { name: user_id, type: i64, field: { index: true } }
  - name: Contact
    extends: Entity
    table: contacts
    provider: Contacts
    members:
      - { name: display_name, type: Option<String>, field: {} }
"#;

fn write_models(dir: &Path) -> PathBuf {
    let path = dir.join("models.yaml");
    fs::write(&path, MODELS).unwrap();
    path
}

#[test]
fn test_generation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let models = write_models(dir.path());
    let out = dir.path().join("gen");
    let options = GeneratorOptions::default();

    let first = generate_to_dir([&models], &out, &options).unwrap();
    assert_eq!(first.written.len(), 2);
    let app_first = fs::read(out.join("app_database.rs")).unwrap();
    let contacts_first = fs::read(out.join("contacts.rs")).unwrap();

    let second = generate_to_dir([&models], &out, &options).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 2);
    assert_eq!(fs::read(out.join("app_database.rs")).unwrap(), app_first);
    assert_eq!(fs::read(out.join("contacts.rs")).unwrap(), contacts_first);
}

#[test]
fn test_providers_classified_through_chains() {
    let dir = tempfile::tempdir().unwrap();
    let registry = load_registry([write_models(dir.path())]).unwrap();

    let user = registry.model("User").unwrap();
    assert_eq!(user.provider.kind, ProviderKind::Local);
    assert_eq!(user.provider.name, "AppDatabase");
    assert_eq!(user.columns(), vec!["_id", "username", "rating", "avatar"]);
    assert_eq!(user.init_hooks, vec!["after_load".to_string()]);

    let contact = registry.model("Contact").unwrap();
    assert_eq!(contact.provider.kind, ProviderKind::Content);
    assert_eq!(contact.provider.count, CountStrategy::CountColumn);
    assert!(registry.model("Entity").is_none());
}

#[test]
fn test_generated_source_shape() {
    let dir = tempfile::tempdir().unwrap();
    let registry = load_registry([write_models(dir.path())]).unwrap();
    let files = generate(&registry, &GeneratorOptions::default()).unwrap();
    let app = &files[0].contents;

    assert!(app.starts_with("// @generated by model-query. Do not edit.\n"));
    assert!(app.contains("// fingerprint: sha256:"));
    assert!(app.contains("pub const TABLE_NAMES: &[&str] = &[\"users\", \"posts\"];"));
    assert!(app.contains("FOREIGN KEY (user_id) REFERENCES users(_id)"));
    assert!(app.contains("CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts(user_id)"));
    assert!(app.contains("pub mod post {"));
    assert!(app.contains("pub mod user {"));
    assert!(app.contains("model.after_load();"));
    assert!(app.contains("if self.avatar.is_some() {"));
}

#[test]
fn test_two_primary_keys_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(
        &path,
        r#"
providers:
  - { name: App, extends: LocalDatabaseProvider }
models:
  - name: Pair
    package: crate::models
    provider: App
    members:
      - { name: left, type: i64, field: { primary_key: true } }
      - { name: right, type: i64, field: { primary_key: true } }
"#,
    )
    .unwrap();

    let out = dir.path().join("gen");
    let err = generate_to_dir([&path], &out, &GeneratorOptions::default()).unwrap_err();
    let CodegenError::Extraction(errors) = err else {
        panic!("expected extraction error, got {err:?}");
    };
    assert_eq!(
        errors.0,
        vec![ExtractionError::MultiplePrimaryKeys {
            model: "Pair".into(),
            fields: vec!["left".into(), "right".into()],
        }]
    );
    assert!(!out.exists());
}

#[test]
fn test_run_config_resolves_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let config_path = dir.path().join("model-query.yml");
    GeneratorConfig::new(vec!["models.yaml".into()], "generated")
        .save(&config_path)
        .unwrap();

    let report = run_config(&config_path).unwrap();
    assert_eq!(
        report.written,
        vec![
            dir.path().join("generated").join("app_database.rs"),
            dir.path().join("generated").join("contacts.rs"),
        ]
    );
}

#[test]
fn test_run_config_without_declarations() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("model-query.yml");
    GeneratorConfig::new(vec![], "generated")
        .save(&config_path)
        .unwrap();
    assert!(matches!(
        run_config(&config_path),
        Err(CodegenError::InvalidConfig(_))
    ));
}
