use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use model_query_codegen::{
    GeneratorOptions, OutputFormat, WriteReport, format_registry, generate_to_dir, load_registry,
    run_config,
};
use model_query_core::{DdlOptions, ModelDescriptor, ProviderKind, Registry};
use model_query_sqlite::{LocalDatabase, SchemaMigration, SchemaPlan};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "model-query")]
#[command(about = "Typed SQL query code generation and schema management", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate Rust sources from model declarations.
    Generate(GenerateArgs),
    /// Validate model declarations without writing anything.
    Check(InputArgs),
    /// Print the extracted model metadata.
    Inspect(InspectArgs),
    /// Print the CREATE statements for local providers.
    Ddl(DdlArgs),
    /// Create, drop or inspect model tables in a SQLite database.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Declaration files (YAML or JSON).
    #[arg(long = "input", short = 'i', required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Generator configuration file; replaces --input and --output.
    #[arg(long, conflicts_with_all = ["inputs", "output"])]
    config: Option<PathBuf>,
    /// Declaration files (YAML or JSON).
    #[arg(long = "input", short = 'i', num_args = 1..)]
    inputs: Vec<PathBuf>,
    /// Output directory for generated files.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Omit IF NOT EXISTS from generated DDL.
    #[arg(long)]
    no_if_not_exists: bool,
    /// Skip CREATE INDEX statements.
    #[arg(long)]
    no_indexes: bool,
    /// Skip the per-model select/insert/update/delete/count functions.
    #[arg(long)]
    no_entry_points: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
    /// Write to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DdlArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Only print tables of this provider.
    #[arg(long)]
    provider: Option<String>,
    /// Omit IF NOT EXISTS.
    #[arg(long)]
    no_if_not_exists: bool,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create tables and indexes.
    Up(MigrateTarget),
    /// Drop tables in reverse creation order.
    Down(MigrateTarget),
    /// Drop and recreate tables.
    Refresh(MigrateTarget),
    /// Show which tables exist and their row counts.
    Status(MigrateStatusArgs),
}

#[derive(Debug, Args)]
struct MigrateTarget {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    #[command(flatten)]
    input: InputArgs,
    /// Only manage tables of this provider.
    #[arg(long)]
    provider: Option<String>,
}

#[derive(Debug, Args)]
struct MigrateStatusArgs {
    #[command(flatten)]
    target: MigrateTarget,
    /// Print the status as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(log_level(&cli)) {
        eprintln!("warning: {err}");
    }

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Ddl(args) => run_ddl(args),
        Command::Migrate(args) => run_migrate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn log_level(cli: &Cli) -> Level {
    if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    }
}

fn init_tracing(level: Level) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

fn load(inputs: &[PathBuf]) -> Result<Registry, String> {
    load_registry(inputs).map_err(|e| format!("failed to load declarations: {e}"))
}

// ---------------------------------------------------------------------------
// generate / check / inspect / ddl
// ---------------------------------------------------------------------------

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let report = match args.config {
        Some(config) => run_config(&config)
            .map_err(|e| format!("generation from '{}' failed: {e}", config.display()))?,
        None => {
            if args.inputs.is_empty() {
                return Err("either --config or --input is required".to_string());
            }
            let output = args
                .output
                .ok_or_else(|| "--output is required with --input".to_string())?;
            let options = GeneratorOptions {
                if_not_exists: !args.no_if_not_exists,
                emit_indexes: !args.no_indexes,
                emit_entry_points: !args.no_entry_points,
                ..GeneratorOptions::default()
            };
            generate_to_dir(&args.inputs, &output, &options)
                .map_err(|e| format!("generation failed: {e}"))?
        }
    };
    print_report(&report);
    Ok(())
}

fn print_report(report: &WriteReport) {
    for path in &report.written {
        println!("wrote {}", path.display());
    }
    println!(
        "{} written, {} unchanged",
        report.written.len(),
        report.unchanged.len()
    );
}

fn run_check(args: InputArgs) -> Result<(), String> {
    let registry = load(&args.inputs)?;
    println!(
        "ok: {} provider(s), {} model(s)",
        registry.providers().count(),
        registry.len()
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let registry = load(&args.input.inputs)?;
    let rendered = format_registry(&registry, args.format)
        .map_err(|e| format!("failed to format registry: {e}"))?;
    match args.output {
        Some(path) => fs::write(&path, rendered)
            .map_err(|e| format!("failed to write '{}': {e}", path.display())),
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

fn run_ddl(args: DdlArgs) -> Result<(), String> {
    let registry = load(&args.input.inputs)?;
    let options = GeneratorOptions {
        if_not_exists: !args.no_if_not_exists,
        ..GeneratorOptions::default()
    }
    .ddl();
    let plan = local_plan(&registry, args.provider.as_deref(), &options)?;
    for statement in plan.statements() {
        println!("{statement};");
    }
    Ok(())
}

/// Local models to manage, optionally restricted to one provider.
fn local_models<'r>(
    registry: &'r Registry,
    provider: Option<&str>,
) -> Result<Vec<&'r ModelDescriptor>, String> {
    match provider {
        Some(name) => {
            let binding = registry
                .provider(name)
                .ok_or_else(|| format!("unknown provider '{name}'"))?;
            if binding.kind != ProviderKind::Local {
                return Err(format!(
                    "provider '{name}' is a {} provider; only local providers have tables",
                    binding.kind
                ));
            }
            Ok(registry.models_for_provider(name))
        }
        None => Ok(registry
            .models()
            .filter(|m| m.provider.kind == ProviderKind::Local)
            .collect()),
    }
}

fn local_plan(
    registry: &Registry,
    provider: Option<&str>,
    options: &DdlOptions,
) -> Result<SchemaPlan, String> {
    let models = local_models(registry, provider)?;
    if models.is_empty() {
        return Err("no local models found".to_string());
    }
    Ok(SchemaPlan::from_descriptors(&models, options))
}

// ---------------------------------------------------------------------------
// migrate command
// ---------------------------------------------------------------------------

fn run_migrate(args: MigrateArgs) -> Result<(), String> {
    match args.operation {
        MigrateOperation::Up(target) => run_migrate_up(target),
        MigrateOperation::Down(target) => run_migrate_down(target),
        MigrateOperation::Refresh(target) => run_migrate_refresh(target),
        MigrateOperation::Status(args) => run_migrate_status(args),
    }
}

fn open_target(target: &MigrateTarget) -> Result<(LocalDatabase, SchemaPlan), String> {
    let registry = load(&target.input.inputs)?;
    let plan = local_plan(
        &registry,
        target.provider.as_deref(),
        &GeneratorOptions::default().ddl(),
    )?;
    let db = LocalDatabase::open(&target.db)
        .map_err(|e| format!("failed to open database '{}': {e}", target.db.display()))?;
    Ok((db, plan))
}

fn migration(db: &LocalDatabase) -> Result<SchemaMigration<'_>, String> {
    SchemaMigration::new(db.connection())
        .map_err(|e| format!("failed to initialize migration: {e}"))
}

fn run_migrate_up(target: MigrateTarget) -> Result<(), String> {
    let (db, plan) = open_target(&target)?;
    migration(&db)?
        .up(&plan)
        .map_err(|e| format!("migration up failed: {e}"))?;
    println!(
        "Migration up complete. {} table(s) created in '{}'.",
        plan.tables().len(),
        target.db.display()
    );
    Ok(())
}

fn run_migrate_down(target: MigrateTarget) -> Result<(), String> {
    let (db, plan) = open_target(&target)?;
    migration(&db)?
        .down(&plan)
        .map_err(|e| format!("migration down failed: {e}"))?;
    println!(
        "Migration down complete. {} table(s) dropped from '{}'.",
        plan.tables().len(),
        target.db.display()
    );
    Ok(())
}

fn run_migrate_refresh(target: MigrateTarget) -> Result<(), String> {
    let (db, plan) = open_target(&target)?;
    migration(&db)?
        .refresh(&plan)
        .map_err(|e| format!("refresh failed: {e}"))?;
    println!(
        "Refresh complete. {} table(s) recreated in '{}'.",
        plan.tables().len(),
        target.db.display()
    );
    Ok(())
}

fn run_migrate_status(args: MigrateStatusArgs) -> Result<(), String> {
    let (db, plan) = open_target(&args.target)?;
    let status = migration(&db)?
        .status(&plan)
        .map_err(|e| format!("failed to get migration status: {e}"))?;
    if args.json {
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| format!("failed to serialize status: {e}"))?;
        println!("{json}");
        return Ok(());
    }
    println!("Migration Status:");
    println!(
        "  Tables exist: {}",
        if status.tables_exist() { "yes" } else { "no" }
    );
    for table in &status.tables {
        if table.exists {
            println!("  {}: {} row(s)", table.name, table.rows);
        } else {
            println!("  {}: missing", table.name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_flags() {
        let level = |args: &[&str]| log_level(&Cli::parse_from(args));
        assert_eq!(level(&["model-query", "check", "-i", "m.yaml"]), Level::INFO);
        assert_eq!(level(&["model-query", "-v", "check", "-i", "m.yaml"]), Level::DEBUG);
        assert_eq!(level(&["model-query", "check", "-q", "-i", "m.yaml"]), Level::WARN);
        assert!(Cli::try_parse_from(["model-query", "-v", "-q", "check", "-i", "m.yaml"]).is_err());
    }

    #[test]
    fn test_second_tracing_init_is_reported() {
        assert!(init_tracing(Level::WARN).is_ok());
        let err = init_tracing(Level::DEBUG).unwrap_err();
        assert!(err.starts_with("failed to initialize logging"));
    }
}
