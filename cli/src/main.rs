use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use specql_core::{Dialect, NamingStrategy, PipelineConfig, RelationKind, Schema, TableNaming};
use specql_ddl::{DdlError, Generation, OutputFormat, format_generation, generate};
use specql_extract::{ResolvedSchemas, extract_with_naming, load_document};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI-specific dialect enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliDialect {
    Postgresql,
    Mysql,
    Mariadb,
    Sqlite,
    Mssql,
}

impl From<CliDialect> for Dialect {
    fn from(dialect: CliDialect) -> Self {
        match dialect {
            CliDialect::Postgresql => Self::PostgreSql,
            CliDialect::Mysql => Self::MySql,
            CliDialect::Mariadb => Self::MariaDb,
            CliDialect::Sqlite => Self::Sqlite,
            CliDialect::Mssql => Self::MsSql,
        }
    }
}

/// CLI-specific naming strategy enum.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliNaming {
    /// Table name from the schema's `title`.
    SchemaTitle,
    /// Table name from the schema key.
    SchemaId,
    /// Table name from `custom_names` in the config file.
    Custom,
}

impl From<CliNaming> for NamingStrategy {
    fn from(naming: CliNaming) -> Self {
        match naming {
            CliNaming::SchemaTitle => Self::SchemaTitle,
            CliNaming::SchemaId => Self::SchemaId,
            CliNaming::Custom => Self::Custom,
        }
    }
}

/// Output format for `inspect`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum InspectFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "specql")]
#[command(version, about = "Generate relational DDL from OpenAPI component schemas")]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate DDL for one dialect.
    Generate(GenerateArgs),
    /// Print extracted schemas and resolved relations.
    Inspect(InspectArgs),
    /// Write a default configuration file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// OpenAPI document (JSON or YAML).
    #[arg(long)]
    spec: PathBuf,
    /// Pipeline configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target dialect (overrides the config file).
    #[arg(long)]
    dialect: Option<CliDialect>,
    /// Table naming strategy (overrides the config file).
    #[arg(long)]
    naming: Option<CliNaming>,
    /// Output format.
    #[arg(long, default_value = "sql")]
    format: OutputFormat,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Directory for per-table sample query files.
    #[arg(long)]
    queries: Option<PathBuf>,
    /// Print what would be written without touching the filesystem.
    #[arg(long)]
    dry_run: bool,
    /// Overwrite existing output files.
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// OpenAPI document (JSON or YAML).
    #[arg(long)]
    spec: PathBuf,
    /// Pipeline configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: InspectFormat,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Path of the configuration file to write.
    #[arg(long)]
    output: PathBuf,
    /// Dialect recorded in the new file.
    #[arg(long)]
    dialect: Option<CliDialect>,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Inspect(args) => run_inspect(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, String> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn load_spec(path: &Path) -> Result<serde_json::Value, String> {
    load_document(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dialect) = args.dialect {
        config.dialect = dialect.into();
    }
    if let Some(naming) = args.naming {
        config.naming_strategy = naming.into();
    }
    debug!(?config, "Effective configuration");

    let document = load_spec(&args.spec)?;
    let generation = generate(&document, &config).map_err(|err| {
        report_failure(&err);
        err.to_string()
    })?;
    report_findings(&generation);

    let mut rendered = format_generation(&generation, args.format).map_err(|e| e.to_string())?;
    if matches!(args.format, OutputFormat::Sql) {
        rendered = format!("{}{rendered}\n", script_header(&args.spec, config.dialect));
    }

    match &args.output {
        Some(path) if args.dry_run => {
            eprintln!("Dry run: would write '{}'.", path.display());
            print!("{rendered}");
        }
        Some(path) => {
            write_file(path, &rendered, args.force)?;
            eprintln!(
                "Wrote {} statement(s) for {} to '{}'.",
                generation.statements.len(),
                config.dialect,
                path.display()
            );
        }
        None => print!("{rendered}"),
    }

    if let Some(dir) = &args.queries {
        write_queries(&generation, dir, args.dry_run, args.force)?;
    }

    Ok(())
}

fn script_header(spec: &Path, dialect: Dialect) -> String {
    format!(
        "-- Generated by specql {PACKAGE_VERSION}\n-- Source: {}\n-- Dialect: {dialect}\n-- Generated at: {}\n\n",
        spec.display(),
        chrono::Utc::now().to_rfc3339()
    )
}

fn write_queries(
    generation: &Generation,
    dir: &Path,
    dry_run: bool,
    force: bool,
) -> Result<(), String> {
    let files = generation.queries();
    if dry_run {
        for file in &files {
            eprintln!(
                "Dry run: would write '{}'.",
                dir.join(&file.file_name).display()
            );
        }
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            dir.display()
        )
    })?;
    for file in &files {
        write_file(&dir.join(&file.file_name), &file.sql, force)?;
    }
    eprintln!(
        "Wrote {} query file(s) to '{}'.",
        files.len(),
        dir.display()
    );
    Ok(())
}

fn write_file(path: &Path, contents: &str, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, contents).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

/// Prints every dangling reference and malformed entry behind a failure.
fn report_failure(err: &DdlError) {
    match err {
        DdlError::Unresolved {
            dangling,
            malformed,
        } => {
            for reference in dangling {
                eprintln!("dangling: {reference}");
            }
            for entry in malformed {
                eprintln!("malformed: {entry}");
            }
        }
        DdlError::Invalid(errors) => {
            for error in errors {
                eprintln!("invalid: {error}");
            }
        }
        _ => {}
    }
}

fn report_findings(generation: &Generation) {
    for entry in &generation.malformed {
        eprintln!("malformed: {entry}");
    }
    for reference in &generation.dangling {
        eprintln!("dangling (dropped): {reference}");
    }
    for warning in &generation.warnings {
        eprintln!("warning: {warning}");
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let naming = TableNaming::from_config(&config);
    let document = load_spec(&args.spec)?;
    let resolved = extract_with_naming(&document, &config, &naming);

    let rendered = match args.format {
        InspectFormat::Text => inspect_text(&resolved, &naming),
        InspectFormat::Json => serde_json::to_string_pretty(&resolved.schemas)
            .map_err(|err| format!("Failed to serialize schemas: {err}"))?,
        InspectFormat::Yaml => serde_yaml::to_string(&resolved.schemas)
            .map_err(|err| format!("Failed to serialize schemas: {err}"))?,
    };
    println!("{rendered}");

    for entry in &resolved.malformed {
        eprintln!("malformed: {entry}");
    }
    for reference in &resolved.dangling {
        eprintln!("dangling: {reference}");
    }
    for error in &resolved.invalid {
        eprintln!("invalid: {error}");
    }

    Ok(())
}

fn inspect_text(resolved: &ResolvedSchemas, naming: &TableNaming) -> String {
    let mut lines = Vec::new();
    for schema in &resolved.schemas {
        lines.push(format!("{} (table {})", schema.name, naming.table_name(schema)));
        for property in &schema.properties {
            let mut line = format!("  {}: {}", property.name, property.ty);
            if let Some(format) = &property.format {
                line.push_str(&format!(" ({format})"));
            }
            if property.required {
                line.push_str(" required");
            }
            if property.is_unique() {
                line.push_str(" unique");
            }
            lines.push(line);
        }
        lines.extend(relation_lines(schema));
    }
    lines.push(format!("{} schema(s)", resolved.schemas.len()));
    lines.join("\n")
}

fn relation_lines(schema: &Schema) -> impl Iterator<Item = String> + '_ {
    schema.relations.iter().map(|relation| {
        let detail = match relation.kind {
            RelationKind::ManyToMany => format!(
                "via {}",
                relation.join_table.as_deref().unwrap_or("<unnamed>")
            ),
            RelationKind::OneToMany => "fk on target".to_string(),
            RelationKind::OneToOne | RelationKind::ManyToOne => {
                format!("fk {}", relation.foreign_key)
            }
        };
        format!(
            "  {} -> {} [{:?}, {detail}]",
            relation.property, relation.target_schema, relation.kind
        )
    })
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            args.output.display()
        ));
    }

    let mut config = PipelineConfig::default();
    if let Some(dialect) = args.dialect {
        config.dialect = dialect.into();
    }
    config
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!("Wrote default configuration to '{}'.", args.output.display());
    Ok(())
}
