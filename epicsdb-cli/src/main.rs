use clap::{Parser, Subcommand, ValueEnum};
use epicsdb::manifest::{build, parse_manifest};
use epicsdb::schema::parse_schema_files;
use epicsdb::{Database, SchemaDefinition};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

/// epicsdb: generate EPICS database files from a build manifest
#[derive(Parser)]
#[command(name = "epicsdb", version, about)]
struct Cli {
    /// Output format for reports
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Build a database file from a manifest
    Build {
        /// Record type schema files (repeatable)
        #[arg(long = "schema", required = true)]
        schemas: Vec<PathBuf>,
        /// Build manifest
        #[arg(long)]
        manifest: PathBuf,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Write records sorted by name instead of creation order
        #[arg(long)]
        alphabetical: bool,
    },

    /// List record types, or the fields of one record type
    Types {
        /// Record type schema files (repeatable)
        #[arg(long = "schema", required = true)]
        schemas: Vec<PathBuf>,
        /// Record type to describe
        record_type: Option<String>,
    },

    /// Validate a manifest against the schema without writing anything
    Check {
        /// Record type schema files (repeatable)
        #[arg(long = "schema", required = true)]
        schemas: Vec<PathBuf>,
        /// Build manifest
        #[arg(long)]
        manifest: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build {
            schemas,
            manifest,
            output,
            alphabetical,
        } => {
            let db = load(&schemas, &manifest)?;
            match output {
                Some(path) => db.write_records(&path, alphabetical)?,
                None => print!("{}", db.render(alphabetical)?),
            }
        }

        Command::Types {
            schemas,
            record_type,
        } => {
            let schema = parse_schema_files(schemas.as_slice())?;
            let report = match record_type {
                Some(name) => describe_record_type(&schema, &name)?,
                None => {
                    let names: Vec<&String> = schema.record_types.keys().collect();
                    serde_json::json!({ "record_types": names })
                }
            };
            print_output(&report, &cli.format)?;
        }

        Command::Check { schemas, manifest } => {
            let db = load(&schemas, &manifest)?;
            // Rendering runs the validation postponed by deferred values
            db.render(false)?;
            print_output(
                &serde_json::json!({ "ok": true, "records": db.records().len() }),
                &cli.format,
            )?;
        }
    }

    Ok(())
}

fn load(schemas: &[PathBuf], manifest: &Path) -> Result<Database, Box<dyn std::error::Error>> {
    let schema = parse_schema_files(schemas)?;
    let manifest = parse_manifest(manifest)?;
    let mut db = Database::new(Arc::new(schema));
    build(&mut db, &manifest)?;
    Ok(db)
}

fn describe_record_type(
    schema: &SchemaDefinition,
    name: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let record_type = schema
        .record_type(name)
        .ok_or_else(|| epicsdb::EpicsDbError::UnknownRecordType(name.to_string()))?;
    Ok(serde_json::json!({
        "record_type": name,
        "fields": record_type.fields,
        "devices": record_type.devices,
    }))
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
