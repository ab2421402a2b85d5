use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use metafields::{Entity, EntityType, SchemaDocument, SerializeOptions, TypeCatalog, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "metafield-tool")]
#[command(about = "Developer tooling for metafields declaration documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the columns and virtual fields of a type.
    Fields {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        entity: String,
    },
    /// Build an entity from `--set` assignments and print it.
    Render {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        entity: String,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        except: Vec<String>,
        #[arg(long)]
        only: Vec<String>,
    },
    /// Build an entity from `--set` assignments and report validation errors.
    Validate {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        entity: String,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Xml,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Fields { schema, entity } => {
            let catalog = load_catalog(&schema)?;
            print_fields(catalog.require(&entity)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Render {
            schema,
            entity,
            assignments,
            format,
            except,
            only,
        } => {
            let entity = build_entity(&schema, &entity, &assignments)?;
            let mut options = SerializeOptions::new().except_all(except);
            if !only.is_empty() {
                options = options.only(only);
            }
            render(&entity, format, &options)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate {
            schema,
            entity,
            assignments,
        } => {
            let mut entity = build_entity(&schema, &entity, &assignments)?;
            if entity.is_valid() {
                println!("{} is valid", entity.type_name());
                return Ok(ExitCode::SUCCESS);
            }

            println!("{} is invalid:", entity.type_name());
            for message in entity.errors().full_messages() {
                println!("  {}", message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_catalog(path: &Path) -> Result<TypeCatalog> {
    let document = SchemaDocument::from_path(path)?;
    document
        .build_catalog()
        .with_context(|| format!("Failed to build types from '{}'", path.display()))
}

fn build_entity(schema: &Path, name: &str, assignments: &[String]) -> Result<Entity> {
    let catalog = load_catalog(schema)?;
    let mut entity = catalog.new_entity(name)?;
    let pairs = parse_assignments(assignments)?;
    entity
        .assign_attributes(pairs)
        .with_context(|| format!("Failed to assign attributes to {}", name))?;
    Ok(entity)
}

/// `key=value` pairs, values kept as text the way form input arrives.
fn parse_assignments(input: &[String]) -> Result<Vec<(String, Value)>> {
    input
        .iter()
        .map(|assignment| -> Result<(String, Value)> {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                anyhow!("Invalid assignment '{}'. Expected format: key=value", assignment)
            })?;
            let key = key.trim();
            if key.is_empty() {
                bail!("Invalid assignment '{}': empty key", assignment);
            }
            Ok((key.to_string(), Value::from(value)))
        })
        .collect()
}

fn render(entity: &Entity, format: Format, options: &SerializeOptions) -> Result<()> {
    match format {
        Format::Json => {
            let json = entity.as_json(options)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Format::Xml => print!("{}", entity.to_xml(options)?),
    }
    Ok(())
}

fn print_fields(entity_type: &Arc<EntityType>) {
    println!("{}", entity_type.name());
    if let Some(parent) = entity_type.parent() {
        println!("  extends {}", parent.name());
    }

    for column in entity_type.schema().columns() {
        let nullable = if column.nullable { "" } else { " not null" };
        println!("  column {}: {}{}", column.name, column.data_type, nullable);
    }

    let registry = entity_type.registry();
    for spec in registry.fields() {
        let data_type = spec
            .data_type()
            .map(|ty| ty.to_string())
            .unwrap_or_else(|| "ANY".to_string());

        let mut notes = Vec::new();
        if spec.allows_nil() {
            notes.push("allow_nil".to_string());
        }
        if spec.allows_blank() {
            notes.push("allow_blank".to_string());
        }
        if let Some(default) = spec.default() {
            notes.push(format!("default={}", default));
        }
        let rules = entity_type.validations().rule_names(spec.name());
        if !rules.is_empty() {
            notes.push(format!("rules={}", rules.join(",")));
        }
        if !registry.own_fields().iter().any(|own| own.name() == spec.name()) {
            notes.push("inherited".to_string());
        }

        if notes.is_empty() {
            println!("  field {}: {}", spec.name(), data_type);
        } else {
            println!("  field {}: {} ({})", spec.name(), data_type, notes.join(", "));
        }
    }
}
