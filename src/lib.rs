//! soundevent: a validated data model and geometry toolkit for bioacoustic
//! annotations.
//!
//! Sound events are regions of a recording's time-frequency plane. This
//! crate describes them with typed geometries, relates geometries to each
//! other and to spectrogram grids, and carries the surrounding entity model
//! (recordings, clips, sequences, annotations, predictions) to and from a
//! JSON document format.
//!
//! # Modules
//!
//! - [`geometry`]: geometry variants, bounds, comparisons and index mapping
//! - [`data`]: entities and their descriptors (tags, features, notes)
//! - [`document`]: encoding entity graphs as documents and back
//! - [`error`]: error types for soundevent operations

pub mod data;
pub mod document;
pub mod error;
pub mod geometry;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

use document::{AnyEntity, EntityKind};
pub use error::{ErrorKind, Result, SoundEventError};

/// The soundevent CLI application.
#[derive(Parser)]
#[command(name = "soundevent")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Decode a document and report whether it is valid.
    Validate(ValidateArgs),
    /// Summarize the entities and sound events in a document.
    Inspect(InspectArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Document file to validate.
    input: PathBuf,

    /// Entity kind the document must hold (e.g. 'clip_annotation').
    #[arg(long)]
    kind: Option<EntityKind>,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Document file to inspect.
    input: PathBuf,

    /// Output format for the summary.
    #[arg(long, value_enum, default_value = "text", env = "SOUNDEVENT_OUTPUT")]
    output: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Run the soundevent CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        None => {
            println!("soundevent {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Validated geometry and annotation documents for bioacoustics.");
            println!();
            println!("Run 'soundevent --help' for usage information.");
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<Vec<AnyEntity>> {
    let value = document::read_document(path)?;
    document::decode_any(&value)
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    let entities = load(&args.input)?;
    let found = entities.first().map(AnyEntity::kind);

    if let (Some(expected), Some(found)) = (args.kind, found) {
        if expected != found {
            return Err(SoundEventError::validation(
                "document.kind",
                format!("expected {expected}, found {found}"),
            ));
        }
    }

    let noun = if entities.len() == 1 { "entity" } else { "entities" };
    match found {
        Some(kind) => println!(
            "{}: valid ({} {kind} {noun})",
            args.input.display(),
            entities.len()
        ),
        None => println!("{}: valid (empty)", args.input.display()),
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let entities = load(&args.input)?;

    match args.output {
        OutputFormat::Json => {
            let summary: Vec<Value> = entities.iter().map(entity_summary).collect();
            println!("{}", document::to_json_string(&Value::Array(summary))?);
        }
        OutputFormat::Text => {
            println!("{}: {} entities", args.input.display(), entities.len());
            for entity in &entities {
                let events = entity.sound_events();
                println!("  {} ({} sound events)", entity.kind(), events.len());
                for event in events {
                    let bounds = event.bounds();
                    let frequency = if bounds.is_time_only() {
                        "full spectrum".to_string()
                    } else {
                        format!("{}-{} Hz", bounds.low_freq(), bounds.high_freq())
                    };
                    println!(
                        "    {} {}: {}-{} s, {frequency}",
                        event.id(),
                        event.geometry().variant_tag(),
                        bounds.start_time(),
                        bounds.end_time(),
                    );
                }
            }
        }
    }
    Ok(())
}

fn entity_summary(entity: &AnyEntity) -> Value {
    let events: Vec<Value> = entity
        .sound_events()
        .into_iter()
        .map(|event| {
            json!({
                "uuid": event.id().to_string(),
                "geometry": event.geometry().variant_tag().as_str(),
                "bounds": event.bounds(),
            })
        })
        .collect();
    json!({ "kind": entity.kind().as_str(), "sound_events": events })
}
