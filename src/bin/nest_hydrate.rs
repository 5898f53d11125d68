//! nest-hydrate: Fold flat join rows into nested entities
//!
//! Usage:
//!   # Rows as a JSON array in a file, pretty JSON array on stdout
//!   nest-hydrate --schema album.schema.json rows.json
//!
//!   # NDJSON rows from stdin, one entity per output line
//!   cat rows.jsonl | nest-hydrate --schema album.schema.json --ndjson --lines
//!
//!   # Null nested-many identities clear the collection instead of keeping it
//!   nest-hydrate --schema album.schema.json --clear-on-null rows.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use nesthydrate::{ArrayWriter, Hydrator, LinesWriter, NullCollectionPolicy, Schema, SchemaDocument};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nest-hydrate")]
#[command(about = "Fold flat join rows into nested, deduplicated entities", long_about = None)]
struct Args {
    /// Schema document: {"properties": [...], "config": {...}}
    #[arg(long, short = 's', value_name = "SCHEMA")]
    schema: String,

    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one row per line)
    #[arg(long)]
    ndjson: bool,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Write one entity per line instead of a single array
    #[arg(long)]
    lines: bool,

    /// Maximum schema nesting depth (default: 10)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Set nested collections to null on rows with a null identity
    #[arg(long)]
    clear_on_null: bool,

    /// Separator for nested scope names in errors and logs (default: ".")
    #[arg(long)]
    separator: Option<String>,

    /// Log hydration progress to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let schema = load_schema(&args)?;

    let reader = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(
            File::open(file_path).with_context(|| format!("Failed to open input: {}", file_path))?,
        )) as Box<dyn Read>
    } else {
        Box::new(std::io::stdin()) as Box<dyn Read>
    };

    let mut hydrator = Hydrator::new(&schema);
    if args.ndjson {
        process_ndjson(reader, &mut hydrator)?;
    } else {
        process_document(reader, &mut hydrator)?;
    }

    info!(rows = hydrator.rows_seen(), entities = hydrator.len(), "hydrated input");
    let entities = hydrator.finish();

    let stdout = std::io::stdout().lock();
    if args.lines {
        let mut writer = LinesWriter::new(stdout);
        writer.write_entities(&entities)?;
        writer.flush()?;
    } else {
        let mut writer = if args.compact {
            ArrayWriter::compact(stdout)
        } else {
            ArrayWriter::new(stdout)
        };
        writer.write_entities(&entities)?;
        writer.flush()?;
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read the schema document and apply command-line overrides
fn load_schema(args: &Args) -> Result<Schema> {
    let text = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("Failed to read schema: {}", args.schema))?;
    let mut document = SchemaDocument::from_json(&text).context("Failed to parse schema")?;

    if let Some(depth) = args.max_depth {
        document.config.max_depth = depth;
    }
    if args.clear_on_null {
        document.config.null_collection = NullCollectionPolicy::Clear;
    }
    if let Some(sep) = &args.separator {
        document.config.scope_separator = sep.clone();
    }

    debug!(config = ?document.config, "loaded schema document");
    document.into_schema().context("Invalid schema")
}

/// Hydrate a JSON array of rows (or a single row) using SIMD-accelerated parsing
fn process_document(reader: Box<dyn Read>, hydrator: &mut Hydrator<'_>) -> Result<()> {
    let mut content = Vec::new();
    let mut buf_reader = BufReader::new(reader);
    buf_reader.read_to_end(&mut content)?;

    // simd-json parses in place, keep the original bytes for the fallback
    let mut scratch = content.clone();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(Value::Array(rows)) => hydrator.extend(&rows)?,
        Ok(row) => hydrator.push(&row)?,
        Err(err) => {
            // Fallback to NDJSON for input that is not a single document
            debug!(error = %err, "input is not a single JSON document, reading as NDJSON");
            process_ndjson(Box::new(content.as_slice()), hydrator)?;
        }
    }

    Ok(())
}

/// Hydrate a stream of concatenated or newline-delimited JSON rows
fn process_ndjson(reader: Box<dyn Read + '_>, hydrator: &mut Hydrator<'_>) -> Result<()> {
    let stream = serde_json::Deserializer::from_reader(BufReader::new(reader)).into_iter::<Value>();

    for result in stream {
        let row = result.context("Failed to parse JSON row")?;
        hydrator.push(&row)?;
    }

    Ok(())
}
