//! Command-line validation of JSON documents against shape schemas.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use shapecheck::{Options, Value, Violation, define_type, validate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate a JSON document against a shape schema
#[derive(Parser, Debug)]
#[command(name = "validate-shape")]
#[command(about = "Validate JSON documents against shape schemas", long_about = None)]
struct Args {
    /// Path to the JSON schema fragment
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Path to the JSON document to validate
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Display name for the schema in violation messages
    #[arg(long, default_value = "Schema")]
    name: String,

    /// Accept keys the schema does not declare and ignore missing ones
    #[arg(long)]
    lenient: bool,

    /// Report only the first violation
    #[arg(long)]
    fatal: bool,

    /// Emit violations as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "validate_shape=info,shapecheck=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Read and compile the schema fragment
    let fragment = read_json(&args.schema)?;
    let schema = define_type(&args.name, Value::from_json(fragment)).map_err(|e| {
        anyhow::anyhow!("Failed to compile schema {}: {}", args.schema.display(), e)
    })?;

    // Read the document
    let document = read_json(&args.input)?;
    let element = Value::from_json(document);

    let options = Options {
        strict: !args.lenient,
        fatal: args.fatal,
    };
    tracing::debug!(
        "validating {} against schema '{}'",
        args.input.display(),
        schema.name()
    );

    let report = validate(&schema).report(&element, options);
    if report.is_empty() {
        println!("✓ Validation successful");
        println!("  Input: {}", args.input.display());
        println!("  Schema: {}", args.schema.display());
        return Ok(());
    }

    // The walk order is deterministic, so the first collected violation is
    // the one a fatal walk would have stopped at.
    let shown: Vec<&Violation> = if args.fatal {
        report.iter().take(1).collect()
    } else {
        report.iter().collect()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        for violation in &shown {
            eprintln!("✖ {}", violation);
        }
        eprintln!();
        eprintln!("{} violation(s) found", shown.len());
    }
    process::exit(1);
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}
