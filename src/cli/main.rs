//! Node type YAML command-line tool
//!
//! Validates, normalizes and documents node type YAML files.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nodetype_yaml::cli::commands::{fields, normalize, validate};

/// Node type YAML command-line tool
#[derive(Parser, Debug)]
#[command(name = "nodetype-cli")]
#[command(version, about = "Validate and normalize node type YAML documents")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report every problem in a document
    Validate {
        /// Input file, or `-` for stdin
        input: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a document in canonical form
    Normalize {
        /// Input file, or `-` for stdin
        input: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Import configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the legal keys of each entity kind
    Fields {
        /// document, node-type, child or property
        kind: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nodetype_yaml=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    match args.command {
        Command::Validate { input, json } => validate::handle_validate(&input, json)
            .with_context(|| format!("validating {}", input)),
        Command::Normalize {
            input,
            output,
            config,
        } => normalize::handle_normalize(&input, output.as_deref(), config.as_deref())
            .map(|()| true)
            .with_context(|| format!("normalizing {}", input)),
        Command::Fields { kind } => fields::handle_fields(kind.as_deref()).map(|()| true).map_err(Into::into),
    }
}
