//! # dealdoc CLI
//!
//! Command-line interface for dealdoc document text extraction.
//!
//! ## Commands
//!
//! - `dealdoc extract <PATH>` - Extract text from a PDF, DOCX, RTF or plain text file
//! - `dealdoc detect <PATH>` - Show the MIME type and format detected for a file
//! - `dealdoc serve` - Run the HTTP API (feature `api`)
//!
//! ## Examples
//!
//! ```bash
//! dealdoc extract term-sheet.pdf
//! dealdoc extract notes.bin --mime-type text/plain --format json
//! dealdoc --config dealdoc.toml serve --host 0.0.0.0 --port 8000
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dealdoc::{ExtractionConfig, ExtractionOutcome, detect_mime_type, extract_file, sniff_format};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dealdoc")]
#[command(about = "Extract clean text from deal-room documents")]
#[command(version)]
struct Cli {
    /// Path to a config file (.toml, .yaml or .json). Defaults to discovering dealdoc.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a document
    Extract {
        /// File to extract
        path: PathBuf,

        /// Declared MIME type (detected from the extension if omitted)
        #[arg(short, long)]
        mime_type: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Detect the MIME type and document format of a file
    Detect {
        /// File to inspect
        path: PathBuf,
    },

    /// Start the HTTP API server
    #[cfg(feature = "api")]
    Serve {
        /// Address to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ExtractionConfig> {
    let config = match path {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ExtractionConfig::discover()
            .context("Failed to load discovered dealdoc.toml")?
            .unwrap_or_default(),
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Print the outcome and report whether it succeeded.
fn print_outcome(outcome: &ExtractionOutcome, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => match outcome {
            ExtractionOutcome::Success(extracted) => println!("{}", extracted.text),
            ExtractionOutcome::Failure(failure) => eprintln!("Extraction failed: {}", failure.reason),
        },
    }
    Ok(outcome.is_success())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            path,
            mime_type,
            format,
        } => {
            let outcome = extract_file(&path, mime_type.as_deref(), &config)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            if let ExtractionOutcome::Success(extracted) = &outcome {
                tracing::info!(
                    method = %extracted.method,
                    extracted_length = extracted.extracted_length,
                    "Extracted {}",
                    path.display()
                );
            }

            if !print_outcome(&outcome, format)? {
                std::process::exit(1);
            }
        }

        Commands::Detect { path } => {
            let mime_type = detect_mime_type(&path).with_context(|| format!("Cannot detect type of {}", path.display()))?;
            match sniff_format(&mime_type) {
                Ok(format) => println!("{}\t{}", mime_type, format),
                Err(_) => println!("{}\tunsupported", mime_type),
            }
        }

        #[cfg(feature = "api")]
        Commands::Serve { host, port } => {
            dealdoc::api::serve_with_config(host, port, config)
                .await
                .context("API server failed")?;
        }
    }

    Ok(())
}
