//! Schema Reference Documentation CLI
//!
//! Command-line interface for resolving schema references and rendering
//! them as documentation HTML.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use schema_refdoc::{
    format_schema, markdown, print_schema, Document, ResolveError, Resolver, SharedOptions,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-refdoc")]
#[command(about = "Resolve schema references and render them as documentation HTML")]
#[command(version)]
struct Cli {
    /// Base directory for relative references in documents without a path
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Do not inline external $ref targets when loading referenced files
    #[arg(long, global = true)]
    no_inline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reference against a document and print the referenced node
    Resolve {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        /// Reference to resolve, e.g. "#/definitions/Widget" or "types.json#/Id"
        reference: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the display projection of a schema
    Format {
        /// Document source: file path or URL
        document: String,

        /// Reference to the schema inside the document (whole document if omitted)
        #[arg(long = "ref", short)]
        reference: Option<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Render a schema as highlighted, cross-linked HTML
    Print {
        /// Document source: file path or URL
        document: String,

        /// Reference to the schema inside the document (whole document if omitted)
        #[arg(long = "ref", short)]
        reference: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Render a Markdown file as HTML
    Markdown {
        /// Markdown file
        file: PathBuf,

        /// Drop the <p> wrapper when the output is a single paragraph
        #[arg(long)]
        strip_paragraph: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut options = SharedOptions::new().inline_external_refs(!cli.no_inline);
    if let Some(dir) = cli.base_dir {
        options = options.base_dir(dir);
    }
    let options = Arc::new(options);

    let result = match cli.command {
        Commands::Resolve {
            document,
            reference,
            output,
            pretty,
        } => run_resolve(&document, &reference, &options, output, pretty),

        Commands::Format {
            document,
            reference,
            pretty,
        } => run_format(&document, reference.as_deref(), &options, pretty),

        Commands::Print {
            document,
            reference,
            output,
        } => run_print(&document, reference.as_deref(), &options, output),

        Commands::Markdown {
            file,
            strip_paragraph,
        } => run_markdown(&file, strip_paragraph),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_resolve(
    source: &str,
    reference: &str,
    options: &Arc<SharedOptions>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let node = load_and_resolve(source, Some(reference), options)?;
    write_output(&to_json(&node, pretty)?, output)
}

fn run_format(
    source: &str,
    reference: Option<&str>,
    options: &Arc<SharedOptions>,
    pretty: bool,
) -> Result<(), u8> {
    let node = load_and_resolve(source, reference, options)?;
    write_output(&to_json(&format_schema(&node), pretty)?, None)
}

fn run_print(
    source: &str,
    reference: Option<&str>,
    options: &Arc<SharedOptions>,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let node = load_and_resolve(source, reference, options)?;
    write_output(&print_schema(&format_schema(&node)), output)
}

fn run_markdown(file: &Path, strip_paragraph: bool) -> Result<(), u8> {
    let text = std::fs::read_to_string(file).map_err(|e| {
        eprintln!("Error: cannot read {}: {}", file.display(), e);
        3u8
    })?;
    write_output(&markdown(&text, strip_paragraph), None)
}

/// Load `source` and resolve `reference` inside it, or return the whole
/// document when there is no reference.
fn load_and_resolve(
    source: &str,
    reference: Option<&str>,
    options: &Arc<SharedOptions>,
) -> Result<Value, u8> {
    let document = Document::load(source, Arc::clone(options)).map_err(report)?;
    match reference {
        Some(reference) => Resolver::new()
            .resolve(reference, &document)
            .map(|resolved| resolved.value)
            .map_err(report),
        None => Ok(document.value),
    }
}

fn report(err: ResolveError) -> u8 {
    eprintln!("Error: {}", err);
    err.exit_code() as u8
}

fn to_json(value: &Value, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn write_output(content: &str, output: Option<PathBuf>) -> Result<(), u8> {
    match output {
        Some(path) => {
            std::fs::write(&path, content).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
