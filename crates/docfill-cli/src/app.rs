//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use docfill_core::{
    Conversation, DocumentRecord, DocumentStore, DownloadService, Settings, UploadService,
};
use docfill_ooxml::{DocumentPackage, FillReport, FillValues, FilledPackage, Placeholder};

/// Output format for scan results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "docfill")]
#[command(author, version, about = "Fill placeholders in Word documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the placeholders in a DOCX file
    Scan {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also scan headers and footers
        #[arg(long)]
        include_headers_footers: bool,
    },

    /// Fill a DOCX file from a JSON or TOML file of values
    Fill {
        /// Input DOCX file
        input: PathBuf,

        /// Values file mapping placeholder keys to values (.json or .toml)
        #[arg(long)]
        values: PathBuf,

        /// Output DOCX file (default: <input>-filled.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print what happened to each key
        #[arg(long)]
        report: bool,
    },

    /// Store a DOCX file and print its record
    Upload {
        /// Input DOCX file
        input: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a stored document with its recorded values
    Download {
        /// Document id printed by `upload`
        id: String,

        /// Output DOCX file (default: filled-document-<id>.docx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Answer the placeholders of a stored document one by one
    ///
    /// A `key = value` line fills that placeholder directly.
    Chat {
        /// Document id printed by `upload`
        id: String,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            input,
            format,
            include_headers_footers,
        } => {
            scan_command(&input, format, include_headers_footers)?;
        }
        Commands::Fill {
            input,
            values,
            output,
            report,
        } => {
            fill_command(&input, &values, output.as_deref(), report)?;
        }
        Commands::Upload { input, config } => {
            upload_command(&input, config.as_deref())?;
        }
        Commands::Download { id, output, config } => {
            download_command(&id, output.as_deref(), config.as_deref())?;
        }
        Commands::Chat { id, config } => {
            chat_command(&id, config.as_deref())?;
        }
    }

    Ok(())
}

fn open_package(input: &Path) -> Result<DocumentPackage> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    DocumentPackage::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))
}

/// Placeholders of a DOCX file, in discovery order
pub fn scan_document(input: &Path, include_headers_footers: bool) -> Result<Vec<Placeholder>> {
    open_package(input)?
        .placeholders(include_headers_footers)
        .with_context(|| format!("Failed to read document text: {}", input.display()))
}

/// Execute the scan command
pub fn scan_command(
    input: &Path,
    format: OutputFormat,
    include_headers_footers: bool,
) -> Result<()> {
    let placeholders = scan_document(input, include_headers_footers)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&placeholders)
                .context("Failed to serialize placeholders to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if placeholders.is_empty() {
                println!("No placeholders found in {}", input.display());
            } else {
                println!(
                    "Found {} placeholder(s) in {}:",
                    placeholders.len(),
                    input.display()
                );
                for placeholder in &placeholders {
                    println!("  {}", placeholder.key);
                }
            }
        }
    }

    Ok(())
}

/// Read a key → value file
///
/// `.toml` files are parsed as TOML, anything else as JSON. Both must be a
/// flat table; numbers and booleans are written as their display form.
pub fn load_values(path: &Path) -> Result<FillValues> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read values file: {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let pairs: Vec<(String, String)> = if is_toml {
        let table: BTreeMap<String, toml::Value> = toml::from_str(&text)
            .with_context(|| format!("Failed to parse TOML values: {}", path.display()))?;
        table
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    toml::Value::Datetime(d) => d.to_string(),
                    other => anyhow::bail!(
                        "Value for \"{}\" must be a scalar, got {}",
                        key,
                        other.type_str()
                    ),
                };
                Ok((key, value))
            })
            .collect::<Result<_>>()?
    } else {
        let table: BTreeMap<String, serde_json::Value> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON values: {}", path.display()))?;
        table
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Null => String::new(),
                    _ => anyhow::bail!("Value for \"{}\" must be a scalar", key),
                };
                Ok((key, value))
            })
            .collect::<Result<_>>()?
    };

    Ok(pairs.into_iter().collect())
}

/// Fill a DOCX file with the values in `values_path`
pub fn fill_document(input: &Path, values_path: &Path) -> Result<FilledPackage> {
    let package = open_package(input)?;
    let values = load_values(values_path)?;
    package
        .fill(&values)
        .with_context(|| format!("Failed to fill document: {}", input.display()))
}

/// Execute the fill command
pub fn fill_command(
    input: &Path,
    values_path: &Path,
    output: Option<&Path>,
    report: bool,
) -> Result<()> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => default_fill_output(input),
    };

    let filled = fill_document(input, values_path)?;
    fs::write(&output_path, &filled.bytes)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    if report {
        print_report(&filled.report);
    }
    println!(
        "Filled {} placeholder occurrence(s) in {} part(s)",
        filled.report.total(),
        filled.parts.len()
    );
    println!("  Created: {}", output_path.display());

    Ok(())
}

/// `<dir>/<stem>-filled.docx` next to the input
fn default_fill_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{}-filled.docx", stem))
}

fn print_report(report: &FillReport) {
    for outcome in &report.outcomes {
        println!(
            "  {:<24} exact: {:>3}  recovered: {:>3}",
            outcome.key, outcome.exact, outcome.recovered
        );
        if outcome.is_inert() {
            println!("    warning: \"{}\" does not occur in the document", outcome.key);
        }
    }
}

/// Execute the upload command
pub fn upload_command(input: &Path, config: Option<&Path>) -> Result<DocumentRecord> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    let service = UploadService::from_settings(&settings).with_context(|| {
        format!(
            "Failed to open document store: {}",
            settings.store.root.display()
        )
    })?;

    let bytes = fs::read(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let record = service
        .upload(&file_name, &bytes)
        .with_context(|| format!("Failed to upload document: {}", input.display()))?;

    let json = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
    println!("{}", json);
    Ok(record)
}

/// Execute the download command
pub fn download_command(
    id: &str,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<PathBuf> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    let service = DownloadService::from_settings(&settings).with_context(|| {
        format!(
            "Failed to open document store: {}",
            settings.store.root.display()
        )
    })?;

    let filled = service
        .download_stored(id)
        .with_context(|| format!("Failed to generate document {}", id))?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(&filled.file_name),
    };
    fs::write(&output_path, &filled.bytes)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
    println!("  Created: {}", output_path.display());

    Ok(output_path)
}

/// Execute the chat command on stdin/stdout
pub fn chat_command(id: &str, config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config).context("Failed to load settings")?;
    let store = DocumentStore::open(&settings.store.root).with_context(|| {
        format!(
            "Failed to open document store: {}",
            settings.store.root.display()
        )
    })?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_chat(&store, id, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Drive a conversation over any line source
///
/// A line of the form `key = value` fills that placeholder out of order.
/// Every answer is saved to the store before the next question, so an
/// interrupted session keeps what was answered so far.
pub fn run_chat<R: BufRead, W: Write>(
    store: &DocumentStore,
    id: &str,
    input: R,
    mut output: W,
) -> Result<DocumentRecord> {
    let record = store
        .load_record(id)
        .with_context(|| format!("Failed to load document {}", id))?;
    let mut chat = Conversation::new(record);

    writeln!(output, "{}", chat.greeting())?;
    if let Some(current) = chat.current() {
        writeln!(output, "What should \"{}\" be?", current.key)?;
    }

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let Some(reply) = chat.respond(&line) else {
            continue;
        };
        store
            .save_record(chat.record())
            .with_context(|| format!("Failed to save document {}", id))?;
        writeln!(output, "{}", reply)?;
        if chat.is_complete() {
            break;
        }
    }

    let (filled, total) = chat.progress();
    writeln!(output, "{}/{} placeholders filled", filled, total)?;
    Ok(chat.into_record())
}
