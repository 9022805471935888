use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Normalize, import, and bulk-edit lab delivery requests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a delivery-request CSV and bulk-insert it into a store file
    Import(ImportArgs),
    /// Normalize a CSV and display the corrected rows without writing
    Preview(PreviewArgs),
    /// Apply a natural-language bulk-edit instruction to the store
    Edit(EditArgs),
    /// Write the store back out as canonical CSV
    Export(ExportArgs),
    /// Emit a built-in vocabulary as an editable YAML file
    Vocab(VocabArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Input CSV file to import ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Store file receiving the corrected records
    #[arg(short = 's', long = "store")]
    pub store: PathBuf,
    /// Custom vocabulary YAML (defaults to the built-in import vocabulary)
    #[arg(long = "vocab")]
    pub vocab: Option<PathBuf>,
    /// Correct and report without writing to the store
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file to preview ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Custom vocabulary YAML (defaults to the built-in import vocabulary)
    #[arg(long = "vocab")]
    pub vocab: Option<PathBuf>,
    /// Number of corrected rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Store file to edit
    #[arg(short = 's', long = "store")]
    pub store: PathBuf,
    /// The bulk-edit instruction, in plain language
    #[arg(short = 'n', long = "instruction")]
    pub instruction: String,
    /// External parser command producing intent JSON (split on whitespace)
    #[arg(long = "parser", conflicts_with = "parsed")]
    pub parser: Option<String>,
    /// Pre-parsed intent JSON file (offline pathway)
    #[arg(long = "parsed", conflicts_with = "parser")]
    pub parsed: Option<PathBuf>,
    /// Custom vocabulary YAML (defaults to the built-in edit vocabulary)
    #[arg(long = "vocab")]
    pub vocab: Option<PathBuf>,
    /// Logical table name reported to the parser
    #[arg(long = "table", default_value = "delivery")]
    pub table: String,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Store file to export
    #[arg(short = 's', long = "store")]
    pub store: PathBuf,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to ',')
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Pathway {
    Import,
    Edit,
}

#[derive(Debug, Args)]
pub struct VocabArgs {
    /// Destination YAML file path
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Which built-in vocabulary to emit
    #[arg(long = "pathway", value_enum, default_value = "import")]
    pub pathway: Pathway,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
