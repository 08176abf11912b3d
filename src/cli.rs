use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "ingest", author, version, about = "Clean data from files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize a file's headers and cell values
    Normalize(NormalizeArgs),
    /// Merge every file in a folder into one master file
    Merge(MergeArgs),
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Input CSV (or .xlsx) file; the first row must be the header
    pub input: PathBuf,
    /// Output file (defaults to <input>_normalized.csv, written with the input delimiter)
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
    /// Fail when a --schema column cannot be sourced from the input
    #[arg(long)]
    pub strict: bool,
    /// Comma-separated list of output headers, in output order
    #[arg(long)]
    pub schema: Option<String>,
    /// Comma-separated `input=output` header renames
    #[arg(long = "map")]
    pub map: Option<String>,
    /// YAML normalization profile providing defaults for the flags above
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum FileType {
    #[default]
    Xlsx,
    Csv,
}

impl FileType {
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Xlsx => "xlsx",
            FileType::Csv => "csv",
        }
    }
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Folder containing the files to merge
    pub folder: PathBuf,
    /// Input file type
    #[arg(short = 'f', long = "filetype", value_enum, default_value_t = FileType::Xlsx)]
    pub filetype: FileType,
    /// Output file; `.csv` writes CSV, anything else is written as .xlsx
    #[arg(short = 'o', long = "out", default_value = "master_file.xlsx")]
    pub out: String,
    /// Name of the output worksheet
    #[arg(short = 's', long = "sheet", default_value = "Sheet1")]
    pub sheet: String,
    /// CSV delimiter character for csv inputs and output
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of csv inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
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
