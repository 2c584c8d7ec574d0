//! Table Scan CLI
//!
//! Reads a markdown or JSON table and prints the compiled scan.

use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tablescan::{Table, TableScan};
use tablescan_core::ScanError;
use tablescan_std::columns::IncludeColumn;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tablescan")]
#[command(version)]
#[command(about = "Compile a table of device settings into scan commands", long_about = None)]
struct Cli {
    /// Table file, `.md` or `.json` (reads stdin if not provided)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Add a comment with the source line before each table row
    #[arg(short, long)]
    lineinfo: bool,

    /// Device to add to every log (repeatable)
    #[arg(long = "log-always", value_name = "DEVICE")]
    log_always: Vec<String>,

    /// Header of a column whose cells name scans to include (repeatable)
    #[arg(long = "include-column", value_name = "HEADER")]
    include_column: Vec<String>,

    /// Use the beamline motor and counter settings
    #[arg(long)]
    beamline: bool,

    /// Print special-column invocations to stderr
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One line, `[Set('X', 1.0), ...]`
    Text,
    /// One command per line
    Pretty,
    /// SCN XML
    Scn,
    /// JSON command tree
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String, ScanError> {
    let table = load_table(cli.input.as_ref())?;
    info!(columns = table.headers().len(), rows = table.len(), "loaded table");

    let mut scan = TableScan::new(table)
        .with_standard_columns()
        .with_log_always(cli.log_always.iter().cloned())
        .with_tracing(cli.trace);
    for header in &cli.include_column {
        scan = scan.with_special(IncludeColumn::new(header.as_str(), ".scn"));
    }
    if cli.beamline {
        scan = scan.with_settings(tablescan_std::beamline_settings()?);
    }

    let result = scan.compile(cli.lineinfo)?;
    if cli.trace {
        for step in &result.trace {
            eprintln!(
                "row {} {}: {:?} -> {}",
                step.row + 1,
                step.column,
                step.cell,
                step.command.as_deref().unwrap_or("-")
            );
        }
    }
    debug!(commands = result.commands.len(), format = ?cli.format, "writing output");

    let commands = result.commands;
    Ok(match cli.format {
        Format::Text => commands.to_string(),
        Format::Pretty => commands.format(),
        Format::Scn => commands.to_scn(),
        Format::Json => commands.to_json()?,
    })
}

fn load_table(path: Option<&PathBuf>) -> Result<Table, ScanError> {
    let (content, is_json) = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                ScanError::invalid_input(format!("Cannot read {}: {}", path.display(), e))
            })?;
            let is_json = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            (content, is_json)
        }
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| ScanError::invalid_input(format!("Cannot read stdin: {}", e)))?;
            let is_json = content.trim_start().starts_with('{');
            (content, is_json)
        }
    };

    if is_json {
        Table::from_json_str(&content)
    } else {
        Table::from_markdown(&content)
    }
}
