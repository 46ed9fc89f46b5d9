use clap::{Parser, Subcommand};
use sheetcodec::{cli, DEFAULT_SHEET_NAME};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetcodec")]
#[command(about = "Convert tables between .xlsx, .xls, .csv and .xlsb")]
#[command(long_about = "sheetcodec - tabular data between spreadsheet and text files

The first row of a sheet is the header. Every value is carried as text and
every row is sized to the header.

FORMATS (by extension, case-insensitive):
  .xlsx  zipped spreadsheet
  .xls   legacy binary workbook
  .csv   delimited text, no quoting
  .xlsb  binary workbook

EXAMPLES:
  sheetcodec convert report.xlsx report.csv
  sheetcodec convert data.csv data.xls --sheet-name Data --delimiter ';'
  sheetcodec show report.xlsb --sheet Summary --limit 5
  sheetcodec sheets report.xlsx

Set RUST_LOG=sheetcodec=debug for codec diagnostics.")]
#[command(version)]
struct Cli {
    /// Log codec diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a table from one file and write it to another
    Convert {
        /// Source file
        input: PathBuf,

        /// Destination file (created or overwritten)
        output: PathBuf,

        /// Sheet to read (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Sheet name for spreadsheet output
        #[arg(long, default_value = DEFAULT_SHEET_NAME)]
        sheet_name: String,

        /// Field delimiter for .csv input and output
        #[arg(short, long, default_value = ",", value_parser = cli::parse_delimiter)]
        delimiter: u8,
    },

    /// Print a table
    Show {
        /// File to read
        file: PathBuf,

        /// Sheet to read (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Print the whole table as JSON
        #[arg(long)]
        json: bool,

        /// Maximum rows in the text view
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Field delimiter for .csv input
        #[arg(short, long, default_value = ",", value_parser = cli::parse_delimiter)]
        delimiter: u8,
    },

    /// List sheet names in workbook order
    Sheets {
        /// Workbook to inspect
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "sheetcodec=debug"
    } else {
        "sheetcodec=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            sheet,
            sheet_name,
            delimiter,
        } => cli::convert(input, output, sheet, sheet_name, delimiter),

        Commands::Show {
            file,
            sheet,
            json,
            limit,
            delimiter,
        } => cli::show(file, sheet, json, limit, delimiter),

        Commands::Sheets { file } => cli::sheets(file),
    }
}
