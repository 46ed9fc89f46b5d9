use crate::codec::{self, CodecOptions, CsvOptions};
use crate::types::Table;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Parse a `--delimiter` value: exactly one ASCII character, `\t` for tab
pub fn parse_delimiter(value: &str) -> std::result::Result<u8, String> {
    if value == "\\t" {
        return Ok(b'\t');
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(format!(
            "delimiter must be a single ASCII character, got {:?}",
            value
        )),
    }
}

fn options(delimiter: u8) -> CodecOptions {
    CodecOptions {
        csv: CsvOptions { delimiter },
    }
}

/// Execute the convert command
pub fn convert(
    input: PathBuf,
    output: PathBuf,
    sheet: Option<String>,
    sheet_name: String,
    delimiter: u8,
) -> Result<()> {
    println!("{}", "📄 sheetcodec - Convert".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    // Both formats are checked before the input is opened
    codec::Format::from_path(&input)?;
    codec::Format::from_path(&output)?;

    let options = options(delimiter);
    let table = codec::read_table_with(&input, sheet.as_deref(), &options)
        .with_context(|| format!("failed to read {}", input.display()))?;
    codec::write_table_with(&table, &output, &sheet_name, &options)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("{}", "✅ Convert Complete!".bold().green());
    println!(
        "   {} columns, {} rows\n",
        table.column_count(),
        table.row_count()
    );
    Ok(())
}

/// Execute the show command
///
/// JSON output is the whole table; the text view stops after `limit` rows.
pub fn show(
    file: PathBuf,
    sheet: Option<String>,
    json: bool,
    limit: usize,
    delimiter: u8,
) -> Result<()> {
    let table = codec::read_table_with(&file, sheet.as_deref(), &options(delimiter))
        .with_context(|| format!("failed to read {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    print_table(&table, limit);
    Ok(())
}

fn print_table(table: &Table, limit: usize) {
    let shown = table.row_count().min(limit);
    let mut widths: Vec<usize> = table.column_names().map(|n| n.chars().count()).collect();
    for row in table.rows().take(shown) {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let header: Vec<String> = table
        .column_names()
        .zip(&widths)
        .map(|(name, &width)| format!("{:<width$}", name, width = width))
        .collect();
    println!("{}", header.join(" | ").bold().cyan());
    println!(
        "{}",
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in table.rows().take(shown) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{:<width$}", value, width = width))
            .collect();
        println!("{}", line.join(" | "));
    }

    if shown < table.row_count() {
        println!(
            "{}",
            format!("... {} more rows", table.row_count() - shown).dimmed()
        );
    }
    println!(
        "\n   {} columns, {} rows",
        table.column_count(),
        table.row_count()
    );
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> Result<()> {
    let format = codec::Format::from_path(&file)?;
    let names = codec::sheet_names(&file)
        .with_context(|| format!("failed to open {}", file.display()))?;

    if names.is_empty() {
        if format == codec::Format::Csv {
            println!("{}", "(delimited text has no sheets)".dimmed());
            return Ok(());
        }
        bail!("{} contains no sheets", file.display());
    }
    for (i, name) in names.iter().enumerate() {
        println!("{:>3}  {}", i, name.bright_blue());
    }
    Ok(())
}
