//! Tabular export of projection ledgers.

use std::io::{self, Write};

use super::{LedgerRow, ProjectionResult};

const CSV_HEADER: [&str; 5] = ["date", "name", "amount", "balance", "below_buffer"];

/// Renders the projection ledger as CSV, one row per entry.
///
/// Every cell is double-quoted with embedded quotes doubled; `below_buffer`
/// is written as `1` or `0`.
pub fn to_csv(result: &ProjectionResult) -> String {
    let mut lines = Vec::with_capacity(result.entries.len() + 1);
    lines.push(csv_line(CSV_HEADER.iter().map(|cell| cell.to_string())));
    lines.extend(result.entries.iter().map(|row| csv_line(row_cells(row))));
    lines.join("\n")
}

pub fn write_csv<W: Write>(result: &ProjectionResult, mut writer: W) -> io::Result<()> {
    writer.write_all(to_csv(result).as_bytes())?;
    writer.flush()
}

/// Suggested download name, e.g. `bills_schedule_2025-01-31.csv`.
pub fn csv_file_name(result: &ProjectionResult) -> String {
    format!(
        "bills_schedule_{}.csv",
        result.generated_at.date_naive().format("%Y-%m-%d")
    )
}

fn row_cells(row: &LedgerRow) -> impl Iterator<Item = String> {
    [
        row.date.format("%Y-%m-%d").to_string(),
        row.name.clone(),
        row.amount.to_string(),
        row.balance.to_string(),
        (if row.below_buffer { "1" } else { "0" }).to_string(),
    ]
    .into_iter()
}

fn csv_line(cells: impl Iterator<Item = String>) -> String {
    cells
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}
