use anyhow::Result;
use log::info;

use crate::{
    cli::PreviewArgs,
    correct,
    fields::CanonicalField,
    import::read_raw_rows,
    io_utils,
    record::DeliveryRequest,
    vocab::Vocabulary,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let vocab = match &args.vocab {
        Some(path) => Vocabulary::load(path)?,
        None => Vocabulary::delivery_import(),
    };

    let (headers, rows) = read_raw_rows(&args.input, delimiter, encoding)?;
    let outcome = correct::correct_batch(&vocab, &headers, &rows)?;

    let display_headers: Vec<String> = CanonicalField::ALL
        .iter()
        .map(|field| field.name().to_string())
        .collect();
    let display_rows: Vec<Vec<String>> = outcome
        .records
        .iter()
        .take(args.rows)
        .map(record_cells)
        .collect();
    print!("{}", render_table(&display_headers, &display_rows));

    for line in &outcome.corrections {
        println!("{line}");
    }
    println!("{}", outcome.summary);
    info!(
        "Previewed {} of {} corrected row(s) from {:?}",
        display_rows.len(),
        outcome.records.len(),
        args.input
    );
    Ok(())
}

fn record_cells(record: &DeliveryRequest) -> Vec<String> {
    CanonicalField::ALL
        .iter()
        .map(|field| record.display(*field))
        .collect()
}

/// Width-aligned plain-text table, two spaces between columns.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    output.push_str(&format_row(headers, &widths));
    output.push('\n');
    let separators: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(3))).collect();
    output.push_str(&format_row(&separators, &widths));
    output.push('\n');
    for row in rows {
        output.push_str(&format_row(row, &widths));
        output.push('\n');
    }
    output
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate().take(widths.len()) {
        if idx > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let padding = widths[idx].saturating_sub(cell.chars().count());
        line.push_str(&" ".repeat(padding));
    }
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns_to_the_widest_cell() {
        let headers = vec!["a".to_string(), "long header".to_string()];
        let rows = vec![vec!["wide value".to_string(), "x".to_string()]];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "a           long header");
        assert!(lines[1].starts_with("---"));
        assert_eq!(lines[2], "wide value  x");
    }
}
