use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::ImportArgs,
    correct::{self, RawRow},
    io_utils,
    store::{JsonStore, RequestStore},
    vocab::Vocabulary,
};

/// Reads the whole input into header/row mappings, one [`RawRow`] per data
/// row, keyed by the original header strings.
pub fn read_raw_rows(
    path: &std::path::Path,
    delimiter: u8,
    encoding: &'static encoding_rs::Encoding,
) -> Result<(Vec<String>, Vec<RawRow>)> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        let values = io_utils::decode_record(&record, encoding)?;
        let row: RawRow = headers.iter().cloned().zip(values).collect();
        rows.push(row);
    }
    Ok((headers, rows))
}

pub fn execute(args: &ImportArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let vocab = match &args.vocab {
        Some(path) => Vocabulary::load(path)?,
        None => Vocabulary::delivery_import(),
    };

    let (headers, rows) = read_raw_rows(&args.input, delimiter, encoding)?;
    let outcome = correct::correct_batch(&vocab, &headers, &rows)?;

    for line in &outcome.corrections {
        info!("{line}");
    }
    if !outcome.unmapped_headers.is_empty() {
        warn!(
            "{} column(s) were not recognized and will not be imported",
            outcome.unmapped_headers.len()
        );
    }

    if args.dry_run {
        info!(
            "Dry run: {} record(s) corrected, store untouched",
            outcome.records.len()
        );
        return Ok(());
    }

    let mut store = JsonStore::open(&args.store)?;
    let inserted = store.insert_batch(outcome.records)?;
    info!(
        "Successfully imported {} record(s) -> {:?}",
        inserted, args.store
    );
    Ok(())
}
