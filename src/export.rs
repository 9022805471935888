use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ExportArgs,
    fields::CanonicalField,
    io_utils,
    store::JsonStore,
};

pub fn execute(args: &ExportArgs) -> Result<()> {
    let store = JsonStore::open(&args.store)?;
    let delimiter = args
        .output_delimiter
        .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;

    writer
        .write_record(CanonicalField::ALL.iter().map(|field| field.name()))
        .context("Writing header row")?;
    let records = store.records();
    for stored in records {
        writer
            .write_record(
                CanonicalField::ALL
                    .iter()
                    .map(|field| stored.request.display(*field)),
            )
            .with_context(|| format!("Writing record {}", stored.id))?;
    }
    writer.flush().context("Flushing output writer")?;

    let destination = args
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!("Exported {} record(s) -> {}", records.len(), destination);
    Ok(())
}
