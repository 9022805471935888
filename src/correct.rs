//! Row and batch correction.
//!
//! Cell-level defects never fail a batch: each one degrades to that field's
//! documented default. Structural defects (no headers, no rows, a row keyed
//! by an unknown column) reject the whole batch before any row is processed.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::{
    fields::CanonicalField,
    header_map::{HeaderMapping, map_headers},
    normalize::{current_year, normalize_field_value},
    record::DeliveryRequest,
    vocab::Vocabulary,
};

/// One input record, keyed by original header exactly as parsed from the
/// uploaded file.
pub type RawRow = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("input has no header row")]
    EmptyHeaders,
    #[error("input has no data rows")]
    EmptyRows,
    #[error("row {row} references unknown column '{column}'")]
    UnknownColumn { row: usize, column: String },
}

/// Everything the batch corrector produced for one import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionOutcome {
    /// Corrected rows, in input order.
    pub records: Vec<DeliveryRequest>,
    /// Lower-cased input header → canonical field name.
    pub header_mapping: BTreeMap<String, String>,
    pub unmapped_headers: Vec<String>,
    /// Human-readable description of what the corrector did.
    pub corrections: Vec<String>,
    pub summary: String,
}

/// Produces one corrected record from one raw row and the resolved header
/// mapping. Total and idempotent: re-correcting a record's own
/// [`DeliveryRequest::to_raw_row`] output changes nothing.
pub fn correct_row(vocab: &Vocabulary, mapping: &HeaderMapping, row: &RawRow) -> DeliveryRequest {
    let mut keyed: BTreeMap<CanonicalField, &str> = BTreeMap::new();
    for (header, value) in row {
        if let Some(field) = mapping.field_for(header) {
            keyed.entry(field).or_insert(value.as_str());
        }
    }

    let mut record = DeliveryRequest::default();
    for field in CanonicalField::ALL {
        let raw = keyed.get(&field).copied().unwrap_or("");
        record.set(field, normalize_field_value(vocab, field, raw));
    }

    if record.year == 0 {
        record.year = current_year();
    }

    // A named public-cloud provider or a third-party lab type implies the
    // environment class even when the lab-type column was missing.
    if record.cloud.is_empty() {
        if !record.cloud_type.is_empty() {
            record.cloud = "Public Cloud".to_string();
        } else if !record.tp_lab_type.is_empty() {
            record.cloud = "TP Labs".to_string();
        }
    }

    // Training name and lab name are synonyms for the thing being delivered.
    if record.training_name.is_empty() && !record.lab_name.is_empty() {
        record.training_name = record.lab_name.clone();
    } else if record.lab_name.is_empty() && !record.training_name.is_empty() {
        record.lab_name = record.training_name.clone();
    }

    record
}

/// Maps headers once, corrects every row with that single mapping, and
/// aggregates the correction summary.
pub fn correct_batch(
    vocab: &Vocabulary,
    headers: &[String],
    rows: &[RawRow],
) -> Result<CorrectionOutcome, ImportError> {
    if headers.is_empty() {
        return Err(ImportError::EmptyHeaders);
    }
    if rows.is_empty() {
        return Err(ImportError::EmptyRows);
    }
    let known: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    for (idx, row) in rows.iter().enumerate() {
        for column in row.keys() {
            if !known.contains(&column.to_lowercase()) {
                return Err(ImportError::UnknownColumn {
                    row: idx + 1,
                    column: column.clone(),
                });
            }
        }
    }

    let mapping = map_headers(vocab, headers);
    let records: Vec<DeliveryRequest> = rows
        .iter()
        .map(|row| correct_row(vocab, &mapping, row))
        .collect();

    let mut corrections = Vec::new();
    corrections.push(format!(
        "Mapped {} of {} column(s) to canonical fields",
        mapping.assignments.len(),
        headers.len()
    ));
    if !mapping.unmapped.is_empty() {
        corrections.push(format!(
            "Ignored {} column(s): {}",
            mapping.unmapped.len(),
            mapping.unmapped.iter().join(", ")
        ));
    }
    let status_normalized = records.iter().filter(|r| r.lab_status != "Pending").count();
    if status_normalized > 0 {
        corrections.push(format!("Normalized status on {status_normalized} row(s)"));
    }
    let cloud_resolved = records.iter().filter(|r| !r.cloud.is_empty()).count();
    if cloud_resolved > 0 {
        corrections.push(format!("Resolved cloud environment on {cloud_resolved} row(s)"));
    }
    let lob_resolved = records
        .iter()
        .filter(|r| !r.line_of_business.is_empty())
        .count();
    if lob_resolved > 0 {
        corrections.push(format!("Resolved line of business on {lob_resolved} row(s)"));
    }

    let summary = format!(
        "Corrected {} row(s); {} of {} column(s) mapped",
        records.len(),
        mapping.assignments.len(),
        headers.len()
    );

    let header_mapping = mapping
        .assignments
        .iter()
        .map(|(header, field)| (header.clone(), field.name().to_string()))
        .collect();

    Ok(CorrectionOutcome {
        records,
        header_mapping,
        unmapped_headers: mapping.unmapped,
        corrections,
        summary,
    })
}
