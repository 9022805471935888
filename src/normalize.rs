//! Per-field value normalization.
//!
//! Every function here is total: unknown categoricals resolve to documented
//! defaults (`Pending`, the current month, an empty string) and unparseable
//! numbers resolve to zero. Bulk import must not abort on a single bad cell,
//! so nothing in this module returns an error.

use std::str::FromStr;

use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::{
    fields::{CanonicalField, FieldKind},
    vocab::Vocabulary,
};

/// A normalized cell value, typed per the target field's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
}

impl Value {
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
        }
    }

    pub fn as_integer(&self) -> i64 {
        match self {
            Value::Integer(i) => *i,
            Value::Decimal(d) => d.trunc().to_i64().unwrap_or(0),
            Value::Text(s) => parse_count(s),
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        match self {
            Value::Decimal(d) => *d,
            Value::Integer(i) => Decimal::from(*i),
            Value::Text(s) => parse_amount(s),
        }
    }
}

fn lookup_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn normalize_status(vocab: &Vocabulary, raw: &str) -> String {
    vocab
        .status
        .get(&lookup_key(raw))
        .cloned()
        .unwrap_or_else(|| "Pending".to_string())
}

pub fn normalize_cloud(vocab: &Vocabulary, raw: &str) -> String {
    vocab.cloud.get(&lookup_key(raw)).cloned().unwrap_or_default()
}

pub fn normalize_provider(vocab: &Vocabulary, raw: &str) -> String {
    vocab
        .provider
        .get(&lookup_key(raw))
        .cloned()
        .unwrap_or_default()
}

pub fn normalize_tp_lab_type(vocab: &Vocabulary, raw: &str) -> String {
    vocab
        .tp_lab_type
        .get(&lookup_key(raw))
        .cloned()
        .unwrap_or_default()
}

pub fn normalize_line_of_business(vocab: &Vocabulary, raw: &str) -> String {
    vocab
        .line_of_business
        .get(&lookup_key(raw))
        .cloned()
        .unwrap_or_default()
}

/// Accepts `1`..`12`, zero-padded numerics, 3-letter abbreviations, and full
/// month names, case-insensitively. Anything else resolves to the current
/// calendar month; a missing month column means "this month's delivery".
pub fn normalize_month(vocab: &Vocabulary, raw: &str) -> String {
    vocab
        .months
        .get(&lookup_key(raw))
        .cloned()
        .unwrap_or_else(current_month_name)
}

pub fn current_month_name() -> String {
    Local::now().format("%B").to_string()
}

pub fn current_year() -> i64 {
    i64::from(Local::now().year())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Re-renders recognizable dates as ISO `YYYY-MM-DD`; anything else passes
/// through trimmed. ISO output re-parses to itself, keeping correction
/// idempotent.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = chrono::NaiveDate::parse_from_str(trimmed, fmt) {
            return parsed.format("%Y-%m-%d").to_string();
        }
    }
    trimmed.to_string()
}

/// Tolerant money/number coercion: strips currency symbols, grouping commas,
/// and any other character that is not a digit, dot, or minus before parsing.
/// Empty or unsalvageable input is zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Integer coercion with the same cleanup rules as [`parse_amount`];
/// fractional input truncates toward zero.
pub fn parse_count(raw: &str) -> i64 {
    parse_amount(raw).trunc().to_i64().unwrap_or(0)
}

/// Applies the normalizer a canonical field calls for. This is the single
/// dispatch point shared by the row corrector and the edit interpreter, so
/// both pathways speak the same vocabulary.
pub fn normalize_field_value(vocab: &Vocabulary, field: CanonicalField, raw: &str) -> Value {
    match field {
        CanonicalField::LabStatus => Value::Text(normalize_status(vocab, raw)),
        CanonicalField::Cloud => Value::Text(normalize_cloud(vocab, raw)),
        CanonicalField::CloudType => Value::Text(normalize_provider(vocab, raw)),
        CanonicalField::TpLabType => Value::Text(normalize_tp_lab_type(vocab, raw)),
        CanonicalField::LineOfBusiness => Value::Text(normalize_line_of_business(vocab, raw)),
        CanonicalField::Month => Value::Text(normalize_month(vocab, raw)),
        CanonicalField::StartDate | CanonicalField::EndDate => {
            Value::Text(normalize_date(raw))
        }
        _ => match field.kind() {
            FieldKind::Integer => Value::Integer(parse_count(raw)),
            FieldKind::Decimal => Value::Decimal(parse_amount(raw)),
            FieldKind::Text => Value::Text(raw.trim().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::delivery_import()
    }

    #[test]
    fn status_defaults_to_pending() {
        let v = vocab();
        assert_eq!(normalize_status(&v, "blah"), "Pending");
        assert_eq!(normalize_status(&v, ""), "Pending");
        assert_eq!(normalize_status(&v, "  WIP "), "Work-in-Progress");
    }

    #[test]
    fn import_status_table_does_not_map_sent_for_testing() {
        assert_eq!(normalize_status(&vocab(), "  Sent For Testing "), "Pending");
        assert_eq!(
            normalize_status(&Vocabulary::edit_instruction(), "Sent for Testing"),
            "Test Credentials Shared"
        );
    }

    #[test]
    fn cloud_map_folds_provider_names_into_public_cloud() {
        let v = vocab();
        assert_eq!(normalize_cloud(&v, "aws"), "Public Cloud");
        assert_eq!(normalize_cloud(&v, "Third-Party"), "TP Labs");
        assert_eq!(normalize_cloud(&v, "datacenter"), "");
    }

    #[test]
    fn provider_map_is_case_insensitive() {
        let v = vocab();
        assert_eq!(normalize_provider(&v, "AZURE"), "Azure");
        assert_eq!(normalize_provider(&v, "google cloud"), "GCP");
        assert_eq!(normalize_provider(&v, "ibm"), "");
    }

    #[test]
    fn month_accepts_numeric_abbreviated_and_full_spellings() {
        let v = vocab();
        assert_eq!(normalize_month(&v, "03"), "March");
        assert_eq!(normalize_month(&v, "mar"), "March");
        assert_eq!(normalize_month(&v, "March"), "March");
        assert_eq!(normalize_month(&v, "not a month"), current_month_name());
        assert_eq!(normalize_month(&v, ""), current_month_name());
    }

    #[test]
    fn parse_amount_strips_currency_symbols_and_separators() {
        assert_eq!(
            parse_amount("₹12,345.50"),
            Decimal::from_str("12345.50").unwrap()
        );
        assert_eq!(parse_amount("$ 1,000"), Decimal::from(1000));
        assert_eq!(parse_amount("-42.5"), Decimal::from_str("-42.5").unwrap());
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("1.2.3"), Decimal::ZERO);
    }

    #[test]
    fn parse_count_truncates_toward_zero() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count("12.9"), 12);
        assert_eq!(parse_count("-3.7"), -3);
        assert_eq!(parse_count("n/a"), 0);
    }

    #[test]
    fn normalize_date_prefers_iso_and_passes_unknown_through() {
        assert_eq!(normalize_date("06/05/2024"), "2024-05-06");
        assert_eq!(normalize_date("2024-05-06"), "2024-05-06");
        assert_eq!(normalize_date("next tuesday"), "next tuesday");
    }

    #[test]
    fn field_dispatch_matches_field_kind() {
        let v = vocab();
        assert_eq!(
            normalize_field_value(&v, CanonicalField::Participants, "25 pax"),
            Value::Integer(25)
        );
        assert_eq!(
            normalize_field_value(&v, CanonicalField::TotalAmount, "₹1,000"),
            Value::Decimal(Decimal::from(1000))
        );
        assert_eq!(
            normalize_field_value(&v, CanonicalField::Client, "  Acme  "),
            Value::Text("Acme".to_string())
        );
    }
}
