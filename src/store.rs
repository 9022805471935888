//! Table-scoped persistence for delivery requests.
//!
//! The engine never issues raw queries: callers compose [`Predicate`]s
//! (equality, `in`, `lt`, `not-null`) and the store evaluates them row by
//! row. [`JsonStore`] is the shipped implementation, a single JSON file that
//! plays the role of the hosted backend's table.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    fields::{CanonicalField, FieldKind},
    normalize::Value,
    record::DeliveryRequest,
};

/// Row-level filter predicate.
#[derive(Debug, Clone)]
pub enum Predicate {
    Eq { field: CanonicalField, value: Value },
    In { field: CanonicalField, values: Vec<Value> },
    Lt { field: CanonicalField, value: Value },
    NotNull { field: CanonicalField },
}

/// One normalized field update.
#[derive(Debug, Clone)]
pub struct FieldAssignment {
    pub field: CanonicalField,
    pub value: Value,
}

fn value_eq(field: CanonicalField, left: &Value, right: &Value) -> bool {
    match field.kind() {
        FieldKind::Text => {
            left.display().trim().eq_ignore_ascii_case(right.display().trim())
        }
        FieldKind::Integer | FieldKind::Decimal => left.as_decimal() == right.as_decimal(),
    }
}

fn value_lt(field: CanonicalField, left: &Value, right: &Value) -> bool {
    match field.kind() {
        FieldKind::Text => left.display() < right.display(),
        FieldKind::Integer | FieldKind::Decimal => left.as_decimal() < right.as_decimal(),
    }
}

fn is_set(field: CanonicalField, value: &Value) -> bool {
    match field.kind() {
        FieldKind::Text => !value.display().trim().is_empty(),
        FieldKind::Integer | FieldKind::Decimal => value.as_decimal() != Decimal::ZERO,
    }
}

/// Evaluates every predicate against one record (conjunction).
pub fn matches(record: &DeliveryRequest, filters: &[Predicate]) -> bool {
    filters.iter().all(|predicate| match predicate {
        Predicate::Eq { field, value } => value_eq(*field, &record.get(*field), value),
        Predicate::In { field, values } => values
            .iter()
            .any(|value| value_eq(*field, &record.get(*field), value)),
        Predicate::Lt { field, value } => value_lt(*field, &record.get(*field), value),
        Predicate::NotNull { field } => is_set(*field, &record.get(*field)),
    })
}

/// A stored row: the canonical record plus its store-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub request: DeliveryRequest,
}

pub trait RequestStore {
    fn count(&self, filters: &[Predicate]) -> Result<usize>;
    fn select(&self, filters: &[Predicate]) -> Result<Vec<StoredRequest>>;
    fn insert_batch(&mut self, records: Vec<DeliveryRequest>) -> Result<usize>;
    fn update_where(
        &mut self,
        filters: &[Predicate],
        updates: &[FieldAssignment],
    ) -> Result<usize>;
}

/// JSON-file-backed request table. Mutations persist immediately.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    records: Vec<StoredRequest>,
}

impl JsonStore {
    /// Opens an existing store file, or starts an empty table if the file
    /// does not exist yet.
    pub fn open(path: &Path) -> Result<Self> {
        let records = if path.exists() {
            let file =
                File::open(path).with_context(|| format!("Opening store file {path:?}"))?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader)
                .with_context(|| format!("Parsing store file {path:?}"))?
        } else {
            Vec::new()
        };
        Ok(JsonStore {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StoredRequest] {
        &self.records
    }

    fn persist(&self) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Creating store file {:?}", self.path))?;
        serde_json::to_writer_pretty(file, &self.records).context("Writing store JSON")
    }
}

impl RequestStore for JsonStore {
    fn count(&self, filters: &[Predicate]) -> Result<usize> {
        Ok(self
            .records
            .iter()
            .filter(|stored| matches(&stored.request, filters))
            .count())
    }

    fn select(&self, filters: &[Predicate]) -> Result<Vec<StoredRequest>> {
        Ok(self
            .records
            .iter()
            .filter(|stored| matches(&stored.request, filters))
            .cloned()
            .collect())
    }

    fn insert_batch(&mut self, records: Vec<DeliveryRequest>) -> Result<usize> {
        let inserted = records.len();
        self.records.extend(records.into_iter().map(|request| StoredRequest {
            id: Uuid::new_v4(),
            request,
        }));
        self.persist()?;
        Ok(inserted)
    }

    fn update_where(
        &mut self,
        filters: &[Predicate],
        updates: &[FieldAssignment],
    ) -> Result<usize> {
        let mut affected = 0;
        for stored in &mut self.records {
            if matches(&stored.request, filters) {
                for update in updates {
                    stored.request.set(update.field, update.value.clone());
                }
                affected += 1;
            }
        }
        if affected > 0 {
            self.persist()?;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(client: &str, status: &str, year: i64) -> DeliveryRequest {
        DeliveryRequest {
            client: client.to_string(),
            lab_status: status.to_string(),
            year,
            ..DeliveryRequest::default()
        }
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn predicates_cover_eq_in_lt_and_not_null() {
        let r = record("Acme", "Pending", 2025);
        assert!(matches(
            &r,
            &[Predicate::Eq {
                field: CanonicalField::Client,
                value: text("acme"),
            }]
        ));
        assert!(matches(
            &r,
            &[Predicate::In {
                field: CanonicalField::LabStatus,
                values: vec![text("Completed"), text("Pending")],
            }]
        ));
        assert!(matches(
            &r,
            &[Predicate::Lt {
                field: CanonicalField::Year,
                value: Value::Integer(2026),
            }]
        ));
        assert!(matches(&r, &[Predicate::NotNull { field: CanonicalField::Client }]));
        assert!(!matches(&r, &[Predicate::NotNull { field: CanonicalField::Cloud }]));
    }

    #[test]
    fn store_round_trips_through_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requests.json");
        {
            let mut store = JsonStore::open(&path).unwrap();
            assert!(store.is_empty());
            store
                .insert_batch(vec![record("Acme", "Pending", 2025), record("Globex", "Completed", 2024)])
                .unwrap();
        }
        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        let selected = store
            .select(&[Predicate::Eq {
                field: CanonicalField::Client,
                value: text("Globex"),
            }])
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].request.lab_status, "Completed");
    }

    #[test]
    fn update_where_only_touches_matching_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requests.json");
        let mut store = JsonStore::open(&path).unwrap();
        store
            .insert_batch(vec![record("Acme", "Pending", 2025), record("Globex", "Pending", 2024)])
            .unwrap();

        let affected = store
            .update_where(
                &[Predicate::Eq {
                    field: CanonicalField::Year,
                    value: Value::Integer(2025),
                }],
                &[FieldAssignment {
                    field: CanonicalField::LabStatus,
                    value: text("Completed"),
                }],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let reloaded = JsonStore::open(&path).unwrap();
        let completed = reloaded
            .count(&[Predicate::Eq {
                field: CanonicalField::LabStatus,
                value: text("Completed"),
            }])
            .unwrap();
        assert_eq!(completed, 1);
    }
}
