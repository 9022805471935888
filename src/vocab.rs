//! Alias tables and categorical value maps.
//!
//! A [`Vocabulary`] is immutable configuration data: it is constructed once
//! (from a built-in or a YAML file) and passed by reference into the header
//! mapper and the field normalizers. Two built-ins exist and are deliberately
//! distinct: the CSV import pathway and the free-text edit pathway recognize
//! slightly different spellings (`sent for testing` folds to
//! `Test Credentials Shared` only when interpreting edit instructions).

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::fields::CanonicalField;

/// Recognized header spellings for one canonical field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAliases {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
}

/// Header-alias table plus per-field categorical value maps.
///
/// The alias table is ordered: fields are offered to each header in
/// declaration order, and a field is claimed by the first header that
/// matches one of its aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub aliases: Vec<FieldAliases>,
    pub status: BTreeMap<String, String>,
    pub cloud: BTreeMap<String, String>,
    pub provider: BTreeMap<String, String>,
    pub tp_lab_type: BTreeMap<String, String>,
    pub line_of_business: BTreeMap<String, String>,
    pub months: BTreeMap<String, String>,
}

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

fn month_map() -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (idx, (abbr, full)) in MONTHS.iter().enumerate() {
        let number = idx + 1;
        map.insert(number.to_string(), (*full).to_string());
        map.insert(format!("{number:02}"), (*full).to_string());
        map.insert((*abbr).to_string(), (*full).to_string());
        map.insert(full.to_lowercase(), (*full).to_string());
    }
    // "sept" shows up in real spreadsheets alongside "sep"
    map.insert("sept".to_string(), "September".to_string());
    map
}

fn value_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(raw, canonical)| ((*raw).to_string(), (*canonical).to_string()))
        .collect()
}

fn alias_entry(field: CanonicalField, aliases: &[&str]) -> FieldAliases {
    FieldAliases {
        field,
        aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
    }
}

impl Vocabulary {
    /// Vocabulary for the CSV bulk-import pathway.
    pub fn delivery_import() -> Self {
        let aliases = vec![
            alias_entry(
                CanonicalField::PotentialId,
                &["potentialId", "potential id", "potential", "opportunity id", "deal id"],
            ),
            alias_entry(
                CanonicalField::FreshDeskTicketNumber,
                &[
                    "freshDeskTicketNumber",
                    "freshdesk ticket number",
                    "freshdesk ticket",
                    "freshdesk",
                    "ticket number",
                    "ticket",
                ],
            ),
            alias_entry(
                CanonicalField::Client,
                &["client", "client name", "customer", "account"],
            ),
            alias_entry(
                CanonicalField::TrainingName,
                &["trainingName", "training name", "training", "course name", "course", "program"],
            ),
            alias_entry(CanonicalField::LabName, &["labName", "lab name", "lab title"]),
            alias_entry(
                CanonicalField::LabStatus,
                &["labStatus", "lab status", "status", "request status", "delivery status"],
            ),
            alias_entry(
                CanonicalField::Cloud,
                &["cloud", "lab type", "environment", "environment type"],
            ),
            alias_entry(
                CanonicalField::CloudType,
                &["cloudType", "cloud type", "cloud provider", "provider", "csp"],
            ),
            alias_entry(
                CanonicalField::TpLabType,
                &["tpLabType", "tp lab type", "tp lab", "third party lab type", "third party lab", "tp type"],
            ),
            alias_entry(
                CanonicalField::LineOfBusiness,
                &["lineOfBusiness", "line of business", "lob", "business line"],
            ),
            alias_entry(CanonicalField::Month, &["month", "delivery month", "billing month"]),
            alias_entry(CanonicalField::Year, &["year", "delivery year", "billing year"]),
            alias_entry(
                CanonicalField::StartDate,
                &["startDate", "start date", "lab start date", "start", "from"],
            ),
            alias_entry(
                CanonicalField::EndDate,
                &["endDate", "end date", "lab end date", "end", "to"],
            ),
            alias_entry(
                CanonicalField::Participants,
                &[
                    "participants",
                    "number of participants",
                    "participant count",
                    "pax count",
                    "pax",
                    "learners",
                    "attendees",
                ],
            ),
            alias_entry(
                CanonicalField::NumberOfDays,
                &["numberOfDays", "number of days", "days", "duration days", "duration"],
            ),
            alias_entry(
                CanonicalField::HoursPerDay,
                &["hoursPerDay", "hours per day", "lab hours", "hours"],
            ),
            alias_entry(
                CanonicalField::NumberOfLabs,
                &["numberOfLabs", "number of labs", "lab count", "labs", "instances"],
            ),
            alias_entry(
                CanonicalField::LabCost,
                &["labCost", "lab cost", "cost of lab", "lab charges", "cost"],
            ),
            alias_entry(
                CanonicalField::TotalAmount,
                &[
                    "totalAmount",
                    "total amount",
                    "billing amount",
                    "invoice amount",
                    "amount",
                    "total",
                    "revenue",
                ],
            ),
            alias_entry(CanonicalField::Margin, &["margin", "margin amount", "profit"]),
            alias_entry(
                CanonicalField::AssignedEngineer,
                &["assignedEngineer", "assigned engineer", "engineer name", "engineer", "assigned to", "owner"],
            ),
            alias_entry(CanonicalField::Region, &["region", "geo", "location"]),
            alias_entry(
                CanonicalField::Remarks,
                &["remarks", "comments", "notes", "description"],
            ),
        ];

        Vocabulary {
            aliases,
            status: value_map(&[
                ("pending", "Pending"),
                ("open", "Pending"),
                ("new", "Pending"),
                ("wip", "Work-in-Progress"),
                ("work in progress", "Work-in-Progress"),
                ("work-in-progress", "Work-in-Progress"),
                ("in progress", "Work-in-Progress"),
                ("in-progress", "Work-in-Progress"),
                ("completed", "Completed"),
                ("complete", "Completed"),
                ("done", "Completed"),
                ("delivered", "Delivered"),
                ("on hold", "On Hold"),
                ("on-hold", "On Hold"),
                ("hold", "On Hold"),
                ("paused", "On Hold"),
                ("cancelled", "Cancelled"),
                ("canceled", "Cancelled"),
                ("test credentials shared", "Test Credentials Shared"),
            ]),
            cloud: Self::cloud_map(),
            provider: Self::provider_map(),
            tp_lab_type: Self::tp_lab_type_map(),
            line_of_business: Self::line_of_business_map(),
            months: month_map(),
        }
    }

    /// Vocabulary for the natural-language edit pathway. Smaller alias table
    /// (only fields bulk edits are allowed to touch) and a status map that
    /// additionally understands operator shorthand.
    pub fn edit_instruction() -> Self {
        let base = Self::delivery_import();
        let editable = [
            CanonicalField::LabStatus,
            CanonicalField::Cloud,
            CanonicalField::CloudType,
            CanonicalField::TpLabType,
            CanonicalField::LineOfBusiness,
            CanonicalField::Month,
            CanonicalField::Year,
            CanonicalField::Client,
            CanonicalField::TrainingName,
            CanonicalField::AssignedEngineer,
            CanonicalField::Region,
            CanonicalField::Participants,
            CanonicalField::TotalAmount,
            CanonicalField::Margin,
        ];
        let aliases = base
            .aliases
            .iter()
            .filter(|entry| editable.contains(&entry.field))
            .cloned()
            .collect();

        let mut status = base.status.clone();
        status.insert("sent for testing".to_string(), "Test Credentials Shared".to_string());
        status.insert("testing".to_string(), "Test Credentials Shared".to_string());
        status.insert("closed".to_string(), "Completed".to_string());

        Vocabulary {
            aliases,
            status,
            ..base
        }
    }

    fn cloud_map() -> BTreeMap<String, String> {
        value_map(&[
            ("public cloud", "Public Cloud"),
            ("public", "Public Cloud"),
            ("aws", "Public Cloud"),
            ("azure", "Public Cloud"),
            ("gcp", "Public Cloud"),
            ("google cloud", "Public Cloud"),
            ("private cloud", "Private Cloud"),
            ("private", "Private Cloud"),
            ("on prem", "Private Cloud"),
            ("on-prem", "Private Cloud"),
            ("on premise", "Private Cloud"),
            ("on-premise", "Private Cloud"),
            ("tp labs", "TP Labs"),
            ("tp lab", "TP Labs"),
            ("tp", "TP Labs"),
            ("third party", "TP Labs"),
            ("third-party", "TP Labs"),
            ("third party labs", "TP Labs"),
            ("sap", "TP Labs"),
            ("oracle", "TP Labs"),
            ("oem", "TP Labs"),
        ])
    }

    fn provider_map() -> BTreeMap<String, String> {
        value_map(&[
            ("aws", "AWS"),
            ("amazon", "AWS"),
            ("amazon web services", "AWS"),
            ("azure", "Azure"),
            ("microsoft azure", "Azure"),
            ("gcp", "GCP"),
            ("google", "GCP"),
            ("google cloud", "GCP"),
            ("google cloud platform", "GCP"),
        ])
    }

    fn tp_lab_type_map() -> BTreeMap<String, String> {
        value_map(&[
            ("sap", "SAP"),
            ("oracle", "Oracle"),
            ("oem", "OEM"),
        ])
    }

    fn line_of_business_map() -> BTreeMap<String, String> {
        value_map(&[
            ("standalone", "Standalone"),
            ("stand alone", "Standalone"),
            ("stand-alone", "Standalone"),
            ("vilt", "VILT"),
            ("virtual instructor led training", "VILT"),
            ("virtual instructor-led training", "VILT"),
            ("integrated", "Integrated"),
            ("blended", "Integrated"),
        ])
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening vocabulary file {path:?}"))?;
        let reader = BufReader::new(file);
        let vocab: Vocabulary =
            serde_yaml::from_reader(reader).context("Parsing vocabulary YAML")?;
        vocab.ensure_valid()?;
        Ok(vocab)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating vocabulary file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing vocabulary YAML")
    }

    pub fn ensure_valid(&self) -> Result<()> {
        let mut seen = Vec::new();
        for entry in &self.aliases {
            ensure!(
                !seen.contains(&entry.field),
                "Field '{}' appears more than once in the alias table",
                entry.field.name()
            );
            ensure!(
                !entry.aliases.is_empty(),
                "Field '{}' has no aliases",
                entry.field.name()
            );
            seen.push(entry.field);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn import_vocabulary_covers_every_canonical_field() {
        let vocab = Vocabulary::delivery_import();
        assert_eq!(vocab.aliases.len(), CanonicalField::ALL.len());
        vocab.ensure_valid().unwrap();
    }

    #[test]
    fn edit_vocabulary_is_smaller_and_maps_testing_shorthand() {
        let import = Vocabulary::delivery_import();
        let edit = Vocabulary::edit_instruction();
        assert!(edit.aliases.len() < import.aliases.len());
        assert!(!import.status.contains_key("sent for testing"));
        assert_eq!(
            edit.status.get("sent for testing").map(String::as_str),
            Some("Test Credentials Shared")
        );
    }

    #[test]
    fn month_map_accepts_numeric_abbreviated_and_full_forms() {
        let vocab = Vocabulary::delivery_import();
        for key in ["3", "03", "mar", "march"] {
            assert_eq!(vocab.months.get(key).map(String::as_str), Some("March"));
        }
    }

    #[test]
    fn vocabulary_round_trips_through_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vocab.yaml");
        let vocab = Vocabulary::delivery_import();
        vocab.save(&path).unwrap();
        let loaded = Vocabulary::load(&path).unwrap();
        assert_eq!(loaded.aliases.len(), vocab.aliases.len());
        assert_eq!(loaded.status, vocab.status);
        assert_eq!(loaded.months, vocab.months);
    }

    #[test]
    fn duplicate_alias_entries_are_rejected() {
        let mut vocab = Vocabulary::delivery_import();
        let duplicate = vocab.aliases[0].clone();
        vocab.aliases.push(duplicate);
        assert!(vocab.ensure_valid().is_err());
    }
}
