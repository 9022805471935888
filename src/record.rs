use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{fields::CanonicalField, normalize::Value};

/// A fully-typed, canonicalized delivery request.
///
/// Every canonical field is a named member, so the compiler proves that each
/// one is handled wherever records are built or read. Unset text fields are
/// empty strings; unset numerics are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryRequest {
    pub potential_id: String,
    pub fresh_desk_ticket_number: String,
    pub client: String,
    pub training_name: String,
    pub lab_name: String,
    pub lab_status: String,
    pub cloud: String,
    pub cloud_type: String,
    pub tp_lab_type: String,
    pub line_of_business: String,
    pub month: String,
    pub year: i64,
    pub start_date: String,
    pub end_date: String,
    pub participants: i64,
    pub number_of_days: i64,
    pub hours_per_day: i64,
    pub number_of_labs: i64,
    pub lab_cost: Decimal,
    pub total_amount: Decimal,
    pub margin: Decimal,
    pub assigned_engineer: String,
    pub region: String,
    pub remarks: String,
}

impl DeliveryRequest {
    /// Reads one field as a normalized [`Value`].
    pub fn get(&self, field: CanonicalField) -> Value {
        match field {
            CanonicalField::PotentialId => Value::Text(self.potential_id.clone()),
            CanonicalField::FreshDeskTicketNumber => {
                Value::Text(self.fresh_desk_ticket_number.clone())
            }
            CanonicalField::Client => Value::Text(self.client.clone()),
            CanonicalField::TrainingName => Value::Text(self.training_name.clone()),
            CanonicalField::LabName => Value::Text(self.lab_name.clone()),
            CanonicalField::LabStatus => Value::Text(self.lab_status.clone()),
            CanonicalField::Cloud => Value::Text(self.cloud.clone()),
            CanonicalField::CloudType => Value::Text(self.cloud_type.clone()),
            CanonicalField::TpLabType => Value::Text(self.tp_lab_type.clone()),
            CanonicalField::LineOfBusiness => Value::Text(self.line_of_business.clone()),
            CanonicalField::Month => Value::Text(self.month.clone()),
            CanonicalField::Year => Value::Integer(self.year),
            CanonicalField::StartDate => Value::Text(self.start_date.clone()),
            CanonicalField::EndDate => Value::Text(self.end_date.clone()),
            CanonicalField::Participants => Value::Integer(self.participants),
            CanonicalField::NumberOfDays => Value::Integer(self.number_of_days),
            CanonicalField::HoursPerDay => Value::Integer(self.hours_per_day),
            CanonicalField::NumberOfLabs => Value::Integer(self.number_of_labs),
            CanonicalField::LabCost => Value::Decimal(self.lab_cost),
            CanonicalField::TotalAmount => Value::Decimal(self.total_amount),
            CanonicalField::Margin => Value::Decimal(self.margin),
            CanonicalField::AssignedEngineer => Value::Text(self.assigned_engineer.clone()),
            CanonicalField::Region => Value::Text(self.region.clone()),
            CanonicalField::Remarks => Value::Text(self.remarks.clone()),
        }
    }

    /// Writes one field from a normalized [`Value`], coercing to the field's
    /// declared kind. Total: a kind mismatch degrades through the value's own
    /// coercions rather than failing.
    pub fn set(&mut self, field: CanonicalField, value: Value) {
        match field {
            CanonicalField::PotentialId => self.potential_id = value.display(),
            CanonicalField::FreshDeskTicketNumber => {
                self.fresh_desk_ticket_number = value.display();
            }
            CanonicalField::Client => self.client = value.display(),
            CanonicalField::TrainingName => self.training_name = value.display(),
            CanonicalField::LabName => self.lab_name = value.display(),
            CanonicalField::LabStatus => self.lab_status = value.display(),
            CanonicalField::Cloud => self.cloud = value.display(),
            CanonicalField::CloudType => self.cloud_type = value.display(),
            CanonicalField::TpLabType => self.tp_lab_type = value.display(),
            CanonicalField::LineOfBusiness => self.line_of_business = value.display(),
            CanonicalField::Month => self.month = value.display(),
            CanonicalField::Year => self.year = value.as_integer(),
            CanonicalField::StartDate => self.start_date = value.display(),
            CanonicalField::EndDate => self.end_date = value.display(),
            CanonicalField::Participants => self.participants = value.as_integer(),
            CanonicalField::NumberOfDays => self.number_of_days = value.as_integer(),
            CanonicalField::HoursPerDay => self.hours_per_day = value.as_integer(),
            CanonicalField::NumberOfLabs => self.number_of_labs = value.as_integer(),
            CanonicalField::LabCost => self.lab_cost = value.as_decimal(),
            CanonicalField::TotalAmount => self.total_amount = value.as_decimal(),
            CanonicalField::Margin => self.margin = value.as_decimal(),
            CanonicalField::AssignedEngineer => self.assigned_engineer = value.display(),
            CanonicalField::Region => self.region = value.display(),
            CanonicalField::Remarks => self.remarks = value.display(),
        }
    }

    pub fn display(&self, field: CanonicalField) -> String {
        self.get(field).display()
    }

    /// Renders the record back into a raw row keyed by canonical wire names.
    /// This is the export shape, and re-correcting it must be a no-op.
    pub fn to_raw_row(&self) -> BTreeMap<String, String> {
        CanonicalField::ALL
            .iter()
            .map(|field| (field.name().to_string(), self.display(*field)))
            .collect()
    }
}
