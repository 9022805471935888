use serde::{Deserialize, Serialize};

/// The closed set of canonical delivery-request fields.
///
/// Serialized names are the camelCase wire names the hosted backend uses
/// (`freshDeskTicketNumber`, `lineOfBusiness`, ...), so vocabulary files and
/// store records read the same as the upstream table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    PotentialId,
    FreshDeskTicketNumber,
    Client,
    TrainingName,
    LabName,
    LabStatus,
    Cloud,
    CloudType,
    TpLabType,
    LineOfBusiness,
    Month,
    Year,
    StartDate,
    EndDate,
    Participants,
    NumberOfDays,
    HoursPerDay,
    NumberOfLabs,
    LabCost,
    TotalAmount,
    Margin,
    AssignedEngineer,
    Region,
    Remarks,
}

/// Declared value type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
}

impl CanonicalField {
    /// Every canonical field in declaration order. The order is load-bearing:
    /// it is the alias-table claim order during header mapping and the column
    /// order of canonical CSV output.
    pub const ALL: [CanonicalField; 24] = [
        CanonicalField::PotentialId,
        CanonicalField::FreshDeskTicketNumber,
        CanonicalField::Client,
        CanonicalField::TrainingName,
        CanonicalField::LabName,
        CanonicalField::LabStatus,
        CanonicalField::Cloud,
        CanonicalField::CloudType,
        CanonicalField::TpLabType,
        CanonicalField::LineOfBusiness,
        CanonicalField::Month,
        CanonicalField::Year,
        CanonicalField::StartDate,
        CanonicalField::EndDate,
        CanonicalField::Participants,
        CanonicalField::NumberOfDays,
        CanonicalField::HoursPerDay,
        CanonicalField::NumberOfLabs,
        CanonicalField::LabCost,
        CanonicalField::TotalAmount,
        CanonicalField::Margin,
        CanonicalField::AssignedEngineer,
        CanonicalField::Region,
        CanonicalField::Remarks,
    ];

    pub fn kind(&self) -> FieldKind {
        match self {
            CanonicalField::Year
            | CanonicalField::Participants
            | CanonicalField::NumberOfDays
            | CanonicalField::HoursPerDay
            | CanonicalField::NumberOfLabs => FieldKind::Integer,
            CanonicalField::LabCost | CanonicalField::TotalAmount | CanonicalField::Margin => {
                FieldKind::Decimal
            }
            _ => FieldKind::Text,
        }
    }

    /// Canonical camelCase wire name, e.g. `freshDeskTicketNumber`.
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::PotentialId => "potentialId",
            CanonicalField::FreshDeskTicketNumber => "freshDeskTicketNumber",
            CanonicalField::Client => "client",
            CanonicalField::TrainingName => "trainingName",
            CanonicalField::LabName => "labName",
            CanonicalField::LabStatus => "labStatus",
            CanonicalField::Cloud => "cloud",
            CanonicalField::CloudType => "cloudType",
            CanonicalField::TpLabType => "tpLabType",
            CanonicalField::LineOfBusiness => "lineOfBusiness",
            CanonicalField::Month => "month",
            CanonicalField::Year => "year",
            CanonicalField::StartDate => "startDate",
            CanonicalField::EndDate => "endDate",
            CanonicalField::Participants => "participants",
            CanonicalField::NumberOfDays => "numberOfDays",
            CanonicalField::HoursPerDay => "hoursPerDay",
            CanonicalField::NumberOfLabs => "numberOfLabs",
            CanonicalField::LabCost => "labCost",
            CanonicalField::TotalAmount => "totalAmount",
            CanonicalField::Margin => "margin",
            CanonicalField::AssignedEngineer => "assignedEngineer",
            CanonicalField::Region => "region",
            CanonicalField::Remarks => "remarks",
        }
    }
}
