//! Treatment records and the fixed twelve-column row codec.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sheet_core::{CellValue, Row};

use crate::date_key::DateKey;

/// Header row of every per-animal treatment sheet.
pub const TREATMENT_HEADER: [&str; 12] = [
    "תאריך",
    "יום",
    "בוקר",
    "צהריים",
    "ערב",
    "טיפול",
    "מינון",
    "מתן",
    "משך",
    "מתחם",
    "סיבת טיפול",
    "הערות",
];

/// Column of the display date.
pub const DATE_COLUMN: usize = 0;
/// Column of the medical case.
pub const CASE_COLUMN: usize = 10;

/// State of one morning/noon/evening cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotState {
    /// Scheduled and given (`TRUE`).
    Done,
    /// Scheduled, not yet given (`FALSE`).
    Pending,
    /// Not scheduled for this record (blank).
    #[default]
    NotApplicable,
}

impl SlotState {
    /// Normalize a raw cell, accepting native booleans and `TRUE`/`FALSE` text.
    pub fn from_cell(cell: &CellValue) -> Self {
        match cell {
            CellValue::Bool(true) => Self::Done,
            CellValue::Bool(false) => Self::Pending,
            CellValue::Text(text) => Self::from_text(text),
            _ => Self::NotApplicable,
        }
    }

    /// Parse the textual form; anything but `TRUE`/`FALSE` is not applicable.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("TRUE") {
            Self::Done
        } else if text.eq_ignore_ascii_case("FALSE") {
            Self::Pending
        } else {
            Self::NotApplicable
        }
    }

    /// The cell text written back to the sheet.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "TRUE",
            Self::Pending => "FALSE",
            Self::NotApplicable => "",
        }
    }

    /// True when the cell should render as a checkbox.
    pub fn is_checkbox(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    /// Scheduled state for a protocol flag.
    pub fn scheduled(flag: bool) -> Self {
        if flag {
            Self::Pending
        } else {
            Self::NotApplicable
        }
    }
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SlotState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SlotState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Bool(true)) => Self::Done,
            Some(Raw::Bool(false)) => Self::Pending,
            Some(Raw::Text(text)) => Self::from_text(&text),
            None => Self::NotApplicable,
        })
    }
}

/// Dosing time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Noon,
    Evening,
    /// A treatment without a specific slot.
    General,
}

impl TimeSlot {
    /// The three checkbox slots, in column order.
    pub const CHECKBOXES: [TimeSlot; 3] = [Self::Morning, Self::Noon, Self::Evening];

    /// Sheet column of the slot's checkbox.
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Morning => Some(2),
            Self::Noon => Some(3),
            Self::Evening => Some(4),
            Self::General => None,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Evening => "evening",
            Self::General => "general",
        }
    }

    /// Parse the wire name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(Self::Morning),
            "noon" => Some(Self::Noon),
            "evening" => Some(Self::Evening),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    /// Board label for the slot.
    pub fn treatment_type(&self) -> &'static str {
        match self {
            Self::Morning => "טיפול בוקר",
            Self::Noon => "טיפול צהריים",
            Self::Evening => "טיפול ערב",
            Self::General => "טיפול כללי",
        }
    }

    /// Nominal clock time shown on the board.
    pub fn time(&self) -> &'static str {
        match self {
            Self::Morning => "08:00",
            Self::Noon => "14:00",
            Self::Evening => "19:00",
            Self::General => "12:00",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of an animal's treatment sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreatmentRecord {
    /// Display date, `DD/MM/YYYY`.
    #[serde(default, deserialize_with = "text")]
    pub date: String,
    /// Weekday name; derived, never authoritative.
    #[serde(default, deserialize_with = "text")]
    pub day: String,
    #[serde(default)]
    pub morning: SlotState,
    #[serde(default)]
    pub noon: SlotState,
    #[serde(default)]
    pub evening: SlotState,
    /// Medication.
    #[serde(default, deserialize_with = "text")]
    pub treatment: String,
    #[serde(default, deserialize_with = "text")]
    pub dosage: String,
    /// Body part or administration route.
    #[serde(
        default,
        rename = "bodyPart",
        alias = "body part",
        alias = "administration",
        deserialize_with = "text"
    )]
    pub body_part: String,
    /// 1-based occurrence within a course.
    #[serde(default, deserialize_with = "text")]
    pub duration: String,
    #[serde(default, deserialize_with = "text")]
    pub location: String,
    /// Medical case; groups records into a treatment type.
    #[serde(default, deserialize_with = "text")]
    pub case: String,
    #[serde(default, deserialize_with = "text")]
    pub notes: String,
}

impl TreatmentRecord {
    /// Decode a sheet row. Missing trailing cells decode as empty.
    pub fn from_row(row: &Row) -> Self {
        let text = |column: usize| row.cell(column).to_text();
        Self {
            date: text(0),
            day: text(1),
            morning: SlotState::from_cell(row.cell(2)),
            noon: SlotState::from_cell(row.cell(3)),
            evening: SlotState::from_cell(row.cell(4)),
            treatment: text(5),
            dosage: text(6),
            body_part: text(7),
            duration: text(8),
            location: text(9),
            case: text(10),
            notes: text(11),
        }
    }

    /// Encode in the fixed column order.
    pub fn to_cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::text(self.date.as_str()),
            CellValue::text(self.day.as_str()),
            CellValue::text(self.morning.as_str()),
            CellValue::text(self.noon.as_str()),
            CellValue::text(self.evening.as_str()),
            CellValue::text(self.treatment.as_str()),
            CellValue::text(self.dosage.as_str()),
            CellValue::text(self.body_part.as_str()),
            CellValue::text(self.duration.as_str()),
            CellValue::text(self.location.as_str()),
            CellValue::text(self.case.as_str()),
            CellValue::text(self.notes.as_str()),
        ]
    }

    /// Comparison key of [`TreatmentRecord::date`].
    pub fn date_key(&self) -> DateKey {
        DateKey::parse(&self.date)
    }

    /// State of one slot; `General` is always not applicable.
    pub fn slot(&self, slot: TimeSlot) -> SlotState {
        match slot {
            TimeSlot::Morning => self.morning,
            TimeSlot::Noon => self.noon,
            TimeSlot::Evening => self.evening,
            TimeSlot::General => SlotState::NotApplicable,
        }
    }

    /// True when at least one slot is scheduled.
    pub fn is_schedulable(&self) -> bool {
        TimeSlot::CHECKBOXES
            .iter()
            .any(|slot| self.slot(*slot).is_checkbox())
    }
}

/// Accept strings, numbers and booleans as text.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
