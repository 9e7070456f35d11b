//! Treatment protocols and their expansion into dated records.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sheet_core::{CellValue, DocumentId, Row, SheetData, SheetStore};
use tracing::debug;

use crate::animal_type::AnimalType;
use crate::date_key::{format_dmy, weekday_name};
use crate::error::Result;
use crate::treatment::{SlotState, TreatmentRecord};

const ANIMAL: &str = "חיה";
const CASE: &str = "אבחון";
const MEDICATION: &str = "תרופה";
const DAYS: &str = "ימים";
const FREQUENCY: &str = "תדירות";
const MORNING: &str = "בוקר";
const NOON: &str = "צהריים";
const EVENING: &str = "ערב";
const DOSAGE: &str = "מינון";
const ADMINISTRATION: &str = "מתן";

/// Longest course or dosing interval a protocol may describe, in days.
pub const MAX_COURSE_DAYS: u32 = 365;

/// A reusable treatment template for one animal type and case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    /// Animal type label as written in the table.
    #[serde(rename = "type")]
    pub animal: String,
    pub case: String,
    pub medication: String,
    /// Course length in days.
    pub days: u32,
    /// Days between doses.
    pub frequency: u32,
    pub morning: bool,
    pub noon: bool,
    pub evening: bool,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub administration: String,
}

impl Protocol {
    fn from_row(sheet: &SheetData, row: &Row) -> Self {
        let cell = |label: &str| {
            sheet
                .column_of(label)
                .map(|column| row.cell(column).clone())
                .unwrap_or_default()
        };
        let text = |label: &str| cell(label).to_text().trim().to_string();

        Self {
            animal: text(ANIMAL),
            case: text(CASE),
            medication: text(MEDICATION),
            days: count(&cell(DAYS)),
            frequency: count(&cell(FREQUENCY)),
            morning: flag(&cell(MORNING)),
            noon: flag(&cell(NOON)),
            evening: flag(&cell(EVENING)),
            dosage: text(DOSAGE),
            administration: text(ADMINISTRATION),
        }
    }

    /// True when at least one slot applies.
    pub fn has_slots(&self) -> bool {
        self.morning || self.noon || self.evening
    }
}

/// Positive whole count capped at [`MAX_COURSE_DAYS`]; blank, non-numeric or
/// zero cells count as 1.
fn count(cell: &CellValue) -> u32 {
    cell.to_text()
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n.min(f64::from(MAX_COURSE_DAYS)).floor() as u32)
        .unwrap_or(1)
}

/// A slot flag is set by any non-blank value other than `0` or `FALSE`.
fn flag(cell: &CellValue) -> bool {
    if cell.is_blank() {
        return false;
    }
    match cell {
        CellValue::Bool(b) => *b,
        CellValue::Number(n) => *n != 0.0,
        CellValue::Text(text) => {
            let text = text.trim();
            !(text == "0" || text.eq_ignore_ascii_case("FALSE"))
        }
        CellValue::Empty => false,
    }
}

/// Decode every protocol row of a sheet.
pub fn decode_protocols(sheet: &SheetData) -> Vec<Protocol> {
    sheet
        .rows
        .iter()
        .map(|row| Protocol::from_row(sheet, row))
        .collect()
}

/// Protocols for one animal type from the shared protocol sheet.
pub async fn list_protocols(
    store: &dyn SheetStore,
    doc: &DocumentId,
    kind: AnimalType,
) -> Result<Vec<Protocol>> {
    let sheet = store.read_sheet(doc).await?;
    let protocols: Vec<Protocol> = decode_protocols(&sheet)
        .into_iter()
        .filter(|p| p.animal == kind.label())
        .collect();
    debug!(
        animal_type = %kind,
        protocols = protocols.len(),
        "Loaded protocols"
    );
    Ok(protocols)
}

/// Expand a protocol into one record per dose day, in ascending date order.
///
/// Doses fall on `start + d` for `d = 0, frequency, 2*frequency, ...` below
/// `days`, which is capped at [`MAX_COURSE_DAYS`]. Flagged slots are `FALSE`
/// (pending), others blank. A protocol with no flagged slot produces nothing.
pub fn expand(protocol: &Protocol, start: NaiveDate, notes: &str) -> Vec<TreatmentRecord> {
    if !protocol.has_slots() {
        return Vec::new();
    }
    let frequency = protocol.frequency.max(1) as usize;

    (0..protocol.days.min(MAX_COURSE_DAYS))
        .step_by(frequency)
        .map_while(|offset| start.checked_add_days(Days::new(u64::from(offset))))
        .enumerate()
        .map(|(index, date)| TreatmentRecord {
            date: format_dmy(date),
            day: weekday_name(date).to_string(),
            morning: SlotState::scheduled(protocol.morning),
            noon: SlotState::scheduled(protocol.noon),
            evening: SlotState::scheduled(protocol.evening),
            treatment: protocol.medication.clone(),
            dosage: protocol.dosage.clone(),
            body_part: protocol.administration.clone(),
            duration: (index + 1).to_string(),
            location: String::new(),
            case: protocol.case.clone(),
            notes: notes.to_string(),
        })
        .collect()
}

/// Sort records newest first by date key; equal dates keep their order.
pub fn sort_descending(records: &mut [TreatmentRecord]) {
    records.sort_by(|a, b| b.date_key().cmp(&a.date_key()));
}
