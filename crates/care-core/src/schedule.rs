//! Schedule queries and mutations across animals and types.
//!
//! Every function here takes the loaded [`CareConfig`] explicitly; callers get
//! it from [`crate::Session::ready`].

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sheet_core::{
    CellValue, DocumentId, DocumentInfo, DocumentLocator, Row, SheetData, SheetStore, ValueInput,
};
use tracing::{debug, info, warn};

use crate::animal_type::AnimalType;
use crate::date_key::DateKey;
use crate::error::{CareError, Result};
use crate::protocol::{list_protocols, Protocol};
use crate::roster::{find_animal, list_animals, Animal};
use crate::settings::{CareConfig, ScheduleOptions};
use crate::treatment::{SlotState, TimeSlot, TreatmentRecord, CASE_COLUMN, DATE_COLUMN};
use crate::writer::{write_batch, DateRange, WriteOutcome};

/// Case shown on the board when a row has none.
pub const DEFAULT_CASE: &str = "ללא תיאור";

/// Find an animal's treatment sheet in its type's folder.
pub async fn locate_sheet(
    locator: &dyn DocumentLocator,
    config: &CareConfig,
    kind: AnimalType,
    fragment: &str,
) -> Result<Option<DocumentInfo>> {
    let folder = config.catalog.folder(kind)?;
    let found = locator.find_document(&folder, fragment.trim()).await?;
    if found.is_none() {
        debug!(animal_type = %kind, fragment, "No treatment sheet found");
    }
    Ok(found)
}

async fn require_sheet(
    locator: &dyn DocumentLocator,
    config: &CareConfig,
    kind: AnimalType,
    fragment: &str,
) -> Result<DocumentInfo> {
    locate_sheet(locator, config, kind, fragment)
        .await?
        .ok_or_else(|| CareError::not_found("treatment sheet", format!("{} ({})", fragment.trim(), kind)))
}

/// Records dated within `window_days` of `today`, in sheet order.
pub async fn treatments_within(
    store: &dyn SheetStore,
    doc: &DocumentId,
    today: NaiveDate,
    window_days: i64,
) -> Result<Vec<TreatmentRecord>> {
    let sheet = store.read_sheet(doc).await?;
    Ok(sheet
        .rows
        .iter()
        .map(TreatmentRecord::from_row)
        .filter(|record| {
            record
                .date_key()
                .to_date()
                .map(|date| (date - today).num_days().abs() <= window_days)
                .unwrap_or(false)
        })
        .collect())
}

/// Animal plus its treatments around today.
#[derive(Debug, Clone, Serialize)]
pub struct AnimalProfile {
    pub animal: Animal,
    pub treatments: Vec<TreatmentRecord>,
}

/// Profile view: the roster entry and records within the profile window.
///
/// An animal without a treatment sheet has no treatments.
pub async fn profile(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    config: &CareConfig,
    options: &ScheduleOptions,
    kind: AnimalType,
    name: &str,
    today: NaiveDate,
) -> Result<AnimalProfile> {
    let roster = config.catalog.roster(kind)?;
    let animal = find_animal(store, &roster, name)
        .await?
        .ok_or_else(|| CareError::not_found("animal", name.trim()))?;

    let treatments = match locate_sheet(locator, config, kind, animal.sheet_search_key()).await? {
        Some(doc) => treatments_within(store, &doc.id, today, options.profile_window_days).await?,
        None => Vec::new(),
    };
    Ok(AnimalProfile { animal, treatments })
}

/// Roster and protocols of one type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeOverview {
    pub animals: Vec<Animal>,
    pub protocols: Vec<Protocol>,
}

/// Everything the add-treatment form needs for a type.
pub async fn type_overview(
    store: &dyn SheetStore,
    config: &CareConfig,
    kind: AnimalType,
) -> Result<TypeOverview> {
    let roster = config.catalog.roster(kind)?;
    let animals = list_animals(store, &roster).await?;
    let protocols = match config.protocols_sheet() {
        Some(doc) => list_protocols(store, &doc, kind).await?,
        None => {
            warn!("PROTOCOLS_SHEET_ID is not set; no protocols available");
            Vec::new()
        }
    };
    Ok(TypeOverview { animals, protocols })
}

/// What to clear before a batch is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Keep existing rows.
    #[default]
    Keep,
    /// Delete rows within the span of the submitted dates.
    Submitted,
    /// Delete rows within an explicit range.
    Range(DateRange),
}

/// Write a batch to an animal's sheet.
///
/// [`DeleteMode::Submitted`] with no parseable record dates deletes nothing.
pub async fn add_treatments(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    config: &CareConfig,
    kind: AnimalType,
    animal_name: &str,
    records: &[TreatmentRecord],
    mode: DeleteMode,
) -> Result<WriteOutcome> {
    let doc = require_sheet(locator, config, kind, animal_name).await?;
    let delete = match mode {
        DeleteMode::Keep => None,
        DeleteMode::Submitted => DateRange::covering(records),
        DeleteMode::Range(range) => Some(range),
    };
    write_batch(store, &doc.id, records, delete).await
}

/// Which of the three days around today an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayLabel {
    Yesterday,
    Today,
    Tomorrow,
}

impl DayLabel {
    pub const ALL: [DayLabel; 3] = [Self::Yesterday, Self::Today, Self::Tomorrow];

    pub fn offset(&self) -> i64 {
        match self {
            Self::Yesterday => -1,
            Self::Today => 0,
            Self::Tomorrow => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yesterday => "yesterday",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
        }
    }
}

/// One slot of one animal on the schedule board.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntry {
    pub id: String,
    pub animal_name: String,
    /// Display label of the type.
    pub animal_type: String,
    pub animal_type_key: AnimalType,
    pub medical_case: String,
    pub medication: String,
    pub dosage: String,
    pub treatment_type: String,
    pub time: String,
    pub time_slot: TimeSlot,
    pub emoji: String,
    pub is_completed: bool,
    /// `YYYY-MM-DD`.
    pub treatment_date: String,
    pub date_label: DayLabel,
}

/// Board entries for yesterday, today and tomorrow.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyBoard {
    pub entries: Vec<BoardEntry>,
}

impl DailyBoard {
    /// Entries still to be given.
    pub fn due(&self) -> impl Iterator<Item = &BoardEntry> {
        self.entries.iter().filter(|e| !e.is_completed)
    }
}

/// Animal name from a treatment file name.
///
/// Drops an `.xlsx`/`.xls` extension, a leading `עותק של ` and a trailing
/// 15-digit chip number.
pub fn animal_name_from_file(file_name: &str) -> String {
    let base = file_name.replace(".xlsx", "").replace(".xls", "");
    let mut name = base.trim();
    if let Some(rest) = name.strip_prefix("עותק של") {
        if rest.starts_with(char::is_whitespace) {
            name = rest.trim_start();
        }
    }
    let name = name.trim();

    let stripped = match name.rsplit_once(char::is_whitespace) {
        Some((head, tail)) if tail.len() == 15 && tail.chars().all(|c| c.is_ascii_digit()) => head.trim(),
        _ => name,
    };
    if stripped.is_empty() {
        base
    } else {
        stripped.to_string()
    }
}

/// Board entries of one sheet for one day.
///
/// Each `FALSE` slot gives a pending entry and each `TRUE` slot a completed
/// one; a row with all three slots blank gives a single `general` entry.
pub fn day_entries(
    sheet: &SheetData,
    doc: &DocumentInfo,
    kind: AnimalType,
    day: NaiveDate,
    label: DayLabel,
) -> Vec<BoardEntry> {
    let key = DateKey::from_date(day);
    let animal_name = animal_name_from_file(&doc.name);
    let mut entries = Vec::new();

    for row in &sheet.rows {
        let record = TreatmentRecord::from_row(row);
        if record.date_key() != key {
            continue;
        }
        let slots: Vec<(TimeSlot, bool)> = if record.is_schedulable() {
            TimeSlot::CHECKBOXES
                .into_iter()
                .filter(|slot| record.slot(*slot).is_checkbox())
                .map(|slot| (slot, record.slot(slot) == SlotState::Done))
                .collect()
        } else {
            vec![(TimeSlot::General, false)]
        };

        let case = record.case.trim();
        for (slot, done) in slots {
            entries.push(BoardEntry {
                id: format!("{}_{}_{}_{}_{}", kind, doc.id, slot, label.as_str(), row.position),
                animal_name: animal_name.clone(),
                animal_type: kind.label().to_string(),
                animal_type_key: kind,
                medical_case: if case.is_empty() { DEFAULT_CASE.to_string() } else { case.to_string() },
                medication: record.treatment.clone(),
                dosage: record.dosage.clone(),
                treatment_type: slot.treatment_type().to_string(),
                time: slot.time().to_string(),
                time_slot: slot,
                emoji: kind.emoji().to_string(),
                is_completed: done,
                treatment_date: day.format("%Y-%m-%d").to_string(),
                date_label: label,
            });
        }
    }
    entries
}

/// Facility-wide board for the day before, of and after `today`.
///
/// Scans each configured folder once per day, pausing `scan_delay` before
/// every scan. Only sheets modified within `lookback_days` of `now` are read;
/// a lookback too large to subtract from `now` reads every sheet.
/// A failing type/day scan is logged and skipped.
pub async fn daily_board(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    config: &CareConfig,
    options: &ScheduleOptions,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> DailyBoard {
    let since = ChronoDuration::try_days(options.lookback_days).and_then(|d| now.checked_sub_signed(d));
    if since.is_none() {
        warn!(
            lookback_days = options.lookback_days,
            "Lookback is out of range; reading every sheet in each folder"
        );
    }
    let mut board = DailyBoard::default();

    for (kind, folder) in config.catalog.with_folders() {
        for label in DayLabel::ALL {
            tokio::time::sleep(options.scan_delay).await;
            let day = today + ChronoDuration::days(label.offset());
            match scan_folder(store, locator, &folder, kind, day, label, since).await {
                Ok(entries) => {
                    info!(
                        animal_type = %kind,
                        day = label.as_str(),
                        entries = entries.len(),
                        "Scanned treatment folder"
                    );
                    board.entries.extend(entries);
                }
                Err(e) => warn!(
                    animal_type = %kind,
                    day = label.as_str(),
                    "Treatment folder scan failed: {}",
                    e
                ),
            }
        }
    }
    board
}

async fn scan_folder(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    folder: &str,
    kind: AnimalType,
    day: NaiveDate,
    label: DayLabel,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<BoardEntry>> {
    let documents = locator.list_documents(folder, since).await?;
    let mut entries = Vec::new();
    for doc in documents {
        let sheet = store.read_sheet(&doc.id).await?;
        entries.extend(day_entries(&sheet, &doc, kind, day, label));
    }
    Ok(entries)
}

/// Request to tick or untick a slot for today.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub animal_name: String,
    pub animal_type: AnimalType,
    #[serde(default)]
    pub medical_case: Option<String>,
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub is_completed: bool,
}

/// Rows changed by [`complete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub rows_updated: usize,
    /// 1-based sheet row numbers.
    pub row_numbers: Vec<usize>,
}

/// Set the slot of every matching row dated `today` to done or pending.
///
/// Rows match when their case equals the requested case (any case when none
/// is given) and the slot holds a checkbox. Every match is updated.
pub async fn complete(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    config: &CareConfig,
    request: &CompletionRequest,
    today: NaiveDate,
) -> Result<CompletionOutcome> {
    let column = request.time_slot.column().ok_or_else(|| {
        CareError::InvalidInput(format!("invalid time slot: {}", request.time_slot))
    })?;
    let doc = require_sheet(locator, config, request.animal_type, &request.animal_name).await?;
    let sheet = store.read_sheet(&doc.id).await?;

    let key = DateKey::from_date(today);
    let wanted_case = request
        .medical_case
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let matches: Vec<&Row> = sheet
        .rows
        .iter()
        .filter(|row| DateKey::parse(&row.cell(DATE_COLUMN).to_text()) == key)
        .filter(|row| wanted_case.map_or(true, |case| row.cell(CASE_COLUMN).to_text().trim() == case))
        .filter(|row| SlotState::from_cell(row.cell(column)).is_checkbox())
        .collect();

    if matches.is_empty() {
        return Err(CareError::not_found(
            "treatment row",
            format!(
                "{} {} checkbox for case {}",
                request.animal_name.trim(),
                request.time_slot,
                wanted_case.unwrap_or("unspecified")
            ),
        ));
    }

    let state = if request.is_completed { SlotState::Done } else { SlotState::Pending };
    for row in &matches {
        store
            .update_cell(&doc.id, row.position, column, CellValue::text(state.as_str()), ValueInput::UserEntered)
            .await?;
    }

    info!(
        animal = %request.animal_name,
        slot = %request.time_slot,
        rows = matches.len(),
        "Marked treatment {}",
        if request.is_completed { "complete" } else { "incomplete" }
    );
    Ok(CompletionOutcome {
        rows_updated: matches.len(),
        row_numbers: matches.iter().map(|row| row.row_number()).collect(),
    })
}

/// True when any row of the sheet is dated `day`, whatever its slot states.
pub async fn has_treatment_on(store: &dyn SheetStore, doc: &DocumentId, day: NaiveDate) -> Result<bool> {
    let key = DateKey::from_date(day);
    let sheet = store.read_sheet(doc).await?;
    Ok(sheet
        .rows
        .iter()
        .any(|row| DateKey::parse(&row.cell(DATE_COLUMN).to_text()) == key))
}

/// An animal on a caregiver's list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedAnimal {
    #[serde(flatten)]
    pub animal: Animal,
    pub animal_type: AnimalType,
}

/// Animals assigned to `caregiver` that have a treatment row dated `today`.
///
/// Types without a roster or folder are skipped, as are animals without a
/// treatment sheet.
pub async fn caregiver_animals(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    config: &CareConfig,
    caregiver: &str,
    today: NaiveDate,
) -> Result<Vec<AssignedAnimal>> {
    let mut found = Vec::new();

    for (kind, roster) in config.catalog.with_rosters() {
        let Some(folder) = config.catalog.sources(kind).folder else {
            debug!(animal_type = %kind, "No treatment folder; skipping");
            continue;
        };
        let assigned: Vec<Animal> = list_animals(store, &roster)
            .await?
            .into_iter()
            .filter(|animal| animal.is_assigned_to(caregiver))
            .collect();

        for animal in assigned {
            let Some(doc) = locator.find_document(&folder, animal.sheet_search_key()).await? else {
                debug!(animal = %animal.name, "No treatment sheet; skipping");
                continue;
            };
            if has_treatment_on(store, &doc.id, today).await? {
                found.push(AssignedAnimal { animal, animal_type: kind });
            }
        }
        debug!(animal_type = %kind, caregiver, total = found.len(), "Caregiver animals");
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animal_name_from_file() {
        assert_eq!(animal_name_from_file("Max 900000000000001"), "Max");
        assert_eq!(animal_name_from_file("עותק של Luna 900000000000002.xlsx"), "Luna");
        assert_eq!(animal_name_from_file("Big Red"), "Big Red");
        assert_eq!(animal_name_from_file("Pita 12345"), "Pita 12345");
        assert_eq!(animal_name_from_file("900000000000001"), "900000000000001");
    }

    #[test]
    fn test_day_labels() {
        assert_eq!(DayLabel::Yesterday.offset(), -1);
        assert_eq!(serde_json::to_value(DayLabel::Tomorrow).unwrap(), "tomorrow");
    }
}
