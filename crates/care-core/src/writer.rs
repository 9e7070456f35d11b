//! Batch writes to an animal's treatment sheet.
//!
//! The store has no transactions. A batch is a sequence of independent calls
//! (delete, insert, write, checkbox rules, sort); if one fails the earlier ones
//! stay applied and the error is returned as is.

use serde::Serialize;
use sheet_core::{CheckboxRule, DocumentId, SheetStore, SortOrder, ValueInput};
use tracing::{debug, info, warn};

use crate::date_key::DateKey;
use crate::error::Result;
use crate::treatment::{TimeSlot, TreatmentRecord, DATE_COLUMN};

/// Inclusive range of date keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateKey,
    pub end: DateKey,
}

impl DateRange {
    /// Range between two keys in either order.
    pub fn new(a: DateKey, b: DateKey) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn contains(&self, key: DateKey) -> bool {
        key.is_valid() && self.start <= key && key <= self.end
    }

    /// Smallest range covering every parseable record date.
    pub fn covering(records: &[TreatmentRecord]) -> Option<Self> {
        let mut keys = records.iter().map(TreatmentRecord::date_key).filter(|k| k.is_valid());
        let first = keys.next()?;
        Some(keys.fold(Self::new(first, first), |range, key| {
            Self::new(range.start.min(key), range.end.max(key))
        }))
    }
}

/// Result of [`write_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub rows_written: usize,
    pub rows_deleted: usize,
}

/// Delete every row dated within `range`. Returns the number removed.
pub async fn delete_between(
    store: &dyn SheetStore,
    doc: &DocumentId,
    range: DateRange,
) -> Result<usize> {
    let sheet = store.read_sheet(doc).await?;
    let mut doomed: Vec<_> = sheet
        .rows
        .iter()
        .filter(|row| range.contains(DateKey::parse(&row.cell(DATE_COLUMN).to_text())))
        .map(|row| (row.position, row.handle))
        .collect();

    // Highest position first so index-based handles stay valid.
    doomed.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, handle) in &doomed {
        store.delete_row(doc, *handle).await?;
    }

    info!(
        document = %doc,
        rows = doomed.len(),
        "Deleted treatments between {} and {}",
        range.start,
        range.end
    );
    Ok(doomed.len())
}

/// Re-sort the data rows newest first.
pub async fn sort_by_date(store: &dyn SheetStore, doc: &DocumentId) -> Result<()> {
    store
        .sort_rows(doc, DATE_COLUMN, SortOrder::Descending)
        .await?;
    Ok(())
}

/// Insert `records` under the header, optionally clearing `delete` first.
///
/// Each slot cell is rendered as a checkbox when its state is `TRUE`/`FALSE`
/// and cleared to plain text when blank. The sheet is sorted by date,
/// newest first, afterwards.
pub async fn write_batch(
    store: &dyn SheetStore,
    doc: &DocumentId,
    records: &[TreatmentRecord],
    delete: Option<DateRange>,
) -> Result<WriteOutcome> {
    let rows_deleted = match delete {
        Some(range) => delete_between(store, doc, range).await?,
        None => 0,
    };

    if records.is_empty() {
        debug!(document = %doc, "No treatments to write");
        return Ok(WriteOutcome {
            rows_written: 0,
            rows_deleted,
        });
    }

    for record in records.iter().filter(|r| !r.is_schedulable()) {
        warn!(
            document = %doc,
            date = %record.date,
            case = %record.case,
            "Treatment has no morning, noon or evening slot"
        );
    }

    store.insert_rows(doc, 1, records.len()).await?;
    let values = records.iter().map(TreatmentRecord::to_cells).collect();
    store
        .write_rows(doc, 1, values, ValueInput::UserEntered)
        .await?;

    let rules = records
        .iter()
        .enumerate()
        .flat_map(|(i, record)| {
            TimeSlot::CHECKBOXES.into_iter().filter_map(move |slot| {
                slot.column().map(|column| CheckboxRule {
                    position: i + 1,
                    column,
                    checkbox: record.slot(slot).is_checkbox(),
                })
            })
        })
        .collect();
    store.set_checkbox_rules(doc, rules).await?;
    sort_by_date(store, doc).await?;

    info!(
        document = %doc,
        rows = records.len(),
        deleted = rows_deleted,
        "Wrote treatment batch"
    );
    Ok(WriteOutcome {
        rows_written: records.len(),
        rows_deleted,
    })
}
