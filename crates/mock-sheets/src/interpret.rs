//! Emulation of hosted-spreadsheet value interpretation and sort ordering.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use sheet_core::{CellValue, SortOrder, ValueInput};

/// Interpret a written value the way the hosted spreadsheet would.
pub(crate) fn interpret(value: CellValue, input: ValueInput) -> CellValue {
    if input == ValueInput::Raw {
        return value;
    }
    match value {
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                CellValue::Bool(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                CellValue::Bool(false)
            } else if let Ok(n) = trimmed.parse::<f64>() {
                CellValue::Number(n)
            } else {
                CellValue::Text(text)
            }
        }
        other => other,
    }
}

/// Sort class: numbers and dates, then text, then booleans.
#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
    Bool(bool),
}

fn sort_key(cell: &CellValue) -> Option<SortKey> {
    if cell.is_blank() {
        return None;
    }
    match cell {
        CellValue::Empty => None,
        CellValue::Bool(b) => Some(SortKey::Bool(*b)),
        CellValue::Number(n) => Some(SortKey::Number(*n)),
        CellValue::Text(text) => Some(
            parse_date(text.trim())
                .map(|d| SortKey::Number(d.num_days_from_ce() as f64))
                .unwrap_or_else(|| SortKey::Text(text.clone())),
        ),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

/// Compare two cells for a sort, keeping blanks last in either direction.
pub(crate) fn compare_cells(a: &CellValue, b: &CellValue, order: SortOrder) -> Ordering {
    match (sort_key(a), sort_key(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        }
    }
}
