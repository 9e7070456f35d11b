//! Tabular data model shared by every store implementation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type the document locator filters on.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Opaque identifier of a spreadsheet document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a raw document ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A document as reported by the locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Document ID.
    pub id: DocumentId,
    /// File name.
    pub name: String,
    /// Last modification time, when the backend reports it.
    pub modified: Option<DateTime<Utc>>,
}

/// A single cell value as returned by the store.
///
/// Stores differ in how they report checkbox cells (native booleans or the
/// strings `"TRUE"`/`"FALSE"`); both shapes are preserved here and
/// normalized by the treatment codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value.
    #[default]
    Empty,
    /// Native boolean.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl CellValue {
    /// Build a text cell, mapping the empty string to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    /// True for [`CellValue::Empty`] and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell the way a spreadsheet would display it.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Convert to the JSON shape the store's write APIs accept.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Empty => serde_json::Value::String(String::new()),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(n.to_string())),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or_default(),
            serde_json::Value::String(s) => Self::text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Stable identity of a row within a document.
///
/// Backends that address rows by index hand out the index observed at read
/// time; callers deleting several rows must do so in descending
/// [`Row::position`] order so earlier handles stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(pub u64);

impl fmt::Display for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A data row read from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Stable identity for deletion.
    pub handle: RowHandle,
    /// 0-based sheet row index at read time (the header is row 0).
    pub position: usize,
    /// Cell values, trailing blanks may be omitted.
    pub values: Vec<CellValue>,
}

impl Row {
    /// Get a cell, treating missing trailing cells as empty.
    pub fn cell(&self, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.values.get(column).unwrap_or(&EMPTY)
    }

    /// 1-based row number as shown in the spreadsheet UI.
    pub fn row_number(&self) -> usize {
        self.position + 1
    }
}

/// Header and data rows of a document's first worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetData {
    /// Header labels (row 0).
    pub header: Vec<String>,
    /// Data rows in sheet order.
    pub rows: Vec<Row>,
}

impl SheetData {
    /// Index of the first header whose trimmed label equals `label`.
    pub fn column_of(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.header.iter().position(|h| h.trim() == label)
    }
}

/// How the store interprets written values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInput {
    /// Stored exactly as given.
    Raw,
    /// Parsed as if typed by a user (dates, booleans, numbers).
    UserEntered,
}

impl ValueInput {
    /// Wire name of the option.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

/// Sort direction for [`crate::SheetStore::sort_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Wire name of the order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

/// Checkbox rendering rule for a single cell.
///
/// `checkbox: true` applies a boolean validation so the cell renders as a
/// checkbox; `false` clears any such rule so the cell renders as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxRule {
    /// 0-based sheet row index.
    pub position: usize,
    /// 0-based column index.
    pub column: usize,
    /// Apply (`true`) or clear (`false`) the checkbox rule.
    pub checkbox: bool,
}
