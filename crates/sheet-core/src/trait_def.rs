//! The store and locator trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    CellValue, CheckboxRule, DocumentId, DocumentInfo, RowHandle, SheetData, SortOrder,
    ValueInput,
};

/// Row-level operations against the first worksheet of a document.
///
/// The store offers no transactions: every method is an independent call and
/// a failure part-way through a sequence leaves earlier calls applied.
/// This trait is object-safe and can be used with `Arc<dyn SheetStore>`.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read the header row and every data row.
    async fn read_sheet(&self, doc: &DocumentId) -> Result<SheetData>;

    /// Insert `count` blank rows before sheet row index `at`.
    async fn insert_rows(&self, doc: &DocumentId, at: usize, count: usize) -> Result<()>;

    /// Overwrite consecutive rows starting at sheet row index `at`.
    async fn write_rows(
        &self,
        doc: &DocumentId,
        at: usize,
        values: Vec<Vec<CellValue>>,
        input: ValueInput,
    ) -> Result<()>;

    /// Overwrite a single cell.
    async fn update_cell(
        &self,
        doc: &DocumentId,
        position: usize,
        column: usize,
        value: CellValue,
        input: ValueInput,
    ) -> Result<()>;

    /// Append a row after the last non-empty row.
    async fn append_row(
        &self,
        doc: &DocumentId,
        values: Vec<CellValue>,
        input: ValueInput,
    ) -> Result<()>;

    /// Delete one row by handle.
    async fn delete_row(&self, doc: &DocumentId, handle: RowHandle) -> Result<()>;

    /// Sort all data rows (header excluded) by one column.
    async fn sort_rows(&self, doc: &DocumentId, column: usize, order: SortOrder) -> Result<()>;

    /// Apply or clear checkbox rendering on individual cells.
    async fn set_checkbox_rules(&self, doc: &DocumentId, rules: Vec<CheckboxRule>) -> Result<()>;
}

/// Folder-scoped document search.
#[async_trait]
pub trait DocumentLocator: Send + Sync {
    /// Find the best spreadsheet in `folder` whose name contains `fragment`.
    async fn find_document(&self, folder: &str, fragment: &str) -> Result<Option<DocumentInfo>>;

    /// List spreadsheets in `folder`, optionally only those modified since a time.
    async fn list_documents(
        &self,
        folder: &str,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentInfo>>;

    /// Create an empty spreadsheet named `name` in `folder`.
    async fn create_spreadsheet(&self, folder: &str, name: &str) -> Result<DocumentInfo>;
}
