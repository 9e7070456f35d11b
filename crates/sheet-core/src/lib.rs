//! Core traits and types for tabular document stores.
//!
//! This crate provides the shared interface between the care tracker and the
//! spreadsheet backend it persists to. It defines:
//!
//! - [`SheetStore`] - Row-level operations against a single document's first worksheet
//! - [`DocumentLocator`] - Folder-scoped document search and provisioning
//! - [`CellValue`] / [`Row`] / [`SheetData`] - The tabular data model
//! - [`StoreError`] - Error types for store operations
//!
//! # Example
//!
//! ```rust
//! use sheet_core::{DocumentId, SheetStore, SheetData, StoreError};
//!
//! async fn count_rows(store: &dyn SheetStore, doc: &DocumentId) -> Result<usize, StoreError> {
//!     let sheet: SheetData = store.read_sheet(doc).await?;
//!     Ok(sheet.rows.len())
//! }
//! ```

mod error;
mod trait_def;
mod types;

pub use error::{Result, StoreError};
pub use trait_def::{DocumentLocator, SheetStore};
pub use types::{
    CellValue, CheckboxRule, DocumentId, DocumentInfo, Row, RowHandle, SheetData, SortOrder,
    ValueInput, SPREADSHEET_MIME_TYPE,
};

// Re-export async_trait for implementors
pub use async_trait::async_trait;
