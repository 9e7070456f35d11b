//! In-memory spreadsheet backend for testing.
//!
//! This crate provides [`MemoryWorkspace`], a mock implementation of both
//! [`SheetStore`] and [`DocumentLocator`] that keeps every document in
//! process memory. It emulates the parts of a hosted spreadsheet that the
//! care tracker depends on:
//!
//! - `USER_ENTERED` writes turn `TRUE`/`FALSE` into booleans and numeric text into numbers
//! - Reads drop trailing empty cells, like the hosted API does
//! - Sorting treats day-first dates chronologically and keeps blanks last
//! - Checkbox rules are tracked per cell and travel with their row
//! - Row handles survive inserts, deletes and sorts
//!
//! # Example
//!
//! ```rust
//! use mock_sheets::MemoryWorkspace;
//! use mock_sheets::{CellValue, SheetStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_sheets::StoreError> {
//!     let workspace = MemoryWorkspace::new();
//!     let doc = workspace.add_document("doc-1", "Max 900000000000001", Some("donkeys"), &["תאריך"]);
//!     workspace.push_row(&doc, vec![CellValue::text("16/10/2026")]);
//!
//!     let sheet = workspace.read_sheet(&doc).await?;
//!     assert_eq!(sheet.rows.len(), 1);
//!     Ok(())
//! }
//! ```

mod interpret;
mod workspace;

pub use workspace::MemoryWorkspace;

// Re-export store types for convenience
pub use sheet_core::{CellValue, DocumentId, DocumentLocator, SheetStore, StoreError};
