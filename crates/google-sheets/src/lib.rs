//! Google Sheets and Drive backend.
//!
//! This crate implements [`sheet_core::SheetStore`] on top of the Sheets v4
//! REST API and [`sheet_core::DocumentLocator`] on top of Drive v3 file
//! search. It supports:
//!
//! - Reading a document's first worksheet (header plus data rows)
//! - Inserting, writing, appending, deleting and sorting rows
//! - Applying and clearing checkbox validation on single cells
//! - Finding, listing and creating spreadsheets inside a Drive folder
//!
//! Authentication is a bearer access token supplied by the caller; minting
//! tokens is left to the deployment.
//!
//! # Example
//!
//! ```no_run
//! use google_sheets::{GoogleConfig, GoogleWorkspace};
//! use sheet_core::{DocumentLocator, SheetStore};
//!
//! # async fn example() -> Result<(), sheet_core::StoreError> {
//! let workspace = GoogleWorkspace::new(GoogleConfig::new("ya29.token"))?;
//!
//! if let Some(doc) = workspace.find_document("folder-id", "Max").await? {
//!     let sheet = workspace.read_sheet(&doc.id).await?;
//!     println!("{} has {} rows", doc.name, sheet.rows.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod requests;

pub use client::GoogleWorkspace;
pub use config::GoogleConfig;
