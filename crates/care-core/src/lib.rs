//! Treatment scheduling for the animal care tracker.
//!
//! Every animal has its own treatment spreadsheet; rosters, protocols and
//! caregivers live in shared spreadsheets. This crate holds the domain logic on
//! top of any [`sheet_core::SheetStore`]:
//!
//! - [`treatment`] - Treatment records, tri-state slots and the row codec
//! - [`protocol`] - Protocol decoding and expansion into dated records
//! - [`writer`] - Batch insert, range delete and date sort
//! - [`schedule`] - Profile window, daily board, completion and caregiver feed
//! - [`roster`] / [`caregivers`] - Roster and caregiver directories
//! - [`Session`] - Store handles plus the once-loaded configuration
//!
//! # Example
//!
//! ```no_run
//! use care_core::{schedule, ScheduleOptions, Session, Settings};
//! use mock_sheets::MemoryWorkspace;
//!
//! # async fn example() -> care_core::Result<()> {
//! let session = Session::with_workspace(
//!     MemoryWorkspace::new(),
//!     Settings::from_env(),
//!     ScheduleOptions::default(),
//! );
//! let config = session.ready().await?;
//! let today = chrono::Local::now().date_naive();
//! let board = schedule::daily_board(
//!     session.store(),
//!     session.locator(),
//!     &config,
//!     session.options(),
//!     today,
//!     chrono::Utc::now(),
//! )
//! .await;
//! println!("{} treatments still due", board.due().count());
//! # Ok(())
//! # }
//! ```

pub mod animal_type;
pub mod caregivers;
pub mod date_key;
pub mod error;
pub mod protocol;
pub mod roster;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod treatment;
pub mod writer;

pub use animal_type::{AnimalType, TypeCatalog, TypeSummary};
pub use date_key::DateKey;
pub use error::{CareError, Result};
pub use protocol::Protocol;
pub use roster::{AddAnimalOutcome, Animal};
pub use schedule::{BoardEntry, CompletionOutcome, CompletionRequest, DailyBoard, DeleteMode};
pub use session::Session;
pub use settings::{CareConfig, ScheduleOptions, Settings};
pub use treatment::{SlotState, TimeSlot, TreatmentRecord};
pub use writer::{DateRange, WriteOutcome};
