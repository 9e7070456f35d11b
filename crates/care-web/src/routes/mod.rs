//! Route handlers for the care web API.

pub mod animals;
pub mod board;
pub mod caregivers;
pub mod health;
pub mod treatments;

use axum::middleware::map_response_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::error::redact_errors;
use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Treatments
        .route(
            "/treatments",
            get(treatments::query).put(treatments::update_animal),
        )
        .route("/treatments/bulk", post(treatments::bulk))
        .route("/treatments/today", get(board::today))
        .route("/treatments/complete", post(board::complete))
        // Directories
        .route("/animals", get(animals::for_caregiver).post(animals::add))
        .route("/caregiver", get(caregivers::by_email))
        .route("/caregivers", get(caregivers::list))
}

/// Router with state, error redaction and open CORS applied.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router()
        .layer(map_response_with_state(state.clone(), redact_errors))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use care_core::date_key::format_dmy;
    use care_core::treatment::TREATMENT_HEADER;
    use care_core::{ScheduleOptions, Session, Settings};
    use chrono::{Local, NaiveDate};
    use mock_sheets::{CellValue, DocumentId, MemoryWorkspace};

    use crate::state::AppState;

    pub const FOLDER: &str = "donkey-folder";

    pub struct Fixture {
        pub store: MemoryWorkspace,
        pub state: AppState,
        pub roster: DocumentId,
        pub max: DocumentId,
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn treatment_row(date: NaiveDate, slots: [&str; 3], case: &str) -> Vec<CellValue> {
        let mut row = vec![CellValue::text(format_dmy(date)), CellValue::text("")];
        row.extend(slots.iter().map(|s| CellValue::text(*s)));
        row.extend(
            ["Bute", "2g", "PO", "1", "", case]
                .iter()
                .map(|s| CellValue::text(*s)),
        );
        row
    }

    /// One donkey, Max, cared for by Dana, due a noon "Checkup" today.
    pub fn fixture() -> Fixture {
        let store = MemoryWorkspace::new();
        let roster = store.add_document("donkeys", "Donkeys", None, &["שם", "שבב", "בטיפול", "משקל"]);
        store.push_row(
            &roster,
            vec![
                CellValue::text("Max"),
                CellValue::text("900000000000001"),
                CellValue::text("Dana"),
                CellValue::text("180"),
            ],
        );

        let max = store.add_document(
            "max-sheet",
            "Max 900000000000001",
            Some(FOLDER),
            &TREATMENT_HEADER,
        );
        store.push_row(&max, treatment_row(today(), ["", "FALSE", ""], "Checkup"));

        let caregivers = store.add_document("caregivers", "Caregivers", None, &["מטפל", "מייל"]);
        store.push_row(
            &caregivers,
            vec![CellValue::text("Dana"), CellValue::text("dana@example.org")],
        );

        let session = Session::with_workspace(
            store.clone(),
            Settings::from_pairs([
                ("DONKEYS_SHEET_ID", "donkeys"),
                ("DONKEYS_DRIVE_FOLDER_ID", FOLDER),
                ("CAREGIVERS_SHEET_ID", "caregivers"),
            ]),
            ScheduleOptions {
                scan_delay: Duration::ZERO,
                ..ScheduleOptions::default()
            },
        );

        Fixture {
            store,
            state: AppState::new(Arc::new(session), false),
            roster,
            max,
        }
    }
}
