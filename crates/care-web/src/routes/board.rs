//! Daily schedule board and completion toggle.

use axum::extract::State;
use axum::Json;
use care_core::schedule::{self, BoardEntry};
use care_core::CompletionRequest;
use chrono::{Local, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub success: bool,
    pub treatments: Vec<BoardEntry>,
    /// RFC 3339 time the board was built.
    pub timestamp: String,
}

/// Board for yesterday, today and tomorrow across every configured type.
pub async fn today(State(state): State<AppState>) -> Result<Json<BoardResponse>> {
    let config = state.session.ready().await?;
    let session = &state.session;

    let now = Utc::now();
    let board = schedule::daily_board(
        session.store(),
        session.locator(),
        &config,
        session.options(),
        Local::now().date_naive(),
        now,
    )
    .await;

    Ok(Json(BoardResponse {
        success: true,
        treatments: board.entries,
        timestamp: now.to_rfc3339(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub success: bool,
    pub message: String,
    pub rows_updated: usize,
    pub row_numbers: Vec<usize>,
}

/// Tick or untick a slot on every matching row dated today.
pub async fn complete(
    State(state): State<AppState>,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<CompleteResponse>> {
    let config = state.session.ready().await?;
    let session = &state.session;

    let outcome = schedule::complete(
        session.store(),
        session.locator(),
        &config,
        &req,
        Local::now().date_naive(),
    )
    .await?;

    Ok(Json(CompleteResponse {
        success: true,
        message: format!(
            "Treatment marked as {}",
            if req.is_completed { "completed" } else { "not completed" }
        ),
        rows_updated: outcome.rows_updated,
        row_numbers: outcome.row_numbers,
    }))
}
