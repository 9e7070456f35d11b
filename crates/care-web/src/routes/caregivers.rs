//! Caregiver directory routes.

use axum::extract::{Query, State};
use axum::Json;
use care_core::caregivers;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverName {
    /// Empty when the email is unknown.
    pub caregiver_name: String,
}

/// Resolve a signed-in email to a caregiver name.
pub async fn by_email(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<CaregiverName>> {
    let config = state.session.ready().await?;
    let email = params
        .email
        .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))?;
    let doc = config.caregivers_sheet()?;

    let caregiver_name = caregivers::caregiver_name(state.session.store(), &doc, &email).await?;
    Ok(Json(CaregiverName { caregiver_name }))
}

/// Every caregiver name, deduplicated.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let config = state.session.ready().await?;
    let doc = config.caregivers_sheet()?;
    Ok(Json(caregivers::list_caregivers(state.session.store(), &doc).await?))
}
