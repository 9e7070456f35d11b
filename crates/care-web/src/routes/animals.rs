//! Animal routes: caregiver feed and new arrivals.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use care_core::schedule::{self, AssignedAnimal};
use care_core::{roster, AddAnimalOutcome, Animal};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::routes::treatments::parse_type;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CaregiverQuery {
    pub caregiver: Option<String>,
}

/// Animals assigned to a caregiver with a treatment row dated today.
pub async fn for_caregiver(
    State(state): State<AppState>,
    Query(params): Query<CaregiverQuery>,
) -> Result<Json<Vec<AssignedAnimal>>> {
    let config = state.session.ready().await?;
    let caregiver = params
        .caregiver
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("caregiver is required".to_string()))?;

    let animals = schedule::caregiver_animals(
        state.session.store(),
        state.session.locator(),
        &config,
        caregiver,
        chrono::Local::now().date_naive(),
    )
    .await?;
    Ok(Json(animals))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimalRequest {
    pub animal_type: String,
    pub animal: Animal,
}

/// Append an animal to its roster and provision its treatment sheet.
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<NewAnimalRequest>,
) -> Result<(StatusCode, Json<AddAnimalOutcome>)> {
    let config = state.session.ready().await?;
    let kind = parse_type(Some(&req.animal_type))?;
    let roster_doc = config.catalog.roster(kind)?;
    let folder = config.catalog.sources(kind).folder;

    let outcome = roster::add_animal(
        state.session.store(),
        state.session.locator(),
        &roster_doc,
        folder.as_deref(),
        req.animal,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{fixture, FOLDER};
    use serde_json::json;

    #[tokio::test]
    async fn test_caregiver_feed() {
        let f = fixture();
        let Json(animals) = for_caregiver(
            State(f.state.clone()),
            Query(CaregiverQuery {
                caregiver: Some("Dana".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(animals.len(), 1);
        let body = serde_json::to_value(&animals[0]).unwrap();
        assert_eq!(body["name"], "Max");
        assert_eq!(body["animalType"], "donkey");

        let Json(none) = for_caregiver(
            State(f.state.clone()),
            Query(CaregiverQuery {
                caregiver: Some("Avi".to_string()),
            }),
        )
        .await
        .unwrap();
        assert!(none.is_empty());

        let missing = for_caregiver(State(f.state), Query(CaregiverQuery::default())).await;
        assert!(matches!(missing, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_add_animal_provisions_sheet() {
        let f = fixture();
        let req: NewAnimalRequest = serde_json::from_value(json!({
            "animalType": "donkey",
            "animal": { "name": "Pita", "id": "900000000000009" },
        }))
        .unwrap();

        let (status, Json(outcome)) = add(State(f.state), Json(req)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(outcome.success);
        assert!(outcome.treatment_sheet_id.is_some());
        assert_eq!(f.store.rows(&f.roster).len(), 2);
        assert!(f
            .store
            .document_names(FOLDER)
            .contains(&"Pita 900000000000009".to_string()));
    }
}
