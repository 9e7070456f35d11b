//! Treatment routes: type catalogue, overviews, profiles and bulk writes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use care_core::schedule::{self, DeleteMode};
use care_core::{roster, AnimalType, DateKey, DateRange, TreatmentRecord, TypeSummary};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Query string of `GET /treatments`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentQuery {
    pub animal_type: Option<String>,
    pub animal_name: Option<String>,
    /// Older clients send the name as `animalId`.
    pub animal_id: Option<String>,
    pub profile: Option<String>,
}

impl TreatmentQuery {
    fn name(&self) -> Option<&str> {
        self.animal_name
            .as_deref()
            .or(self.animal_id.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// `profile=1` or `profile=true` asks for a single animal's profile.
    fn wants_profile(&self) -> bool {
        self.profile
            .as_deref()
            .map(str::trim)
            .is_some_and(|p| p == "1" || p.eq_ignore_ascii_case("true"))
    }
}

pub(crate) fn parse_type(raw: Option<&str>) -> Result<AnimalType> {
    let raw = raw
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("animalType is required".to_string()))?;
    Ok(raw.parse()?)
}

/// Type catalogue, type overview or animal profile, depending on the query.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<TreatmentQuery>,
) -> Result<Json<Value>> {
    let config = state.session.ready().await?;
    let session = &state.session;

    if params.animal_type.is_none() {
        let types: Vec<TypeSummary> = AnimalType::ALL.into_iter().map(TypeSummary::from).collect();
        return Ok(Json(json!(types)));
    }
    let kind = parse_type(params.animal_type.as_deref())?;

    if params.wants_profile() {
        let name = params
            .name()
            .ok_or_else(|| ApiError::BadRequest("animalName is required for a profile".to_string()))?;
        let today = chrono::Local::now().date_naive();
        let profile = schedule::profile(
            session.store(),
            session.locator(),
            &config,
            session.options(),
            kind,
            name,
            today,
        )
        .await?;
        return Ok(Json(json!(profile)));
    }

    let overview = schedule::type_overview(session.store(), &config, kind).await?;
    Ok(Json(json!(overview)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuery {
    pub animal_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub animal_type: String,
    pub updated_animal: Map<String, Value>,
}

/// Rewrite the named fields of a roster row.
pub async fn update_animal(
    State(state): State<AppState>,
    Query(params): Query<UpdateQuery>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    let config = state.session.ready().await?;

    let name = params
        .animal_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("animalName is required".to_string()))?;
    let kind = parse_type(Some(&req.animal_type))?;
    let roster_doc = config.catalog.roster(kind)?;

    let cells = roster::update_animal(state.session.store(), &roster_doc, name, &req.updated_animal).await?;
    Ok(Json(json!({
        "animal": req.updated_animal,
        "cellsUpdated": cells,
    })))
}

/// Query string of `POST /treatments/bulk`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkQuery {
    pub animal_name: Option<String>,
    pub animal_type: Option<String>,
    pub delete: Option<String>,
    pub caregiver: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl BulkQuery {
    /// `delete=TRUE` clears `start..=end` when both are given, otherwise the
    /// span of the submitted dates.
    pub fn delete_mode(&self) -> Result<DeleteMode> {
        let delete = self
            .delete
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("true"));
        if !delete {
            return Ok(DeleteMode::Keep);
        }

        match (self.start.as_deref(), self.end.as_deref()) {
            (Some(start), Some(end)) => {
                let (start_key, end_key) = (DateKey::parse(start), DateKey::parse(end));
                if !start_key.is_valid() || !end_key.is_valid() {
                    return Err(ApiError::BadRequest(format!(
                        "invalid delete range: {} to {}",
                        start, end
                    )));
                }
                Ok(DeleteMode::Range(DateRange::new(start_key, end_key)))
            }
            (None, None) => Ok(DeleteMode::Submitted),
            _ => Err(ApiError::BadRequest(
                "start and end must be given together".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub treatments: Vec<TreatmentRecord>,
}

/// Write a course of treatments to an animal's sheet.
pub async fn bulk(
    State(state): State<AppState>,
    Query(params): Query<BulkQuery>,
    Json(req): Json<BulkRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let config = state.session.ready().await?;
    let session = &state.session;

    let name = params
        .animal_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("animalName is required".to_string()))?;
    let kind = parse_type(params.animal_type.as_deref())?;
    let mode = params.delete_mode()?;

    info!(
        animal = name,
        animal_type = %kind,
        caregiver = params.caregiver.as_deref().unwrap_or(""),
        treatments = req.treatments.len(),
        ?mode,
        "Bulk treatment write"
    );

    let outcome = schedule::add_treatments(
        session.store(),
        session.locator(),
        &config,
        kind,
        name,
        &req.treatments,
        mode,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "rowsWritten": outcome.rows_written,
            "rowsDeleted": outcome.rows_deleted,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{fixture, today, treatment_row};
    use care_core::date_key::format_dmy;
    use care_core::CareError;
    use chrono::Duration;
    use mock_sheets::CellValue;

    #[tokio::test]
    async fn test_lists_all_types() {
        let f = fixture();
        let Json(body) = query(State(f.state), Query(TreatmentQuery::default()))
            .await
            .unwrap();
        let types = body.as_array().unwrap();
        assert_eq!(types.len(), 9);
        assert!(types
            .iter()
            .any(|t| t["id"] == "donkey" && t["displayName"] == "חמור"));
    }

    #[tokio::test]
    async fn test_type_overview_without_protocols() {
        let f = fixture();
        let params = TreatmentQuery {
            animal_type: Some("donkey".to_string()),
            ..Default::default()
        };
        let Json(body) = query(State(f.state), Query(params)).await.unwrap();
        assert_eq!(body["animals"][0]["name"], "Max");
        assert_eq!(body["protocols"], json!([]));
    }

    #[tokio::test]
    async fn test_profile_by_name() {
        let f = fixture();
        f.store.push_row(
            &f.max,
            treatment_row(today() - Duration::days(30), ["FALSE", "", ""], "Old"),
        );
        let params = TreatmentQuery {
            animal_type: Some("חמור".to_string()),
            animal_id: Some("Max".to_string()),
            profile: Some("1".to_string()),
            ..Default::default()
        };
        let Json(body) = query(State(f.state), Query(params)).await.unwrap();
        assert_eq!(body["animal"]["chipId"], "900000000000001");
        let treatments = body["treatments"].as_array().unwrap();
        assert_eq!(treatments.len(), 1);
        assert_eq!(treatments[0]["case"], "Checkup");
    }

    #[tokio::test]
    async fn test_profile_zero_returns_overview() {
        let f = fixture();
        let params = TreatmentQuery {
            animal_type: Some("donkey".to_string()),
            animal_name: Some("Max".to_string()),
            profile: Some("0".to_string()),
            ..Default::default()
        };
        let Json(body) = query(State(f.state), Query(params)).await.unwrap();
        assert!(body.get("animal").is_none());
        assert_eq!(body["animals"][0]["name"], "Max");

        let params = TreatmentQuery {
            profile: Some(" TRUE ".to_string()),
            ..Default::default()
        };
        assert!(params.wants_profile());
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let f = fixture();
        let params = TreatmentQuery {
            animal_type: Some("unicorn".to_string()),
            ..Default::default()
        };
        let result = query(State(f.state), Query(params)).await;
        assert!(matches!(result, Err(ApiError::Care(CareError::InvalidInput(_)))));
    }

    #[tokio::test]
    async fn test_update_animal() {
        let f = fixture();
        let mut patch = Map::new();
        patch.insert("weight".to_string(), json!(195));
        patch.insert("favouriteColour".to_string(), json!("blue"));

        let Json(body) = update_animal(
            State(f.state.clone()),
            Query(UpdateQuery {
                animal_name: Some("Max".to_string()),
            }),
            Json(UpdateRequest {
                animal_type: "donkey".to_string(),
                updated_animal: patch.clone(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(body["cellsUpdated"], 1);
        assert_eq!(f.store.rows(&f.roster)[0][3], CellValue::Number(195.0));

        let missing = update_animal(
            State(f.state),
            Query(UpdateQuery {
                animal_name: Some("Ghost".to_string()),
            }),
            Json(UpdateRequest {
                animal_type: "donkey".to_string(),
                updated_animal: patch,
            }),
        )
        .await;
        assert!(matches!(missing, Err(ApiError::Care(CareError::NotFound { .. }))));
    }

    #[test]
    fn test_delete_mode() {
        let mut params = BulkQuery::default();
        assert_eq!(params.delete_mode().unwrap(), DeleteMode::Keep);

        params.delete = Some("TRUE".to_string());
        assert_eq!(params.delete_mode().unwrap(), DeleteMode::Submitted);

        params.start = Some("20/10/2026".to_string());
        params.end = Some("2026-10-18".to_string());
        assert_eq!(
            params.delete_mode().unwrap(),
            DeleteMode::Range(DateRange::new(
                DateKey::parse("18/10/2026"),
                DateKey::parse("20/10/2026")
            ))
        );

        params.end = None;
        assert!(params.delete_mode().is_err());
        params.end = Some("someday".to_string());
        assert!(params.delete_mode().is_err());
        params.end = Some("01/01/500000".to_string());
        assert!(params.delete_mode().is_err());
    }

    #[tokio::test]
    async fn test_bulk_replaces_course() {
        let f = fixture();
        let records: Vec<TreatmentRecord> = (0..2)
            .map(|d| TreatmentRecord {
                date: format_dmy(today() + Duration::days(d)),
                morning: care_core::SlotState::Pending,
                case: "Eye".to_string(),
                ..Default::default()
            })
            .collect();

        let (status, Json(body)) = bulk(
            State(f.state),
            Query(BulkQuery {
                animal_name: Some("Max".to_string()),
                animal_type: Some("donkey".to_string()),
                delete: Some("TRUE".to_string()),
                caregiver: Some("Dana".to_string()),
                ..Default::default()
            }),
            Json(BulkRequest { treatments: records }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["rowsWritten"], 2);
        assert_eq!(body["rowsDeleted"], 1);
        assert_eq!(f.store.rows(&f.max).len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_requires_name() {
        let f = fixture();
        let result = bulk(
            State(f.state),
            Query(BulkQuery {
                animal_type: Some("donkey".to_string()),
                ..Default::default()
            }),
            Json(BulkRequest { treatments: vec![] }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
