use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use futures::future::{join, try_join};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geo::{estimate_time, TravelMode};
use crate::models::building::{Building, BuildingList, DashboardStats, NewBuilding};
use crate::models::error::AppError;
use crate::models::position::GeoPoint;
use crate::state::AppState;
use crate::translate::{translate_with_retry, TranslateError};

const DEFAULT_MODE: &str = "drive";
const SOURCE_LANGUAGE: &str = "en";

#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    pub start: Option<GeoPoint>,
    pub end: Option<GeoPoint>,
    pub mode: Option<String>,
    pub speed: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TravelTime {
    pub readable: String,
    pub minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub mode: String,
    pub distance: f64,
    pub time: TravelTime,
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub async fn get_distance(
    State(state): State<AppState>,
    payload: Result<Json<DistanceRequest>, JsonRejection>,
) -> Result<Json<DistanceResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (start, end) = match (request.start, request.end) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(AppError::BadRequest("Missing start or end".to_string())),
    };
    start.validate().map_err(AppError::BadRequest)?;
    end.validate().map_err(AppError::BadRequest)?;

    let mode = request.mode.unwrap_or_else(|| DEFAULT_MODE.to_string());

    let distance = state
        .distance
        .distance_km(start, end)
        .await
        .map_err(|e| AppError::Internal(format!("Error calculating distance: {}", e)))?;

    let estimate = estimate_time(distance, TravelMode::parse(&mode), request.speed);
    debug!("{:?} -> {:?}: {} km, {}", start, end, distance, estimate.time_string);

    Ok(Json(DistanceResponse {
        mode,
        distance: round_to_hundredths(distance),
        time: TravelTime {
            readable: estimate.time_string,
            minutes: estimate.minutes,
        },
    }))
}

pub async fn get_buildings(State(state): State<AppState>) -> Result<Json<BuildingList>, AppError> {
    let buildings = state
        .buildings
        .list_buildings()
        .await
        .map_err(AppError::store("Error fetching buildings"))?;
    Ok(Json(BuildingList { buildings }))
}

pub async fn add_place(
    State(state): State<AppState>,
    payload: Result<Json<NewBuilding>, JsonRejection>,
) -> Result<Json<Building>, AppError> {
    let Json(mut building) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if building.name.trim().is_empty() {
        return Err(AppError::BadRequest("Building name is required".to_string()));
    }
    building.location().validate().map_err(AppError::BadRequest)?;

    if building.needs_translation() {
        fill_translations(&state, &mut building).await;
    }

    let created = state
        .buildings
        .create_building(building)
        .await
        .map_err(AppError::store("Error adding building"))?;
    info!("Added building {} ({})", created.id, created.name);
    Ok(Json(created))
}

/// Best effort: fills blank Arabic/French fields, leaving them blank when the
/// translation service fails.
async fn fill_translations(state: &AppState, building: &mut NewBuilding) {
    if building.name_ar.trim().is_empty() || building.name_fr.trim().is_empty() {
        let (ar, fr) = translate_pair(state, &building.name).await;
        fill_blank(&mut building.name_ar, ar);
        fill_blank(&mut building.name_fr, fr);
    }

    if !building.description.trim().is_empty()
        && (building.description_ar.trim().is_empty() || building.description_fr.trim().is_empty())
    {
        let (ar, fr) = translate_pair(state, &building.description).await;
        fill_blank(&mut building.description_ar, ar);
        fill_blank(&mut building.description_fr, fr);
    }
}

async fn translate_pair(state: &AppState, text: &str) -> (Option<String>, Option<String>) {
    let translator = state.translator.as_ref();
    let backoff = state.translate_retry_backoff;
    let (ar, fr) = join(
        translate_with_retry(translator, text, SOURCE_LANGUAGE, "ar", backoff),
        translate_with_retry(translator, text, SOURCE_LANGUAGE, "fr", backoff),
    )
    .await;

    let keep = |target: &str, result: Result<String, TranslateError>| match result {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Translation to {} failed: {}", target, e);
            None
        }
    };
    (keep("ar", ar), keep("fr", fr))
}

fn fill_blank(field: &mut String, translated: Option<String>) {
    if field.trim().is_empty() {
        if let Some(text) = translated {
            *field = text;
        }
    }
}

pub async fn get_dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let (users, buildings) = try_join(state.users.count_users(), state.buildings.count_buildings())
        .await
        .map_err(AppError::store("Error fetching stats"))?;
    Ok(Json(DashboardStats { users, buildings }))
}
