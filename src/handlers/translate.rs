use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target: String,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedBody {
    pub translated_text: String,
}

/// Forwards a single translation request to the translation service.
pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<Json<TranslatedBody>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if body.text.is_empty() || body.target.is_empty() {
        return Err(AppError::BadRequest("Missing text or target".to_string()));
    }

    let source = body.source.as_deref().filter(|s| !s.is_empty()).unwrap_or("en");
    let translated_text = state
        .translator
        .translate(&body.text, source, &body.target)
        .await
        .map_err(AppError::Translation)?;

    Ok(Json(TranslatedBody { translated_text }))
}
