use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub resume_text: String,
    #[serde(default)]
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestion: String,
}

/// POST /api/suggestion
///
/// Proxies the resume text to the language model and returns its advice.
pub async fn handle_suggest(
    State(state): State<AppState>,
    AppJson(req): AppJson<SuggestionRequest>,
) -> Result<Json<SuggestionResponse>, AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resumeText cannot be empty".to_string(),
        ));
    }
    let suggestion = state.llm.suggest(&req.resume_text, &req.user_name).await?;
    Ok(Json(SuggestionResponse { suggestion }))
}
