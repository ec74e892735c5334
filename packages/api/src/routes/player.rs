use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::error;

use crate::{error::ApiError, state::AppState};
use shared::models::responses::MatchRecordResponse;

pub fn routes() -> Router<AppState> {
    Router::new().route("/players/{user_id}/matches", get(match_history))
}

async fn match_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MatchRecordResponse>>, ApiError> {
    let records = state
        .game_session_service
        .match_history(&user_id)
        .await
        .map_err(|e| {
            error!("Failed to load match history for {}: {}", user_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(
        records
            .into_iter()
            .map(MatchRecordResponse::from)
            .collect(),
    ))
}
