use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::inventory::repo::list_in_stock;
use crate::pairing::{rank_for_food, PairingResult};
use crate::profile::repo::load_profile;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct FoodPairingRequest {
    pub food: String,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// POST /api/food-pairing
pub async fn handle_food_pairing(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<FoodPairingRequest>,
) -> Result<Json<PairingResult>, AppError> {
    let food = request.food.trim();
    if food.is_empty() {
        return Err(AppError::Validation("food: must not be empty".to_string()));
    }
    let limit = request.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let (wines, profile) = tokio::try_join!(
        list_in_stock(&state.db, user.user_id),
        load_profile(&state.db, user.user_id),
    )?;

    let result = rank_for_food(&wines, food, profile.as_ref(), Utc::now().date_naive(), limit);
    info!(
        "Food pairing for user {} ({:?}, occasion {:?}): {} candidates",
        user.user_id,
        result.main_ingredient,
        request.occasion,
        result.suggestions.len()
    );
    Ok(Json(result))
}
