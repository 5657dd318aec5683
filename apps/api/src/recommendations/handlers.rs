use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::inventory::handlers::LimitQuery;
use crate::inventory::repo::list_in_stock;
use crate::models::recommendation::{RecommendationRow, UserFeedback};
use crate::profile::repo::load_profile;
use crate::recommendations::{
    build_recommendations, repo, RecommendationRequest, DEFAULT_LIMIT, MAX_LIMIT,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: UserFeedback,
    #[serde(default)]
    pub notes: Option<String>,
}

fn validate_request(request: &RecommendationRequest) -> Result<usize, AppError> {
    let limit = request.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(AppError::Validation(format!(
            "limit: must be between 1 and {MAX_LIMIT}"
        )));
    }
    if let Some(band) = &request.price_band {
        if band.min < 0.0 || band.min > band.max {
            return Err(AppError::Validation(
                "price_band: min must be >= 0 and <= max".to_string(),
            ));
        }
    }
    Ok(limit)
}

/// POST /api/recommendations
pub async fn handle_generate(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<RecommendationRequest>,
) -> Result<(StatusCode, Json<Vec<RecommendationRow>>), AppError> {
    let limit = validate_request(&request)?;

    let (wines, profile) = tokio::try_join!(
        list_in_stock(&state.db, user.user_id),
        load_profile(&state.db, user.user_id),
    )?;

    let candidates = build_recommendations(
        &request,
        &wines,
        profile.as_ref(),
        Utc::now().date_naive(),
        limit,
    );
    let context = json!({
        "occasion": request.occasion,
        "food": request.food,
        "price_band": request.price_band,
    });
    let rows = repo::insert_recommendations(&state.db, user.user_id, &candidates, &context).await?;
    Ok((StatusCode::CREATED, Json(rows)))
}

/// GET /api/recommendations
pub async fn handle_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<RecommendationRow>>, AppError> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    Ok(Json(
        repo::list_recommendations(&state.db, user.user_id, limit).await?,
    ))
}

/// PATCH /api/recommendations/:id/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<FeedbackRequest>,
) -> Result<Json<RecommendationRow>, AppError> {
    Ok(Json(
        repo::set_feedback(
            &state.db,
            user.user_id,
            id,
            body.feedback,
            body.notes.as_deref(),
        )
        .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::taste_profile::PriceRange;

    #[test]
    fn test_limit_bounds() {
        let mut r = RecommendationRequest::default();
        assert_eq!(validate_request(&r).unwrap(), DEFAULT_LIMIT);
        r.limit = Some(11);
        assert!(validate_request(&r).is_err());
        r.limit = Some(0);
        assert!(validate_request(&r).is_err());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let r = RecommendationRequest {
            price_band: Some(PriceRange {
                min: 50.0,
                max: 10.0,
            }),
            ..Default::default()
        };
        assert!(validate_request(&r).is_err());
    }

    #[test]
    fn test_unknown_feedback_value_rejected() {
        let parsed: Result<FeedbackRequest, _> =
            serde_json::from_str(r#"{"feedback": "maybe"}"#);
        assert!(parsed.is_err());
    }
}
