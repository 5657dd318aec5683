use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::inventory::repo::{self, WineFilter};
use crate::inventory::stats::{compute_cellar_stats, CellarStats};
use crate::inventory::validation::{ConsumeRequest, NewWine, WinePatch};
use crate::inventory::window::refresh_status;
use crate::models::consumption::ConsumptionRecordRow;
use crate::models::wine::WineRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WineListResponse {
    pub wines: Vec<WineRow>,
    pub stats: CellarStats,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// GET /api/wines
pub async fn handle_list_wines(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<WineFilter>,
) -> Result<Json<WineListResponse>, AppError> {
    let today = Utc::now().date_naive();
    let since = today - Duration::days(30);

    // Stats always cover the whole cellar, independent of the list filter.
    let whole_cellar = WineFilter::default();
    let (mut wines, all_wines, consumed) = tokio::try_join!(
        repo::list_wines(&state.db, user.user_id, &filter),
        repo::list_wines(&state.db, user.user_id, &whole_cellar),
        repo::count_consumed_since(&state.db, user.user_id, since),
    )?;

    let stats = compute_cellar_stats(&all_wines, today, consumed);
    for wine in &mut wines {
        refresh_status(wine, today);
    }
    Ok(Json(WineListResponse { wines, stats }))
}

/// POST /api/wines
pub async fn handle_create_wine(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(body): AppJson<NewWine>,
) -> Result<(StatusCode, Json<WineRow>), AppError> {
    let draft = body.into_draft(Utc::now().date_naive())?;
    let wine = repo::insert_wine(&state.db, user.user_id, &draft).await?;
    Ok((StatusCode::CREATED, Json(wine)))
}

/// GET /api/wines/:id
pub async fn handle_get_wine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WineRow>, AppError> {
    let mut wine = repo::get_wine(&state.db, user.user_id, id).await?;
    refresh_status(&mut wine, Utc::now().date_naive());
    Ok(Json(wine))
}

/// PUT /api/wines/:id
pub async fn handle_update_wine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(patch): AppJson<WinePatch>,
) -> Result<Json<WineRow>, AppError> {
    let today = Utc::now().date_naive();
    let existing = repo::get_wine(&state.db, user.user_id, id).await?;
    let draft = patch.apply(&existing, today)?;
    let mut wine = repo::update_wine(&state.db, user.user_id, id, &draft).await?;
    refresh_status(&mut wine, today);
    Ok(Json(wine))
}

/// DELETE /api/wines/:id
pub async fn handle_delete_wine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    repo::delete_wine(&state.db, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/wines/:id/consume
pub async fn handle_consume_wine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<ConsumeRequest>,
) -> Result<(StatusCode, Json<ConsumptionRecordRow>), AppError> {
    request.validate()?;
    let record = repo::consume_wine(
        &state.db,
        user.user_id,
        id,
        &request,
        Utc::now().date_naive(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/consumption
pub async fn handle_consumption_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<ConsumptionRecordRow>>, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    Ok(Json(
        repo::list_consumption(&state.db, user.user_id, limit).await?,
    ))
}
