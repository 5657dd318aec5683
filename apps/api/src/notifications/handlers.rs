use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extractors::{AppJson, AuthUser, CronAuth};
use crate::inventory::repo::list_in_stock;
use crate::models::notification::NotificationRow;
use crate::notifications::alerts::{generate_alerts, DrinkingWindowAlert};
use crate::notifications::preferences::{NotificationPreferences, PreferencesInput};
use crate::notifications::processing::{process_all, JobContext, ProcessingSummary};
use crate::notifications::repo;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// GET /api/notifications
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<NotificationRow>>, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    Ok(Json(
        repo::list_notifications(&state.db, user.user_id, query.unread_only, limit).await?,
    ))
}

/// PATCH /api/notifications/:id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationRow>, AppError> {
    Ok(Json(repo::mark_read(&state.db, user.user_id, id).await?))
}

/// GET /api/notifications/alerts
pub async fn handle_live_alerts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<DrinkingWindowAlert>>, AppError> {
    let wines = list_in_stock(&state.db, user.user_id).await?;
    Ok(Json(generate_alerts(&wines, Utc::now().date_naive())))
}

/// GET /api/notifications/preferences
pub async fn handle_get_preferences(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<NotificationPreferences>, AppError> {
    Ok(Json(repo::load_preferences(&state.db, user.user_id).await?))
}

/// PUT /api/notifications/preferences
pub async fn handle_put_preferences(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<PreferencesInput>,
) -> Result<Json<NotificationPreferences>, AppError> {
    // Validated in full before anything is written.
    let prefs = input.into_replacement()?;
    let row =
        repo::upsert_preferences(&state.db, user.user_id, &prefs, user.email.as_deref()).await?;
    Ok(Json(row.into()))
}

/// PATCH /api/notifications/preferences
pub async fn handle_patch_preferences(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<PreferencesInput>,
) -> Result<Json<NotificationPreferences>, AppError> {
    let current = repo::load_preferences(&state.db, user.user_id).await?;
    let prefs = input.merge_onto(current)?;
    let row =
        repo::upsert_preferences(&state.db, user.user_id, &prefs, user.email.as_deref()).await?;
    Ok(Json(row.into()))
}

/// POST /api/notifications/process
pub async fn handle_process(
    State(state): State<AppState>,
    _cron: CronAuth,
) -> Result<Json<ProcessingSummary>, AppError> {
    let now = Utc::now();
    let ctx = JobContext {
        db: &state.db,
        email: state.email.as_ref(),
        app_base_url: &state.config.app_base_url,
        today: now.date_naive(),
        now: now.time(),
    };
    Ok(Json(process_all(&ctx).await?))
}
