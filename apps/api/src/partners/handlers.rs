use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::models::partner::DrinkingPartnerRow;
use crate::partners::{repo, NewPartner};
use crate::state::AppState;

/// GET /api/partners
pub async fn handle_list_partners(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<DrinkingPartnerRow>>, AppError> {
    Ok(Json(repo::list_partners(&state.db, user.user_id).await?))
}

/// POST /api/partners
pub async fn handle_create_partner(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(body): AppJson<NewPartner>,
) -> Result<(StatusCode, Json<DrinkingPartnerRow>), AppError> {
    let partner = body.validated()?;
    let row = repo::insert_partner(&state.db, user.user_id, &partner).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/partners/:id
pub async fn handle_delete_partner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    repo::delete_partner(&state.db, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
