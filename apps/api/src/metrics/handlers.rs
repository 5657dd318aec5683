use axum::{extract::State, Json};
use chrono::{Duration, Utc};

use crate::errors::AppError;
use crate::extractors::AuthUser;
use crate::inventory::repo::{self as inventory_repo, WineFilter};
use crate::inventory::stats::compute_cellar_stats;
use crate::metrics::MetricsDigest;
use crate::notifications::repo as notification_repo;
use crate::recommendations::repo as recommendation_repo;
use crate::state::AppState;

/// GET /api/metrics/digest
pub async fn handle_metrics_digest(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MetricsDigest>, AppError> {
    let today = Utc::now().date_naive();
    let whole_cellar = WineFilter::default();
    let (wines, consumed, feedback, unread) = tokio::try_join!(
        inventory_repo::list_wines(&state.db, user.user_id, &whole_cellar),
        inventory_repo::count_consumed_since(&state.db, user.user_id, today - Duration::days(30)),
        recommendation_repo::feedback_counts(&state.db, user.user_id),
        notification_repo::count_unread(&state.db, user.user_id),
    )?;

    let cellar = compute_cellar_stats(&wines, today, consumed);
    Ok(Json(MetricsDigest::assemble(cellar, feedback, unread)))
}
