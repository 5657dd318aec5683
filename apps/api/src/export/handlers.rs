use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use crate::errors::AppError;
use crate::export::{render_cellar_html, upload_export};
use crate::extractors::AuthUser;
use crate::inventory::repo::{self, WineFilter};
use crate::inventory::stats::compute_cellar_stats;
use crate::state::AppState;

pub const EXPORT_KEY_HEADER: &str = "x-export-key";

/// GET /api/export/cellar
pub async fn handle_export_cellar(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let today = now.date_naive();

    let whole_cellar = WineFilter::default();
    let (wines, consumed) = tokio::try_join!(
        repo::list_wines(&state.db, user.user_id, &whole_cellar),
        repo::count_consumed_since(&state.db, user.user_id, today - Duration::days(30)),
    )?;
    let stats = compute_cellar_stats(&wines, today, consumed);
    let html = render_cellar_html(&wines, &stats, now);

    let key = upload_export(&state.s3, &state.config.s3_bucket, user.user_id, now, &html).await?;
    let key_value = HeaderValue::from_str(&key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid export key header: {e}")))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (HeaderName::from_static(EXPORT_KEY_HEADER), key_value),
        ],
        html,
    ))
}
