use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::recommendation::{RecommendationRow, UserFeedback};
use crate::recommendations::Candidate;

/// Persists a batch of suggestions atomically, in ranking order.
pub async fn insert_recommendations(
    pool: &PgPool,
    user_id: Uuid,
    candidates: &[Candidate],
    context: &Value,
) -> Result<Vec<RecommendationRow>, AppError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(candidates.len());

    for c in candidates {
        let row = sqlx::query_as::<_, RecommendationRow>(
            r#"
            INSERT INTO recommendations
                (user_id, recommendation_type, wine_id, suggested_wine, context, reasoning, confidence)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(c.recommendation_type.as_str())
        .bind(c.wine_id)
        .bind(&c.suggested_wine)
        .bind(context)
        .bind(&c.reasoning)
        .bind(c.confidence)
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;
    info!("Stored {} recommendations for user {user_id}", rows.len());
    Ok(rows)
}

pub async fn list_recommendations(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<RecommendationRow>, AppError> {
    Ok(sqlx::query_as::<_, RecommendationRow>(
        "SELECT * FROM recommendations WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn set_feedback(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    feedback: UserFeedback,
    notes: Option<&str>,
) -> Result<RecommendationRow, AppError> {
    sqlx::query_as::<_, RecommendationRow>(
        r#"
        UPDATE recommendations SET user_feedback = $3, feedback_notes = $4
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(feedback.as_str())
    .bind(notes)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Recommendation {id} not found")))
}

/// (suggestions with feedback, of which accepted).
pub async fn feedback_counts(pool: &PgPool, user_id: Uuid) -> Result<(i64, i64), AppError> {
    let counts: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE user_feedback IS NOT NULL),
            COUNT(*) FILTER (WHERE user_feedback = 'accepted')
        FROM recommendations
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}
