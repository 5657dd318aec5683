use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification::{NotificationPreferencesRow, NotificationRow};
use crate::notifications::alerts::DrinkingWindowAlert;
use crate::notifications::preferences::NotificationPreferences;

pub const DRINKING_WINDOW_TYPE: &str = "drinking_window";

pub async fn get_preferences(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<NotificationPreferencesRow>, AppError> {
    Ok(sqlx::query_as::<_, NotificationPreferencesRow>(
        "SELECT * FROM notification_preferences WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

/// Stored preferences, or the defaults when the user never saved any.
pub async fn load_preferences(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<NotificationPreferences, AppError> {
    Ok(get_preferences(pool, user_id)
        .await?
        .map(NotificationPreferences::from)
        .unwrap_or_default())
}

/// Writes the full record. `email` refreshes the digest address when known.
pub async fn upsert_preferences(
    pool: &PgPool,
    user_id: Uuid,
    prefs: &NotificationPreferences,
    email: Option<&str>,
) -> Result<NotificationPreferencesRow, AppError> {
    Ok(sqlx::query_as::<_, NotificationPreferencesRow>(
        r#"
        INSERT INTO notification_preferences
            (user_id, drinking_window_alerts, recommendation_alerts, inventory_reminders,
             system_alerts, email_enabled, push_enabled, quiet_hours_enabled,
             quiet_hours_start, quiet_hours_end, frequency, email)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (user_id) DO UPDATE SET
            drinking_window_alerts = EXCLUDED.drinking_window_alerts,
            recommendation_alerts = EXCLUDED.recommendation_alerts,
            inventory_reminders = EXCLUDED.inventory_reminders,
            system_alerts = EXCLUDED.system_alerts,
            email_enabled = EXCLUDED.email_enabled,
            push_enabled = EXCLUDED.push_enabled,
            quiet_hours_enabled = EXCLUDED.quiet_hours_enabled,
            quiet_hours_start = EXCLUDED.quiet_hours_start,
            quiet_hours_end = EXCLUDED.quiet_hours_end,
            frequency = EXCLUDED.frequency,
            email = COALESCE(EXCLUDED.email, notification_preferences.email),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(prefs.drinking_window_alerts)
    .bind(prefs.recommendation_alerts)
    .bind(prefs.inventory_reminders)
    .bind(prefs.system_alerts)
    .bind(prefs.email_enabled)
    .bind(prefs.push_enabled)
    .bind(prefs.quiet_hours_enabled)
    .bind(&prefs.quiet_hours_start)
    .bind(&prefs.quiet_hours_end)
    .bind(prefs.frequency.as_str())
    .bind(email)
    .fetch_one(pool)
    .await?)
}

pub async fn list_notifications(
    pool: &PgPool,
    user_id: Uuid,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<NotificationRow>, AppError> {
    Ok(sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT * FROM notifications
        WHERE user_id = $1 AND (NOT $2 OR read = false)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(unread_only)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn mark_read(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<NotificationRow, AppError> {
    sqlx::query_as::<_, NotificationRow>(
        "UPDATE notifications SET read = true WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found")))
}

pub async fn count_unread(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = false",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?)
}

/// Inserts one notification per alert, skipping alerts already sent for the
/// same wine and kind within `repeat_after_days`. Returns the rows created.
pub async fn insert_alerts(
    pool: &PgPool,
    user_id: Uuid,
    alerts: &[DrinkingWindowAlert],
    repeat_after_days: i32,
) -> Result<Vec<NotificationRow>, AppError> {
    let mut tx = pool.begin().await?;
    let mut created = Vec::new();

    for alert in alerts {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, notification_type, title, message, urgency, wine_id, data)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1
                  AND wine_id = $6
                  AND notification_type = $2
                  AND data->>'kind' = $8
                  AND created_at > now() - make_interval(days => $9)
            )
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(DRINKING_WINDOW_TYPE)
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.urgency.as_str())
        .bind(alert.wine_id)
        .bind(json!({ "kind": alert.kind, "days": alert.days }))
        .bind(alert.kind.as_str())
        .bind(repeat_after_days)
        .fetch_optional(&mut *tx)
        .await?;
        created.extend(row);
    }

    tx.commit().await?;
    Ok(created)
}
