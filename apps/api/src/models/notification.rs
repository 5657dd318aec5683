use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub urgency: String,
    pub wine_id: Option<Uuid>,
    pub data: Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationPreferencesRow {
    pub user_id: Uuid,
    pub drinking_window_alerts: bool,
    pub recommendation_alerts: bool,
    pub inventory_reminders: bool,
    pub system_alerts: bool,
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: String,
    pub quiet_hours_end: String,
    pub frequency: String,
    /// Digest address, captured from the session when preferences are saved.
    pub email: Option<String>,
    pub updated_at: DateTime<Utc>,
}
