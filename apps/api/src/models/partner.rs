use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DrinkingPartnerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    pub taste_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
