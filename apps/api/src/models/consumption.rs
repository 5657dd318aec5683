use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsumptionRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub wine_id: Uuid,
    pub consumed_date: NaiveDate,
    pub quantity: i32,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub occasion: Option<String>,
    pub food_pairing: Option<String>,
    pub companions: Vec<String>,
    pub created_at: DateTime<Utc>,
}
