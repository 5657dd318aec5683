use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Inventory,
    Purchase,
    Pairing,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Inventory => "inventory",
            RecommendationType::Purchase => "purchase",
            RecommendationType::Pairing => "pairing",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserFeedback {
    Accepted,
    Rejected,
    Modified,
}

impl UserFeedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserFeedback::Accepted => "accepted",
            UserFeedback::Rejected => "rejected",
            UserFeedback::Modified => "modified",
        }
    }
}

/// Audit log of one suggestion shown to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recommendation_type: String,
    pub wine_id: Option<Uuid>,
    /// Free-form purchase suggestion for wines not in the cellar.
    pub suggested_wine: Option<Value>,
    pub context: Value,
    pub reasoning: String,
    pub confidence: f64,
    pub user_feedback: Option<String>,
    pub feedback_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
