use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::wine::WineType;

/// Flavor dimension scores for one wine style, each on a 1–10 scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlavorProfile {
    pub fruitiness: u8,
    pub earthiness: u8,
    pub oakiness: u8,
    pub acidity: u8,
    pub tannins: u8,
    pub sweetness: u8,
    pub body: u8,
    #[serde(default)]
    pub preferred_regions: Vec<String>,
    #[serde(default)]
    pub preferred_varietals: Vec<String>,
    #[serde(default)]
    pub disliked_characteristics: Vec<String>,
}

impl Default for FlavorProfile {
    fn default() -> Self {
        Self {
            fruitiness: 5,
            earthiness: 5,
            oakiness: 5,
            acidity: 5,
            tannins: 5,
            sweetness: 3,
            body: 5,
            preferred_regions: vec![],
            preferred_varietals: vec![],
            disliked_characteristics: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralPreferences {
    pub price_range: PriceRange,
    #[serde(default)]
    pub occasion_preferences: Vec<String>,
    /// How much food pairing should weigh in suggestions, 1–10.
    pub food_pairing_importance: u8,
}

impl Default for GeneralPreferences {
    fn default() -> Self {
        Self {
            price_range: PriceRange {
                min: 15.0,
                max: 50.0,
            },
            occasion_preferences: vec![],
            food_pairing_importance: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TastingRecord {
    pub wine_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TasteProfile {
    pub red_wine_preferences: FlavorProfile,
    pub white_wine_preferences: FlavorProfile,
    pub sparkling_preferences: FlavorProfile,
    pub general_preferences: GeneralPreferences,
    pub confidence_score: f64,
    #[serde(default)]
    pub learning_history: Vec<TastingRecord>,
}

impl TasteProfile {
    /// Flavor preferences relevant to a given style. Rosé and dessert wines
    /// borrow from the closest still-wine profile.
    pub fn flavor_for(&self, wine_type: WineType) -> &FlavorProfile {
        match wine_type {
            WineType::Red | WineType::Fortified => &self.red_wine_preferences,
            WineType::White | WineType::Rose | WineType::Dessert => &self.white_wine_preferences,
            WineType::Sparkling => &self.sparkling_preferences,
        }
    }

    pub fn all_flavors(&self) -> [&FlavorProfile; 3] {
        [
            &self.red_wine_preferences,
            &self.white_wine_preferences,
            &self.sparkling_preferences,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TasteProfileRow {
    pub user_id: Uuid,
    pub red_wine_preferences: Json<FlavorProfile>,
    pub white_wine_preferences: Json<FlavorProfile>,
    pub sparkling_preferences: Json<FlavorProfile>,
    pub general_preferences: Json<GeneralPreferences>,
    pub learning_history: Json<Vec<TastingRecord>>,
    pub confidence_score: f64,
    /// Raw mapping output kept for auditing the onboarding pipeline.
    pub mapped_profile: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TasteProfileRow> for TasteProfile {
    fn from(row: TasteProfileRow) -> Self {
        TasteProfile {
            red_wine_preferences: row.red_wine_preferences.0,
            white_wine_preferences: row.white_wine_preferences.0,
            sparkling_preferences: row.sparkling_preferences.0,
            general_preferences: row.general_preferences.0,
            confidence_score: row.confidence_score,
            learning_history: row.learning_history.0,
        }
    }
}
