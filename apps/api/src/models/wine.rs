use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WineType {
    Red,
    White,
    Rose,
    Sparkling,
    Dessert,
    Fortified,
}

impl WineType {
    pub const ALL: [WineType; 6] = [
        WineType::Red,
        WineType::White,
        WineType::Rose,
        WineType::Sparkling,
        WineType::Dessert,
        WineType::Fortified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "red",
            WineType::White => "white",
            WineType::Rose => "rose",
            WineType::Sparkling => "sparkling",
            WineType::Dessert => "dessert",
            WineType::Fortified => "fortified",
        }
    }
}

impl fmt::Display for WineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(WineType::Red),
            "white" => Ok(WineType::White),
            "rose" | "rosé" => Ok(WineType::Rose),
            "sparkling" => Ok(WineType::Sparkling),
            "dessert" => Ok(WineType::Dessert),
            "fortified" => Ok(WineType::Fortified),
            other => Err(format!("unknown wine type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrinkingWindowStatus {
    TooYoung,
    Approaching,
    Ready,
    Peak,
    Declining,
    OverHill,
}

impl DrinkingWindowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DrinkingWindowStatus::TooYoung => "too young",
            DrinkingWindowStatus::Approaching => "approaching its window",
            DrinkingWindowStatus::Ready => "ready to drink",
            DrinkingWindowStatus::Peak => "at peak",
            DrinkingWindowStatus::Declining => "declining",
            DrinkingWindowStatus::OverHill => "over the hill",
        }
    }
}

/// Four ordered dates bracketing when a bottle is worth opening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrinkingWindow {
    pub earliest_date: NaiveDate,
    pub peak_start_date: NaiveDate,
    pub peak_end_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub status: DrinkingWindowStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WineRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub producer: String,
    pub vintage: Option<i32>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub varietal: Vec<String>,
    pub wine_type: String,
    pub quantity: i32,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_location: Option<String>,
    pub storage_location: Option<String>,
    pub drinking_window: Option<Json<DrinkingWindow>>,
    pub personal_notes: Option<String>,
    pub personal_rating: Option<i32>,
    pub external_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WineRow {
    pub fn kind(&self) -> Option<WineType> {
        self.wine_type.parse().ok()
    }

    pub fn window(&self) -> Option<&DrinkingWindow> {
        self.drinking_window.as_ref().map(|w| &w.0)
    }

    pub fn display_name(&self) -> String {
        match self.vintage {
            Some(v) => format!("{} {} {}", v, self.producer, self.name),
            None => format!("NV {} {}", self.producer, self.name),
        }
    }
}
