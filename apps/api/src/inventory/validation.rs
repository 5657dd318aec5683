//! Request shapes for the cellar and their normalization.
//!
//! Clients send vintages as numbers or strings and varietals as a single
//! string or a list; everything is normalized here before touching the DB.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::AppError;
use crate::inventory::window::WindowDates;
use crate::models::wine::{DrinkingWindow, WineRow, WineType};

pub const MIN_VINTAGE: i32 = 1800;

#[derive(Debug, Clone, Deserialize)]
pub struct NewWine {
    pub name: String,
    pub producer: String,
    #[serde(default, deserialize_with = "deserialize_vintage")]
    pub vintage: Option<i32>,
    pub region: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "deserialize_varietal")]
    pub varietal: Vec<String>,
    pub wine_type: WineType,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_location: Option<String>,
    pub storage_location: Option<String>,
    pub drinking_window: Option<WindowDates>,
    pub personal_notes: Option<String>,
    pub personal_rating: Option<i32>,
    #[serde(default)]
    pub external_data: Option<Value>,
}

/// Partial update. Absent fields keep their stored value; an explicit `null`
/// clears a nullable column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WinePatch {
    pub name: Option<String>,
    pub producer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_patched_vintage")]
    pub vintage: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub region: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_varietal")]
    pub varietal: Option<Vec<String>>,
    pub wine_type: Option<WineType>,
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub purchase_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub purchase_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub purchase_location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub storage_location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub drinking_window: Option<Option<WindowDates>>,
    #[serde(default, deserialize_with = "nullable")]
    pub personal_notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub personal_rating: Option<Option<i32>>,
    pub external_data: Option<Value>,
}

/// Normalized, validated wine ready for INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct WineDraft {
    pub name: String,
    pub producer: String,
    pub vintage: Option<i32>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub varietal: Vec<String>,
    pub wine_type: WineType,
    pub quantity: i32,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_location: Option<String>,
    pub storage_location: Option<String>,
    pub drinking_window: Option<DrinkingWindow>,
    pub personal_notes: Option<String>,
    pub personal_rating: Option<i32>,
    pub external_data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumeRequest {
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub occasion: Option<String>,
    pub food_pairing: Option<String>,
    #[serde(default)]
    pub companions: Vec<String>,
    pub consumed_date: Option<NaiveDate>,
}

fn default_quantity() -> i32 {
    1
}

impl NewWine {
    pub fn into_draft(self, today: NaiveDate) -> Result<WineDraft, AppError> {
        let drinking_window = match self.drinking_window {
            Some(dates) => {
                dates.validate()?;
                Some(dates.into_window(today))
            }
            None => None,
        };

        let draft = WineDraft {
            name: self.name.trim().to_string(),
            producer: self.producer.trim().to_string(),
            vintage: self.vintage,
            region: clean_optional(self.region),
            country: clean_optional(self.country),
            varietal: self.varietal,
            wine_type: self.wine_type,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            purchase_date: self.purchase_date,
            purchase_location: clean_optional(self.purchase_location),
            storage_location: clean_optional(self.storage_location),
            drinking_window,
            personal_notes: clean_optional(self.personal_notes),
            personal_rating: self.personal_rating,
            external_data: self
                .external_data
                .filter(|v| v.is_object())
                .unwrap_or_else(|| Value::Object(Default::default())),
        };
        validate_draft(&draft, today)?;
        Ok(draft)
    }
}

/// `None` keeps the stored value, `Some(None)` clears it.
fn patched<T: Clone>(update: Option<Option<T>>, current: &Option<T>) -> Option<T> {
    match update {
        Some(value) => value,
        None => current.clone(),
    }
}

fn patched_text(update: Option<Option<String>>, current: &Option<String>) -> Option<String> {
    match update {
        Some(value) => clean_optional(value),
        None => current.clone(),
    }
}

impl WinePatch {
    /// Applies the patch over a stored row and re-validates the result.
    /// A kept window has its status recomputed for `today`.
    pub fn apply(self, existing: &WineRow, today: NaiveDate) -> Result<WineDraft, AppError> {
        let drinking_window = match self.drinking_window {
            Some(Some(dates)) => {
                dates.validate()?;
                Some(dates.into_window(today))
            }
            Some(None) => None,
            None => existing
                .window()
                .map(|w| WindowDates::from(w).into_window(today)),
        };

        let wine_type = match self.wine_type {
            Some(t) => t,
            None => existing.wine_type.parse().map_err(AppError::Validation)?,
        };

        let draft = WineDraft {
            name: self.name.map(|n| n.trim().to_string()).unwrap_or_else(|| existing.name.clone()),
            producer: self
                .producer
                .map(|p| p.trim().to_string())
                .unwrap_or_else(|| existing.producer.clone()),
            vintage: patched(self.vintage, &existing.vintage),
            region: patched_text(self.region, &existing.region),
            country: patched_text(self.country, &existing.country),
            varietal: self.varietal.unwrap_or_else(|| existing.varietal.clone()),
            wine_type,
            quantity: self.quantity.unwrap_or(existing.quantity),
            purchase_price: patched(self.purchase_price, &existing.purchase_price),
            purchase_date: patched(self.purchase_date, &existing.purchase_date),
            purchase_location: patched_text(self.purchase_location, &existing.purchase_location),
            storage_location: patched_text(self.storage_location, &existing.storage_location),
            drinking_window,
            personal_notes: patched_text(self.personal_notes, &existing.personal_notes),
            personal_rating: patched(self.personal_rating, &existing.personal_rating),
            external_data: self
                .external_data
                .filter(|v| v.is_object())
                .unwrap_or_else(|| existing.external_data.clone()),
        };
        validate_draft(&draft, today)?;
        Ok(draft)
    }
}

pub fn validate_draft(draft: &WineDraft, today: NaiveDate) -> Result<(), AppError> {
    if draft.name.is_empty() {
        return Err(AppError::Validation("name: must not be empty".to_string()));
    }
    if draft.producer.is_empty() {
        return Err(AppError::Validation("producer: must not be empty".to_string()));
    }
    if let Some(vintage) = draft.vintage {
        let max = today.year() + 1;
        if !(MIN_VINTAGE..=max).contains(&vintage) {
            return Err(AppError::Validation(format!(
                "vintage: must be between {MIN_VINTAGE} and {max}"
            )));
        }
    }
    if draft.quantity < 0 {
        return Err(AppError::Validation(
            "quantity: must not be negative".to_string(),
        ));
    }
    if let Some(price) = draft.purchase_price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::Validation(
                "purchase_price: must be a non-negative amount".to_string(),
            ));
        }
    }
    validate_rating("personal_rating", draft.personal_rating)?;
    Ok(())
}

impl ConsumeRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.quantity < 1 {
            return Err(AppError::Validation(
                "quantity: must be at least 1".to_string(),
            ));
        }
        validate_rating("rating", self.rating)
    }
}

/// Guards a consumption against the stock currently in the cellar.
pub fn check_stock(available: i32, requested: i32) -> Result<(), AppError> {
    if requested > available {
        return Err(AppError::Validation(format!(
            "quantity: only {available} bottle(s) left, cannot consume {requested}"
        )));
    }
    Ok(())
}

fn validate_rating(field: &str, rating: Option<i32>) -> Result<(), AppError> {
    match rating {
        Some(r) if !(1..=10).contains(&r) => Err(AppError::Validation(format!(
            "{field}: must be between 1 and 10"
        ))),
        _ => Ok(()),
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses a vintage from a number or a numeric string. "NV" and blanks mean none.
pub fn parse_vintage(value: &Value) -> Result<Option<i32>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| format!("invalid vintage {n}")),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("nv") {
                return Ok(None);
            }
            s.parse::<i32>()
                .map(Some)
                .map_err(|_| format!("invalid vintage '{s}'"))
        }
        other => Err(format!("invalid vintage {other}")),
    }
}

/// Normalizes varietals: a list, or one string split on commas and slashes.
pub fn parse_varietal(value: &Value) -> Result<Vec<String>, String> {
    let raw: Vec<String> = match value {
        Value::Null => vec![],
        Value::String(s) => s.split([',', '/']).map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("invalid varietal entry {v}"))
            })
            .collect::<Result<_, _>>()?,
        other => return Err(format!("invalid varietal {other}")),
    };

    let mut out: Vec<String> = Vec::new();
    for v in raw {
        let v = v.trim();
        if !v.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(v)) {
            out.push(v.to_string());
        }
    }
    Ok(out)
}

fn deserialize_vintage<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_vintage(&value).map_err(serde::de::Error::custom)
}

/// Present keys, including explicit nulls, become `Some`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn deserialize_patched_vintage<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_vintage(deserializer).map(Some)
}

fn deserialize_varietal<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_varietal(&value).map_err(serde::de::Error::custom)
}

fn deserialize_optional_varietal<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_varietal(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn base() -> Value {
        json!({
            "name": "Barolo Cannubi",
            "producer": "Brezza",
            "wine_type": "red",
        })
    }

    #[test]
    fn test_vintage_string_is_normalized_to_integer() {
        let mut body = base();
        body["vintage"] = json!("2016");
        let wine: NewWine = serde_json::from_value(body).unwrap();
        let draft = wine.into_draft(today()).unwrap();
        assert_eq!(draft.vintage, Some(2016));
    }

    #[test]
    fn test_non_vintage_marker() {
        let mut body = base();
        body["vintage"] = json!("NV");
        let wine: NewWine = serde_json::from_value(body).unwrap();
        assert_eq!(wine.vintage, None);
    }

    #[test]
    fn test_varietal_string_becomes_array() {
        let mut body = base();
        body["varietal"] = json!("Grenache, Syrah / Mourvèdre, syrah");
        let wine: NewWine = serde_json::from_value(body).unwrap();
        assert_eq!(wine.varietal, vec!["Grenache", "Syrah", "Mourvèdre"]);
    }

    #[test]
    fn test_varietal_array_kept() {
        let mut body = base();
        body["varietal"] = json!(["Nebbiolo"]);
        let wine: NewWine = serde_json::from_value(body).unwrap();
        assert_eq!(wine.varietal, vec!["Nebbiolo"]);
    }

    #[test]
    fn test_default_quantity_is_one() {
        let wine: NewWine = serde_json::from_value(base()).unwrap();
        assert_eq!(wine.quantity, 1);
    }

    #[test]
    fn test_future_vintage_rejected() {
        let mut body = base();
        body["vintage"] = json!(2031);
        let wine: NewWine = serde_json::from_value(body).unwrap();
        assert!(matches!(
            wine.into_draft(today()),
            Err(AppError::Validation(msg)) if msg.starts_with("vintage")
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut body = base();
        body["name"] = json!("   ");
        let wine: NewWine = serde_json::from_value(body).unwrap();
        assert!(wine.into_draft(today()).is_err());
    }

    #[test]
    fn test_window_status_computed_on_create() {
        let mut body = base();
        body["drinking_window"] = json!({
            "earliest_date": "2022-01-01",
            "peak_start_date": "2025-01-01",
            "peak_end_date": "2030-01-01",
            "latest_date": "2035-01-01"
        });
        let draft = serde_json::from_value::<NewWine>(body)
            .unwrap()
            .into_draft(today())
            .unwrap();
        assert_eq!(
            draft.drinking_window.unwrap().status,
            crate::models::wine::DrinkingWindowStatus::Peak
        );
    }

    #[test]
    fn test_unknown_wine_type_fails_deserialization() {
        let mut body = base();
        body["wine_type"] = json!("orange");
        assert!(serde_json::from_value::<NewWine>(body).is_err());
    }

    fn stored() -> WineRow {
        use crate::inventory::stats::tests::{make_wine, with_window};
        let mut wine = with_window(
            make_wine("Barolo Cannubi", "red", 3),
            ["2024-01-01", "2026-01-01", "2030-12-31", "2035-12-31"],
            NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(),
        );
        wine.region = Some("Piedmont".to_string());
        wine.personal_notes = Some("gift".to_string());
        wine
    }

    #[test]
    fn test_patch_absent_fields_keep_stored_values() {
        let patch: WinePatch = serde_json::from_value(json!({"quantity": 2})).unwrap();
        let draft = patch.apply(&stored(), today()).unwrap();
        assert_eq!(draft.quantity, 2);
        assert_eq!(draft.vintage, Some(2018));
        assert_eq!(draft.region.as_deref(), Some("Piedmont"));
        assert_eq!(draft.personal_notes.as_deref(), Some("gift"));
        assert!(draft.drinking_window.is_some());
    }

    #[test]
    fn test_patch_null_clears_nullable_fields() {
        let patch: WinePatch = serde_json::from_value(json!({
            "vintage": "NV",
            "region": null,
            "personal_notes": "  ",
            "drinking_window": null
        }))
        .unwrap();
        let draft = patch.apply(&stored(), today()).unwrap();
        assert_eq!(draft.vintage, None);
        assert_eq!(draft.region, None);
        assert_eq!(draft.personal_notes, None);
        assert_eq!(draft.drinking_window, None);
    }

    #[test]
    fn test_patch_recomputes_kept_window_status() {
        use crate::models::wine::DrinkingWindowStatus;
        let existing = stored();
        assert_eq!(existing.window().unwrap().status, DrinkingWindowStatus::Approaching);
        let patch: WinePatch = serde_json::from_value(json!({"name": "Cannubi"})).unwrap();
        let draft = patch.apply(&existing, today()).unwrap();
        assert_eq!(draft.drinking_window.unwrap().status, DrinkingWindowStatus::Peak);
    }

    #[test]
    fn test_check_stock() {
        assert!(check_stock(2, 1).is_ok());
        assert!(check_stock(1, 1).is_ok());
        assert!(check_stock(0, 1).is_err());
    }

    #[test]
    fn test_consume_rating_range() {
        let req: ConsumeRequest = serde_json::from_value(json!({"rating": 11})).unwrap();
        assert!(req.validate().is_err());
        let req: ConsumeRequest = serde_json::from_value(json!({"rating": 8})).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.quantity, 1);
    }
}
