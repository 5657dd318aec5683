use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::inventory::window::current_status;
use crate::models::wine::{DrinkingWindowStatus, WineRow};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CellarStats {
    pub total_bottles: i64,
    pub distinct_wines: usize,
    pub total_value: f64,
    pub by_type: BTreeMap<String, i64>,
    pub ready_to_drink: i64,
    pub at_peak: i64,
    pub over_hill: i64,
    pub consumed_last_30_days: i64,
}

/// Aggregates bottle counts over the in-memory wine list. Wines with zero
/// stock still count as distinct entries but contribute no bottles.
pub fn compute_cellar_stats(wines: &[WineRow], today: NaiveDate, consumed: i64) -> CellarStats {
    let mut stats = CellarStats {
        distinct_wines: wines.len(),
        consumed_last_30_days: consumed,
        ..Default::default()
    };

    for wine in wines {
        let bottles = i64::from(wine.quantity.max(0));
        stats.total_bottles += bottles;
        stats.total_value += wine.purchase_price.unwrap_or(0.0) * bottles as f64;
        *stats.by_type.entry(wine.wine_type.clone()).or_default() += bottles;

        match wine.window().map(|w| current_status(w, today)) {
            Some(DrinkingWindowStatus::Peak) => {
                stats.at_peak += bottles;
                stats.ready_to_drink += bottles;
            }
            Some(DrinkingWindowStatus::Ready) | Some(DrinkingWindowStatus::Declining) => {
                stats.ready_to_drink += bottles;
            }
            Some(DrinkingWindowStatus::OverHill) => stats.over_hill += bottles,
            _ => {}
        }
    }

    stats.total_value = (stats.total_value * 100.0).round() / 100.0;
    stats
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::inventory::window::WindowDates;
    use chrono::Utc;
    use serde_json::json;
    use sqlx::types::Json;
    use uuid::Uuid;

    pub(crate) fn make_wine(name: &str, wine_type: &str, quantity: i32) -> WineRow {
        WineRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            producer: "Test Producer".to_string(),
            vintage: Some(2018),
            region: None,
            country: None,
            varietal: vec![],
            wine_type: wine_type.to_string(),
            quantity,
            purchase_price: None,
            purchase_date: None,
            purchase_location: None,
            storage_location: None,
            drinking_window: None,
            personal_notes: None,
            personal_rating: None,
            external_data: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn with_window(
        mut wine: WineRow,
        dates: [&str; 4],
        today: NaiveDate,
    ) -> WineRow {
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let window = WindowDates {
            earliest_date: parse(dates[0]),
            peak_start_date: parse(dates[1]),
            peak_end_date: parse(dates[2]),
            latest_date: parse(dates[3]),
        }
        .into_window(today);
        wine.drinking_window = Some(Json(window));
        wine
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_totals_and_value() {
        let mut a = make_wine("A", "red", 3);
        a.purchase_price = Some(20.0);
        let mut b = make_wine("B", "white", 2);
        b.purchase_price = Some(12.5);
        let c = make_wine("C", "red", 0);

        let stats = compute_cellar_stats(&[a, b, c], today(), 4);
        assert_eq!(stats.total_bottles, 5);
        assert_eq!(stats.distinct_wines, 3);
        assert!((stats.total_value - 85.0).abs() < f64::EPSILON);
        assert_eq!(stats.by_type["red"], 3);
        assert_eq!(stats.by_type["white"], 2);
        assert_eq!(stats.consumed_last_30_days, 4);
    }

    #[test]
    fn test_readiness_buckets_use_today() {
        let peak = with_window(
            make_wine("Peak", "red", 2),
            ["2020-01-01", "2025-01-01", "2028-01-01", "2032-01-01"],
            today(),
        );
        let old = with_window(
            make_wine("Old", "white", 1),
            ["2010-01-01", "2012-01-01", "2014-01-01", "2016-01-01"],
            today(),
        );
        let stats = compute_cellar_stats(&[peak, old], today(), 0);
        assert_eq!(stats.at_peak, 2);
        assert_eq!(stats.ready_to_drink, 2);
        assert_eq!(stats.over_hill, 1);
    }
}
