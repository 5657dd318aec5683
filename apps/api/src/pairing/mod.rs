//! Food pairing against the user's own cellar.

pub mod handlers;
pub mod scoring;
pub mod tables;

use chrono::NaiveDate;
use serde::Serialize;

use crate::inventory::window::{current_status, readiness_score};
use crate::models::taste_profile::TasteProfile;
use crate::models::wine::{DrinkingWindowStatus, WineRow};
use crate::pairing::scoring::{taste_alignment, wine_description};
use crate::pairing::tables::{infer_main_ingredient, pairing_reason, pairing_score, MainIngredient};

const FOOD_WEIGHT: f64 = 0.5;
const READINESS_WEIGHT: f64 = 0.3;
const TASTE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Serialize)]
pub struct PairingSuggestion {
    pub wine: WineRow,
    pub score: f64,
    pub food_score: f64,
    pub readiness: f64,
    pub taste_score: f64,
    pub status: Option<DrinkingWindowStatus>,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairingResult {
    pub main_ingredient: Option<MainIngredient>,
    pub suggestions: Vec<PairingSuggestion>,
}

fn readiness_reason(status: DrinkingWindowStatus) -> &'static str {
    match status {
        DrinkingWindowStatus::Peak => "Drinking at its peak right now",
        DrinkingWindowStatus::Ready => "Ready to drink",
        DrinkingWindowStatus::Declining => "Past its peak; open it soon",
        DrinkingWindowStatus::Approaching => "Still a little young",
        DrinkingWindowStatus::TooYoung => "Too young to open yet",
        DrinkingWindowStatus::OverHill => "Likely past its best",
    }
}

/// Scores one wine for a dish.
pub fn score_for_food(
    wine: &WineRow,
    ingredient: Option<MainIngredient>,
    profile: Option<&TasteProfile>,
    today: NaiveDate,
) -> PairingSuggestion {
    let wine_type = wine.kind();
    let status = wine.window().map(|w| current_status(w, today));

    let food_score = pairing_score(wine_type, ingredient);
    let readiness = readiness_score(status);
    let alignment = taste_alignment(wine_type, &wine_description(wine), profile);

    let mut reasoning = Vec::new();
    if let (Some(t), Some(i)) = (wine_type, ingredient) {
        reasoning.push(pairing_reason(t, i));
    }
    if let Some(s) = status {
        reasoning.push(readiness_reason(s).to_string());
    }
    reasoning.extend(alignment.reasons());

    PairingSuggestion {
        wine: wine.clone(),
        score: FOOD_WEIGHT * food_score + READINESS_WEIGHT * readiness + TASTE_WEIGHT * alignment.score,
        food_score,
        readiness,
        taste_score: alignment.score,
        status,
        reasoning,
    }
}

/// Ranks in-stock wines for a dish, best first. Ties keep inventory order.
pub fn rank_for_food(
    wines: &[WineRow],
    food: &str,
    profile: Option<&TasteProfile>,
    today: NaiveDate,
    limit: usize,
) -> PairingResult {
    let ingredient = infer_main_ingredient(food);
    let mut suggestions: Vec<PairingSuggestion> = wines
        .iter()
        .filter(|w| w.quantity > 0)
        .map(|w| score_for_food(w, ingredient, profile, today))
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    suggestions.truncate(limit);

    PairingResult {
        main_ingredient: ingredient,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::stats::tests::{make_wine, with_window};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_red_ranks_first_for_steak() {
        let wines = vec![
            make_wine("Sancerre", "white", 2),
            make_wine("Rioja Reserva", "red", 1),
        ];
        let result = rank_for_food(&wines, "grilled steak", None, today(), 5);
        assert_eq!(result.main_ingredient, Some(MainIngredient::Beef));
        assert_eq!(result.suggestions[0].wine.name, "Rioja Reserva");
        assert_eq!(
            result.suggestions[0].reasoning[0],
            "Red wine is a classic match for beef"
        );
    }

    #[test]
    fn test_out_of_stock_excluded_and_limit_applied() {
        let wines = vec![
            make_wine("A", "red", 0),
            make_wine("B", "red", 1),
            make_wine("C", "red", 1),
        ];
        let result = rank_for_food(&wines, "lamb", None, today(), 1);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].wine.name, "B");
    }

    #[test]
    fn test_readiness_breaks_food_tie() {
        let young = with_window(
            make_wine("Young", "red", 1),
            ["2030-01-01", "2032-01-01", "2036-01-01", "2040-01-01"],
            today(),
        );
        let peak = with_window(
            make_wine("Peak", "red", 1),
            ["2020-01-01", "2024-01-01", "2028-01-01", "2032-01-01"],
            today(),
        );
        let result = rank_for_food(&[young, peak], "beef stew", None, today(), 5);
        assert_eq!(result.suggestions[0].wine.name, "Peak");
        // 0.5*1.0 + 0.3*1.0 + 0.2*0.5
        assert!((result.suggestions[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_food_is_neutral() {
        let wines = vec![make_wine("X", "white", 1)];
        let result = rank_for_food(&wines, "mystery", None, today(), 5);
        assert_eq!(result.main_ingredient, None);
        assert_eq!(result.suggestions[0].food_score, 0.5);
    }
}
