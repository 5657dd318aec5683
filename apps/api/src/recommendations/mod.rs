//! Personalized "what should I open / buy" suggestions.
//!
//! Cellar wines are ranked first; remaining slots are filled with purchase
//! ideas built from the taste profile's preferred grapes and regions.

pub mod handlers;
pub mod repo;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::inventory::window::{current_status, readiness_score};
use crate::models::recommendation::RecommendationType;
use crate::models::taste_profile::{PriceRange, TasteProfile};
use crate::models::wine::{WineRow, WineType};
use crate::pairing::scoring::{price_fit, taste_alignment, wine_description};
use crate::pairing::tables::{infer_main_ingredient, pairing_reason, pairing_score, MainIngredient};

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 10;

const READINESS_WEIGHT: f64 = 0.4;
const TASTE_WEIGHT: f64 = 0.3;
const FOOD_WEIGHT: f64 = 0.2;
const PRICE_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub food: Option<String>,
    #[serde(default)]
    pub price_band: Option<PriceRange>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One suggestion before it is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub recommendation_type: RecommendationType,
    pub wine_id: Option<Uuid>,
    pub suggested_wine: Option<Value>,
    pub reasoning: String,
    pub confidence: f64,
}

/// Weighted mean of the components that apply: readiness and taste always,
/// food when a dish is given, price when a band is given.
pub fn score_cellar_wine(
    wine: &WineRow,
    profile: Option<&TasteProfile>,
    ingredient: Option<MainIngredient>,
    price_band: Option<&PriceRange>,
    today: NaiveDate,
) -> Candidate {
    let wine_type = wine.kind();
    let status = wine.window().map(|w| current_status(w, today));
    let readiness = readiness_score(status);
    let alignment = taste_alignment(wine_type, &wine_description(wine), profile);

    let mut weighted = READINESS_WEIGHT * readiness + TASTE_WEIGHT * alignment.score;
    let mut total_weight = READINESS_WEIGHT + TASTE_WEIGHT;
    let mut reasons: Vec<String> = Vec::new();

    if let Some(s) = status {
        reasons.push(format!("{} ({})", wine.display_name(), s.label()));
    } else {
        reasons.push(wine.display_name());
    }
    reasons.extend(alignment.reasons());

    if ingredient.is_some() {
        weighted += FOOD_WEIGHT * pairing_score(wine_type, ingredient);
        total_weight += FOOD_WEIGHT;
        if let (Some(t), Some(i)) = (wine_type, ingredient) {
            reasons.push(pairing_reason(t, i));
        }
    }
    if price_band.is_some() {
        weighted += PRICE_WEIGHT * price_fit(wine.purchase_price, price_band);
        total_weight += PRICE_WEIGHT;
    }

    Candidate {
        recommendation_type: if ingredient.is_some() {
            RecommendationType::Pairing
        } else {
            RecommendationType::Inventory
        },
        wine_id: Some(wine.id),
        suggested_wine: None,
        reasoning: reasons.join(". "),
        confidence: weighted / total_weight,
    }
}

fn cellar_has_varietal(wines: &[WineRow], varietal: &str) -> bool {
    wines
        .iter()
        .any(|w| w.varietal.iter().any(|v| v.eq_ignore_ascii_case(varietal)))
}

/// Purchase ideas from preferred grapes the cellar does not already hold.
/// With a dish, the best-pairing wine type is suggested first.
pub fn purchase_suggestions(
    profile: &TasteProfile,
    wines: &[WineRow],
    ingredient: Option<MainIngredient>,
    price_band: Option<&PriceRange>,
) -> Vec<Candidate> {
    let mut types = [WineType::Red, WineType::White, WineType::Sparkling];
    // Stable: without a dish the red/white/sparkling order stays.
    types.sort_by(|a, b| {
        pairing_score(Some(*b), ingredient).total_cmp(&pairing_score(Some(*a), ingredient))
    });

    let band = price_band.unwrap_or(&profile.general_preferences.price_range);
    let mut out = Vec::new();
    for wine_type in types {
        let flavor = profile.flavor_for(wine_type);
        let region = flavor.preferred_regions.first();
        for varietal in &flavor.preferred_varietals {
            if cellar_has_varietal(wines, varietal) {
                continue;
            }
            let mut reasoning = format!("{varietal} matches the grapes you tend to enjoy");
            if let Some(r) = region {
                reasoning.push_str(&format!("; look for one from {r}"));
            }
            if let Some(i) = ingredient {
                reasoning.push_str(&format!(". {}", pairing_reason(wine_type, i)));
            }
            out.push(Candidate {
                recommendation_type: RecommendationType::Purchase,
                wine_id: None,
                suggested_wine: Some(json!({
                    "varietal": varietal,
                    "region": region,
                    "wine_type": wine_type,
                    "price_range": band,
                })),
                reasoning,
                confidence: profile.confidence_score.clamp(0.0, 1.0)
                    * pairing_score(Some(wine_type), ingredient).max(0.5),
            });
        }
    }
    out
}

/// Builds up to `limit` suggestions: ranked cellar wines, then purchases.
pub fn build_recommendations(
    request: &RecommendationRequest,
    wines: &[WineRow],
    profile: Option<&TasteProfile>,
    today: NaiveDate,
    limit: usize,
) -> Vec<Candidate> {
    let ingredient = request.food.as_deref().and_then(infer_main_ingredient);
    let band = request
        .price_band
        .as_ref()
        .or(profile.map(|p| &p.general_preferences.price_range));

    let mut ranked: Vec<Candidate> = wines
        .iter()
        .filter(|w| w.quantity > 0)
        .map(|w| score_cellar_wine(w, profile, ingredient, band, today))
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(limit);

    if ranked.len() < limit {
        if let Some(p) = profile {
            let remaining = limit - ranked.len();
            ranked.extend(
                purchase_suggestions(p, wines, ingredient, band)
                    .into_iter()
                    .take(remaining),
            );
        }
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::stats::tests::{make_wine, with_window};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn profile() -> TasteProfile {
        let mut p = TasteProfile::default();
        p.confidence_score = 0.8;
        p.red_wine_preferences.preferred_varietals = vec!["Syrah".into(), "Merlot".into()];
        p.red_wine_preferences.preferred_regions = vec!["Northern Rhône".into()];
        p.white_wine_preferences.preferred_varietals = vec!["Riesling".into()];
        p
    }

    #[test]
    fn test_peak_wine_ranks_above_young() {
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
        let young_id = young.id;
        let out = build_recommendations(
            &RecommendationRequest::default(),
            &[young, peak],
            None,
            today(),
            5,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].wine_id, Some(young_id));
        // readiness 1.0, taste 0.5: (0.4 + 0.15) / 0.7
        assert!((out[0].confidence - 0.55 / 0.7).abs() < 1e-9);
        assert_eq!(out[0].recommendation_type, RecommendationType::Inventory);
    }

    #[test]
    fn test_purchases_fill_remaining_slots() {
        let mut syrah = make_wine("Crozes", "red", 1);
        syrah.varietal = vec!["syrah".into()];
        let out = build_recommendations(
            &RecommendationRequest::default(),
            &[syrah],
            Some(&profile()),
            today(),
            3,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].recommendation_type, RecommendationType::Inventory);
        // Syrah already in the cellar, so Merlot then Riesling.
        let suggested: Vec<_> = out[1..]
            .iter()
            .map(|c| c.suggested_wine.as_ref().unwrap()["varietal"].clone())
            .collect();
        assert_eq!(suggested, vec![json!("Merlot"), json!("Riesling")]);
        assert!(out[1].reasoning.contains("Northern Rhône"));
    }

    #[test]
    fn test_food_puts_best_pairing_type_first() {
        let request = RecommendationRequest {
            food: Some("oysters".into()),
            ..Default::default()
        };
        let out = build_recommendations(&request, &[], Some(&profile()), today(), 1);
        assert_eq!(
            out[0].suggested_wine.as_ref().unwrap()["varietal"],
            json!("Riesling")
        );
    }

    #[test]
    fn test_no_profile_no_purchases() {
        let out = build_recommendations(&RecommendationRequest::default(), &[], None, today(), 5);
        assert!(out.is_empty());
    }

    #[test]
    fn test_food_marks_pairing_type() {
        let request = RecommendationRequest {
            food: Some("roast lamb".into()),
            ..Default::default()
        };
        let out = build_recommendations(&request, &[make_wine("Red", "red", 1)], None, today(), 5);
        assert_eq!(out[0].recommendation_type, RecommendationType::Pairing);
        assert!(out[0].reasoning.contains("classic match for lamb"));
    }
}
