//! Restaurant wine-list analysis: match list entries to the cellar, then rank
//! them by taste, food pairing, price and match confidence.

pub mod handlers;
pub mod ocr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::taste_profile::{PriceRange, TasteProfile};
use crate::models::wine::{WineRow, WineType};
use crate::pairing::scoring::{price_fit, taste_alignment};
use crate::pairing::tables::{infer_wine_type, pairing_reason, pairing_score, MainIngredient};
use crate::text::token_similarity;

const NAME_WEIGHT: f64 = 0.5;
const PRODUCER_WEIGHT: f64 = 0.3;
const VINTAGE_WEIGHT: f64 = 0.2;
/// Per-field similarity needed to report the field as matched.
const FIELD_MATCH_THRESHOLD: f64 = 0.8;
/// Weakest overall confidence still reported as a cellar match.
const MIN_MATCH_CONFIDENCE: f64 = 0.4;

const TASTE_WEIGHT: f64 = 0.35;
const FOOD_WEIGHT: f64 = 0.25;
const PRICE_WEIGHT: f64 = 0.20;
const MATCH_WEIGHT: f64 = 0.20;

/// One line of a restaurant wine list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WineListEntry {
    pub name: String,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub vintage: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub wine_type: Option<WineType>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub varietal: Option<String>,
}

impl WineListEntry {
    fn description(&self) -> String {
        [
            Some(self.name.as_str()),
            self.producer.as_deref(),
            self.region.as_deref(),
            self.varietal.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Supplied type, else inferred from varietal, name and region keywords.
    pub fn resolved_type(&self) -> Option<WineType> {
        self.wine_type.or_else(|| infer_wine_type(&self.description()))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InventoryMatch {
    pub wine_id: Uuid,
    pub wine_name: String,
    pub confidence: f64,
    pub matched_fields: Vec<&'static str>,
}

fn vintage_score(a: Option<i32>, b: Option<i32>) -> f64 {
    match (a, b) {
        (Some(x), Some(y)) if x == y => 1.0,
        (Some(_), Some(_)) => 0.0,
        _ => 0.5,
    }
}

fn score_match(entry: &WineListEntry, wine: &WineRow) -> InventoryMatch {
    let name_sim = token_similarity(&entry.name, &wine.name);
    let producer_sim = entry
        .producer
        .as_deref()
        .map(|p| token_similarity(p, &wine.producer))
        .unwrap_or(0.0);
    let vintage = vintage_score(entry.vintage, wine.vintage);

    let mut matched_fields = Vec::new();
    if name_sim >= FIELD_MATCH_THRESHOLD {
        matched_fields.push("name");
    }
    if producer_sim >= FIELD_MATCH_THRESHOLD {
        matched_fields.push("producer");
    }
    if entry.vintage.is_some() && entry.vintage == wine.vintage {
        matched_fields.push("vintage");
    }

    InventoryMatch {
        wine_id: wine.id,
        wine_name: wine.display_name(),
        confidence: NAME_WEIGHT * name_sim + PRODUCER_WEIGHT * producer_sim + VINTAGE_WEIGHT * vintage,
        matched_fields,
    }
}

/// Best cellar wine for a list entry, if its confidence reaches 0.4.
/// On equal confidence the earlier inventory wine wins.
pub fn match_inventory(entry: &WineListEntry, inventory: &[WineRow]) -> Option<InventoryMatch> {
    let mut best: Option<InventoryMatch> = None;
    for wine in inventory {
        let candidate = score_match(entry, wine);
        if best
            .as_ref()
            .map_or(true, |b| candidate.confidence > b.confidence)
        {
            best = Some(candidate);
        }
    }
    best.filter(|m| m.confidence >= MIN_MATCH_CONFIDENCE)
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub taste: f64,
    pub food: f64,
    pub price: f64,
    pub match_confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    pub entry: WineListEntry,
    pub wine_type: Option<WineType>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub inventory_match: Option<InventoryMatch>,
    pub reasoning: Vec<String>,
}

pub struct AnalysisContext<'a> {
    pub inventory: &'a [WineRow],
    pub profile: Option<&'a TasteProfile>,
    pub ingredient: Option<MainIngredient>,
    pub price_band: Option<&'a PriceRange>,
}

pub fn score_entry(entry: WineListEntry, ctx: &AnalysisContext<'_>) -> RankedEntry {
    let wine_type = entry.resolved_type();
    let alignment = taste_alignment(wine_type, &entry.description(), ctx.profile);
    let food = pairing_score(wine_type, ctx.ingredient);
    let price = price_fit(entry.price, ctx.price_band);
    let inventory_match = match_inventory(&entry, ctx.inventory);
    let match_confidence = inventory_match.as_ref().map_or(0.0, |m| m.confidence);

    let mut reasoning = alignment.reasons();
    if let (Some(t), Some(i)) = (wine_type, ctx.ingredient) {
        reasoning.push(pairing_reason(t, i));
    }
    if price >= 1.0 && entry.price.is_some() {
        reasoning.push("Within your usual price range".to_string());
    }
    if let Some(m) = &inventory_match {
        reasoning.push(format!("Similar to {} in your cellar", m.wine_name));
    }

    RankedEntry {
        score: TASTE_WEIGHT * alignment.score
            + FOOD_WEIGHT * food
            + PRICE_WEIGHT * price
            + MATCH_WEIGHT * match_confidence,
        breakdown: ScoreBreakdown {
            taste: alignment.score,
            food,
            price,
            match_confidence,
        },
        wine_type,
        inventory_match,
        reasoning,
        entry,
    }
}

/// Scores and ranks the list, best first. The sort is stable: equal scores
/// keep their position on the list.
pub fn analyze_list(
    entries: Vec<WineListEntry>,
    ctx: &AnalysisContext<'_>,
    limit: Option<usize>,
) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = entries.into_iter().map(|e| score_entry(e, ctx)).collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::stats::tests::make_wine;

    fn entry(name: &str, producer: Option<&str>) -> WineListEntry {
        WineListEntry {
            name: name.to_string(),
            producer: producer.map(str::to_string),
            vintage: None,
            price: None,
            wine_type: None,
            region: None,
            varietal: None,
        }
    }

    fn cellar() -> Vec<WineRow> {
        let mut a = make_wine("Sauvignon Blanc", "white", 2);
        a.producer = "Cloudy Bay".to_string();
        let mut b = make_wine("Reserva", "red", 1);
        b.producer = "Muga".to_string();
        vec![a, b]
    }

    fn ctx<'a>(inventory: &'a [WineRow]) -> AnalysisContext<'a> {
        AnalysisContext {
            inventory,
            profile: None,
            ingredient: None,
            price_band: None,
        }
    }

    #[test]
    fn test_exact_name_and_producer_match() {
        let inventory = cellar();
        let m = match_inventory(&entry("Sauvignon Blanc", Some("Cloudy Bay")), &inventory).unwrap();
        assert!(m.confidence >= 0.6);
        assert!(m.matched_fields.contains(&"name"));
        assert!(m.matched_fields.contains(&"producer"));
        assert_eq!(m.wine_id, inventory[0].id);
    }

    #[test]
    fn test_exact_match_on_stopword_only_labels() {
        let mut a = make_wine("Estate Wine", "red", 1);
        a.producer = "Bodegas y Vinedos".to_string();
        let mut b = make_wine("The Wine", "white", 1);
        b.producer = "Domaine de la".to_string();
        let inventory = vec![a, b];

        let m = match_inventory(&entry("Estate Wine", Some("Bodegas y Vinedos")), &inventory).unwrap();
        assert_eq!(m.wine_id, inventory[0].id);
        assert!(m.confidence >= 0.6);
        assert!(m.matched_fields.contains(&"name"));
        assert!(m.matched_fields.contains(&"producer"));

        let m = match_inventory(&entry("The Wine", Some("Domaine de la")), &inventory).unwrap();
        assert_eq!(m.wine_id, inventory[1].id);
        assert!(m.confidence >= 0.6);
        assert!(m.matched_fields.contains(&"name"));
        assert!(m.matched_fields.contains(&"producer"));
    }

    #[test]
    fn test_vintage_mismatch_lowers_confidence() {
        let inventory = cellar();
        let mut e = entry("Sauvignon Blanc", Some("Cloudy Bay"));
        e.vintage = Some(2018);
        let same = match_inventory(&e, &inventory).unwrap();
        e.vintage = Some(2021);
        let other = match_inventory(&e, &inventory).unwrap();
        assert!((same.confidence - 1.0).abs() < 1e-9);
        assert!((other.confidence - 0.8).abs() < 1e-9);
        assert!(!other.matched_fields.contains(&"vintage"));
    }

    #[test]
    fn test_unrelated_entry_has_no_match() {
        assert!(match_inventory(&entry("Barolo Cannubi", Some("Brezza")), &cellar()).is_none());
    }

    #[test]
    fn test_accents_and_stopwords_ignored() {
        let mut wine = make_wine("Château Musar Rouge", "red", 1);
        wine.producer = "Chateau Musar".to_string();
        let m = match_inventory(&entry("Musar Rouge", Some("Musar")), &[wine]).unwrap();
        assert_eq!(m.matched_fields, vec!["name", "producer"]);
    }

    #[test]
    fn test_type_inferred_from_varietal() {
        let mut e = entry("Cuvée Tradition", None);
        e.varietal = Some("Grenache".into());
        assert_eq!(e.resolved_type(), Some(WineType::Red));
    }

    #[test]
    fn test_cellar_match_raises_rank() {
        let inventory = cellar();
        let entries = vec![
            entry("House Red", None),
            entry("Sauvignon Blanc", Some("Cloudy Bay")),
        ];
        let ranked = analyze_list(entries, &ctx(&inventory), None);
        assert_eq!(ranked[0].entry.name, "Sauvignon Blanc");
        assert!(ranked[0].inventory_match.is_some());
    }

    #[test]
    fn test_ties_keep_list_order() {
        let inventory: Vec<WineRow> = vec![];
        let entries = vec![entry("Alpha", None), entry("Beta", None), entry("Gamma", None)];
        let ranked = analyze_list(entries, &ctx(&inventory), Some(2));
        let names: Vec<_> = ranked.iter().map(|r| r.entry.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_composite_weights() {
        let inventory: Vec<WineRow> = vec![];
        let band = PriceRange {
            min: 30.0,
            max: 60.0,
        };
        let mut e = entry("Chablis", None);
        e.price = Some(45.0);
        let c = AnalysisContext {
            inventory: &inventory,
            profile: None,
            ingredient: Some(MainIngredient::Shellfish),
            price_band: Some(&band),
        };
        let ranked = score_entry(e, &c);
        assert_eq!(ranked.wine_type, Some(WineType::White));
        // 0.35*0.5 + 0.25*1.0 + 0.20*1.0 + 0.20*0.0
        assert!((ranked.score - 0.625).abs() < 1e-9);
    }
}
