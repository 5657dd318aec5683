//! Scoring primitives shared by restaurant matching, food pairing and
//! recommendations. Every score is in [0,1].

use crate::models::taste_profile::{FlavorProfile, PriceRange, TasteProfile};
use crate::models::wine::{WineRow, WineType};
use crate::text::{contains_phrase, normalize};

/// Score used when there is nothing to judge against.
pub const NEUTRAL: f64 = 0.5;

const REGION_BONUS: f64 = 0.2;
const VARIETAL_BONUS: f64 = 0.2;
const DISLIKE_PENALTY: f64 = 0.25;

/// Outcome of comparing one wine description against the taste profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub score: f64,
    pub region_hit: Option<String>,
    pub varietal_hit: Option<String>,
    pub dislikes_hit: Vec<String>,
}

impl Alignment {
    fn neutral() -> Self {
        Self {
            score: NEUTRAL,
            region_hit: None,
            varietal_hit: None,
            dislikes_hit: vec![],
        }
    }

    /// Short human-readable reasons, empty for a neutral result.
    pub fn reasons(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(region) = &self.region_hit {
            out.push(format!("From {region}, a region you enjoy"));
        }
        if let Some(varietal) = &self.varietal_hit {
            out.push(format!("{varietal} is one of your preferred grapes"));
        }
        for d in &self.dislikes_hit {
            out.push(format!("Mentions {d}, which you tend to avoid"));
        }
        out
    }
}

fn first_hit(description: &str, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|c| contains_phrase(description, &normalize(c)))
        .cloned()
}

/// Flavor profiles to consult: the one for the wine's type, or all of them
/// when the type is unknown.
fn relevant_flavors(profile: &TasteProfile, wine_type: Option<WineType>) -> Vec<&FlavorProfile> {
    match wine_type {
        Some(t) => vec![profile.flavor_for(t)],
        None => profile.all_flavors().to_vec(),
    }
}

/// Base 0.5, +0.2 for a preferred region, +0.2 for a preferred grape, −0.25 per
/// disliked characteristic named in the description. Neutral without a profile.
pub fn taste_alignment(
    wine_type: Option<WineType>,
    description: &str,
    profile: Option<&TasteProfile>,
) -> Alignment {
    let Some(profile) = profile else {
        return Alignment::neutral();
    };
    let description = normalize(description);
    let flavors = relevant_flavors(profile, wine_type);

    let region_hit = flavors
        .iter()
        .find_map(|f| first_hit(&description, &f.preferred_regions));
    let varietal_hit = flavors
        .iter()
        .find_map(|f| first_hit(&description, &f.preferred_varietals));

    let mut dislikes_hit: Vec<String> = Vec::new();
    for f in &flavors {
        for d in &f.disliked_characteristics {
            if !dislikes_hit.contains(d) && contains_phrase(&description, &normalize(d)) {
                dislikes_hit.push(d.clone());
            }
        }
    }

    let mut score = NEUTRAL;
    if region_hit.is_some() {
        score += REGION_BONUS;
    }
    if varietal_hit.is_some() {
        score += VARIETAL_BONUS;
    }
    score -= DISLIKE_PENALTY * dislikes_hit.len() as f64;

    Alignment {
        score: score.clamp(0.0, 1.0),
        region_hit,
        varietal_hit,
        dislikes_hit,
    }
}

/// 1.0 inside the band, falling linearly to 0 at one band-width outside it.
pub fn price_fit(price: Option<f64>, band: Option<&PriceRange>) -> f64 {
    let (Some(price), Some(band)) = (price, band) else {
        return NEUTRAL;
    };
    if price >= band.min && price <= band.max {
        return 1.0;
    }
    let width = (band.max - band.min).max(1.0);
    let distance = if price < band.min {
        band.min - price
    } else {
        price - band.max
    };
    (1.0 - distance / width).max(0.0)
}

/// Free text describing a cellar wine for keyword alignment.
pub fn wine_description(wine: &WineRow) -> String {
    let mut parts = vec![wine.name.as_str(), wine.producer.as_str()];
    parts.extend(wine.region.as_deref());
    parts.extend(wine.country.as_deref());
    parts.extend(wine.varietal.iter().map(String::as_str));
    parts.extend(wine.personal_notes.as_deref());
    parts.join(" ")
}
