//! Schema of the onboarding mapping output.
//!
//! The model replies in JSON; serde enforces shape and the closed aroma enum,
//! `validate` enforces numeric ranges. Anything that fails either check never
//! reaches the stored profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Novice,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    /// Discount applied to model confidence; novices describe taste less precisely.
    pub fn confidence_factor(&self) -> f64 {
        match self {
            ExperienceLevel::Novice => 0.8,
            ExperienceLevel::Intermediate => 0.9,
            ExperienceLevel::Expert => 1.0,
        }
    }
}

/// Onboarding quiz submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub experience: ExperienceLevel,
    #[serde(default)]
    pub free_enjoyed: Option<String>,
    #[serde(default)]
    pub free_disliked: Option<String>,
    /// Structured quiz answers keyed by question id.
    #[serde(default)]
    pub answers: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AromaFamily {
    Citrus,
    StoneFruit,
    Tropical,
    RedFruit,
    BlackFruit,
    Floral,
    Herbal,
    Spice,
    Earth,
    Oak,
    Dairy,
    Nutty,
    Mineral,
}

impl AromaFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            AromaFamily::Citrus => "citrus",
            AromaFamily::StoneFruit => "stone_fruit",
            AromaFamily::Tropical => "tropical",
            AromaFamily::RedFruit => "red_fruit",
            AromaFamily::BlackFruit => "black_fruit",
            AromaFamily::Floral => "floral",
            AromaFamily::Herbal => "herbal",
            AromaFamily::Spice => "spice",
            AromaFamily::Earth => "earth",
            AromaFamily::Oak => "oak",
            AromaFamily::Dairy => "dairy",
            AromaFamily::Nutty => "nutty",
            AromaFamily::Mineral => "mineral",
        }
    }
}

/// Palate intensities, each in [0,1].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Palate {
    pub sweetness: f64,
    pub acidity: f64,
    pub tannin: f64,
    pub bitterness: f64,
    pub body: f64,
    pub alcohol_warmth: f64,
    pub sparkle_intensity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AromaPreferences {
    #[serde(default)]
    pub affinities: Vec<AromaFamily>,
    #[serde(default)]
    pub aversions: Vec<AromaFamily>,
}

impl AromaPreferences {
    /// 0.8 for liked families, 0.2 for disliked, 0.5 otherwise.
    pub fn weight(&self, family: AromaFamily) -> f64 {
        if self.affinities.contains(&family) {
            0.8
        } else if self.aversions.contains(&family) {
            0.2
        } else {
            0.5
        }
    }
}

/// Style levers, each in [0,1].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StyleLevers {
    pub oak: f64,
    pub malolactic_butter: f64,
    pub oxidative: f64,
    pub minerality: f64,
    pub fruit_ripeness: f64,
}

/// How much each drinking context matters, each in [0,1].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextWeights {
    pub weeknight: f64,
    pub celebration: f64,
    pub with_food: f64,
    pub casual_social: f64,
    pub gift: f64,
}

impl ContextWeights {
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("weeknight", self.weeknight),
            ("celebration", self.celebration),
            ("with_food", self.with_food),
            ("casual_social", self.casual_social),
            ("gift", self.gift),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappedProfile {
    pub palate: Palate,
    #[serde(default)]
    pub aroma: AromaPreferences,
    pub styles: StyleLevers,
    pub contexts: ContextWeights,
    #[serde(default)]
    pub dislikes: Vec<String>,
    pub confidence: f64,
}

impl MappedProfile {
    /// Returns one message per value outside [0,1]; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let p = &self.palate;
        let s = &self.styles;
        let mut fields: Vec<(String, f64)> = vec![
            ("palate.sweetness".into(), p.sweetness),
            ("palate.acidity".into(), p.acidity),
            ("palate.tannin".into(), p.tannin),
            ("palate.bitterness".into(), p.bitterness),
            ("palate.body".into(), p.body),
            ("palate.alcohol_warmth".into(), p.alcohol_warmth),
            ("palate.sparkle_intensity".into(), p.sparkle_intensity),
            ("styles.oak".into(), s.oak),
            ("styles.malolactic_butter".into(), s.malolactic_butter),
            ("styles.oxidative".into(), s.oxidative),
            ("styles.minerality".into(), s.minerality),
            ("styles.fruit_ripeness".into(), s.fruit_ripeness),
            ("confidence".into(), self.confidence),
        ];
        fields.extend(
            self.contexts
                .entries()
                .iter()
                .map(|(name, v)| (format!("contexts.{name}"), *v)),
        );

        fields
            .into_iter()
            .filter(|(_, v)| !v.is_finite() || !(0.0..=1.0).contains(v))
            .map(|(name, v)| format!("{name}: {v} is outside [0,1]"))
            .collect()
    }
}
