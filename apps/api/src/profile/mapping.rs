//! Onboarding mapping: quiz answers → model prompt → validated JSON → TasteProfile.
//!
//! Flow: validate_answers → build_messages → LlmClient::call (one delayed retry
//! on 429 inside the client) → interpret_reply (malformed JSON re-requested
//! once) → to_taste_profile.

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{parse_json_reply, ChatMessage, LlmClient};
use crate::models::taste_profile::{FlavorProfile, GeneralPreferences, PriceRange, TasteProfile};
use crate::models::wine::WineType;
use crate::pairing::tables::varietals_for_aroma;
use crate::profile::prompts::{
    FEW_SHOT_ASSISTANT_1, FEW_SHOT_ASSISTANT_2, FEW_SHOT_USER_1, FEW_SHOT_USER_2, MAPPING_SYSTEM,
};
use crate::profile::schema::{AromaFamily, ExperienceLevel, MappedProfile, QuizAnswers};

pub const MAX_FREE_TEXT_CHARS: usize = 2000;
/// Malformed replies are re-requested once.
const MAPPING_ATTEMPTS: u32 = 2;
const MAPPING_TEMPERATURE: f32 = 0.2;
const MAX_PREFERRED_VARIETALS: usize = 5;

#[derive(Debug, PartialEq)]
pub enum ReplyError {
    Malformed(String),
    OutOfRange(Vec<String>),
}

pub fn validate_answers(answers: &QuizAnswers) -> Result<(), AppError> {
    for (field, text) in [
        ("free_enjoyed", &answers.free_enjoyed),
        ("free_disliked", &answers.free_disliked),
    ] {
        if let Some(t) = text {
            if t.chars().count() > MAX_FREE_TEXT_CHARS {
                return Err(AppError::Validation(format!(
                    "{field}: must be at most {MAX_FREE_TEXT_CHARS} characters"
                )));
            }
        }
    }

    let has_free_text = [&answers.free_enjoyed, &answers.free_disliked]
        .iter()
        .any(|t| t.as_deref().is_some_and(|s| !s.trim().is_empty()));
    if !has_free_text && answers.answers.is_empty() {
        return Err(AppError::Validation(
            "answers: provide at least one quiz answer".to_string(),
        ));
    }
    Ok(())
}

pub fn build_messages(answers: &QuizAnswers) -> Result<Vec<ChatMessage>, AppError> {
    let payload = serde_json::to_string(answers)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize answers: {e}")))?;

    Ok(vec![
        ChatMessage::system(format!(
            "{MAPPING_SYSTEM}\n\n{NO_INVENTION_INSTRUCTION}\n\n{JSON_ONLY_SYSTEM}"
        )),
        ChatMessage::user(FEW_SHOT_USER_1),
        ChatMessage::assistant(FEW_SHOT_ASSISTANT_1),
        ChatMessage::user(FEW_SHOT_USER_2),
        ChatMessage::assistant(FEW_SHOT_ASSISTANT_2),
        ChatMessage::user(payload),
    ])
}

/// Parses and range-checks one model reply.
pub fn interpret_reply(text: &str) -> Result<MappedProfile, ReplyError> {
    let mut mapped: MappedProfile =
        parse_json_reply(text).map_err(|e| ReplyError::Malformed(e.to_string()))?;

    let errors = mapped.validate();
    if !errors.is_empty() {
        return Err(ReplyError::OutOfRange(errors));
    }

    mapped.aroma.affinities.sort();
    mapped.aroma.affinities.dedup();
    mapped.aroma.aversions.sort();
    mapped.aroma.aversions.dedup();
    mapped.dislikes = mapped
        .dislikes
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();
    Ok(mapped)
}

/// Runs the full mapping call for one quiz submission.
pub async fn map_answers(llm: &LlmClient, answers: &QuizAnswers) -> Result<MappedProfile, AppError> {
    validate_answers(answers)?;
    let messages = build_messages(answers)?;

    let mut last_error = String::from("no reply");
    for attempt in 1..=MAPPING_ATTEMPTS {
        let response = llm
            .call(&messages, MAPPING_TEMPERATURE)
            .await
            .map_err(|e| e.into_app_error("MAPPING_UPSTREAM_FAILED"))?;

        let Some(text) = response.text() else {
            warn!("Mapping attempt {attempt} returned empty content");
            last_error = "empty reply".to_string();
            continue;
        };

        match interpret_reply(text) {
            Ok(mapped) => {
                info!(
                    "Mapped quiz answers ({:?}) with confidence {:.2}",
                    answers.experience, mapped.confidence
                );
                return Ok(mapped);
            }
            Err(ReplyError::Malformed(e)) => {
                warn!("Mapping attempt {attempt} returned malformed JSON: {e}");
                last_error = e;
            }
            Err(ReplyError::OutOfRange(errors)) => {
                return Err(AppError::llm("MAPPING_SCHEMA_INVALID", errors.join("; ")));
            }
        }
    }

    Err(AppError::llm("MAPPING_PARSE_FAILED", last_error))
}

/// Maps a [0,1] intensity onto the 1–10 profile scale.
pub fn scale(x: f64) -> u8 {
    (1.0 + 9.0 * x.clamp(0.0, 1.0)).round() as u8
}

fn max_weight(mapped: &MappedProfile, families: &[AromaFamily]) -> f64 {
    families
        .iter()
        .map(|f| mapped.aroma.weight(*f))
        .fold(0.0, f64::max)
}

fn preferred_varietals(mapped: &MappedProfile, wine_type: WineType) -> Vec<String> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for family in &mapped.aroma.affinities {
        for name in varietals_for_aroma(*family, Some(wine_type)) {
            match counts.iter_mut().find(|(n, _)| *n == name) {
                Some((_, c)) => *c += 1,
                None => counts.push((name, 1)),
            }
        }
    }
    // Stable sort keeps table order among equally matched grapes.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(MAX_PREFERRED_VARIETALS)
        .map(|(n, _)| n.to_string())
        .collect()
}

fn disliked_characteristics(mapped: &MappedProfile) -> Vec<String> {
    let mut out: Vec<String> = mapped
        .aroma
        .aversions
        .iter()
        .map(|f| f.as_str().replace('_', " "))
        .collect();
    out.extend(mapped.dislikes.iter().map(|d| d.to_lowercase()));

    let levers = [
        (mapped.styles.oak, "oaky"),
        (mapped.styles.malolactic_butter, "buttery"),
        (mapped.styles.oxidative, "oxidative"),
        (mapped.palate.sweetness, "sweet"),
    ];
    for (value, label) in levers {
        if value < 0.2 {
            out.push(label.to_string());
        }
    }

    let mut seen = Vec::new();
    out.retain(|d| {
        if seen.contains(d) {
            false
        } else {
            seen.push(d.clone());
            true
        }
    });
    out
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Reads a budget answer: `{min,max}`, `[min,max]`, or text like "$20–40" / "under 30".
pub fn parse_budget(value: &Value) -> Option<PriceRange> {
    let range = |a: f64, b: f64| PriceRange {
        min: a.min(b).max(0.0),
        max: a.max(b),
    };
    match value {
        Value::Object(obj) => {
            let min = obj.get("min").and_then(Value::as_f64)?;
            let max = obj.get("max").and_then(Value::as_f64)?;
            Some(range(min, max))
        }
        Value::Array(arr) if arr.len() == 2 => Some(range(arr[0].as_f64()?, arr[1].as_f64()?)),
        Value::String(s) => {
            let numbers: Vec<f64> = s
                .split(|c: char| !(c.is_ascii_digit() || c == '.'))
                .filter_map(|part| part.parse::<f64>().ok())
                .collect();
            match numbers.as_slice() {
                [a, b, ..] => Some(range(*a, *b)),
                // A single figure is read as a ceiling.
                [a] => Some(range(0.0, *a)),
                [] => None,
            }
        }
        _ => None,
    }
}

fn default_price_range(experience: ExperienceLevel) -> PriceRange {
    match experience {
        ExperienceLevel::Novice => PriceRange {
            min: 10.0,
            max: 30.0,
        },
        ExperienceLevel::Intermediate => PriceRange {
            min: 15.0,
            max: 50.0,
        },
        ExperienceLevel::Expert => PriceRange {
            min: 25.0,
            max: 120.0,
        },
    }
}

/// Converts validated model output into the stored 1–10 taste profile.
pub fn to_taste_profile(mapped: &MappedProfile, answers: &QuizAnswers) -> TasteProfile {
    let p = &mapped.palate;
    let s = &mapped.styles;
    let dislikes = disliked_characteristics(mapped);
    let regions = string_list(answers.answers.get("regions"));

    let red_fruit = max_weight(mapped, &[AromaFamily::RedFruit, AromaFamily::BlackFruit]);
    let white_fruit = max_weight(
        mapped,
        &[AromaFamily::Citrus, AromaFamily::StoneFruit, AromaFamily::Tropical],
    );

    let red = FlavorProfile {
        fruitiness: scale((s.fruit_ripeness + red_fruit) / 2.0),
        earthiness: scale(mapped.aroma.weight(AromaFamily::Earth)),
        oakiness: scale(s.oak),
        acidity: scale(p.acidity),
        tannins: scale(p.tannin),
        sweetness: scale(p.sweetness),
        body: scale(p.body),
        preferred_regions: regions.clone(),
        preferred_varietals: preferred_varietals(mapped, WineType::Red),
        disliked_characteristics: dislikes.clone(),
    };

    let white = FlavorProfile {
        fruitiness: scale((s.fruit_ripeness + white_fruit) / 2.0),
        earthiness: scale(s.minerality),
        oakiness: scale((s.oak + s.malolactic_butter) / 2.0),
        acidity: scale(p.acidity),
        tannins: scale(p.tannin * 0.3),
        sweetness: scale(p.sweetness),
        body: scale(p.body),
        preferred_regions: regions.clone(),
        preferred_varietals: preferred_varietals(mapped, WineType::White),
        disliked_characteristics: dislikes.clone(),
    };

    let sparkling = FlavorProfile {
        fruitiness: scale((s.fruit_ripeness + white_fruit) / 2.0),
        earthiness: scale(s.oxidative),
        oakiness: scale(s.oak * 0.5),
        acidity: scale(p.acidity),
        tannins: 1,
        sweetness: scale(p.sweetness),
        body: scale(p.sparkle_intensity),
        preferred_regions: regions,
        preferred_varietals: preferred_varietals(mapped, WineType::Sparkling),
        disliked_characteristics: dislikes,
    };

    let price_range = ["budget", "price_range"]
        .iter()
        .find_map(|k| answers.answers.get(*k).and_then(parse_budget))
        .unwrap_or_else(|| default_price_range(answers.experience));

    let occasion_preferences = mapped
        .contexts
        .entries()
        .iter()
        .filter(|(_, w)| *w >= 0.6)
        .map(|(name, _)| name.to_string())
        .collect();

    let confidence = (mapped.confidence * answers.experience.confidence_factor()).clamp(0.0, 1.0);

    TasteProfile {
        red_wine_preferences: red,
        white_wine_preferences: white,
        sparkling_preferences: sparkling,
        general_preferences: GeneralPreferences {
            price_range,
            occasion_preferences,
            food_pairing_importance: scale(mapped.contexts.with_food),
        },
        confidence_score: (confidence * 100.0).round() / 100.0,
        learning_history: vec![],
    }
}
