//! Lightweight sanity check of a mapped profile against what the user wrote.
//!
//! Keyword heuristics on the free text produce expectations; a mapping that
//! misses several of them is flagged in the preview. A low score never
//! rejects the mapping.

use serde::Serialize;

use crate::profile::schema::{MappedProfile, QuizAnswers};
use crate::text::{contains_phrase, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Acidity,
    Oak,
    Sweetness,
    Tannin,
    Sparkle,
}

impl Dimension {
    fn value(&self, mapped: &MappedProfile) -> f64 {
        match self {
            Dimension::Acidity => mapped.palate.acidity,
            Dimension::Oak => mapped.styles.oak,
            Dimension::Sweetness => mapped.palate.sweetness,
            Dimension::Tannin => mapped.palate.tannin,
            Dimension::Sparkle => mapped.palate.sparkle_intensity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "bound", content = "value", rename_all = "snake_case")]
pub enum Bound {
    AtLeast(f64),
    AtMost(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expectation {
    pub dimension: Dimension,
    pub bound: Bound,
    /// The keyword that produced this expectation.
    pub cue: &'static str,
}

impl Expectation {
    pub fn holds(&self, mapped: &MappedProfile) -> bool {
        let v = self.dimension.value(mapped);
        match self.bound {
            Bound::AtLeast(min) => v >= min,
            Bound::AtMost(max) => v <= max,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub score: f64,
    pub passed: Vec<Expectation>,
    pub failed: Vec<Expectation>,
}

enum Side {
    Enjoyed,
    Disliked,
}

struct Rule {
    side: Side,
    keywords: &'static [&'static str],
    dimension: Dimension,
    bound: Bound,
}

const RULES: &[Rule] = &[
    Rule {
        side: Side::Enjoyed,
        keywords: &["crisp", "citrus", "citrusy", "zesty", "tart"],
        dimension: Dimension::Acidity,
        bound: Bound::AtLeast(0.5),
    },
    Rule {
        side: Side::Disliked,
        keywords: &["oak", "oaky", "buttery", "vanilla"],
        dimension: Dimension::Oak,
        bound: Bound::AtMost(0.3),
    },
    Rule {
        side: Side::Disliked,
        keywords: &["sweet", "sugary"],
        dimension: Dimension::Sweetness,
        bound: Bound::AtMost(0.3),
    },
    Rule {
        side: Side::Enjoyed,
        keywords: &["bold", "tannic", "structured", "grippy"],
        dimension: Dimension::Tannin,
        bound: Bound::AtLeast(0.5),
    },
    Rule {
        side: Side::Enjoyed,
        keywords: &["bubbles", "bubbly", "sparkling", "fizzy", "champagne"],
        dimension: Dimension::Sparkle,
        bound: Bound::AtLeast(0.5),
    },
];

pub fn expectations_from_answers(answers: &QuizAnswers) -> Vec<Expectation> {
    let enjoyed = normalize(answers.free_enjoyed.as_deref().unwrap_or_default());
    let disliked = normalize(answers.free_disliked.as_deref().unwrap_or_default());

    RULES
        .iter()
        .filter_map(|rule| {
            let text = match rule.side {
                Side::Enjoyed => enjoyed.as_str(),
                Side::Disliked => disliked.as_str(),
            };
            rule.keywords
                .iter()
                .find(|k| contains_phrase(text, k))
                .map(|cue| Expectation {
                    dimension: rule.dimension,
                    bound: rule.bound,
                    cue: *cue,
                })
        })
        .collect()
}

pub fn evaluate(mapped: &MappedProfile, expectations: &[Expectation]) -> EvalReport {
    let (passed, failed): (Vec<_>, Vec<_>) = expectations
        .iter()
        .cloned()
        .partition(|e| e.holds(mapped));

    let score = if expectations.is_empty() {
        1.0
    } else {
        passed.len() as f64 / expectations.len() as f64
    };

    EvalReport {
        score,
        passed,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::schema::tests::sample_json;
    use crate::profile::schema::ExperienceLevel;
    use serde_json::json;

    fn answers(enjoyed: &str, disliked: &str) -> QuizAnswers {
        QuizAnswers {
            experience: ExperienceLevel::Intermediate,
            free_enjoyed: Some(enjoyed.into()),
            free_disliked: Some(disliked.into()),
            answers: Default::default(),
        }
    }

    #[test]
    fn test_crisp_white_scenario_passes() {
        let a = answers("crisp citrusy white", "oaky buttery");
        let expectations = expectations_from_answers(&a);
        assert_eq!(expectations.len(), 2);
        assert_eq!(expectations[0].dimension, Dimension::Acidity);
        assert_eq!(expectations[1].dimension, Dimension::Oak);

        let mapped: MappedProfile = serde_json::from_value(sample_json()).unwrap();
        let report = evaluate(&mapped, &expectations);
        assert_eq!(report.score, 1.0);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_failed_expectation_lowers_score() {
        let mut value = sample_json();
        value["styles"]["oak"] = json!(0.9);
        let mapped: MappedProfile = serde_json::from_value(value).unwrap();
        let a = answers("crisp citrusy white", "oaky buttery");
        let report = evaluate(&mapped, &expectations_from_answers(&a));
        assert_eq!(report.score, 0.5);
        assert_eq!(report.failed[0].cue, "oaky");
    }

    #[test]
    fn test_no_cues_scores_one() {
        let mapped: MappedProfile = serde_json::from_value(sample_json()).unwrap();
        let report = evaluate(&mapped, &expectations_from_answers(&answers("anything", "")));
        assert_eq!(report.score, 1.0);
        assert!(report.passed.is_empty());
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        // "oakland" must not trigger the oak rule
        let e = expectations_from_answers(&answers("", "wines from oakland"));
        assert!(e.is_empty());
    }
}
