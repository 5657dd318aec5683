//! Text normalization shared by wine-list matching and keyword heuristics.

use std::collections::BTreeSet;

/// Words that carry no identity on a wine label or list.
const STOPWORDS: &[&str] = &[
    "the", "de", "du", "des", "la", "le", "les", "di", "del", "della", "el", "los", "das", "der",
    "von", "and", "et", "y", "of", "domaine", "chateau", "bodega", "bodegas", "weingut", "tenuta",
    "estate", "winery", "vineyards", "vineyard", "cellars", "wines", "wine",
];

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Lowercases, folds common accents, and turns punctuation into single spaces.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(fold_char)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized, stopword-free token set.
pub fn token_set(text: &str) -> BTreeSet<String> {
    normalize(text)
        .split_whitespace()
        .filter(|t| !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Token set used for identity comparisons. Labels made only of stopwords
/// ("The Wine", "Domaine de la") keep all their tokens.
fn identity_tokens(text: &str) -> BTreeSet<String> {
    let filtered = token_set(text);
    if !filtered.is_empty() {
        return filtered;
    }
    normalize(text).split_whitespace().map(str::to_string).collect()
}

/// Jaccard similarity of the two token sets, in [0,1]. Identical labels score
/// 1 after normalization; empty inputs score 0.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let (na, nb) = (normalize(a), normalize(b));
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    if na == nb {
        return 1.0;
    }
    let a = identity_tokens(&na);
    let b = identity_tokens(&nb);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    intersection / union
}

/// True when `needle` (already normalized) appears as whole words in `haystack`.
pub fn contains_phrase(haystack_normalized: &str, needle_normalized: &str) -> bool {
    if needle_normalized.is_empty() {
        return false;
    }
    let padded = format!(" {haystack_normalized} ");
    padded.contains(&format!(" {needle_normalized} "))
}

/// Escapes text for interpolation into HTML bodies and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_accents_and_punctuation() {
        assert_eq!(normalize("Château Mouton-Rothschild, 1er Cru!"), "chateau mouton rothschild 1er cru");
    }

    #[test]
    fn test_token_set_drops_stopwords() {
        let tokens = token_set("Domaine de la Romanée-Conti");
        assert_eq!(
            tokens.into_iter().collect::<Vec<_>>(),
            vec!["conti".to_string(), "romanee".to_string()]
        );
    }

    #[test]
    fn test_identical_strings_are_fully_similar() {
        assert!((token_similarity("Cloudy Bay Sauvignon Blanc", "cloudy bay sauvignon blanc") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_overlap() {
        // {cloudy, bay, sauvignon, blanc} vs {cloudy, bay, chardonnay} -> 2/5
        let sim = token_similarity("Cloudy Bay Sauvignon Blanc", "Cloudy Bay Chardonnay");
        assert!((sim - 0.4).abs() < 1e-9, "sim was {sim}");
    }

    #[test]
    fn test_stopword_only_labels_still_compare() {
        assert_eq!(token_similarity("The Wine", "the wine"), 1.0);
        assert_eq!(token_similarity("Domaine de la", "Domaine de la"), 1.0);
        // {estate, wine} vs {estate, wines}
        let sim = token_similarity("Estate Wine", "Estate Wines");
        assert!((sim - 1.0 / 3.0).abs() < 1e-9, "sim was {sim}");
    }

    #[test]
    fn test_empty_similarity_is_zero() {
        assert_eq!(token_similarity("", "anything"), 0.0);
    }

    #[test]
    fn test_contains_phrase_respects_word_boundaries() {
        assert!(contains_phrase("pinot noir reserve", "pinot noir"));
        assert!(!contains_phrase("primrose hill", "rose"));
    }
}
