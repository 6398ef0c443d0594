//! Relevance weights and name suggestions.

use crate::model::Field;
use rapidfuzz::distance::jaro_winkler;

/// Multiplier applied to each occurrence of a term, by the field it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub method: f32,
    pub path: f32,
    pub summary: f32,
    pub section: f32,
    pub description: f32,
    pub parameters: f32,
    pub examples: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            method: 3.0,
            path: 3.0,
            summary: 2.0,
            section: 2.0,
            description: 1.0,
            parameters: 1.0,
            examples: 1.0,
        }
    }
}

impl FieldWeights {
    pub const fn weight(&self, field: Field) -> f32 {
        match field {
            Field::Method => self.method,
            Field::Path => self.path,
            Field::Summary => self.summary,
            Field::Section => self.section,
            Field::Description => self.description,
            Field::Parameters => self.parameters,
            Field::Examples => self.examples,
        }
    }
}

/// Inverse document frequency: `ln(1 + total_docs / doc_freq)`.
///
/// Always positive, so every matching term adds to a document's score.
pub fn idf(total_docs: usize, doc_freq: usize) -> f32 {
    if doc_freq == 0 {
        return 0.0;
    }
    (1.0 + total_docs as f32 / doc_freq as f32).ln()
}

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 5;

/// Known names closest to `target`, best first.
pub fn suggest<'a>(target: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let target = target.to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|name| {
            let score = jaro_winkler::similarity(target.chars(), name.to_lowercase().chars());
            (score, name)
        })
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|(a, name_a), (b, name_b)| b.total_cmp(a).then_with(|| name_a.cmp(name_b)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn default_weights_are_ordered() {
        let weights = FieldWeights::default();
        check!(weights.weight(Field::Path) == weights.weight(Field::Method));
        check!(weights.weight(Field::Path) > weights.weight(Field::Summary));
        check!(weights.weight(Field::Section) > weights.weight(Field::Description));
        check!(weights.weight(Field::Examples) == weights.weight(Field::Parameters));
    }

    #[rstest]
    #[case(10, 1)]
    #[case(10, 10)]
    #[case(1, 1)]
    fn idf_is_positive(#[case] total: usize, #[case] freq: usize) {
        check!(idf(total, freq) > 0.0);
    }

    #[test]
    fn rarer_terms_weigh_more() {
        check!(idf(100, 1) > idf(100, 50));
    }

    #[test]
    fn suggestions_rank_closest_first() {
        let names = ["Storage API", "Queue API", "Stream API"];
        let suggestions = suggest("Storage AP", names);
        check!(suggestions.first().map(String::as_str) == Some("Storage API"));
        check!(suggest("zzz", names).is_empty());
    }
}
