// ============================================================
// Layer 6 — ROUGE Scorer
// ============================================================
// ROUGE-N measures n-gram overlap between a predicted sentence
// (the "summary") and the original sentence (the "reference").
//
//   matches   = Σ min(count_summary(g), count_reference(g))
//   precision = matches / #summary n-grams
//   recall    = matches / #reference n-grams
//   F         = 1 / (α/P + (1-α)/R)      with α = 0.5
//
// Tokens are lower-cased whitespace splits. With stop-word
// removal enabled, common English function words are dropped
// before counting, so reconstructing "the" and "a" correctly
// does not inflate the score.
//
// Reference: Lin (2004) ROUGE: A Package for Automatic
//            Evaluation of Summaries

use std::collections::HashMap;

use crate::domain::sentence::PAD_TOKEN;

const ALPHA: f64 = 0.5;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "did", "do", "does", "doing", "down",
    "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "you", "your", "yours", "yourself",
    "yourselves",
];

#[derive(Debug, Clone)]
pub struct RougeScorer {
    remove_stop_words: bool,
}

impl RougeScorer {
    pub fn new(remove_stop_words: bool) -> Self {
        Self { remove_stop_words }
    }

    pub fn rouge_1(&self, summary: &str, reference: &str) -> f64 {
        self.rouge_n(summary, reference, 1)
    }

    pub fn rouge_2(&self, summary: &str, reference: &str) -> f64 {
        self.rouge_n(summary, reference, 2)
    }

    /// ROUGE-N F-score in [0, 1]. Empty inputs score 0.
    pub fn rouge_n(&self, summary: &str, reference: &str, n: usize) -> f64 {
        let summary   = self.tokenize(summary);
        let reference = self.tokenize(reference);

        let summary_grams   = ngram_counts(&summary, n);
        let reference_grams = ngram_counts(&reference, n);

        let summary_total:   usize = summary_grams.values().sum();
        let reference_total: usize = reference_grams.values().sum();
        if summary_total == 0 || reference_total == 0 {
            return 0.0;
        }

        let matches: usize = summary_grams
            .iter()
            .map(|(gram, count)| (*count).min(reference_grams.get(gram).copied().unwrap_or(0)))
            .sum();
        if matches == 0 {
            return 0.0;
        }

        let precision = matches as f64 / summary_total as f64;
        let recall    = matches as f64 / reference_total as f64;
        1.0 / (ALPHA / precision + (1.0 - ALPHA) / recall)
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter(|t| *t != PAD_TOKEN)
            .map(str::to_lowercase)
            .filter(|t| !self.remove_stop_words || !STOP_WORDS.contains(&t.as_str()))
            .collect()
    }
}

impl Default for RougeScorer {
    fn default() -> Self {
        Self::new(true)
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sentences_score_one() {
        let r = RougeScorer::new(true);
        let s = "coffee with friends downtown <EOS>";
        assert!((r.rouge_1(s, s) - 1.0).abs() < 1e-12);
        assert!((r.rouge_2(s, s) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_sentences_score_zero() {
        let r = RougeScorer::new(false);
        assert_eq!(r.rouge_1("sunny beach", "rainy mountain"), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let r = RougeScorer::new(false);
        // summary: x y z, reference: x y w v → matches 2, P=2/3, R=2/4
        let f = r.rouge_1("x y z", "x y w v");
        let expected = 1.0 / (0.5 / (2.0 / 3.0) + 0.5 / 0.5);
        assert!((f - expected).abs() < 1e-12);
        // bigrams: {xy, yz} vs {xy, yw, wv} → 1 match, P=1/2, R=1/3
        let f2 = r.rouge_2("x y z", "x y w v");
        let expected2 = 1.0 / (0.5 / 0.5 + 0.5 / (1.0 / 3.0));
        assert!((f2 - expected2).abs() < 1e-12);
    }

    #[test]
    fn test_stop_words_and_padding_ignored() {
        let r = RougeScorer::new(true);
        let f = r.rouge_1("the coffee <PAD> <PAD>", "a coffee");
        assert!((f - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_scores_zero() {
        let r = RougeScorer::default();
        assert_eq!(r.rouge_1("", "coffee"), 0.0);
        assert_eq!(r.rouge_2("coffee", "coffee"), 0.0);
    }

    #[test]
    fn test_clipped_counts() {
        let r = RougeScorer::new(false);
        // "x x x" only gets credit for the single x in the reference
        let f = r.rouge_1("x x x", "x y");
        let expected = 1.0 / (0.5 / (1.0 / 3.0) + 0.5 / 0.5);
        assert!((f - expected).abs() < 1e-12);
    }
}
