//! Recurring terms across article coverage

use crate::normalize::WeightedArticle;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

const MIN_TERM_LEN: usize = 4;

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "against", "also", "amid", "among", "been", "before", "being",
    "between", "both", "could", "does", "doing", "during", "each", "even", "from", "further",
    "have", "having", "here", "into", "just", "last", "like", "more", "most", "much", "next",
    "only", "other", "over", "said", "says", "same", "should", "since", "some", "such", "than",
    "that", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "under", "until", "very", "were", "what", "when", "where", "which", "while", "will", "with",
    "would", "year", "years", "your", "according", "report", "reports", "news", "week", "today",
];

/// A term that recurs across articles
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub term: String,
    /// Number of articles mentioning the term
    pub mentions: usize,
    /// Summed evidence weight of those articles
    pub weight: f64,
    /// Weighted mean sentiment of those articles
    pub sentiment: f64,
}

/// Lowercase content terms of a text, each once
pub fn terms(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TERM_LEN && t.chars().all(char::is_alphabetic))
        .filter(|t| !STOPWORDS.iter().any(|s| s == t))
        .map(String::from)
        .collect()
}

/// Terms mentioned in at least `min_mentions` articles, heaviest first
///
/// `scores` holds per-article sentiment aligned with `articles`.
pub fn extract_themes(
    articles: &[WeightedArticle],
    scores: &[f64],
    exclude: &HashSet<String>,
    min_mentions: usize,
) -> Vec<Theme> {
    // term -> (mentions, weight, weighted sentiment)
    let mut stats: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();

    for (article, score) in articles.iter().zip(scores) {
        let weight = article.weight();
        for term in terms(&article.article.text()) {
            if exclude.contains(&term) {
                continue;
            }
            let entry = stats.entry(term).or_insert((0, 0.0, 0.0));
            entry.0 += 1;
            entry.1 += weight;
            entry.2 += weight * score;
        }
    }

    let mut themes: Vec<Theme> = stats
        .into_iter()
        .filter(|(_, (mentions, _, _))| *mentions >= min_mentions.max(1))
        .map(|(term, (mentions, weight, weighted_sentiment))| Theme {
            term,
            mentions,
            weight,
            sentiment: if weight > 0.0 { weighted_sentiment / weight } else { 0.0 },
        })
        .collect();

    themes.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
    themes
}
