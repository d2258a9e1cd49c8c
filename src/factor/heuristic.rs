//! Deterministic evidence-driven factor decomposer

use super::{extract_themes, terms, Evidence, Factor, FactorDecomposer};
use crate::config::FactorConfig;
use crate::normalize::WeightedArticle;

/// Article polarity below this magnitude counts as neutral
const SIGNED_THRESHOLD: f64 = 0.05;
/// Credibility at or above this counts as a high-credibility outlet
const HIGH_CREDIBILITY: f64 = 0.8;
/// Age window for coverage momentum
const MOMENTUM_WINDOW_HOURS: f64 = 24.0;
/// Maximum theme factors emitted
const MAX_THEME_FACTORS: usize = 3;

const CONSENSUS_SCALE: f64 = 0.08;
const RESOLUTION_SCALE: f64 = 0.12;
const DIVERGENCE_SCALE: f64 = 0.10;
const MOMENTUM_SCALE: f64 = 0.05;
const THEME_SCALE: f64 = 0.05;

const YES_MARKERS: &[&str] = &[
    "confirmed", "approved", "signed", "passed", "announced", "scheduled", "on track", "agreed",
    "clinched", "secured", "won", "certified", "greenlit",
];
const NO_MARKERS: &[&str] = &[
    "postponed", "delayed", "cancelled", "canceled", "rejected", "blocked", "withdrawn",
    "ruled out", "denied", "suspended", "collapsed", "lost", "vetoed", "struck down",
];

/// Rule-based decomposer used when no model-backed decomposer is injected
#[derive(Debug, Clone)]
pub struct HeuristicDecomposer {
    theme_min_mentions: usize,
}

impl HeuristicDecomposer {
    pub fn new(config: &FactorConfig) -> Self {
        Self {
            theme_min_mentions: config.theme_min_mentions,
        }
    }

    /// Do sources agree on the direction of the aggregate sentiment?
    fn source_consensus(&self, evidence: &Evidence<'_>) -> Option<Factor> {
        let aggregate = evidence.sentiment.score;
        if aggregate.abs() < SIGNED_THRESHOLD {
            return None;
        }

        let (mut agree, mut signed, mut count) = (0.0, 0.0, 0usize);
        for (article, score) in scored(evidence) {
            if score.abs() < SIGNED_THRESHOLD {
                continue;
            }
            signed += article.weight();
            count += 1;
            if score.signum() == aggregate.signum() {
                agree += article.weight();
            }
        }
        if count < 2 || signed <= 0.0 {
            return None;
        }

        let share = agree / signed;
        let contribution = aggregate.signum() * (share - 0.5) * 2.0 * CONSENSUS_SCALE;
        Some(Factor::new(
            "Source consensus",
            contribution,
            format!(
                "{:.0}% of weighted coverage across {} opinionated articles leans {}",
                share * 100.0,
                count,
                direction(aggregate)
            ),
        ))
    }

    /// Language that usually precedes a yes or no resolution
    fn resolution_language(&self, evidence: &Evidence<'_>) -> Option<Factor> {
        let (mut yes, mut no, mut total) = (0.0, 0.0, 0.0);
        let (mut yes_hits, mut no_hits) = (Vec::new(), Vec::new());

        for article in evidence.articles {
            let text = MarkerText::new(&article.article.text());
            total += article.weight();
            for marker in YES_MARKERS.iter().filter(|m| text.mentions(m)) {
                yes += article.weight();
                push_unique(&mut yes_hits, marker);
            }
            for marker in NO_MARKERS.iter().filter(|m| text.mentions(m)) {
                no += article.weight();
                push_unique(&mut no_hits, marker);
            }
        }
        if yes + no <= 0.0 || total <= 0.0 {
            return None;
        }

        let net = (yes - no) / (yes + no);
        let coverage = ((yes + no) / total).min(1.0);
        let mut markers: Vec<&str> = yes_hits.into_iter().chain(no_hits).collect();
        markers.truncate(6);

        Some(Factor::new(
            "Resolution language",
            net * coverage * RESOLUTION_SCALE,
            format!(
                "Coverage uses {} resolution language ({})",
                if net >= 0.0 { "affirmative" } else { "negative" },
                markers.join(", ")
            ),
        ))
    }

    /// High-credibility outlets read differently from overall coverage
    fn credibility_divergence(&self, evidence: &Evidence<'_>) -> Option<Factor> {
        let (mut weight, mut weighted, mut count) = (0.0, 0.0, 0usize);
        for (article, score) in scored(evidence) {
            if article.credibility >= HIGH_CREDIBILITY {
                weight += article.weight();
                weighted += article.weight() * score;
                count += 1;
            }
        }
        if count == 0 || count == evidence.articles.len() || weight <= 0.0 {
            return None;
        }

        let high_mean = weighted / weight;
        let divergence = high_mean - evidence.sentiment.score;
        if divergence.abs() < 0.1 {
            return None;
        }

        Some(Factor::new(
            "High-credibility reporting",
            divergence * DIVERGENCE_SCALE,
            format!(
                "{} high-credibility outlets read more {} ({:+.2}) than overall coverage ({:+.2})",
                count,
                direction(divergence),
                high_mean,
                evidence.sentiment.score
            ),
        ))
    }

    /// Recent coverage concentrated in the direction of sentiment
    fn coverage_momentum(&self, evidence: &Evidence<'_>) -> Option<Factor> {
        let aggregate = evidence.sentiment.score;
        if evidence.articles.len() < 3 || aggregate.abs() < 0.1 {
            return None;
        }

        let total: f64 = evidence.articles.iter().map(WeightedArticle::weight).sum();
        let recent: f64 = evidence
            .articles
            .iter()
            .filter(|a| a.age_hours <= MOMENTUM_WINDOW_HOURS)
            .map(WeightedArticle::weight)
            .sum();
        if total <= 0.0 {
            return None;
        }

        let share = recent / total;
        if share < 0.5 {
            return None;
        }

        Some(Factor::new(
            "Coverage momentum",
            aggregate.signum() * share * MOMENTUM_SCALE,
            format!(
                "{:.0}% of evidence weight arrived in the last {}h, leaning {}",
                share * 100.0,
                MOMENTUM_WINDOW_HOURS,
                direction(aggregate)
            ),
        ))
    }

    /// Recurring themes with a clear sentiment of their own
    fn theme_factors(&self, question: &str, evidence: &Evidence<'_>) -> Vec<Factor> {
        let total: f64 = evidence.articles.iter().map(WeightedArticle::weight).sum();
        if total <= 0.0 {
            return Vec::new();
        }

        extract_themes(
            evidence.articles,
            &evidence.sentiment.article_scores,
            &terms(question),
            self.theme_min_mentions,
        )
        .into_iter()
        .filter(|t| t.sentiment.abs() >= 0.1)
        .take(MAX_THEME_FACTORS)
        .map(|theme| {
            let share = (theme.weight / total).min(1.0);
            Factor::new(
                format!("Theme: {}", theme.term),
                theme.sentiment * share * THEME_SCALE,
                format!(
                    "'{}' recurs in {} articles with {} tone ({:+.2})",
                    theme.term,
                    theme.mentions,
                    direction(theme.sentiment),
                    theme.sentiment
                ),
            )
        })
        .collect()
    }
}

impl FactorDecomposer for HeuristicDecomposer {
    fn decompose(&self, question: &str, evidence: &Evidence<'_>) -> Vec<Factor> {
        if evidence.articles.is_empty() {
            return Vec::new();
        }

        let mut factors: Vec<Factor> = [
            self.source_consensus(evidence),
            self.resolution_language(evidence),
            self.credibility_divergence(evidence),
            self.coverage_momentum(evidence),
        ]
        .into_iter()
        .flatten()
        .collect();
        factors.extend(self.theme_factors(question, evidence));
        factors
    }

    fn name(&self) -> &str {
        "heuristic_factor_decomposition"
    }
}

/// Articles paired with their sentiment scores
fn scored<'a>(evidence: &'a Evidence<'a>) -> impl Iterator<Item = (&'a WeightedArticle, f64)> + 'a {
    evidence
        .articles
        .iter()
        .zip(evidence.sentiment.article_scores.iter().copied())
}

fn direction(value: f64) -> &'static str {
    if value >= 0.0 {
        "positive"
    } else {
        "negative"
    }
}

/// Article text split into whole words; contractions stay one word
struct MarkerText {
    tokens: Vec<String>,
    /// Tokens joined by single spaces and padded, for phrase markers
    joined: String,
}

impl MarkerText {
    fn new(text: &str) -> Self {
        let tokens: Vec<String> = text
            .to_lowercase()
            .replace('\u{2019}', "'")
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        let joined = format!(" {} ", tokens.join(" "));
        Self { tokens, joined }
    }

    fn mentions(&self, marker: &str) -> bool {
        if marker.contains(' ') {
            self.joined.contains(&format!(" {} ", marker))
        } else {
            self.tokens.iter().any(|t| t == marker)
        }
    }
}

fn push_unique<'a>(hits: &mut Vec<&'a str>, marker: &'a str) {
    if !hits.contains(&marker) {
        hits.push(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::Article;
    use crate::sentiment::{SentimentAnalyzer, SentimentReport};
    use chrono::Utc;

    fn weighted(source: &str, headline: &str, polarity: f64, credibility: f64, age_hours: f64) -> WeightedArticle {
        WeightedArticle {
            article: Article::new(source, headline, Utc::now()).with_polarity(polarity),
            credibility,
            recency: 1.0,
            age_hours,
        }
    }

    fn decompose(question: &str, articles: &[WeightedArticle]) -> Vec<Factor> {
        let sentiment: SentimentReport = SentimentAnalyzer::default().analyze(articles);
        let evidence = Evidence {
            articles,
            sentiment: &sentiment,
        };
        HeuristicDecomposer::new(&FactorConfig::default()).decompose(question, &evidence)
    }

    fn find<'a>(factors: &'a [Factor], name: &str) -> Option<&'a Factor> {
        factors.iter().find(|f| f.name == name)
    }

    #[test]
    fn test_markers_match_whole_words_only() {
        let text = MarkerText::new("Governor won't attend as chief of staff resigned; Lostock reassigned");
        assert!(!text.mentions("won"));
        assert!(!text.mentions("signed"));
        assert!(!text.mentions("lost"));

        let text = MarkerText::new("Bill signed after the team won. Launch on track, appeal struck  down");
        assert!(text.mentions("signed"));
        assert!(text.mentions("won"));
        assert!(text.mentions("on track"));
        assert!(text.mentions("struck down"));
        assert!(!text.mentions("ruled out"));
    }

    #[test]
    fn test_negative_contractions_are_not_affirmative_resolution() {
        let articles = vec![
            weighted("Reuters", "Governor won't attend as chief of staff resigned", -0.3, 0.95, 2.0),
            weighted("Bloomberg", "Committee won't advance the bill this session", -0.4, 0.92, 3.0),
        ];
        let factors = decompose("Will the governor sign the bill?", &articles);
        assert!(find(&factors, "Resolution language").is_none());
    }

    #[test]
    fn test_no_articles_no_factors() {
        assert!(decompose("Will X happen?", &[]).is_empty());
    }

    #[test]
    fn test_source_consensus_positive() {
        let articles = vec![
            weighted("Reuters", "a", 0.6, 0.9, 2.0),
            weighted("Bloomberg", "b", 0.5, 0.9, 3.0),
            weighted("Blog", "c", -0.2, 0.3, 4.0),
        ];
        let factors = decompose("Will X happen?", &articles);
        let consensus = find(&factors, "Source consensus").unwrap();
        assert!(consensus.contribution > 0.0);
        assert!(consensus.description.contains("positive"));
    }

    #[test]
    fn test_resolution_language_negative() {
        let articles = vec![
            weighted("Reuters", "Launch postponed after review", 0.0, 0.9, 2.0),
            weighted("AP", "Mission delayed again", 0.0, 0.9, 5.0),
        ];
        let factors = decompose("Will the launch happen in May?", &articles);
        let language = find(&factors, "Resolution language").unwrap();
        assert!(language.contribution < 0.0);
        assert!(language.description.contains("postponed"));
        assert!(language.description.contains("delayed"));
    }

    #[test]
    fn test_credibility_divergence() {
        let articles = vec![
            weighted("Reuters", "a", 0.8, 0.95, 2.0),
            weighted("Blog", "b", -0.6, 0.3, 2.0),
            weighted("Forum", "c", -0.6, 0.3, 2.0),
        ];
        let factors = decompose("Will X happen?", &articles);
        let divergence = find(&factors, "High-credibility reporting").unwrap();
        assert!(divergence.contribution > 0.0);
    }

    #[test]
    fn test_coverage_momentum_requires_recent_majority() {
        let recent = vec![
            weighted("A", "a", 0.5, 0.8, 1.0),
            weighted("B", "b", 0.5, 0.8, 2.0),
            weighted("C", "c", 0.5, 0.8, 100.0),
        ];
        assert!(find(&decompose("Q?", &recent), "Coverage momentum").is_some());

        let stale = vec![
            weighted("A", "a", 0.5, 0.8, 100.0),
            weighted("B", "b", 0.5, 0.8, 200.0),
            weighted("C", "c", 0.5, 0.8, 1.0),
        ];
        assert!(find(&decompose("Q?", &stale), "Coverage momentum").is_none());
    }

    #[test]
    fn test_theme_factors_exclude_question_terms() {
        let articles = vec![
            weighted("A", "Senate budget optimism grows", 0.6, 0.8, 1.0),
            weighted("B", "Senate budget deal close", 0.5, 0.8, 1.0),
        ];
        let factors = decompose("Will the Senate pass a bill?", &articles);
        assert!(find(&factors, "Theme: budget").is_some());
        assert!(find(&factors, "Theme: senate").is_none());
    }

    #[test]
    fn test_decompose_is_deterministic() {
        let articles = vec![
            weighted("Reuters", "Deal approved by regulators", 0.4, 0.95, 3.0),
            weighted("Blog", "Deal approved, critics fear delays", -0.2, 0.3, 1.0),
            weighted("Bloomberg", "Regulators approved merger", 0.3, 0.92, 10.0),
        ];
        let first = decompose("Will the merger close?", &articles);
        let second = decompose("Will the merger close?", &articles);
        assert_eq!(first, second);
        assert!(first.iter().all(|f| !f.description.is_empty()));
    }
}
