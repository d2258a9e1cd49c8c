//! Rule-based polarity lexicon for news text

use std::collections::HashMap;

/// VADER-style normalization constant
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Tokens looked back for negations and intensifiers
const LOOKBACK: usize = 3;

/// Word-polarity lexicon with negation and intensifier handling
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon {
    pub fn new() -> Self {
        let positive = [
            ("approve", 0.6),
            ("approval", 0.5),
            ("pass", 0.5),
            ("win", 0.7),
            ("victory", 0.7),
            ("lead", 0.5),
            ("ahead", 0.4),
            ("confirm", 0.5),
            ("surge", 0.7),
            ("rally", 0.6),
            ("soar", 0.8),
            ("gain", 0.5),
            ("rise", 0.4),
            ("growth", 0.5),
            ("strong", 0.5),
            ("beat", 0.6),
            ("exceed", 0.6),
            ("record", 0.4),
            ("bullish", 0.8),
            ("optimistic", 0.6),
            ("likely", 0.4),
            ("expected", 0.3),
            ("agreement", 0.5),
            ("deal", 0.4),
            ("success", 0.7),
            ("breakthrough", 0.7),
            ("support", 0.4),
            ("recovery", 0.5),
            ("boost", 0.5),
            ("secure", 0.5),
        ];
        let negative = [
            ("reject", -0.6),
            ("deny", -0.5),
            ("fail", -0.7),
            ("lose", -0.7),
            ("loss", -0.6),
            ("defeat", -0.7),
            ("trail", -0.5),
            ("behind", -0.4),
            ("delay", -0.5),
            ("cancel", -0.6),
            ("collapse", -0.8),
            ("crash", -0.9),
            ("plunge", -0.8),
            ("drop", -0.5),
            ("fall", -0.5),
            ("decline", -0.5),
            ("weak", -0.5),
            ("miss", -0.5),
            ("bearish", -0.8),
            ("pessimistic", -0.6),
            ("unlikely", -0.5),
            ("doubt", -0.5),
            ("concern", -0.4),
            ("fear", -0.5),
            ("risk", -0.3),
            ("uncertainty", -0.4),
            ("scandal", -0.7),
            ("crisis", -0.8),
            ("lawsuit", -0.5),
            ("investigation", -0.4),
            ("block", -0.5),
            ("veto", -0.6),
            ("stall", -0.5),
        ];

        let negations = vec![
            "not", "no", "never", "neither", "nor", "cannot", "can't", "cant", "won't", "wont",
            "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "isn't", "isnt", "aren't",
            "arent", "wasn't", "wasnt", "hardly", "barely", "without",
        ];

        let intensifiers = [
            ("very", 1.5),
            ("extremely", 2.0),
            ("highly", 1.5),
            ("significantly", 1.5),
            ("sharply", 1.6),
            ("overwhelmingly", 1.8),
            ("slightly", 0.5),
            ("somewhat", 0.7),
            ("marginally", 0.5),
        ];

        Self {
            words: positive.into_iter().chain(negative).collect(),
            negations,
            intensifiers: intensifiers.into_iter().collect(),
        }
    }

    /// Polarity of a single token, trying common inflections
    fn polarity(&self, token: &str) -> Option<f64> {
        if let Some(score) = self.words.get(token) {
            return Some(*score);
        }
        const SUFFIXES: [&str; 6] = ["ing", "ed", "es", "s", "d", "ning"];
        SUFFIXES.iter().find_map(|suffix| {
            token
                .strip_suffix(suffix)
                .filter(|stem| stem.len() >= 3)
                .and_then(|stem| self.words.get(stem).copied())
        })
    }

    /// Score text in (-1, 1); zero when no lexicon word appears
    pub fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut total = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(mut score) = self.polarity(token) else {
                continue;
            };

            let window = &tokens[i.saturating_sub(LOOKBACK)..i];
            if let Some(multiplier) = window.last().and_then(|prev| self.intensifiers.get(*prev)) {
                score *= multiplier;
            }
            let negated = window
                .iter()
                .any(|prev| self.negations.iter().any(|n| n == prev));
            if negated {
                score = -score * 0.75;
            }
            total += score;
        }

        if total == 0.0 {
            0.0
        } else {
            total / (total * total + NORMALIZATION_ALPHA).sqrt()
        }
    }
}
