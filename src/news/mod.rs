//! News article module
//!
//! Raw articles delivered by news collaborators and the JSON news-search
//! adapter used by the CLI.

mod client;

pub use client::{NewsSearchClient, MAX_PAGE_SIZE};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article as fetched, before weighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Publisher name (e.g. "Reuters")
    pub source: String,
    pub headline: String,
    #[serde(default)]
    pub body: String,
    pub published_at: DateTime<Utc>,
    /// Optional sentiment pre-score supplied by the collaborator (-1..1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Article {
    pub fn new(
        source: impl Into<String>,
        headline: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source: source.into(),
            headline: headline.into(),
            body: String::new(),
            published_at,
            polarity: None,
            url: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_polarity(mut self, polarity: f64) -> Self {
        self.polarity = Some(polarity);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Headline and body joined for text analysis
    pub fn text(&self) -> String {
        if self.body.is_empty() {
            self.headline.clone()
        } else {
            format!("{} {}", self.headline, self.body)
        }
    }
}

/// Trait for news collaborators
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Source name reported in scan errors
    fn name(&self) -> &str;
    /// Free-text search capped at `limit` results
    async fn fetch_articles(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Article>>;
}

/// Turn a market question into a search query
///
/// Strips leading auxiliaries ("Will", "Does", ...) and trailing punctuation.
pub fn search_query(question: &str) -> String {
    const LEADING: [&str; 6] = ["will ", "does ", "is ", "are ", "can ", "did "];

    let trimmed = question.trim().trim_end_matches(['?', '.', '!']);
    let lower = trimmed.to_lowercase();
    let stripped = LEADING
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .and_then(|prefix| trimmed.get(prefix.len()..))
        .unwrap_or(trimmed);

    stripped.trim().to_string()
}
