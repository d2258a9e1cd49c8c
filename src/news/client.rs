//! News search client
//!
//! Speaks the common `everything`-style JSON search API: a free-text `q`
//! parameter, a `pageSize` cap, and an `articles` array in the response.

use super::{Article, ArticleSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Largest page a single search may request
pub const MAX_PAGE_SIZE: usize = 50;

/// HTTP news search collaborator
pub struct NewsSearchClient {
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl NewsSearchClient {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl ArticleSource for NewsSearchClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_articles(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Article>> {
        let page_size = limit.clamp(1, MAX_PAGE_SIZE).to_string();

        tracing::debug!(source = %self.name, query = %query, page_size = %page_size, "Searching news");

        let mut request = self.client.get(&self.base_url).query(&[
            ("q", query),
            ("pageSize", page_size.as_str()),
            ("sortBy", "publishedAt"),
            ("language", "en"),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("News API error ({}): {} - {}", self.name, status, body);
        }

        let search: SearchResponse = response.json().await?;
        Ok(convert_articles(search, limit))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

/// Articles without a title or a parseable publish time are dropped
fn convert_articles(search: SearchResponse, limit: usize) -> Vec<Article> {
    search
        .articles
        .into_iter()
        .filter_map(|raw| {
            let headline = raw.title.filter(|t| !t.trim().is_empty())?;
            let published_at = raw
                .published_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
                .with_timezone(&Utc);
            let source = raw
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "unknown".to_string());

            Some(Article {
                source,
                headline,
                body: raw.description.unwrap_or_default(),
                published_at,
                polarity: None,
                url: raw.url,
            })
        })
        .take(limit.min(MAX_PAGE_SIZE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": "reuters", "name": "Reuters"},
                "title": "Fed signals December cut",
                "description": "Officials point to cooling inflation.",
                "url": "https://www.reuters.com/markets/fed",
                "publishedAt": "2026-10-14T12:00:00Z"
            },
            {
                "source": {"id": null, "name": "Blog"},
                "title": "",
                "publishedAt": "2026-10-14T12:00:00Z"
            },
            {
                "source": null,
                "title": "Markets await CPI",
                "publishedAt": "not-a-date"
            }
        ]
    }"#;

    #[test]
    fn test_convert_articles() {
        let search: SearchResponse = serde_json::from_str(RESPONSE).unwrap();
        let articles = convert_articles(search, 50);

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].headline, "Fed signals December cut");
        assert_eq!(articles[0].body, "Officials point to cooling inflation.");
        assert_eq!(articles[0].url.as_deref(), Some("https://www.reuters.com/markets/fed"));
    }

    #[test]
    fn test_convert_articles_respects_limit() {
        let search: SearchResponse = serde_json::from_str(
            r#"{"articles": [
                {"source": {"name": "A"}, "title": "one", "publishedAt": "2026-10-14T12:00:00Z"},
                {"source": {"name": "B"}, "title": "two", "publishedAt": "2026-10-14T13:00:00Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(convert_articles(search, 1).len(), 1);
    }

    #[test]
    fn test_client_name() {
        let client = NewsSearchClient::new(
            "newsapi",
            "https://newsapi.org/v2/everything",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.name(), "newsapi");
    }
}
