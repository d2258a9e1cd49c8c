//! Per-question article cache
//!
//! Holds the last usable article set for each question so a later scan whose
//! fetch comes back empty still has a prior to work from.

use crate::news::Article;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CachedArticles {
    articles: Vec<Article>,
    stored_at: DateTime<Utc>,
}

/// TTL-bounded article cache keyed by normalized question text
#[derive(Debug)]
pub struct ArticleCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedArticles>>,
}

fn cache_key(question: &str) -> String {
    question.trim().to_lowercase()
}

impl ArticleCache {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(36_500)),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached articles for a question, if stored within the TTL of `as_of`
    pub async fn get(&self, question: &str, as_of: DateTime<Utc>) -> Option<Vec<Article>> {
        let entries = self.entries.read().await;
        entries
            .get(&cache_key(question))
            .filter(|entry| as_of - entry.stored_at <= self.ttl)
            .map(|entry| entry.articles.clone())
    }

    /// Replace the cached set; empty sets are ignored
    pub async fn put(&self, question: &str, articles: &[Article], as_of: DateTime<Utc>) {
        if articles.is_empty() {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.insert(
            cache_key(question),
            CachedArticles {
                articles: articles.to_vec(),
                stored_at: as_of,
            },
        );
    }

    /// Drop entries older than the TTL
    pub async fn evict_expired(&self, as_of: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| as_of - entry.stored_at <= self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    fn articles() -> Vec<Article> {
        vec![Article::new("Reuters", "Senate schedules vote", as_of())]
    }

    #[tokio::test]
    async fn test_put_and_get_within_ttl() {
        let cache = ArticleCache::new(std::time::Duration::from_secs(3600));
        cache.put("Will the Senate vote?", &articles(), as_of()).await;

        let hit = cache
            .get("  will the senate VOTE? ", as_of() + Duration::minutes(30))
            .await;
        assert_eq!(hit, Some(articles()));
    }

    #[tokio::test]
    async fn test_expired_entries_are_ignored_and_evicted() {
        let cache = ArticleCache::new(std::time::Duration::from_secs(3600));
        cache.put("q", &articles(), as_of()).await;

        let later = as_of() + Duration::hours(2);
        assert!(cache.get("q", later).await.is_none());
        assert_eq!(cache.evict_expired(later).await, 1);
        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_empty_sets_do_not_overwrite() {
        let cache = ArticleCache::new(std::time::Duration::from_secs(3600));
        tokio_test::block_on(async {
            cache.put("q", &articles(), as_of()).await;
            cache.put("q", &[], as_of()).await;
            assert_eq!(cache.get("q", as_of()).await.map(|a| a.len()), Some(1));
        });
    }
}
