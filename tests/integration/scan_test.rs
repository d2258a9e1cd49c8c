//! Scan orchestration across several platforms

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use poly_alpha::config::{Config, ScanConfig};
use poly_alpha::market::{MarketQuery, MarketQuote, MarketSource};
use poly_alpha::news::{Article, ArticleSource};
use poly_alpha::scan::ScanOrchestrator;
use poly_alpha::signal::OpportunityStatus;
use poly_alpha::storage::{InMemoryStore, OpportunityStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
}

struct Platform {
    name: &'static str,
    delay: Option<std::time::Duration>,
    price: Decimal,
}

#[async_trait]
impl MarketSource for Platform {
    fn platform(&self) -> &str {
        self.name
    }

    async fn fetch_quotes(&self, _query: &MarketQuery) -> anyhow::Result<Vec<MarketQuote>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(vec![MarketQuote::new(
            self.name,
            "fed-cut",
            "Will the Fed announce a rate cut in December?",
            self.price,
        )])
    }
}

struct Wire;

#[async_trait]
impl ArticleSource for Wire {
    fn name(&self) -> &str {
        "wire"
    }

    async fn fetch_articles(&self, _query: &str, limit: usize) -> anyhow::Result<Vec<Article>> {
        let articles = (0..5)
            .map(|i| {
                Article::new(
                    "Reuters",
                    format!("Fed officials signal support for rate cut, remarks {}", i),
                    Utc::now() - Duration::hours(8 + i),
                )
                .with_polarity(0.5)
            })
            .take(limit)
            .collect();
        Ok(articles)
    }
}

fn fast_timeout_config() -> Config {
    Config {
        scan: ScanConfig {
            fetch_timeout_secs: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_one_platform_timing_out_leaves_the_others() {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = ScanOrchestrator::new(&fast_timeout_config(), store.clone())
        .with_article_source(Arc::new(Wire))
        .with_market_source(Arc::new(Platform {
            name: "polymarket",
            delay: None,
            price: dec!(0.30),
        }))
        .with_market_source(Arc::new(Platform {
            name: "kalshi",
            delay: None,
            price: dec!(0.35),
        }))
        .with_market_source(Arc::new(Platform {
            name: "manifold",
            delay: Some(std::time::Duration::from_secs(5)),
            price: dec!(0.40),
        }));

    let report = orchestrator.scan_sources(&MarketQuery::default(), dec!(0)).await;

    assert_eq!(report.markets_scanned, 2);
    assert_eq!(report.opportunities_created, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].platform, "manifold");
    assert!(report.errors[0].error.starts_with("Timed out"));
    assert_eq!(report.platforms, vec!["kalshi", "manifold", "polymarket"]);

    let keys: Vec<String> = report.opportunities.iter().map(|o| o.market_key.clone()).collect();
    assert_eq!(keys, vec!["kalshi:fed-cut", "polymarket:fed-cut"]);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_rescanning_updates_in_place() {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator =
        ScanOrchestrator::new(&Config::default(), store.clone()).with_article_source(Arc::new(Wire));
    let market = MarketQuote::new("polymarket", "m1", "Will the Fed announce a rate cut?", dec!(0.20));

    let first = orchestrator.scan(vec![market.clone()], dec!(0)).await;
    let second = orchestrator.scan(vec![market], dec!(0)).await;

    assert_eq!(first.opportunities_created, 1);
    assert_eq!(second.opportunities_created, 0);
    assert_eq!(second.opportunities_updated, 1);
    assert_eq!(store.len().await, 1);
    assert_eq!(first.opportunities[0].id, second.opportunities[0].id);
}

#[tokio::test]
async fn test_closed_opportunity_is_replaced_not_mutated() {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator =
        ScanOrchestrator::new(&Config::default(), store.clone()).with_article_source(Arc::new(Wire));
    let market = MarketQuote::new("polymarket", "m1", "Will the Fed announce a rate cut?", dec!(0.20));

    let first = orchestrator.scan(vec![market.clone()], dec!(0)).await;
    let closed = store.close("polymarket:m1").await.unwrap();
    assert_eq!(closed.status, OpportunityStatus::Closed);

    let second = orchestrator.scan(vec![market], dec!(0)).await;
    assert_eq!(second.opportunities_created, 1);
    assert_ne!(first.opportunities[0].id, second.opportunities[0].id);

    let all = store.all().await;
    assert_eq!(all.len(), 2);
    assert_eq!(
        all.iter().filter(|o| o.status == OpportunityStatus::Closed).count(),
        1
    );
}

#[tokio::test]
async fn test_scan_without_article_sources_falls_back_to_base_rate() {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = ScanOrchestrator::new(&Config::default(), store);
    let market = MarketQuote::new("polymarket", "m1", "Will the ethics board meet?", dec!(0.35));

    let report = orchestrator.scan_at(vec![market], dec!(0), as_of()).await;
    assert_eq!(report.markets_scanned, 1);
    assert!(report.errors.is_empty());
    let opportunity = &report.opportunities[0];
    assert_eq!(opportunity.estimated_probability, dec!(0.35));
    assert_eq!(opportunity.edge, Decimal::ZERO);
}
