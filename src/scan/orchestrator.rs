//! Scan orchestrator
//!
//! Coordinates one scan:
//! 1. Fetching quotes from every market source in parallel (optional)
//! 2. Running each market through the analysis pipeline under a bounded pool
//! 3. Scoring the prediction against the market price
//! 4. Creating or refreshing opportunity records

use super::{AnalysisPipeline, ArticleCache, PlatformError, ScanReport};
use crate::config::{Config, ScanConfig};
use crate::error::{EngineError, Result};
use crate::market::{MarketQuery, MarketQuote, MarketSource};
use crate::model::PredictionResult;
use crate::news::{search_query, Article, ArticleSource};
use crate::signal::{EdgeScorer, Opportunity};
use crate::storage::{OpportunityStore, UpsertOutcome};
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Articles gathered for one question
#[derive(Debug, Default)]
struct Gathered {
    articles: Vec<Article>,
    errors: Vec<PlatformError>,
    /// A fetch was cut short by the scan deadline
    deadline_hit: bool,
}

/// What happened to one market
#[derive(Debug, Default)]
struct MarketOutcome {
    platform: String,
    scanned: bool,
    skipped: bool,
    persisted: Option<(UpsertOutcome, Opportunity)>,
    errors: Vec<PlatformError>,
    deadline_hit: bool,
}

/// Runs scans across market and article sources
pub struct ScanOrchestrator {
    pipeline: Arc<AnalysisPipeline>,
    scorer: EdgeScorer,
    store: Arc<dyn OpportunityStore>,
    market_sources: Vec<Arc<dyn MarketSource>>,
    article_sources: Vec<Arc<dyn ArticleSource>>,
    cache: ArticleCache,
    config: ScanConfig,
}

impl ScanOrchestrator {
    pub fn new(config: &Config, store: Arc<dyn OpportunityStore>) -> Self {
        Self {
            pipeline: Arc::new(AnalysisPipeline::from_config(config)),
            scorer: EdgeScorer::new(config.scoring.clone()),
            store,
            market_sources: Vec::new(),
            article_sources: Vec::new(),
            cache: ArticleCache::new(Duration::from_secs(config.scan.cache_ttl_secs)),
            config: config.scan.clone(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: AnalysisPipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    pub fn with_market_source(mut self, source: Arc<dyn MarketSource>) -> Self {
        self.market_sources.push(source);
        self
    }

    pub fn with_article_source(mut self, source: Arc<dyn ArticleSource>) -> Self {
        self.article_sources.push(source);
        self
    }

    pub fn store(&self) -> &Arc<dyn OpportunityStore> {
        &self.store
    }

    pub fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    pub fn scorer(&self) -> &EdgeScorer {
        &self.scorer
    }

    /// Time a single fetch may take: the fetch timeout, cut to the deadline
    fn fetch_budget(&self, deadline: Instant) -> (Duration, bool) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let timeout = self.config.fetch_timeout();
        if remaining < timeout {
            (remaining, true)
        } else {
            (timeout, false)
        }
    }

    /// Fetch quotes from every market source, then scan them
    pub async fn scan_sources(&self, query: &MarketQuery, min_edge: Decimal) -> ScanReport {
        let started = Instant::now();
        let deadline = started + self.config.deadline();

        let fetches = self.market_sources.iter().map(|source| {
            let (budget, _) = self.fetch_budget(deadline);
            async move {
                let platform = source.platform().to_string();
                let fetch_started = Instant::now();
                let result = tokio::time::timeout(budget, source.fetch_quotes(query)).await;
                telemetry::record_latency(LatencyMetric::SourceFetch, fetch_started.elapsed());
                let result = match result {
                    Ok(Ok(quotes)) => Ok(quotes),
                    Ok(Err(e)) => Err(EngineError::source_unavailable(&platform, format!("{:#}", e))),
                    Err(_) => Err(EngineError::timeout(
                        format!("fetch quotes from {}", platform),
                        budget,
                    )),
                };
                (platform, result)
            }
        });

        let mut quotes = Vec::new();
        let mut errors = Vec::new();
        let mut platforms = BTreeSet::new();
        for (platform, result) in join_all(fetches).await {
            match result {
                Ok(fetched) => {
                    tracing::debug!(platform = %platform, count = fetched.len(), "Fetched quotes");
                    quotes.extend(fetched);
                }
                Err(e) => {
                    tracing::warn!(platform = %platform, error = %e, "Market source failed");
                    telemetry::record_source_error(&platform);
                    errors.push(PlatformError::new(&platform, &e));
                }
            }
            platforms.insert(platform);
        }

        let mut report = self.run(quotes, min_edge, started, deadline, Utc::now()).await;
        report.errors.extend(errors);
        report.errors.sort();
        report.errors.dedup();
        platforms.extend(report.platforms.drain(..));
        report.platforms = platforms.into_iter().collect();
        report
    }

    /// Scan the given markets
    pub async fn scan(&self, markets: Vec<MarketQuote>, min_edge: Decimal) -> ScanReport {
        self.scan_at(markets, min_edge, Utc::now()).await
    }

    /// Scan with an explicit analysis time
    pub async fn scan_at(
        &self,
        markets: Vec<MarketQuote>,
        min_edge: Decimal,
        as_of: DateTime<Utc>,
    ) -> ScanReport {
        let started = Instant::now();
        let deadline = started + self.config.deadline();
        self.run(markets, min_edge, started, deadline, as_of).await
    }

    async fn run(
        &self,
        markets: Vec<MarketQuote>,
        min_edge: Decimal,
        started: Instant,
        deadline: Instant,
        as_of: DateTime<Utc>,
    ) -> ScanReport {
        let min_edge = min_edge.abs();
        let total = markets.len();

        let evicted = self.cache.evict_expired(as_of).await;
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired article cache entries");
        }

        let outcomes: Vec<MarketOutcome> = stream::iter(markets)
            .map(|quote| self.process_market(quote, min_edge, deadline, as_of))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut report = ScanReport::default();
        let mut platforms = BTreeSet::new();
        for outcome in outcomes {
            platforms.insert(outcome.platform);
            if outcome.skipped {
                report.markets_skipped += 1;
                continue;
            }
            if outcome.scanned {
                report.markets_scanned += 1;
            }
            report.partial |= outcome.deadline_hit;
            report.errors.extend(outcome.errors);
            match outcome.persisted {
                Some((UpsertOutcome::Created, opportunity)) => {
                    report.opportunities_created += 1;
                    report.opportunities.push(opportunity);
                }
                Some((UpsertOutcome::Updated, opportunity)) => {
                    report.opportunities_updated += 1;
                    report.opportunities.push(opportunity);
                }
                None => {}
            }
        }

        report.partial |= report.markets_skipped > 0;
        report.platforms = platforms.into_iter().collect();
        report.errors.sort();
        report.errors.dedup();
        report.opportunities.sort_by(|a, b| a.market_key.cmp(&b.market_key));
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        telemetry::increment(CounterMetric::MarketsScanned, report.markets_scanned as u64);
        telemetry::increment(CounterMetric::OpportunitiesCreated, report.opportunities_created as u64);
        telemetry::increment(CounterMetric::OpportunitiesUpdated, report.opportunities_updated as u64);
        telemetry::record_latency(LatencyMetric::Scan, started.elapsed());
        if let Some(edge) = report.max_edge() {
            telemetry::set_gauge(GaugeMetric::LastScanMaxEdge, f64::try_from(edge).unwrap_or(0.0));
        }
        if let Ok(active) = self.store.list_active().await {
            telemetry::set_gauge(GaugeMetric::ActiveOpportunities, active.len() as f64);
        }
        if report.partial {
            telemetry::increment(CounterMetric::PartialScans, 1);
            tracing::warn!(
                skipped = report.markets_skipped,
                total,
                "Scan deadline reached, returning partial results"
            );
        }

        tracing::info!(
            markets = report.markets_scanned,
            created = report.opportunities_created,
            updated = report.opportunities_updated,
            errors = report.errors.len(),
            partial = report.partial,
            elapsed_ms = report.elapsed_ms,
            "Scan complete"
        );
        report
    }

    async fn process_market(
        &self,
        quote: MarketQuote,
        min_edge: Decimal,
        deadline: Instant,
        as_of: DateTime<Utc>,
    ) -> MarketOutcome {
        let mut outcome = MarketOutcome {
            platform: quote.platform.clone(),
            ..Default::default()
        };

        if Instant::now() >= deadline {
            tracing::debug!(market = %quote.key(), "Deadline passed before market started");
            outcome.skipped = true;
            return outcome;
        }

        let started = Instant::now();
        let gathered = self.gather_articles(&quote.question, deadline).await;
        outcome.errors = gathered.errors;
        outcome.deadline_hit = gathered.deadline_hit;

        let prediction = match self
            .analyze_with_cache(&quote.question, Some(&quote), &gathered.articles, as_of)
            .await
        {
            Ok(prediction) => prediction,
            Err(e) => {
                tracing::warn!(market = %quote.key(), error = %e, "Market rejected");
                telemetry::increment(CounterMetric::MarketsRejected, 1);
                outcome.errors.push(PlatformError::new(&quote.platform, format!("{}: {}", quote.key(), e)));
                return outcome;
            }
        };
        outcome.scanned = true;
        if prediction.article_count == 0 {
            telemetry::increment(CounterMetric::BaseRateFallbacks, 1);
        }

        let opportunity = self.scorer.score(&prediction, &quote, as_of);
        let persisted = if opportunity.edge.abs() >= min_edge {
            self.store.upsert(opportunity).await.map(Some)
        } else {
            self.store
                .refresh(opportunity)
                .await
                .map(|refreshed| refreshed.map(|o| (UpsertOutcome::Updated, o)))
        };
        match persisted {
            Ok(persisted) => outcome.persisted = persisted,
            Err(e) => {
                tracing::warn!(market = %quote.key(), error = %e, "Failed to persist opportunity");
                outcome.errors.push(PlatformError::new("store", e));
            }
        }

        telemetry::record_latency(LatencyMetric::Pipeline, started.elapsed());
        outcome
    }

    /// Fetch articles for a question from every source in parallel
    async fn gather_articles(&self, question: &str, deadline: Instant) -> Gathered {
        let query = search_query(question);
        let limit = self.config.article_limit;

        let fetches = self.article_sources.iter().map(|source| {
            let (budget, cut) = self.fetch_budget(deadline);
            let query = query.as_str();
            async move {
                let name = source.name().to_string();
                let fetch_started = Instant::now();
                let result = tokio::time::timeout(budget, source.fetch_articles(query, limit)).await;
                telemetry::record_latency(LatencyMetric::SourceFetch, fetch_started.elapsed());
                match result {
                    Ok(Ok(articles)) => (name, Ok(articles), false),
                    Ok(Err(e)) => {
                        let err = EngineError::source_unavailable(&name, format!("{:#}", e));
                        (name, Err(err), false)
                    }
                    Err(_) => {
                        let err = EngineError::timeout(format!("fetch articles from {}", name), budget);
                        (name, Err(err), cut)
                    }
                }
            }
        });

        let mut gathered = Gathered::default();
        for (name, result, cut) in join_all(fetches).await {
            match result {
                Ok(mut articles) => {
                    articles.truncate(limit);
                    gathered.articles.extend(articles);
                }
                Err(e) => {
                    let after = match &e {
                        EngineError::Timeout { after, .. } => Some(*after),
                        _ => None,
                    };
                    tracing::warn!(source = %name, error = %e, after = ?after, "Article source failed");
                    telemetry::record_source_error(&name);
                    gathered.errors.push(PlatformError::new(&name, &e));
                    gathered.deadline_hit |= cut;
                }
            }
        }
        gathered
    }

    /// Run the pipeline with the cached prior, then refresh the cache
    async fn analyze_with_cache(
        &self,
        question: &str,
        quote: Option<&MarketQuote>,
        articles: &[Article],
        as_of: DateTime<Utc>,
    ) -> Result<PredictionResult> {
        let cached = if articles.is_empty() {
            self.cache.get(question, as_of).await
        } else {
            None
        };
        let prediction = self
            .pipeline
            .analyze(question, quote, articles, cached.as_deref(), as_of)?;
        if !articles.is_empty() && prediction.article_count > 0 {
            self.cache.put(question, articles, as_of).await;
        }
        Ok(prediction)
    }

    /// Ad-hoc single-question estimate; nothing is persisted
    pub async fn predict(&self, question: &str) -> Result<PredictionResult> {
        self.predict_at(question, Utc::now()).await
    }

    pub async fn predict_at(&self, question: &str, as_of: DateTime<Utc>) -> Result<PredictionResult> {
        self.predict_with(question, None, as_of).await
    }

    /// Estimate one question, optionally against a known market quote
    pub async fn predict_with(
        &self,
        question: &str,
        quote: Option<&MarketQuote>,
        as_of: DateTime<Utc>,
    ) -> Result<PredictionResult> {
        if question.trim().is_empty() {
            return Err(EngineError::InvalidInput("question is empty".to_string()));
        }
        let deadline = Instant::now() + self.config.deadline();
        let gathered = self.gather_articles(question, deadline).await;
        self.analyze_with_cache(question, quote, &gathered.articles, as_of)
            .await
    }
}
