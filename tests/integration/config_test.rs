//! Configuration loading tests

use poly_alpha::config::{Config, LogFormat};
use rust_decimal_macros::dec;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    let defaults = Config::default();

    assert_eq!(config.normalizer.reputation, defaults.normalizer.reputation);
    assert_eq!(config.estimator.base_rates, defaults.estimator.base_rates);
    assert_eq!(config.estimator.category_keywords, defaults.estimator.category_keywords);
    assert_eq!(config.scoring.buy_edge, dec!(0.03));
    assert_eq!(config.scan.default_min_edge, dec!(0.05));
    assert!(config.sources.news.is_empty());
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert_eq!(config.telemetry.metrics_port, None);
}

#[test]
fn test_empty_file_equals_defaults() {
    let config: Config = toml::from_str("").unwrap();
    let defaults = Config::default();
    assert_eq!(config.scan.max_concurrency, defaults.scan.max_concurrency);
    assert_eq!(config.estimator.epsilon, defaults.estimator.epsilon);
    assert_eq!(config.scoring.strong_edge, defaults.scoring.strong_edge);
}

#[test]
fn test_effective_config_round_trips_through_toml() {
    let rendered = toml::to_string_pretty(&Config::default()).unwrap();
    let parsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed.scoring.kelly_multiplier, dec!(0.25));
    assert_eq!(parsed.normalizer.reputation.len(), Config::default().normalizer.reputation.len());
}
