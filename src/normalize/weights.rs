//! Credibility and recency weighting tables

use crate::config::NormalizerConfig;
use std::collections::HashMap;

/// Source reputation lookup
#[derive(Debug, Clone)]
pub struct ReputationTable {
    entries: HashMap<String, f64>,
    default_weight: f64,
}

impl ReputationTable {
    pub fn new(entries: HashMap<String, f64>, default_weight: f64) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, weight)| (name.trim().to_lowercase(), weight.clamp(0.0, 1.0)))
            .collect();
        Self {
            entries,
            default_weight: default_weight.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &NormalizerConfig) -> Self {
        Self::new(config.reputation.clone(), config.default_credibility)
    }

    /// Credibility for a source name, falling back to the URL host
    pub fn credibility(&self, source: &str, url: Option<&str>) -> f64 {
        let name = source.trim().to_lowercase();
        if let Some(weight) = self.entries.get(&name) {
            return *weight;
        }

        url.and_then(host_of)
            .and_then(|host| self.lookup_host(&host))
            .unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    /// Match the host or any parent domain ("www.reuters.com" -> "reuters.com")
    fn lookup_host(&self, host: &str) -> Option<f64> {
        let mut candidate = host;
        loop {
            if let Some(weight) = self.entries.get(candidate) {
                return Some(*weight);
            }
            match candidate.split_once('.') {
                Some((_, rest)) if rest.contains('.') => candidate = rest,
                _ => return None,
            }
        }
    }
}

/// Extract the lowercase host from an absolute URL
fn host_of(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()?
        .rsplit('@')
        .next()?
        .split(':')
        .next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// Exponential recency decay with a floor
#[derive(Debug, Clone, Copy)]
pub struct RecencyDecay {
    half_life_hours: f64,
    floor: f64,
}

impl RecencyDecay {
    pub fn new(half_life_hours: f64, floor: f64) -> Self {
        Self {
            half_life_hours: half_life_hours.max(f64::EPSILON),
            floor: floor.clamp(f64::EPSILON, 1.0),
        }
    }

    pub fn from_config(config: &NormalizerConfig) -> Self {
        Self::new(config.half_life_hours, config.recency_floor)
    }

    /// Weight in [floor, 1] for an article `age_hours` old
    pub fn weight(&self, age_hours: f64) -> f64 {
        let age = age_hours.max(0.0);
        0.5_f64.powf(age / self.half_life_hours).max(self.floor)
    }
}
