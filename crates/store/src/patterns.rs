use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use datalens_core::constants::{PHRASING_LOG_CAP, SIMILARITY_THRESHOLD, SQL_PATTERN_LOG_CAP};
use datalens_core::Source;
use serde::Serialize;
use tokio::sync::Mutex;

/// One accepted phrasing→SQL pair.
#[derive(Debug, Clone, Serialize)]
pub struct PatternRecord {
    pub phrasing: String,
    pub sql: String,
    pub source: Source,
    pub learned_at: DateTime<Utc>,
}

/// Counts for the stats endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PatternStats {
    pub financial_phrasings: usize,
    pub devices_phrasings: usize,
    pub accepted_queries: usize,
}

#[derive(Default)]
struct PatternLog {
    phrasings: HashMap<Source, VecDeque<String>>,
    accepted: VecDeque<PatternRecord>,
}

/// Rolling log of accepted phrasings and compiled SQL, kept for
/// similarity-based suggestions. Purely passive: nothing here alters
/// routing decisions.
#[derive(Default)]
pub struct PatternLearner {
    inner: Mutex<PatternLog>,
}

impl PatternLearner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answered phrasing, and the SQL that answered it when the
    /// SQL path ran. Both logs are FIFO ring buffers, not deduplicated.
    pub async fn learn(&self, message: &str, source: Source, sql: Option<&str>) {
        let phrasing = message.to_lowercase();
        let mut log = self.inner.lock().await;

        let ring = log.phrasings.entry(source).or_default();
        ring.push_back(phrasing.clone());
        while ring.len() > PHRASING_LOG_CAP {
            ring.pop_front();
        }

        if let Some(sql) = sql.filter(|s| !s.is_empty()) {
            log.accepted.push_back(PatternRecord {
                phrasing,
                sql: sql.to_owned(),
                source,
                learned_at: Utc::now(),
            });
            while log.accepted.len() > SQL_PATTERN_LOG_CAP {
                log.accepted.pop_front();
            }
        }
    }

    /// Logged phrasings for `source` most similar to `message`: Jaccard
    /// similarity over token sets, above a fixed threshold, best first.
    /// A nearest-neighbor suggestion feature, never consulted for cache
    /// lookups.
    pub async fn similar(&self, message: &str, source: Source, limit: usize) -> Vec<String> {
        let query: HashSet<String> =
            message.to_lowercase().split_whitespace().map(str::to_owned).collect();
        if query.is_empty() {
            return Vec::new();
        }

        let log = self.inner.lock().await;
        let Some(ring) = log.phrasings.get(&source) else {
            return Vec::new();
        };

        let mut scored: Vec<(f64, &String)> = ring
            .iter()
            .filter_map(|phrasing| {
                let tokens: HashSet<&str> = phrasing.split_whitespace().collect();
                let intersection =
                    query.iter().filter(|t| tokens.contains(t.as_str())).count();
                let union = query.len() + tokens.len() - intersection;
                if union == 0 {
                    return None;
                }
                #[expect(clippy::cast_precision_loss, reason = "token counts are tiny")]
                let similarity = intersection as f64 / union as f64;
                (similarity > SIMILARITY_THRESHOLD).then_some((similarity, phrasing))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(limit).map(|(_, p)| p.clone()).collect()
    }

    pub async fn stats(&self) -> PatternStats {
        let log = self.inner.lock().await;
        PatternStats {
            financial_phrasings:
                log.phrasings.get(&Source::Financial).map_or(0, VecDeque::len),
            devices_phrasings: log.phrasings.get(&Source::Devices).map_or(0, VecDeque::len),
            accepted_queries: log.accepted.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn learn_fills_both_logs() {
        let learner = PatternLearner::new();
        learner.learn("how many orders", Source::Financial, Some("SELECT 1;")).await;
        learner.learn("what is this", Source::Financial, None).await;

        let stats = learner.stats().await;
        assert_eq!(stats.financial_phrasings, 2);
        assert_eq!(stats.accepted_queries, 1);
        assert_eq!(stats.devices_phrasings, 0);
    }

    #[tokio::test]
    async fn phrasing_ring_is_fifo_bounded() {
        let learner = PatternLearner::new();
        for i in 0..(PHRASING_LOG_CAP + 5) {
            learner.learn(&format!("query number {i}"), Source::Devices, None).await;
        }
        let stats = learner.stats().await;
        assert_eq!(stats.devices_phrasings, PHRASING_LOG_CAP);

        let log = learner.inner.lock().await;
        let ring = log.phrasings.get(&Source::Devices).unwrap();
        assert_eq!(ring.front().unwrap(), "query number 5");
    }

    #[tokio::test]
    async fn accepted_ring_is_bounded() {
        let learner = PatternLearner::new();
        for i in 0..(SQL_PATTERN_LOG_CAP + 3) {
            learner
                .learn(&format!("q{i}"), Source::Financial, Some("SELECT COUNT(*) FROM t;"))
                .await;
        }
        assert_eq!(learner.stats().await.accepted_queries, SQL_PATTERN_LOG_CAP);
    }

    #[tokio::test]
    async fn similar_ranks_by_jaccard_overlap() {
        let learner = PatternLearner::new();
        learner.learn("how many orders today", Source::Financial, None).await;
        learner.learn("revenue by customer", Source::Financial, None).await;
        learner.learn("how many orders this week", Source::Financial, None).await;

        let similar = learner.similar("how many orders", Source::Financial, 5).await;
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0], "how many orders today");
        assert!(!similar.contains(&"revenue by customer".to_owned()));
    }

    #[tokio::test]
    async fn similar_respects_source_and_limit() {
        let learner = PatternLearner::new();
        learner.learn("how many devices online", Source::Devices, None).await;
        assert!(learner.similar("how many devices", Source::Financial, 5).await.is_empty());
        assert_eq!(learner.similar("how many devices", Source::Devices, 5).await.len(), 1);
    }

    #[tokio::test]
    async fn empty_sql_is_not_accepted() {
        let learner = PatternLearner::new();
        learner.learn("q", Source::Financial, Some("")).await;
        assert_eq!(learner.stats().await.accepted_queries, 0);
    }
}
