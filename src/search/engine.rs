use crate::config::SearchConfig;
use crate::employees::types::{EmployeeId, EmployeeSummary};
use crate::error::SearchError;
use crate::index::normalizer::{normalize, tokenize};
use crate::storage::{EmployeeStore, ReverseIndexEntry, ReverseIndexStore, ScoredEntry};

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Read side of the reverse index. Holds no state of its own besides the store handles.
pub struct SearchEngine {
    index: Arc<dyn ReverseIndexStore>,
    employees: Arc<dyn EmployeeStore>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(
        index: Arc<dyn ReverseIndexStore>,
        employees: Arc<dyn EmployeeStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            index,
            employees,
            config,
        }
    }

    /// The whole query is one key; no tokenization.
    pub async fn exact(&self, query: &str) -> Result<Vec<EmployeeSummary>, SearchError> {
        let key = normalize(query);
        let Some(ids) = self.index.lookup(&key).await? else {
            tracing::debug!("Exact search: no entry for {:?}", key);
            return Ok(Vec::new());
        };

        let ids = dedup_in_order(ids);
        Ok(self.employees.fetch_summaries(&ids).await?)
    }

    /// Trigram-ranked search over every token of the query. `limit` must be positive and is
    /// clamped to `max_limit`.
    pub async fn ranked(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<EmployeeSummary>, SearchError> {
        if limit == 0 {
            return Err(SearchError::InvalidRequest(
                "limit must be a positive integer".to_string(),
            ));
        }
        let limit = limit.min(self.config.max_limit);

        let tokens = tokenize(query);
        let scored = self
            .index
            .similar(&tokens, self.config.similarity_threshold)
            .await?;

        let ids = rank_candidates(&scored, limit);
        tracing::debug!(
            "Ranked search: {} tokens, {} matching keys, {} results",
            tokens.len(),
            scored.len(),
            ids.len()
        );
        Ok(self.employees.fetch_summaries(&ids).await?)
    }

    /// All tokens but the last must match a key exactly; the last one is a key prefix.
    pub async fn suggest(&self, query: &str) -> Result<Vec<EmployeeSummary>, SearchError> {
        let mut tokens = tokenize(query);
        let prefix = tokens.pop().unwrap_or_default();

        let mut exact_sets = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match self.index.lookup(token).await? {
                Some(ids) => exact_sets.push(ids),
                // One empty filter empties the intersection.
                None => return Ok(Vec::new()),
            }
        }

        let prefixed = self.index.prefixed(&prefix).await?;
        let ids = intersect_suggestions(&exact_sets, &prefixed, self.config.suggest_limit);
        Ok(self.employees.fetch_summaries(&ids).await?)
    }
}

/// Collapses duplicate ids of an index row, keeping first occurrences.
fn dedup_in_order(ids: Vec<EmployeeId>) -> Vec<EmployeeId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Sums the scores of every matched row per id and returns the `limit` heaviest ids.
/// Ties go to the smaller id. Duplicate ids inside one row count once.
pub fn rank_candidates(scored: &[ScoredEntry], limit: usize) -> Vec<EmployeeId> {
    let mut weights: HashMap<&str, f64> = HashMap::new();
    for entry in scored {
        let row_ids: HashSet<&str> = entry.ids.iter().map(String::as_str).collect();
        for id in row_ids {
            *weights.entry(id).or_insert(0.0) += entry.score;
        }
    }

    let mut ranked: Vec<(&str, f64)> = weights.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// `(∪ prefixed) ∩ exact_1 ∩ … ∩ exact_n`, capped at `cap` ids in ascending order.
pub fn intersect_suggestions(
    exact_sets: &[Vec<EmployeeId>],
    prefixed: &[ReverseIndexEntry],
    cap: usize,
) -> Vec<EmployeeId> {
    let mut result: BTreeSet<&str> = prefixed
        .iter()
        .flat_map(|entry| entry.ids.iter().map(String::as_str))
        .collect();

    for set in exact_sets {
        let filter: HashSet<&str> = set.iter().map(String::as_str).collect();
        result.retain(|id| filter.contains(id));
    }

    result.into_iter().take(cap).map(str::to_string).collect()
}
