//! Application state management.

use crate::config::Config;
use crate::gex::ProcessedDataset;
use crate::models::{DatasetSummary, GlobalStatsResponse};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// A processed dataset held by the service.
#[derive(Debug)]
pub struct StoredDataset {
    /// Dataset identifier.
    pub id: Uuid,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// The immutable dataset.
    pub dataset: ProcessedDataset,
}

impl StoredDataset {
    /// Summary for API responses.
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::new(self.id, self.uploaded_at, &self.dataset)
    }
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Uploaded datasets by id.
    pub datasets: Arc<DashMap<Uuid, Arc<StoredDataset>>>,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new application state with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Creates a new application state from configuration.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            datasets: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Stores a dataset under a fresh id.
    pub fn insert(&self, dataset: ProcessedDataset) -> Arc<StoredDataset> {
        let stored = Arc::new(StoredDataset {
            id: Uuid::new_v4(),
            uploaded_at: Utc::now(),
            dataset,
        });
        self.datasets.insert(stored.id, Arc::clone(&stored));
        info!(
            "Stored dataset {} ({}, {} points)",
            stored.id,
            stored.dataset.symbol,
            stored.dataset.point_count()
        );
        stored
    }

    /// Looks up a dataset.
    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<Arc<StoredDataset>> {
        self.datasets.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drops a dataset; returns whether it existed.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.datasets.remove(id).is_some()
    }

    /// Summaries of every dataset, oldest upload first.
    #[must_use]
    pub fn summaries(&self) -> Vec<DatasetSummary> {
        let mut summaries: Vec<DatasetSummary> = self
            .datasets
            .iter()
            .map(|entry| entry.value().summary())
            .collect();
        summaries.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at).then(a.id.cmp(&b.id)));
        summaries
    }

    /// Global statistics.
    #[must_use]
    pub fn stats(&self) -> GlobalStatsResponse {
        GlobalStatsResponse {
            dataset_count: self.datasets.len(),
            total_points: self
                .datasets
                .iter()
                .map(|entry| entry.value().dataset.point_count())
                .sum(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gex::process_payload;
    use serde_json::json;

    fn dataset() -> ProcessedDataset {
        let raw = json!([
            {"contract": {"symbol": "ES", "strike": 100.0, "right": "C",
                          "lastTradeDate": "20251031", "multiplier": 50},
             "data": {"gamma": 0.001, "undPrice": 105.0, "openInterest": 10}}
        ]);
        process_payload(&raw.to_string()).unwrap().dataset
    }

    #[test]
    fn test_insert_get_remove() {
        let state = AppState::new();
        let stored = state.insert(dataset());

        let fetched = state.get(&stored.id).unwrap();
        assert_eq!(fetched.dataset.symbol, "ES");
        assert!(Arc::ptr_eq(&stored, &fetched));

        assert!(state.remove(&stored.id));
        assert!(!state.remove(&stored.id));
        assert!(state.get(&stored.id).is_none());
    }

    #[test]
    fn test_stats_and_summaries() {
        let state = AppState::new();
        state.insert(dataset());
        state.insert(dataset());

        let stats = state.stats();
        assert_eq!(stats.dataset_count, 2);
        assert_eq!(stats.total_points, 2);

        let summaries = state.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].uploaded_at <= summaries[1].uploaded_at);
        assert_eq!(summaries[0].point_count, 1);
    }
}
