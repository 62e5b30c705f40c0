//! Request and response models for the REST API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::gex::{
    GammaProfilePoint, NormalizedStrikePoint, PayloadFormat, ProcessedDataset, StrikeWindow,
    SymbolDecodeWarning,
};

// ============================================================================
// Health & Statistics
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Global statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct GlobalStatsResponse {
    /// Number of datasets held in memory.
    pub dataset_count: usize,
    /// Aggregated points across all datasets.
    pub total_points: usize,
}

// ============================================================================
// Datasets
// ============================================================================

/// Summary of one uploaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatasetSummary {
    /// Dataset identifier.
    pub id: Uuid,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// Underlying symbol.
    pub symbol: String,
    /// Source schema.
    pub format: PayloadFormat,
    /// Earliest expiration.
    pub reference_date: String,
    /// Reference underlying price.
    pub underlying_price: f64,
    /// Number of distinct expirations.
    pub expiration_count: usize,
    /// Number of aggregated points.
    pub point_count: usize,
    /// Total signed exposure in billions (snapshot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_gamma_bn: Option<f64>,
}

impl DatasetSummary {
    /// Builds a summary for a stored dataset.
    #[must_use]
    pub fn new(id: Uuid, uploaded_at: DateTime<Utc>, dataset: &ProcessedDataset) -> Self {
        Self {
            id,
            uploaded_at,
            symbol: dataset.symbol.clone(),
            format: dataset.format,
            reference_date: dataset.reference_date.clone(),
            underlying_price: dataset.underlying_price,
            expiration_count: dataset.expirations.len(),
            point_count: dataset.point_count(),
            total_gamma_bn: dataset.total_gamma_bn,
        }
    }
}

/// List of datasets.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatasetsListResponse {
    /// Dataset summaries, oldest upload first.
    pub datasets: Vec<DatasetSummary>,
}

/// Response after uploading a payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// The stored dataset.
    pub dataset: DatasetSummary,
    /// Snapshot entries that were skipped.
    pub warnings: Vec<SymbolDecodeWarning>,
    /// Legacy records excluded by validation.
    pub skipped_records: usize,
}

/// List of expirations.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExpirationsListResponse {
    /// Expiration dates, ascending.
    pub expirations: Vec<String>,
}

// ============================================================================
// Strike Selection
// ============================================================================

/// Query parameters for strike selection endpoints.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StrikeQuery {
    /// Comma-separated expirations. Absent selects all; empty selects none.
    #[serde(default)]
    pub expirations: Option<String>,
    /// Lower strike bound.
    #[serde(default)]
    pub min_strike: Option<f64>,
    /// Upper strike bound.
    #[serde(default)]
    pub max_strike: Option<f64>,
}

impl StrikeQuery {
    /// Expirations to select, in request order.
    #[must_use]
    pub fn selected_expirations(&self, available: &[String]) -> Vec<String> {
        match &self.expirations {
            None => available.to_vec(),
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Filtered strike points.
#[derive(Debug, Serialize, ToSchema)]
pub struct StrikesResponse {
    /// Applied strike window.
    pub window: StrikeWindow,
    /// Expirations that were selected.
    pub expirations: Vec<String>,
    /// Points, highest strike first.
    pub points: Vec<NormalizedStrikePoint>,
}

/// Strikes preceding each sign change of the filtered exposure.
#[derive(Debug, Serialize, ToSchema)]
pub struct CrossingsResponse {
    /// Applied strike window.
    pub window: StrikeWindow,
    /// Strikes, ascending.
    pub crossings: Vec<f64>,
}

// ============================================================================
// Gamma Profile
// ============================================================================

/// Query parameters for the gamma profile endpoint.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProfileQuery {
    /// Lowest spot level.
    #[serde(default)]
    pub min_strike: Option<f64>,
    /// Highest spot level.
    #[serde(default)]
    pub max_strike: Option<f64>,
    /// Number of spot levels.
    #[serde(default)]
    pub levels: Option<usize>,
    /// Valuation date (default: today, UTC).
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Gamma exposure profile across spot levels.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// Underlying symbol.
    pub symbol: String,
    /// Valuation date.
    pub as_of: NaiveDate,
    /// Spot range.
    pub window: StrikeWindow,
    /// Points in ascending spot order, in billions per 1% move.
    pub points: Vec<GammaProfilePoint>,
    /// Spot where total gamma changes sign.
    pub flip_point: Option<f64>,
    /// Nearest expiration.
    pub nearest_expiration: Option<String>,
    /// Nearest monthly expiration.
    pub nearest_monthly_expiration: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> Vec<String> {
        vec!["2025-10-31".to_string(), "2025-11-21".to_string()]
    }

    #[test]
    fn test_absent_expirations_select_all() {
        let query = StrikeQuery::default();
        assert_eq!(query.selected_expirations(&available()), available());
    }

    #[test]
    fn test_empty_expirations_select_none() {
        let query = StrikeQuery {
            expirations: Some(String::new()),
            ..Default::default()
        };
        assert!(query.selected_expirations(&available()).is_empty());
    }

    #[test]
    fn test_expirations_keep_request_order() {
        let query = StrikeQuery {
            expirations: Some(" 2025-11-21, 2025-10-31 ,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.selected_expirations(&available()),
            vec!["2025-11-21", "2025-10-31"]
        );
    }

    #[test]
    fn test_profile_query_deserializes_date() {
        let query: ProfileQuery =
            serde_json::from_str(r#"{"as_of": "2025-10-27", "levels": 10}"#).unwrap();
        assert_eq!(query.as_of, NaiveDate::from_ymd_opt(2025, 10, 27));
        assert_eq!(query.levels, Some(10));
        assert_eq!(query.min_strike, None);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
    }
}
