//! REST API types for the distribution surface.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::distribution::FanOutResult;
use crate::models::{CatalogMetadata, Credentials, DistributorId, ReleaseAssets};
use crate::royalty::{FeeConfig, RoyaltyCalculation};

/// Fan-out submission request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReleaseRequest {
    pub metadata: CatalogMetadata,
    pub assets: ReleaseAssets,
    pub distributors: Vec<DistributorId>,
    #[serde(default)]
    pub skip_failed_validation: bool,
}

/// Fan-out submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReleaseResponse {
    /// Unique job identifier.
    pub job_id: String,
    /// "delivered", "partial" or "failed".
    pub status: String,
    pub result: FanOutResult,
}

impl From<FanOutResult> for SubmitReleaseResponse {
    fn from(result: FanOutResult) -> Self {
        let status = if result.summary.failed_count == 0 && result.summary.success_count > 0 {
            "delivered"
        } else if result.summary.success_count > 0 {
            "partial"
        } else {
            "failed"
        };
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            result,
        }
    }
}

/// Royalty calculation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltiesRequest {
    /// Raw tab-delimited sales report.
    pub report_text: String,
    /// Catalog entries; rows resolve against each entry's ISRC.
    pub catalog: Vec<CatalogMetadata>,
    #[serde(default)]
    pub fee_config: FeeConfig,
}

/// Totals over one royalty run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyTotals {
    pub gross_revenue: f64,
    pub total_fees: f64,
    pub net_revenue: f64,
}

/// Royalty calculation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltiesResponse {
    pub report_id: String,
    pub currency_code: String,
    pub calculations: Vec<RoyaltyCalculation>,
    pub totals: RoyaltyTotals,
}

impl RoyaltiesResponse {
    pub fn new(
        report_id: String,
        currency_code: String,
        calculations: Vec<RoyaltyCalculation>,
    ) -> Self {
        let totals = RoyaltyTotals {
            gross_revenue: calculations.iter().map(|c| c.gross_revenue).sum(),
            total_fees: calculations
                .iter()
                .map(|c| c.distributor_fees + c.platform_fees)
                .sum(),
            net_revenue: calculations.iter().map(|c| c.net_revenue).sum(),
        };
        Self {
            report_id,
            currency_code,
            calculations,
            totals,
        }
    }
}

/// Connect request body.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    /// Saved through the credential boundary when present; otherwise the
    /// stored credentials are loaded.
    pub credentials: Option<Credentials>,
}

/// Earnings query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsQuery {
    pub start_date: String,
    pub end_date: String,
}

/// Uniform error body.
pub fn error_response(message: &str) -> Value {
    json!({
        "status": "error",
        "error": message,
    })
}
