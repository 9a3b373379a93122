//! Distribution-side domain types: distributor identity, release lifecycle,
//! validation results, requirements, earnings and deployment records.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Distributor Identity
// =============================================================================

/// Closed set of supported distributors.
///
/// The orchestrator's adapter registry is keyed by this type, so an unknown
/// distributor cannot be addressed at compile time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DistributorId {
    Distrokid,
    Tunecore,
    Cdbaby,
    Ditto,
    Awal,
    Unitedmasters,
    Amuse,
    Symphonic,
}

impl DistributorId {
    /// All known distributor ids.
    pub const ALL: [DistributorId; 8] = [
        Self::Distrokid,
        Self::Tunecore,
        Self::Cdbaby,
        Self::Ditto,
        Self::Awal,
        Self::Unitedmasters,
        Self::Amuse,
        Self::Symphonic,
    ];

    /// Canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distrokid => "distrokid",
            Self::Tunecore => "tunecore",
            Self::Cdbaby => "cdbaby",
            Self::Ditto => "ditto",
            Self::Awal => "awal",
            Self::Unitedmasters => "unitedmasters",
            Self::Amuse => "amuse",
            Self::Symphonic => "symphonic",
        }
    }

    /// Parse an identifier string.
    pub fn from_str_id(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "distrokid" => Some(Self::Distrokid),
            "tunecore" => Some(Self::Tunecore),
            "cdbaby" | "cd baby" => Some(Self::Cdbaby),
            "ditto" => Some(Self::Ditto),
            "awal" => Some(Self::Awal),
            "unitedmasters" => Some(Self::Unitedmasters),
            "amuse" => Some(Self::Amuse),
            "symphonic" => Some(Self::Symphonic),
            _ => None,
        }
    }
}

impl std::fmt::Display for DistributorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Release Lifecycle
// =============================================================================

/// Lifecycle status of a release on one distributor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    Draft,
    Validating,
    PendingReview,
    InReview,
    Approved,
    Processing,
    Delivering,
    Delivered,
    Live,
    TakedownRequested,
    TakenDown,
    Failed,
    Rejected,
}

impl ReleaseStatus {
    /// Terminal statuses are never overwritten; a resubmission creates a
    /// new deployment row instead.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TakenDown | Self::Failed | Self::Rejected)
    }

    /// Statuses still waiting on the distributor.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::PendingReview | Self::InReview | Self::Processing
        )
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One machine-readable validation finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(code: &str, message: impl Into<String>, field: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: Some(field.to_string()),
            severity: Severity::Error,
        }
    }
}

/// Outcome of validating metadata or assets against requirements.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    /// Outcome with no findings.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Build an outcome from collected findings.
    pub fn from_findings(errors: Vec<ValidationIssue>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Merge another outcome into this one.
    pub fn merge(mut self, other: ValidationOutcome) -> Self {
        self.is_valid = self.is_valid && other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self
    }
}

// =============================================================================
// Release Result
// =============================================================================

/// Structured result of one release operation against one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    pub success: bool,
    pub status: ReleaseStatus,
    /// External id assigned by the distributor, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributor_release_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_live_date: Option<String>,
    #[serde(default)]
    pub review_required: bool,
}

impl ReleaseResult {
    /// Successful result in the given status.
    pub fn ok(status: ReleaseStatus) -> Self {
        Self {
            success: true,
            status,
            distributor_release_id: None,
            errors: Vec::new(),
            estimated_live_date: None,
            review_required: false,
        }
    }

    /// Failed result carrying the given findings.
    pub fn failed(errors: Vec<ValidationIssue>) -> Self {
        Self {
            success: false,
            status: ReleaseStatus::Failed,
            distributor_release_id: None,
            errors,
            estimated_live_date: None,
            review_required: false,
        }
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Opaque credential set for one distributor.
///
/// The pipeline only moves these between the credential boundary and the
/// adapter; it never inspects fields beyond what the adapter requires.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

// =============================================================================
// Release Assets
// =============================================================================

/// Audio master formats accepted across the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Flac,
    Mp3,
    Aac,
    Aiff,
}

/// Cover-art formats accepted across the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpg,
    Png,
}

/// The audio master for a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAsset {
    pub path: String,
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub size_bytes: u64,
}

/// The front cover image for a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverArtAsset {
    pub path: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

/// Assets accompanying a release submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseAssets {
    pub audio: AudioAsset,
    pub cover_art: CoverArtAsset,
}

// =============================================================================
// Distributor Requirements
// =============================================================================

/// Cover-art rules for one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverArtRules {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub allowed_formats: Vec<ImageFormat>,
    pub max_size_bytes: u64,
}

/// Audio rules for one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioRules {
    pub allowed_formats: Vec<AudioFormat>,
    pub min_sample_rate: u32,
    pub min_bit_depth: u16,
}

/// Metadata rules for one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRules {
    /// Fields that must be non-empty, named by their metadata key.
    pub required_fields: Vec<String>,
    pub max_title_length: usize,
    pub max_artist_name_length: usize,
    pub isrc_required: bool,
    pub upc_required: bool,
}

/// Lead-time rules for one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRules {
    pub min_lead_time_days: i64,
    pub review_time_days: i64,
}

/// Pricing model of one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    Subscription,
    PerRelease,
    Free,
    RevenueShare,
}

/// Pricing rules for one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRules {
    pub model: PricingModel,
    pub payout_percentage: f64,
}

/// Static validation rules one distributor imposes on submissions.
///
/// Read-only reference data owned by the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorRequirements {
    pub distributor_id: DistributorId,
    pub cover_art: CoverArtRules,
    pub audio: AudioRules,
    pub metadata: MetadataRules,
    pub timing: TimingRules,
    pub pricing: PricingRules,
}

// =============================================================================
// Earnings
// =============================================================================

/// Inclusive date range for an earnings query.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

/// Per-platform/territory slice of one distributor's earnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsBreakdown {
    pub platform: String,
    pub territory_code: String,
    pub streams: u64,
    pub downloads: u64,
    pub revenue: f64,
}

/// Earnings one distributor reports for one release over one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorEarnings {
    pub distributor_id: DistributorId,
    pub release_id: String,
    pub period: DateRange,
    pub streams: u64,
    pub downloads: u64,
    pub gross_revenue: f64,
    pub distributor_fee: f64,
    pub net_revenue: f64,
    pub currency_code: String,
    #[serde(default)]
    pub breakdown: Vec<EarningsBreakdown>,
    pub last_updated: String,
}

/// Totals across all distributors, regrouped by platform and territory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedEarnings {
    pub release_id: String,
    pub period: DateRange,
    pub total_streams: u64,
    pub total_downloads: u64,
    pub total_gross_revenue: f64,
    pub total_fees: f64,
    pub total_net_revenue: f64,
    pub currency_code: String,
    pub by_distributor: Vec<DistributorEarnings>,
    pub by_platform: Vec<GroupedEarnings>,
    pub by_territory: Vec<GroupedEarnings>,
}

/// Earnings regrouped under one key (platform name or territory code).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedEarnings {
    pub key: String,
    pub streams: u64,
    pub downloads: u64,
    pub revenue: f64,
}

// =============================================================================
// Release Deployment
// =============================================================================

/// Lifecycle record of one release on one distributor.
///
/// Created on first submission attempt, mutated only through the
/// orchestrator's status-transition calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDeployment {
    pub id: String,
    pub internal_release_id: String,
    pub distributor_id: DistributorId,
    pub status: ReleaseStatus,
    /// Snapshot for listings, avoids a catalog lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Id the distributor assigned to this release.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub submitted_at: String,
    pub last_checked_at: String,
    pub last_updated_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_link: Option<String>,
}

impl ReleaseDeployment {
    /// New deployment record in the given initial status.
    pub fn new(
        internal_release_id: &str,
        distributor_id: DistributorId,
        status: ReleaseStatus,
    ) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            internal_release_id: internal_release_id.to_string(),
            distributor_id,
            status,
            title: None,
            artist: None,
            external_id: None,
            submitted_at: now.clone(),
            last_checked_at: now.clone(),
            last_updated_at: now,
            errors: Vec::new(),
            tracking_link: None,
        }
    }
}

/// Filter for deployment queries.
#[derive(Debug, Clone, Default)]
pub struct DeploymentFilter {
    pub distributor_id: Option<DistributorId>,
    pub internal_release_id: Option<String>,
    pub status: Option<ReleaseStatus>,
}

impl DeploymentFilter {
    /// Whether a deployment matches every set criterion.
    pub fn matches(&self, deployment: &ReleaseDeployment) -> bool {
        if let Some(id) = self.distributor_id {
            if deployment.distributor_id != id {
                return false;
            }
        }
        if let Some(ref release_id) = self.internal_release_id {
            if &deployment.internal_release_id != release_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if deployment.status != status {
                return false;
            }
        }
        true
    }
}

/// Connection state of one registered distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub distributor_id: DistributorId,
    pub is_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distributor_id_roundtrip() {
        for id in DistributorId::ALL {
            assert_eq!(DistributorId::from_str_id(id.as_str()), Some(id));
        }
        assert_eq!(DistributorId::from_str_id("CD Baby"), Some(DistributorId::Cdbaby));
        assert_eq!(DistributorId::from_str_id("spotify"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ReleaseStatus::Failed.is_terminal());
        assert!(ReleaseStatus::Rejected.is_terminal());
        assert!(ReleaseStatus::TakenDown.is_terminal());
        assert!(!ReleaseStatus::Live.is_terminal());
        assert!(!ReleaseStatus::Processing.is_terminal());
    }

    #[test]
    fn test_validation_outcome_merge() {
        let clean = ValidationOutcome::valid();
        let failed = ValidationOutcome::from_findings(
            vec![ValidationIssue::error("MISSING_GENRE", "Genre is required", "genre")],
            vec!["short lead time".into()],
        );
        let merged = clean.merge(failed);
        assert!(!merged.is_valid);
        assert_eq!(merged.errors.len(), 1);
        assert_eq!(merged.warnings.len(), 1);
    }

    #[test]
    fn test_deployment_filter() {
        let deployment =
            ReleaseDeployment::new("rel-1", DistributorId::Tunecore, ReleaseStatus::Validating);

        let by_release = DeploymentFilter {
            internal_release_id: Some("rel-1".into()),
            ..Default::default()
        };
        assert!(by_release.matches(&deployment));

        let by_other_distributor = DeploymentFilter {
            distributor_id: Some(DistributorId::Cdbaby),
            ..Default::default()
        };
        assert!(!by_other_distributor.matches(&deployment));
    }

    #[test]
    fn test_status_serialization_is_snake_case() {
        let json = serde_json::to_string(&ReleaseStatus::TakedownRequested).unwrap();
        assert_eq!(json, "\"takedown_requested\"");
        let back: ReleaseStatus = serde_json::from_str("\"pending_review\"").unwrap();
        assert_eq!(back, ReleaseStatus::PendingReview);
    }
}
