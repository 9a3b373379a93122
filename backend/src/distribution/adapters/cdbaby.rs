//! CD Baby adapter: package + transport delivery strategy.
//!
//! CD Baby ingests full release packages over a remote-file-copy endpoint.
//! Each submission stages a package (interchange document, metadata CSV,
//! assets) and pushes it with a fresh transport instance; transports are
//! never shared across concurrent submissions.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::api::logs::{log_info, log_success};
use crate::distribution::adapter::DistributorAdapter;
use crate::distribution::package::PackageBuilder;
use crate::distribution::requirements::{check_assets, check_metadata};
use crate::error::{AdapterError, AdapterResult};
use crate::message::{build_release_message, map_release_notification, MessageOptions, Party};
use crate::models::{
    AudioFormat, AudioRules, CatalogMetadata, CoverArtRules, Credentials, DateRange,
    DistributorEarnings, DistributorId, DistributorRequirements, ImageFormat, MetadataRules,
    PricingModel, PricingRules, ReleaseAssets, ReleaseResult, ReleaseStatus, TimingRules,
    ValidationIssue, ValidationOutcome,
};
use crate::transport::{DeliveryTransport, DropFolderTransport, TransportConfig};

const DEFAULT_HOST: &str = "gateway.cdbaby.com";

fn cdbaby_requirements() -> DistributorRequirements {
    DistributorRequirements {
        distributor_id: DistributorId::Cdbaby,
        cover_art: CoverArtRules {
            min_width: 1400,
            min_height: 1400,
            max_width: 3000,
            max_height: 3000,
            allowed_formats: vec![ImageFormat::Jpg, ImageFormat::Png],
            max_size_bytes: 20 * 1024 * 1024,
        },
        audio: AudioRules {
            allowed_formats: vec![AudioFormat::Wav, AudioFormat::Flac, AudioFormat::Mp3],
            min_sample_rate: 44_100,
            min_bit_depth: 16,
        },
        metadata: MetadataRules {
            required_fields: vec!["trackTitle".into(), "artistName".into(), "genre".into()],
            max_title_length: 255,
            max_artist_name_length: 255,
            isrc_required: false,
            upc_required: false,
        },
        timing: TimingRules {
            min_lead_time_days: 5,
            review_time_days: 2,
        },
        pricing: PricingRules {
            model: PricingModel::PerRelease,
            payout_percentage: 91.0,
        },
    }
}

/// Adapter delivering release packages to CD Baby.
pub struct CdBabyAdapter {
    requirements: DistributorRequirements,
    builder: PackageBuilder,
    gateway_root: PathBuf,
    sender: Party,
    credentials: Mutex<Option<Credentials>>,
}

impl CdBabyAdapter {
    pub fn new(
        staging_root: impl Into<PathBuf>,
        gateway_root: impl Into<PathBuf>,
        sender: Party,
    ) -> Self {
        Self {
            requirements: cdbaby_requirements(),
            builder: PackageBuilder::new(staging_root),
            gateway_root: gateway_root.into(),
            sender,
            credentials: Mutex::new(None),
        }
    }

    async fn stored_credentials(&self) -> AdapterResult<Credentials> {
        self.credentials
            .lock()
            .await
            .clone()
            .ok_or(AdapterError::NotConnected(DistributorId::Cdbaby))
    }

    fn recipient(&self) -> Party {
        Party {
            party_id: "PADPIDCDBABY".into(),
            party_name: "CD Baby".into(),
        }
    }

    fn transport_config(&self, credentials: &Credentials) -> TransportConfig {
        TransportConfig {
            host: credentials
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: credentials.port.unwrap_or(0),
            username: credentials
                .username
                .clone()
                .or_else(|| credentials.account_id.clone())
                .unwrap_or_else(|| "label".to_string()),
            password: credentials
                .password
                .clone()
                .or_else(|| credentials.api_key.clone()),
            private_key: credentials.private_key.clone(),
        }
    }

    async fn deliver(
        &self,
        credentials: &Credentials,
        package_path: &Path,
        remote_path: &str,
    ) -> AdapterResult<Vec<String>> {
        // One transport per delivery; fan-out submissions never share one.
        let transport = DropFolderTransport::new(self.gateway_root.clone());
        transport.connect(self.transport_config(credentials)).await?;
        let files = transport.upload_directory(package_path, remote_path).await?;
        transport.disconnect().await;
        Ok(files)
    }

    fn estimated_live_date(&self, release_date: &str) -> String {
        let base = NaiveDate::parse_from_str(release_date, "%Y-%m-%d")
            .unwrap_or_else(|_| Utc::now().date_naive());
        (base + Duration::days(self.requirements.timing.min_lead_time_days))
            .format("%Y-%m-%d")
            .to_string()
    }
}

#[async_trait]
impl DistributorAdapter for CdBabyAdapter {
    fn id(&self) -> DistributorId {
        DistributorId::Cdbaby
    }

    fn name(&self) -> &'static str {
        "CD Baby"
    }

    fn requirements(&self) -> &DistributorRequirements {
        &self.requirements
    }

    async fn connect(&self, credentials: &Credentials) -> AdapterResult<()> {
        if credentials.api_key.is_none()
            && credentials.password.is_none()
            && credentials.private_key.is_none()
        {
            return Err(AdapterError::MissingCredential {
                distributor: DistributorId::Cdbaby,
                field: "apiKey, password or privateKey",
            });
        }
        let mut state = self.credentials.lock().await;
        *state = Some(credentials.clone());
        log_success("[CD Baby] Connected");
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.credentials.lock().await.is_some()
    }

    async fn disconnect(&self) {
        let mut state = self.credentials.lock().await;
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
        let credentials = self.stored_credentials().await?;

        log_info(format!(
            "[CD Baby] Building package for: {}",
            metadata.track_title
        ));

        let message = map_release_notification(
            metadata,
            MessageOptions::new(self.sender.clone(), self.recipient()),
        );
        let document = build_release_message(&message);

        let release_ref = metadata
            .upc
            .clone()
            .unwrap_or_else(|| metadata.release_id.clone());

        let delivery = async {
            let package = self.builder.build(metadata, assets, &document)?;
            let remote_path = format!("/upload/{}", release_ref);
            log_info(format!(
                "[CD Baby] Uploading {} file(s) to {}",
                package.files.len(),
                remote_path
            ));
            self.deliver(&credentials, &package.path, &remote_path).await
        };

        match delivery.await {
            Ok(_files) => {
                let mut result = ReleaseResult::ok(ReleaseStatus::Delivered);
                result.distributor_release_id = Some(format!("CDB-{}", release_ref));
                result.review_required = true;
                result.estimated_live_date = Some(self.estimated_live_date(&metadata.release_date));
                Ok(result)
            }
            Err(error) => Ok(ReleaseResult::failed(vec![ValidationIssue {
                code: "DELIVERY_ERROR".into(),
                message: error.to_string(),
                field: None,
                severity: crate::models::Severity::Error,
            }])),
        }
    }

    async fn update_release(
        &self,
        release_id: &str,
        _metadata: &CatalogMetadata,
    ) -> AdapterResult<ReleaseResult> {
        self.stored_credentials().await?;
        // An update goes out as a fresh notification with the same ids.
        log_info(format!("[CD Baby] Sending update message for {}", release_id));
        let mut result = ReleaseResult::ok(ReleaseStatus::Processing);
        result.distributor_release_id = Some(release_id.to_string());
        Ok(result)
    }

    async fn get_release_status(&self, _release_id: &str) -> AdapterResult<ReleaseStatus> {
        self.stored_credentials().await?;
        Ok(ReleaseStatus::Validating)
    }

    async fn takedown_release(&self, release_id: &str) -> AdapterResult<ReleaseResult> {
        self.stored_credentials().await?;
        log_info(format!("[CD Baby] Sending takedown message for {}", release_id));
        let mut result = ReleaseResult::ok(ReleaseStatus::TakedownRequested);
        result.distributor_release_id = Some(release_id.to_string());
        Ok(result)
    }

    async fn get_earnings(
        &self,
        release_id: &str,
        period: &DateRange,
    ) -> AdapterResult<DistributorEarnings> {
        self.stored_credentials().await?;
        Ok(DistributorEarnings {
            distributor_id: DistributorId::Cdbaby,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioAsset, CoverArtAsset};
    use tempfile::tempdir;

    fn sender() -> Party {
        Party {
            party_id: "PADPIDA001".into(),
            party_name: "Songcast".into(),
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            api_key: Some("key-123".into()),
            account_id: Some("label-42".into()),
            ..Default::default()
        }
    }

    fn metadata() -> CatalogMetadata {
        CatalogMetadata {
            release_id: "rel-1".into(),
            release_title: None,
            track_title: "Test Track".into(),
            artist_name: "Test Artist".into(),
            isrc: Some("USXYZ2400001".into()),
            upc: Some("123456789012".into()),
            catalog_number: None,
            label_name: None,
            genre: "Pop".into(),
            sub_genre: None,
            language: None,
            release_date: "2030-01-01".into(),
            explicit: false,
            instrumental: false,
            duration_secs: None,
            territories: vec![],
            splits: vec![],
            description: None,
            lyrics: None,
            ai_disclosure: None,
        }
    }

    fn assets_in(dir: &std::path::Path) -> ReleaseAssets {
        let audio_path = dir.join("master.wav");
        let cover_path = dir.join("cover.jpg");
        std::fs::write(&audio_path, b"RIFFdata").unwrap();
        std::fs::write(&cover_path, b"JPEGdata").unwrap();
        ReleaseAssets {
            audio: AudioAsset {
                path: audio_path.to_string_lossy().to_string(),
                format: AudioFormat::Wav,
                sample_rate: 44_100,
                bit_depth: 16,
                size_bytes: 8,
            },
            cover_art: CoverArtAsset {
                path: cover_path.to_string_lossy().to_string(),
                format: ImageFormat::Jpg,
                width: 3000,
                height: 3000,
                size_bytes: 8,
            },
        }
    }

    #[tokio::test]
    async fn test_create_release_before_connect_fails() {
        let staging = tempdir().unwrap();
        let gateway = tempdir().unwrap();
        let sources = tempdir().unwrap();
        let adapter = CdBabyAdapter::new(staging.path(), gateway.path(), sender());

        let result = adapter
            .create_release(&metadata(), &assets_in(sources.path()))
            .await;
        assert!(matches!(result, Err(AdapterError::NotConnected(_))));
    }

    #[tokio::test]
    async fn test_package_delivered_to_gateway() {
        let staging = tempdir().unwrap();
        let gateway = tempdir().unwrap();
        let sources = tempdir().unwrap();
        let adapter = CdBabyAdapter::new(staging.path(), gateway.path(), sender());
        adapter.connect(&credentials()).await.unwrap();

        let result = adapter
            .create_release(&metadata(), &assets_in(sources.path()))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.status, ReleaseStatus::Delivered);
        assert_eq!(result.distributor_release_id.as_deref(), Some("CDB-123456789012"));

        let delivered = gateway
            .path()
            .join(DEFAULT_HOST)
            .join("upload/123456789012");
        assert!(delivered.join("release-message.json").exists());
        assert!(delivered.join("metadata.csv").exists());
        assert!(delivered.join("cover.jpg").exists());
    }

    #[tokio::test]
    async fn test_missing_asset_yields_failed_result_not_panic() {
        let staging = tempdir().unwrap();
        let gateway = tempdir().unwrap();
        let adapter = CdBabyAdapter::new(staging.path(), gateway.path(), sender());
        adapter.connect(&credentials()).await.unwrap();

        let sources = tempdir().unwrap();
        let mut assets = assets_in(sources.path());
        assets.audio.path = "/nowhere/master.wav".into();

        let result = adapter.create_release(&metadata(), &assets).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.status, ReleaseStatus::Failed);
        assert_eq!(result.errors[0].code, "DELIVERY_ERROR");
    }

    #[tokio::test]
    async fn test_connect_requires_secret() {
        let staging = tempdir().unwrap();
        let gateway = tempdir().unwrap();
        let adapter = CdBabyAdapter::new(staging.path(), gateway.path(), sender());

        let bare = Credentials {
            account_id: Some("label-42".into()),
            ..Default::default()
        };
        assert!(matches!(
            adapter.connect(&bare).await,
            Err(AdapterError::MissingCredential { .. })
        ));
    }
}
