//! Uniform distributor adapter contract.
//!
//! Every delivery strategy implements this trait; the orchestrator depends
//! only on the trait, never on concrete adapter types. File-based adapters
//! stage a package and push it through the delivery transport; API-style
//! adapters serialize a payload and issue (or simulate) a request.

use async_trait::async_trait;

use crate::error::AdapterResult;
use crate::models::{
    CatalogMetadata, Credentials, DateRange, DistributorEarnings, DistributorId,
    DistributorRequirements, ReleaseAssets, ReleaseResult, ReleaseStatus, ValidationOutcome,
};

/// One distributor's delivery strategy.
///
/// `create_release` must never be called before `connect` succeeds; a
/// disconnected adapter fails with [`crate::error::AdapterError::NotConnected`],
/// never a silent no-op. The orchestrator always validates before calling
/// `create_release`; adapters may additionally self-validate.
#[async_trait]
pub trait DistributorAdapter: Send + Sync {
    /// Stable identifier of the distributor this adapter targets.
    fn id(&self) -> DistributorId;

    /// Human-readable distributor name.
    fn name(&self) -> &'static str;

    /// Static validation rules this distributor imposes.
    fn requirements(&self) -> &DistributorRequirements;

    /// Establish a session with the distributor.
    async fn connect(&self, credentials: &Credentials) -> AdapterResult<()>;

    /// Whether a session is currently established.
    async fn is_connected(&self) -> bool;

    /// Tear down the session.
    async fn disconnect(&self);

    /// Check metadata against this distributor's requirements.
    async fn validate_metadata(&self, metadata: &CatalogMetadata) -> ValidationOutcome;

    /// Check assets against this distributor's requirements.
    async fn validate_assets(&self, assets: &ReleaseAssets) -> ValidationOutcome;

    /// Submit a new release.
    async fn create_release(
        &self,
        metadata: &CatalogMetadata,
        assets: &ReleaseAssets,
    ) -> AdapterResult<ReleaseResult>;

    /// Resend updated metadata for an existing release.
    async fn update_release(
        &self,
        release_id: &str,
        metadata: &CatalogMetadata,
    ) -> AdapterResult<ReleaseResult>;

    /// Poll the distributor for the current release status.
    async fn get_release_status(&self, release_id: &str) -> AdapterResult<ReleaseStatus>;

    /// Request removal of a live release.
    async fn takedown_release(&self, release_id: &str) -> AdapterResult<ReleaseResult>;

    /// Earnings for one release over one period.
    async fn get_earnings(
        &self,
        release_id: &str,
        period: &DateRange,
    ) -> AdapterResult<DistributorEarnings>;
}
