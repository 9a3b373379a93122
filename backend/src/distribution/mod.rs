//! Distribution orchestrator: validate, submit, track and settle releases
//! across registered distributors.
//!
//! The orchestrator composes the adapter contract, the deployment store,
//! and the credential boundary, all dependency-injected through the
//! builder. The adapter registry is built once at startup and immutable
//! afterwards.
//!
//! Every public operation returns a structured result per unit of work;
//! adapter failures are caught at this boundary and folded into the
//! result, never propagated to callers.

pub mod adapter;
pub mod adapters;
pub mod package;
pub mod requirements;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::api::logs::{log_info, log_success, log_warning};
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::error::DistributionError;
use crate::models::{
    AggregatedEarnings, CatalogMetadata, ConnectionStatus, Credentials, DateRange,
    DeploymentFilter, DistributorEarnings, DistributorId, GroupedEarnings, ReleaseAssets,
    ReleaseDeployment, ReleaseResult, ReleaseStatus, Severity, ValidationIssue, ValidationOutcome,
};
use crate::store::{DeploymentStore, StatusDetails};

pub use adapter::DistributorAdapter;
pub use adapters::{CdBabyAdapter, TuneCoreAdapter};
pub use package::{BuiltPackage, PackageBuilder};

// =============================================================================
// Result types
// =============================================================================

/// Outcome of one submission attempt against one distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub distributor_id: DistributorId,
    /// Deployment row tracking this attempt; absent when the attempt was
    /// skipped before a row was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    pub result: ReleaseResult,
}

/// Fan-out submission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutRequest {
    pub metadata: CatalogMetadata,
    pub assets: ReleaseAssets,
    pub distributors: Vec<DistributorId>,
    /// Skip distributors whose pre-validation already failed instead of
    /// creating failed deployment rows for them.
    #[serde(default)]
    pub skip_failed_validation: bool,
}

/// Counts over one fan-out result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutSummary {
    pub total_distributors: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub pending_count: usize,
}

/// Aggregate result of a fan-out submission, one entry per requested
/// distributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutResult {
    pub overall_success: bool,
    pub submissions: Vec<Submission>,
    pub summary: FanOutSummary,
}

/// One deployment's answer to a status sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub distributor_id: DistributorId,
    pub deployment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReleaseStatus>,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn synthetic_issue(code: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        code: code.to_string(),
        message: message.into(),
        field: None,
        severity: Severity::Error,
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds an orchestrator with an immutable adapter registry.
#[derive(Default)]
pub struct OrchestratorBuilder {
    adapters: HashMap<DistributorId, Arc<dyn DistributorAdapter>>,
    store: Option<Arc<DeploymentStore>>,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl OrchestratorBuilder {
    /// Register one adapter; later registrations win on id collision.
    pub fn register(mut self, adapter: Arc<dyn DistributorAdapter>) -> Self {
        log_info(format!("Registered adapter: {}", adapter.name()));
        self.adapters.insert(adapter.id(), adapter);
        self
    }

    pub fn store(mut self, store: Arc<DeploymentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn build(self) -> DistributionOrchestrator {
        DistributionOrchestrator {
            adapters: self.adapters,
            store: self.store.unwrap_or_else(|| Arc::new(DeploymentStore::new())),
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
        }
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Facade over all registered distributors.
pub struct DistributionOrchestrator {
    adapters: HashMap<DistributorId, Arc<dyn DistributorAdapter>>,
    store: Arc<DeploymentStore>,
    credentials: Arc<dyn CredentialStore>,
}

impl DistributionOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Registered distributor ids, in stable order.
    pub fn registered(&self) -> Vec<DistributorId> {
        let mut ids: Vec<DistributorId> = self.adapters.keys().copied().collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }

    /// Deployment listing, optionally filtered.
    pub fn deployments(&self, filter: Option<&DeploymentFilter>) -> Vec<ReleaseDeployment> {
        self.store.all(filter)
    }

    /// Connect one distributor.
    ///
    /// Supplied credentials are saved through the credential boundary;
    /// absent ones are loaded from it.
    pub async fn connect(
        &self,
        distributor_id: DistributorId,
        credentials: Option<Credentials>,
    ) -> Result<(), DistributionError> {
        let adapter = self
            .adapters
            .get(&distributor_id)
            .ok_or(DistributionError::UnknownDistributor(distributor_id))?;

        let credentials = match credentials {
            Some(c) => {
                self.credentials.save(distributor_id, &c)?;
                c
            }
            None => self
                .credentials
                .get(distributor_id)?
                .ok_or(DistributionError::NoCredentials(distributor_id))?,
        };

        adapter.connect(&credentials).await?;
        log_success(format!("Connected to {}", adapter.name()));
        Ok(())
    }

    /// Disconnect one distributor.
    pub async fn disconnect(&self, distributor_id: DistributorId) -> Result<(), DistributionError> {
        let adapter = self
            .adapters
            .get(&distributor_id)
            .ok_or(DistributionError::UnknownDistributor(distributor_id))?;
        adapter.disconnect().await;
        Ok(())
    }

    /// Connection state of every registered distributor.
    pub async fn connection_status(&self) -> Vec<ConnectionStatus> {
        let ids = self.registered();
        join_all(ids.into_iter().map(|id| {
            let adapter = Arc::clone(&self.adapters[&id]);
            async move {
                ConnectionStatus {
                    distributor_id: id,
                    is_connected: adapter.is_connected().await,
                }
            }
        }))
        .await
    }

    /// Validate metadata and assets against one distributor's requirements.
    pub async fn validate_for(
        &self,
        distributor_id: DistributorId,
        metadata: &CatalogMetadata,
        assets: &ReleaseAssets,
    ) -> Result<ValidationOutcome, DistributionError> {
        let adapter = self
            .adapters
            .get(&distributor_id)
            .ok_or(DistributionError::UnknownDistributor(distributor_id))?;
        let metadata_outcome = adapter.validate_metadata(metadata).await;
        let asset_outcome = adapter.validate_assets(assets).await;
        Ok(metadata_outcome.merge(asset_outcome))
    }

    /// Submit one release to one distributor.
    ///
    /// Protocol: create a deployment row in `validating`; run validation
    /// (failure stops before any network call); move to `processing` and
    /// call the adapter; record the adapter's status and external id. Any
    /// adapter error becomes a `failed` deployment with one synthetic
    /// error; the caller always receives a structured [`Submission`].
    pub async fn submit_release(
        &self,
        distributor_id: DistributorId,
        metadata: &CatalogMetadata,
        assets: &ReleaseAssets,
    ) -> Submission {
        let adapter = match self.adapters.get(&distributor_id) {
            Some(a) => a,
            None => {
                return Submission {
                    distributor_id,
                    deployment_id: None,
                    result: ReleaseResult::failed(vec![synthetic_issue(
                        "UNKNOWN_DISTRIBUTOR",
                        format!("No adapter registered for {}", distributor_id),
                    )]),
                }
            }
        };

        let deployment = match self.store.create(
            &metadata.release_id,
            distributor_id,
            ReleaseStatus::Validating,
            Some(metadata.display_title().to_string()),
            Some(metadata.artist_name.clone()),
        ) {
            Ok(d) => d,
            Err(e) => {
                return Submission {
                    distributor_id,
                    deployment_id: None,
                    result: ReleaseResult::failed(vec![synthetic_issue(
                        "STORE_ERROR",
                        e.to_string(),
                    )]),
                }
            }
        };
        let deployment_id = deployment.id.clone();

        let validation = adapter
            .validate_metadata(metadata)
            .await
            .merge(adapter.validate_assets(assets).await);
        if !validation.is_valid {
            let _ = self.store.update_status(
                &deployment_id,
                ReleaseStatus::Failed,
                StatusDetails {
                    errors: Some(validation.errors.clone()),
                    ..Default::default()
                },
            );
            return Submission {
                distributor_id,
                deployment_id: Some(deployment_id),
                result: ReleaseResult::failed(validation.errors),
            };
        }

        let _ = self.store.update_status(
            &deployment_id,
            ReleaseStatus::Processing,
            StatusDetails::default(),
        );

        match adapter.create_release(metadata, assets).await {
            Ok(result) => {
                let _ = self.store.update_status(
                    &deployment_id,
                    result.status,
                    StatusDetails {
                        external_id: result.distributor_release_id.clone(),
                        errors: if result.errors.is_empty() {
                            None
                        } else {
                            Some(result.errors.clone())
                        },
                        ..Default::default()
                    },
                );
                Submission {
                    distributor_id,
                    deployment_id: Some(deployment_id),
                    result,
                }
            }
            Err(error) => {
                let issue = synthetic_issue("SUBMISSION_ERROR", error.to_string());
                let _ = self.store.update_status(
                    &deployment_id,
                    ReleaseStatus::Failed,
                    StatusDetails {
                        errors: Some(vec![issue.clone()]),
                        ..Default::default()
                    },
                );
                Submission {
                    distributor_id,
                    deployment_id: Some(deployment_id),
                    result: ReleaseResult::failed(vec![issue]),
                }
            }
        }
    }

    /// Submit one release to many distributors concurrently.
    ///
    /// One task per distributor; a task's failure never cancels or blocks
    /// its siblings, and the aggregate waits for every task before
    /// returning. No mid-flight cancellation exists.
    pub async fn submit_to_many(self: Arc<Self>, request: FanOutRequest) -> FanOutResult {
        let FanOutRequest {
            metadata,
            assets,
            distributors,
            skip_failed_validation,
        } = request;

        let mut submissions: Vec<Submission> = Vec::new();
        let mut targets: Vec<DistributorId> = Vec::new();

        if skip_failed_validation {
            let this = &self;
            let metadata_ref = &metadata;
            let assets_ref = &assets;
            let outcomes = join_all(distributors.iter().map(|id| async move {
                (*id, this.validate_for(*id, metadata_ref, assets_ref).await)
            }))
            .await;
            for (id, outcome) in outcomes {
                match outcome {
                    Ok(o) if !o.is_valid => {
                        log_warning(format!("Skipping {}: pre-validation failed", id));
                        submissions.push(Submission {
                            distributor_id: id,
                            deployment_id: None,
                            result: ReleaseResult::failed(o.errors),
                        });
                    }
                    _ => targets.push(id),
                }
            }
        } else {
            targets = distributors.clone();
        }

        let mut handles = Vec::new();
        for id in targets {
            let orchestrator = Arc::clone(&self);
            let metadata = metadata.clone();
            let assets = assets.clone();
            handles.push((
                id,
                tokio::spawn(async move {
                    orchestrator.submit_release(id, &metadata, &assets).await
                }),
            ));
        }

        // Barrier: every sub-task settles before the aggregate returns.
        for (id, handle) in handles {
            match handle.await {
                Ok(submission) => submissions.push(submission),
                Err(join_error) => submissions.push(Submission {
                    distributor_id: id,
                    deployment_id: None,
                    result: ReleaseResult::failed(vec![synthetic_issue(
                        "SUBMISSION_ERROR",
                        format!("submission task aborted: {}", join_error),
                    )]),
                }),
            }
        }

        submissions.sort_by_key(|s| {
            distributors
                .iter()
                .position(|d| *d == s.distributor_id)
                .unwrap_or(usize::MAX)
        });

        let success_count = submissions.iter().filter(|s| s.result.success).count();
        let failed_count = submissions
            .iter()
            .filter(|s| s.result.status == ReleaseStatus::Failed)
            .count();
        let pending_count = submissions
            .iter()
            .filter(|s| s.result.status.is_pending())
            .count();

        FanOutResult {
            overall_success: success_count > 0 && failed_count == 0,
            summary: FanOutSummary {
                total_distributors: distributors.len(),
                success_count,
                failed_count,
                pending_count,
            },
            submissions,
        }
    }

    /// Poll every deployment of a release for its latest status and
    /// persist what came back.
    pub async fn refresh_release_status(&self, internal_release_id: &str) -> Vec<StatusReport> {
        let deployments = self.store.for_release(internal_release_id);
        join_all(deployments.into_iter().map(|deployment| {
            let adapter = self.adapters.get(&deployment.distributor_id).cloned();
            let store = Arc::clone(&self.store);
            let internal_id = internal_release_id.to_string();
            async move {
                let adapter = match adapter {
                    Some(a) => a,
                    None => {
                        return StatusReport {
                            distributor_id: deployment.distributor_id,
                            deployment_id: deployment.id,
                            status: Some(deployment.status),
                            connected: false,
                            error: Some("no adapter registered".into()),
                        }
                    }
                };
                if !adapter.is_connected().await {
                    return StatusReport {
                        distributor_id: deployment.distributor_id,
                        deployment_id: deployment.id,
                        status: Some(deployment.status),
                        connected: false,
                        error: None,
                    };
                }
                let external_id = deployment
                    .external_id
                    .clone()
                    .unwrap_or_else(|| internal_id.clone());
                match adapter.get_release_status(&external_id).await {
                    Ok(status) => {
                        let _ =
                            store.update_status(&deployment.id, status, StatusDetails::default());
                        StatusReport {
                            distributor_id: deployment.distributor_id,
                            deployment_id: deployment.id,
                            status: Some(status),
                            connected: true,
                            error: None,
                        }
                    }
                    Err(error) => StatusReport {
                        distributor_id: deployment.distributor_id,
                        deployment_id: deployment.id,
                        status: None,
                        connected: true,
                        error: Some(error.to_string()),
                    },
                }
            }
        }))
        .await
    }

    /// Request takedown of one deployment's release.
    ///
    /// Returns `None` when the deployment id is unknown.
    pub async fn takedown(&self, deployment_id: &str) -> Option<Submission> {
        let deployment = self.store.get(deployment_id)?;
        let adapter = match self.adapters.get(&deployment.distributor_id) {
            Some(a) => a,
            None => {
                return Some(Submission {
                    distributor_id: deployment.distributor_id,
                    deployment_id: Some(deployment.id),
                    result: ReleaseResult::failed(vec![synthetic_issue(
                        "UNKNOWN_DISTRIBUTOR",
                        format!("No adapter registered for {}", deployment.distributor_id),
                    )]),
                })
            }
        };

        let external_id = deployment
            .external_id
            .clone()
            .unwrap_or_else(|| deployment.internal_release_id.clone());

        match adapter.takedown_release(&external_id).await {
            Ok(result) => {
                let _ = self.store.update_status(
                    &deployment.id,
                    result.status,
                    StatusDetails::default(),
                );
                Some(Submission {
                    distributor_id: deployment.distributor_id,
                    deployment_id: Some(deployment.id),
                    result,
                })
            }
            // A failed takedown leaves the deployment where it was.
            Err(error) => Some(Submission {
                distributor_id: deployment.distributor_id,
                deployment_id: Some(deployment.id),
                result: ReleaseResult::failed(vec![synthetic_issue(
                    "TAKEDOWN_ERROR",
                    error.to_string(),
                )]),
            }),
        }
    }

    /// Fetch and aggregate earnings across all connected distributors.
    ///
    /// A single adapter's failure excludes it from the aggregate; it never
    /// aborts the aggregation.
    pub async fn aggregated_earnings(
        &self,
        release_id: &str,
        period: &DateRange,
    ) -> AggregatedEarnings {
        let ids = self.registered();
        let fetched = join_all(ids.into_iter().map(|id| {
            let adapter = Arc::clone(&self.adapters[&id]);
            let release_id = release_id.to_string();
            let period = period.clone();
            async move {
                if !adapter.is_connected().await {
                    return None;
                }
                match adapter.get_earnings(&release_id, &period).await {
                    Ok(earnings) => Some(earnings),
                    Err(error) => {
                        log_warning(format!("Failed to fetch earnings from {}: {}", id, error));
                        None
                    }
                }
            }
        }))
        .await;

        let by_distributor: Vec<DistributorEarnings> = fetched.into_iter().flatten().collect();

        let total_streams = by_distributor.iter().map(|e| e.streams).sum();
        let total_downloads = by_distributor.iter().map(|e| e.downloads).sum();
        let total_gross_revenue = by_distributor.iter().map(|e| e.gross_revenue).sum();
        let total_fees = by_distributor.iter().map(|e| e.distributor_fee).sum();
        let total_net_revenue = by_distributor.iter().map(|e| e.net_revenue).sum();
        let currency_code = by_distributor
            .first()
            .map(|e| e.currency_code.clone())
            .unwrap_or_else(|| "USD".to_string());

        let mut platforms: BTreeMap<String, GroupedEarnings> = BTreeMap::new();
        let mut territories: BTreeMap<String, GroupedEarnings> = BTreeMap::new();
        for earnings in &by_distributor {
            for slice in &earnings.breakdown {
                let platform = platforms
                    .entry(slice.platform.clone())
                    .or_insert_with(|| GroupedEarnings {
                        key: slice.platform.clone(),
                        streams: 0,
                        downloads: 0,
                        revenue: 0.0,
                    });
                platform.streams += slice.streams;
                platform.downloads += slice.downloads;
                platform.revenue += slice.revenue;

                let territory = territories
                    .entry(slice.territory_code.clone())
                    .or_insert_with(|| GroupedEarnings {
                        key: slice.territory_code.clone(),
                        streams: 0,
                        downloads: 0,
                        revenue: 0.0,
                    });
                territory.streams += slice.streams;
                territory.downloads += slice.downloads;
                territory.revenue += slice.revenue;
            }
        }

        AggregatedEarnings {
            release_id: release_id.to_string(),
            period: period.clone(),
            total_streams,
            total_downloads,
            total_gross_revenue,
            total_fees,
            total_net_revenue,
            currency_code,
            by_distributor,
            by_platform: platforms.into_values().collect(),
            by_territory: territories.into_values().collect(),
        }
    }
}
