//! # Songcast - release exchange and royalty settlement pipeline
//!
//! Songcast converts catalog metadata into industry interchange messages,
//! delivers releases to distributors concurrently, tracks each deployment's
//! lifecycle durably, and reconciles sales reports into per-contributor
//! royalty payments.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌───────────────┐    ┌─────────────┐
//! │   Catalog    │───▶│    Mapper    │───▶│  Interchange  │───▶│ Distributor │
//! │   Metadata   │    │ (refs/roles) │    │   document    │    │  adapters   │
//! └──────────────┘    └──────────────┘    └───────────────┘    └──────┬──────┘
//!                                                                    │
//! ┌──────────────┐    ┌──────────────┐    ┌───────────────┐          ▼
//! │ Sales report │───▶│    Codec     │───▶│Royalty engine │    ┌─────────────┐
//! │  (flat file) │    │ (tab-delim)  │    │ (fees/splits) │    │ Deployment  │
//! └──────────────┘    └──────────────┘    └───────────────┘    │    store    │
//!                                                              └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use songcast::{DistributionOrchestrator, FanOutRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let orchestrator = std::sync::Arc::new(
//!         DistributionOrchestrator::builder().build(),
//!     );
//!     let result = orchestrator.submit_to_many(request).await;
//!     println!("{} delivered", result.summary.success_count);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (metadata, reports, deployments)
//! - [`message`] - Interchange codec and mappers
//! - [`validation`] - Schema and business-rule checks
//! - [`royalty`] - Royalty calculation engine
//! - [`distribution`] - Adapter contract, adapters, orchestrator
//! - [`transport`] - Delivery transport
//! - [`store`] - Deployment store
//! - [`credentials`] - Credential boundary
//! - [`api`] - HTTP API server and log stream

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Interchange
pub mod message;

// Validation
pub mod validation;

// Settlement
pub mod royalty;

// Distribution
pub mod credentials;
pub mod distribution;
pub mod store;
pub mod transport;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AdapterError, CredentialError, DistributionError, MessageError, ServerError, StoreError,
    TransportError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AggregatedEarnings, CatalogMetadata, Credentials, DateRange, DistributorEarnings,
    DistributorId, DistributorRequirements, ReleaseAssets, ReleaseDeployment, ReleaseResult,
    ReleaseStatus, RoyaltySplit, SalesReport, SplitRole, Transaction, UsageType, ValidationIssue,
    ValidationOutcome,
};

// =============================================================================
// Re-exports - Interchange
// =============================================================================

pub use message::{
    build_enrichment, build_enrichment_document, build_release_message, build_session_credits,
    build_session_credits_document, map_release_notification, parse_release_message,
    parse_sales_report, parse_sales_report_bytes, MessageOptions, Party, ReleaseMessage,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    check_release_message, is_valid, is_valid_release_document, validate,
    validate_release_document,
};

// =============================================================================
// Re-exports - Royalty engine
// =============================================================================

pub use royalty::{calculate_royalties, ContributorPayment, FeeConfig, RoyaltyCalculation};

// =============================================================================
// Re-exports - Distribution
// =============================================================================

pub use distribution::{
    CdBabyAdapter, DistributionOrchestrator, DistributorAdapter, FanOutRequest, FanOutResult,
    PackageBuilder, StatusReport, Submission, TuneCoreAdapter,
};

// =============================================================================
// Re-exports - Transport / Store / Credentials
// =============================================================================

pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use store::{DeploymentStore, StatusDetails};
pub use transport::{DeliveryTransport, DropFolderTransport, TransportConfig};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::AppConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
