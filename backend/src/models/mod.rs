//! Domain models for the Songcast distribution pipeline.
//!
//! This module contains the core data structures shared across the pipeline:
//!
//! - [`CatalogMetadata`] - Release/track metadata with contributor splits
//! - [`SalesReport`] - Parsed usage/revenue report batch
//! - [`ReleaseDeployment`] - Per-distributor lifecycle record
//! - [`DistributorRequirements`] - Static per-distributor validation rules
//! - [`DistributorId`] / [`ReleaseStatus`] - Closed identifier and lifecycle
//!   vocabularies

mod distribution;
mod metadata;
mod report;

pub use distribution::{
    AggregatedEarnings, AudioAsset, AudioFormat, AudioRules, ConnectionStatus, CoverArtAsset,
    CoverArtRules, Credentials, DateRange, DeploymentFilter, DistributorEarnings, DistributorId,
    DistributorRequirements, EarningsBreakdown, GroupedEarnings, ImageFormat, MetadataRules,
    PricingModel, PricingRules, ReleaseAssets, ReleaseDeployment, ReleaseResult, ReleaseStatus,
    Severity, TimingRules, ValidationIssue, ValidationOutcome,
};
pub use metadata::{AiDisclosure, CatalogMetadata, RoyaltySplit, SplitRole};
pub use report::{ReportSummary, ReportingPeriod, SalesReport, Transaction, UsageType};
