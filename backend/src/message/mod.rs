//! Interchange message layer: object model, codec and mappers.
//!
//! - [`types`] - message object model (header, releases, resources, deals)
//! - [`codec`] - parse/build release documents, parse sales reports
//! - [`mapper`] - catalog metadata to release-notification mapping
//! - [`enrichment`] - enrichment and session-credit message builders

pub mod codec;
pub mod enrichment;
pub mod mapper;
pub mod types;

pub use codec::{
    build_release_message, parse_release_message, parse_sales_report, parse_sales_report_bytes,
    MESSAGE_SCHEMA_VERSION,
};
pub use enrichment::{
    build_enrichment, build_enrichment_document, build_session_credits,
    build_session_credits_document, EnrichmentMessage, SessionCreditMessage,
};
pub use mapper::{map_contributors, map_release_notification, MessageOptions};
pub use types::{
    CommercialModel, Contributor, ContributorRole, Deal, Genre, MessageControlType, MessageHeader,
    MessageKind, ParentalWarning, Party, Release, ReleaseId, ReleaseMessage, ReleaseType,
    Resource, ResourceId, ResourceKind, UseType,
};
