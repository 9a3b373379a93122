//! Interchange message object model.
//!
//! A [`ReleaseMessage`] is an immutable snapshot: releases, resources and
//! deals reference each other by plain string tokens ("R1", "A1", "IMG1"),
//! assigned deterministically by the mapper, never by pointer.

use serde::{Deserialize, Serialize};

use crate::models::AiDisclosure;

// =============================================================================
// Header
// =============================================================================

/// A sending or receiving party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub party_id: String,
    pub party_name: String,
}

/// Whether the message is live or a delivery test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MessageControlType {
    #[default]
    LiveMessage,
    TestMessage,
}

impl MessageControlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiveMessage => "LiveMessage",
            Self::TestMessage => "TestMessage",
        }
    }

    pub fn from_label(label: &str) -> Self {
        if label == "TestMessage" {
            Self::TestMessage
        } else {
            Self::LiveMessage
        }
    }
}

/// Message header: identity, parties and creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub message_id: String,
    pub sender: Party,
    pub recipient: Party,
    pub created_date_time: String,
    pub control_type: MessageControlType,
}

// =============================================================================
// Releases
// =============================================================================

/// Commercial product identifier of a release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseId {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icpn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_number: Option<String>,
}

/// Product type of a release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReleaseType {
    #[default]
    Single,
    Ep,
    Album,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Ep => "EP",
            Self::Album => "Album",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "EP" => Self::Ep,
            "Album" => Self::Album,
            _ => Self::Single,
        }
    }
}

/// Contributor role vocabulary used in messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContributorRole {
    MainArtist,
    FeaturedArtist,
    Composer,
    Producer,
    AssociatedPerformer,
}

impl ContributorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainArtist => "MainArtist",
            Self::FeaturedArtist => "FeaturedArtist",
            Self::Composer => "Composer",
            Self::Producer => "Producer",
            Self::AssociatedPerformer => "AssociatedPerformer",
        }
    }

    /// Unrecognized labels fall back to `AssociatedPerformer`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "MainArtist" => Self::MainArtist,
            "FeaturedArtist" => Self::FeaturedArtist,
            "Composer" => Self::Composer,
            "Producer" => Self::Producer,
            _ => Self::AssociatedPerformer,
        }
    }
}

/// One contributor entry on a release or resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub name: String,
    pub role: ContributorRole,
    pub sequence_number: u32,
}

/// Parental advisory marking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ParentalWarning {
    Explicit,
    NotExplicit,
    #[default]
    NoAdviceAvailable,
}

impl ParentalWarning {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "Explicit",
            Self::NotExplicit => "NotExplicit",
            Self::NoAdviceAvailable => "NoAdviceAvailable",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Explicit" => Self::Explicit,
            "NotExplicit" => Self::NotExplicit,
            _ => Self::NoAdviceAvailable,
        }
    }
}

/// Genre with optional sub-genre.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_genre: Option<String>,
}

/// One release section of the message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub release_reference: String,
    pub release_id: ReleaseId,
    pub release_type: ReleaseType,
    pub title: String,
    pub display_artist_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_name: Option<String>,
    pub genre: Genre,
    pub parental_warning: ParentalWarning,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    pub contributors: Vec<Contributor>,
    /// Ordered tokens pointing at entries in the resource list.
    pub resource_references: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_disclosure: Option<AiDisclosure>,
}

// =============================================================================
// Resources
// =============================================================================

/// Kind of a resource entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceKind {
    SoundRecording,
    Image,
}

/// Identifier of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proprietary_id: Option<String>,
}

/// One resource section of the message (sound recording or image).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub resource_reference: String,
    pub kind: ResourceKind,
    pub resource_id: ResourceId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_artist_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    pub contributors: Vec<Contributor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_instrumental: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parental_warning: Option<ParentalWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_disclosure: Option<AiDisclosure>,
}

// =============================================================================
// Deals
// =============================================================================

/// Commercial model of a deal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CommercialModel {
    #[default]
    SubscriptionModel,
    PayAsYouGoModel,
    AdvertisementSupportedModel,
}

impl CommercialModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionModel => "SubscriptionModel",
            Self::PayAsYouGoModel => "PayAsYouGoModel",
            Self::AdvertisementSupportedModel => "AdvertisementSupportedModel",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "PayAsYouGoModel" => Self::PayAsYouGoModel,
            "AdvertisementSupportedModel" => Self::AdvertisementSupportedModel,
            _ => Self::SubscriptionModel,
        }
    }
}

/// Permitted usage under a deal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UseType {
    OnDemandStream,
    PermanentDownload,
    ConditionalDownload,
}

impl UseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnDemandStream => "OnDemandStream",
            Self::PermanentDownload => "PermanentDownload",
            Self::ConditionalDownload => "ConditionalDownload",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "OnDemandStream" => Some(Self::OnDemandStream),
            "PermanentDownload" => Some(Self::PermanentDownload),
            "ConditionalDownload" => Some(Self::ConditionalDownload),
            _ => None,
        }
    }
}

/// One commercial deal attached to the release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub deal_reference: String,
    pub commercial_model: CommercialModel,
    pub use_types: Vec<UseType>,
    pub territories: Vec<String>,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub takedown: bool,
}

// =============================================================================
// Message
// =============================================================================

/// Which root the document carried.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    NewRelease,
    PurgeRelease,
}

impl MessageKind {
    /// Root element name in the document form.
    pub fn root_name(&self) -> &'static str {
        match self {
            Self::NewRelease => "NewReleaseMessage",
            Self::PurgeRelease => "PurgeReleaseMessage",
        }
    }
}

/// A complete release-notification message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMessage {
    pub schema_version: String,
    pub kind: MessageKind,
    pub header: MessageHeader,
    pub releases: Vec<Release>,
    pub resources: Vec<Resource>,
    pub deals: Vec<Deal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contributor_role_labels() {
        assert_eq!(ContributorRole::from_label("MainArtist"), ContributorRole::MainArtist);
        assert_eq!(
            ContributorRole::from_label("SessionMusician"),
            ContributorRole::AssociatedPerformer
        );
        assert_eq!(ContributorRole::Composer.as_str(), "Composer");
    }

    #[test]
    fn test_use_type_labels_are_strict() {
        assert_eq!(UseType::from_label("OnDemandStream"), Some(UseType::OnDemandStream));
        assert_eq!(UseType::from_label("stream"), None);
    }

    #[test]
    fn test_message_kind_roots() {
        assert_eq!(MessageKind::NewRelease.root_name(), "NewReleaseMessage");
        assert_eq!(MessageKind::PurgeRelease.root_name(), "PurgeReleaseMessage");
    }
}
