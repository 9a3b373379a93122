//! Maps catalog metadata into a release-notification message.
//!
//! Reference tokens are assigned deterministically (release "R1", audio
//! resources "A1"…, images "IMG1"…, audio before image) so identical input
//! always produces an identical message.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{CatalogMetadata, RoyaltySplit, SplitRole};

use super::codec::MESSAGE_SCHEMA_VERSION;
use super::types::{
    CommercialModel, Contributor, ContributorRole, Deal, Genre, MessageControlType, MessageHeader,
    MessageKind, ParentalWarning, Party, Release, ReleaseId, ReleaseMessage, ReleaseType,
    Resource, ResourceId, ResourceKind, UseType,
};

// =============================================================================
// Options
// =============================================================================

/// Per-message inputs the catalog does not carry.
#[derive(Debug, Clone)]
pub struct MessageOptions {
    pub message_id: String,
    pub sender: Party,
    pub recipient: Party,
    pub created_date_time: String,
    pub control_type: MessageControlType,
    /// Explicit commercial deals; when empty a default worldwide deal is
    /// synthesized from the metadata.
    pub deals: Vec<Deal>,
}

impl MessageOptions {
    /// Fresh options with a generated message id and current timestamp.
    pub fn new(sender: Party, recipient: Party) -> Self {
        Self {
            message_id: format!("MSG-{}", Uuid::new_v4()),
            sender,
            recipient,
            created_date_time: Utc::now().to_rfc3339(),
            control_type: MessageControlType::LiveMessage,
            deals: Vec::new(),
        }
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Build one release-notification message from one catalog entry.
pub fn map_release_notification(
    metadata: &CatalogMetadata,
    options: MessageOptions,
) -> ReleaseMessage {
    let release_reference = "R1".to_string();

    // Audio before image, sequential counters per resource type.
    let mut audio_counter = 0u32;
    let mut image_counter = 0u32;
    let mut resources = Vec::new();
    let mut resource_references = Vec::new();

    audio_counter += 1;
    let audio_reference = format!("A{}", audio_counter);
    resource_references.push(audio_reference.clone());
    resources.push(build_audio_resource(metadata, audio_reference));

    image_counter += 1;
    let image_reference = format!("IMG{}", image_counter);
    resource_references.push(image_reference.clone());
    resources.push(build_image_resource(metadata, image_reference));

    let contributors = map_contributors(&metadata.splits, &metadata.artist_name);

    let release = Release {
        release_reference: release_reference.clone(),
        release_id: ReleaseId {
            icpn: metadata.upc.clone(),
            catalog_number: metadata.catalog_number.clone(),
        },
        release_type: ReleaseType::Single,
        title: metadata.display_title().to_string(),
        display_artist_name: metadata.artist_name.clone(),
        label_name: metadata.label_name.clone(),
        genre: Genre {
            genre: metadata.genre.clone(),
            sub_genre: metadata.sub_genre.clone(),
        },
        parental_warning: parental_warning(metadata),
        release_date: Some(metadata.release_date.clone()),
        contributors,
        resource_references,
        ai_disclosure: metadata.ai_disclosure.clone(),
    };

    let deals = if options.deals.is_empty() {
        vec![default_deal(metadata)]
    } else {
        options.deals
    };

    ReleaseMessage {
        schema_version: MESSAGE_SCHEMA_VERSION.to_string(),
        kind: MessageKind::NewRelease,
        header: MessageHeader {
            message_id: options.message_id,
            sender: options.sender,
            recipient: options.recipient,
            created_date_time: options.created_date_time,
            control_type: options.control_type,
        },
        releases: vec![release],
        resources,
        deals,
    }
}

/// Map the split sheet to the message contributor vocabulary.
///
/// When the display artist's legal name is absent from the splits, a
/// synthetic MainArtist entry leads the list. A split naming the display
/// artist is always forced to MainArtist regardless of its declared role.
pub fn map_contributors(splits: &[RoyaltySplit], display_artist: &str) -> Vec<Contributor> {
    let mut contributors = Vec::new();

    let artist_in_splits = splits.iter().any(|s| s.legal_name == display_artist);
    if !artist_in_splits {
        contributors.push(Contributor {
            name: display_artist.to_string(),
            role: ContributorRole::MainArtist,
            sequence_number: 0,
        });
    }

    for split in splits {
        contributors.push(Contributor {
            name: split.legal_name.clone(),
            role: message_role(split, display_artist),
            sequence_number: 0,
        });
    }

    for (index, contributor) in contributors.iter_mut().enumerate() {
        contributor.sequence_number = index as u32 + 1;
    }
    contributors
}

fn message_role(split: &RoyaltySplit, display_artist: &str) -> ContributorRole {
    if split.legal_name == display_artist {
        return ContributorRole::MainArtist;
    }
    match split.role {
        SplitRole::Songwriter => ContributorRole::Composer,
        SplitRole::Producer => ContributorRole::Producer,
        SplitRole::Performer => ContributorRole::FeaturedArtist,
        SplitRole::Other => ContributorRole::AssociatedPerformer,
    }
}

fn parental_warning(metadata: &CatalogMetadata) -> ParentalWarning {
    if metadata.explicit {
        ParentalWarning::Explicit
    } else {
        ParentalWarning::NotExplicit
    }
}

fn build_audio_resource(metadata: &CatalogMetadata, reference: String) -> Resource {
    Resource {
        resource_reference: reference,
        kind: ResourceKind::SoundRecording,
        resource_id: ResourceId {
            isrc: metadata.isrc.clone(),
            proprietary_id: None,
        },
        title: metadata.track_title.clone(),
        display_artist_name: Some(metadata.artist_name.clone()),
        duration_secs: metadata.duration_secs,
        contributors: map_contributors(&metadata.splits, &metadata.artist_name),
        is_instrumental: Some(metadata.instrumental),
        language: metadata.language.clone(),
        parental_warning: Some(parental_warning(metadata)),
        ai_disclosure: metadata.ai_disclosure.clone(),
    }
}

fn build_image_resource(metadata: &CatalogMetadata, reference: String) -> Resource {
    let proprietary_id = match metadata.isrc {
        Some(ref isrc) => format!("IMG-{}", isrc),
        None => format!("IMG-{}", metadata.release_id),
    };
    Resource {
        resource_reference: reference,
        kind: ResourceKind::Image,
        resource_id: ResourceId {
            isrc: None,
            proprietary_id: Some(proprietary_id),
        },
        title: "Front Cover Image".to_string(),
        display_artist_name: Some(metadata.artist_name.clone()),
        duration_secs: None,
        contributors: Vec::new(),
        is_instrumental: None,
        language: None,
        parental_warning: None,
        ai_disclosure: None,
    }
}

/// Worldwide streaming + permanent-download deal starting at the release
/// date, used when no explicit deal is supplied.
fn default_deal(metadata: &CatalogMetadata) -> Deal {
    let territories = if metadata.territories.is_empty() {
        vec!["Worldwide".to_string()]
    } else {
        metadata.territories.clone()
    };
    Deal {
        deal_reference: "D1".to_string(),
        commercial_model: CommercialModel::SubscriptionModel,
        use_types: vec![UseType::OnDemandStream, UseType::PermanentDownload],
        territories,
        start_date: metadata.release_date.clone(),
        end_date: None,
        takedown: false,
    }
}
