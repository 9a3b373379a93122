//! Catalog metadata for a release and its royalty splits.

use serde::{Deserialize, Serialize};

// =============================================================================
// Split Role
// =============================================================================

/// Role a contributor holds in a release's split sheet.
///
/// Unrecognized role labels deserialize as [`SplitRole::Other`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitRole {
    /// Wrote the underlying composition.
    Songwriter,
    /// Produced the recording.
    Producer,
    /// Performed on the recording.
    Performer,
    /// Any other credited role.
    #[serde(other)]
    Other,
}

impl SplitRole {
    /// Parse a role from a free-form label.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "songwriter" | "writer" | "composer" => Self::Songwriter,
            "producer" => Self::Producer,
            "performer" | "artist" | "main artist" | "featured artist" => Self::Performer,
            _ => Self::Other,
        }
    }

    /// Label used in reports and payment records.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Songwriter => "songwriter",
            Self::Producer => "producer",
            Self::Performer => "performer",
            Self::Other => "other",
        }
    }
}

// =============================================================================
// Royalty Split
// =============================================================================

/// One contributor's contractual share of net royalty revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltySplit {
    /// Stable contributor identifier (account id, email, etc.).
    pub contributor_id: String,
    /// Legal name as it appears on the split sheet.
    pub legal_name: String,
    /// Declared role.
    pub role: SplitRole,
    /// Percentage share (0-100). Shares are applied as declared and are
    /// never normalized, even when the sheet does not sum to 100.
    pub percentage: f64,
}

// =============================================================================
// AI Disclosure
// =============================================================================

/// Generative-content disclosure flags, copied through to messages verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiDisclosure {
    pub is_fully_ai_generated: bool,
    pub is_partially_ai_generated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tools_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_contribution: Option<String>,
}

// =============================================================================
// Catalog Metadata
// =============================================================================

/// Complete metadata for one release in the catalog.
///
/// This is the internal model the mapper converts into an interchange
/// message and the royalty engine resolves sales transactions against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    /// Internal release identifier.
    pub release_id: String,
    /// Release (product) title. Falls back to the track title for singles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_title: Option<String>,
    /// Primary recording title.
    pub track_title: String,
    /// Display artist name.
    pub artist_name: String,
    /// ISRC of the primary recording.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    /// UPC/ICPN of the release product.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    /// Label catalog number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_number: Option<String>,
    /// Record label name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_name: Option<String>,
    /// Primary genre.
    pub genre: String,
    /// Secondary genre.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_genre: Option<String>,
    /// Language of performance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Planned release date (YYYY-MM-DD).
    pub release_date: String,
    /// Explicit-lyrics flag.
    #[serde(default)]
    pub explicit: bool,
    /// Instrumental recording (no lyrics).
    #[serde(default)]
    pub instrumental: bool,
    /// Recording duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    /// Commercial territories; empty means worldwide.
    #[serde(default)]
    pub territories: Vec<String>,
    /// Contributor split sheet.
    #[serde(default)]
    pub splits: Vec<RoyaltySplit>,
    /// Promotional description / liner notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lyrics of the primary recording.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    /// Generative-content disclosure, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_disclosure: Option<AiDisclosure>,
}

impl CatalogMetadata {
    /// Title used on the release product (release title, else track title).
    pub fn display_title(&self) -> &str {
        self.release_title.as_deref().unwrap_or(&self.track_title)
    }

    /// Sum of declared split percentages.
    pub fn split_total(&self) -> f64 {
        self.splits.iter().map(|s| s.percentage).sum()
    }

    /// Whether the split sheet allocates exactly 100% (within tolerance).
    pub fn splits_balanced(&self) -> bool {
        (self.split_total() - 100.0).abs() < 1e-6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_with_splits(splits: Vec<RoyaltySplit>) -> CatalogMetadata {
        CatalogMetadata {
            release_id: "rel-1".into(),
            release_title: None,
            track_title: "Midnight City".into(),
            artist_name: "M83".into(),
            isrc: Some("USM831100012".into()),
            upc: Some("123456789012".into()),
            catalog_number: Some("MUTE123".into()),
            label_name: Some("Mute Records".into()),
            genre: "Electronic".into(),
            sub_genre: None,
            language: Some("en".into()),
            release_date: "2011-10-18".into(),
            explicit: false,
            instrumental: false,
            duration_secs: Some(244),
            territories: vec![],
            splits,
            description: None,
            lyrics: None,
            ai_disclosure: None,
        }
    }

    #[test]
    fn test_split_role_from_label() {
        assert_eq!(SplitRole::from_label("Songwriter"), SplitRole::Songwriter);
        assert_eq!(SplitRole::from_label("PRODUCER"), SplitRole::Producer);
        assert_eq!(SplitRole::from_label("performer"), SplitRole::Performer);
        assert_eq!(SplitRole::from_label("mixing engineer"), SplitRole::Other);
    }

    #[test]
    fn test_split_total_unbalanced_is_not_an_error() {
        let metadata = metadata_with_splits(vec![
            RoyaltySplit {
                contributor_id: "a".into(),
                legal_name: "A".into(),
                role: SplitRole::Songwriter,
                percentage: 60.0,
            },
            RoyaltySplit {
                contributor_id: "b".into(),
                legal_name: "B".into(),
                role: SplitRole::Producer,
                percentage: 30.0,
            },
        ]);
        assert!((metadata.split_total() - 90.0).abs() < 1e-9);
        assert!(!metadata.splits_balanced());
    }

    #[test]
    fn test_display_title_falls_back_to_track() {
        let mut metadata = metadata_with_splits(vec![]);
        assert_eq!(metadata.display_title(), "Midnight City");
        metadata.release_title = Some("Hurry Up, We're Dreaming".into());
        assert_eq!(metadata.display_title(), "Hurry Up, We're Dreaming");
    }

    #[test]
    fn test_unknown_role_deserializes_as_other() {
        let split: RoyaltySplit = serde_json::from_str(
            r#"{"contributorId":"x","legalName":"X","role":"arranger","percentage":10.0}"#,
        )
        .unwrap();
        assert_eq!(split.role, SplitRole::Other);
    }
}
