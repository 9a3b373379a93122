//! Shared requirement checks adapters run against metadata and assets.
//!
//! Each finding carries a machine-readable code, a human message and the
//! offending field. Errors block submission; lead-time shortfalls are
//! advisory and surface as warnings.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{
    CatalogMetadata, DistributorRequirements, ReleaseAssets, ValidationIssue, ValidationOutcome,
};

static ISRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{3}[0-9]{7}$").expect("invalid ISRC pattern"));
static UPC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{12,14}$").expect("invalid UPC pattern"));

/// Check metadata against one distributor's rules.
///
/// `today` anchors the lead-time check so callers (and tests) control the
/// clock.
pub fn check_metadata(
    metadata: &CatalogMetadata,
    requirements: &DistributorRequirements,
    today: NaiveDate,
) -> ValidationOutcome {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let rules = &requirements.metadata;

    for field in &rules.required_fields {
        if field_is_empty(metadata, field) {
            errors.push(ValidationIssue::error(
                "MISSING_FIELD",
                format!("{} is required", field),
                field,
            ));
        }
    }

    if metadata.track_title.len() > rules.max_title_length {
        errors.push(ValidationIssue::error(
            "TITLE_TOO_LONG",
            format!("Track title exceeds {} characters", rules.max_title_length),
            "trackTitle",
        ));
    }
    if metadata.artist_name.len() > rules.max_artist_name_length {
        errors.push(ValidationIssue::error(
            "ARTIST_NAME_TOO_LONG",
            format!(
                "Artist name exceeds {} characters",
                rules.max_artist_name_length
            ),
            "artistName",
        ));
    }

    match metadata.isrc {
        Some(ref isrc) if !ISRC_RE.is_match(isrc) => {
            errors.push(ValidationIssue::error(
                "INVALID_ISRC",
                format!("'{}' is not a valid ISRC", isrc),
                "isrc",
            ));
        }
        None if rules.isrc_required => {
            errors.push(ValidationIssue::error(
                "MISSING_ISRC",
                "An ISRC is required",
                "isrc",
            ));
        }
        _ => {}
    }

    match metadata.upc {
        Some(ref upc) if !UPC_RE.is_match(upc) => {
            errors.push(ValidationIssue::error(
                "INVALID_UPC",
                format!("'{}' is not a valid UPC/ICPN", upc),
                "upc",
            ));
        }
        None if rules.upc_required => {
            errors.push(ValidationIssue::error(
                "MISSING_UPC",
                "A UPC is required",
                "upc",
            ));
        }
        _ => {}
    }

    match NaiveDate::parse_from_str(&metadata.release_date, "%Y-%m-%d") {
        Ok(release_date) => {
            let lead_days = (release_date - today).num_days();
            if lead_days < requirements.timing.min_lead_time_days {
                warnings.push(format!(
                    "Release date {} leaves {} day(s) of lead time, {} recommends {}",
                    metadata.release_date,
                    lead_days.max(0),
                    requirements.distributor_id,
                    requirements.timing.min_lead_time_days
                ));
            }
        }
        Err(_) => {
            errors.push(ValidationIssue::error(
                "INVALID_RELEASE_DATE",
                format!("'{}' is not a YYYY-MM-DD date", metadata.release_date),
                "releaseDate",
            ));
        }
    }

    ValidationOutcome::from_findings(errors, warnings)
}

/// Check assets against one distributor's rules.
pub fn check_assets(
    assets: &ReleaseAssets,
    requirements: &DistributorRequirements,
) -> ValidationOutcome {
    let mut errors = Vec::new();
    let audio_rules = &requirements.audio;
    let cover_rules = &requirements.cover_art;

    if !audio_rules.allowed_formats.contains(&assets.audio.format) {
        errors.push(ValidationIssue::error(
            "AUDIO_FORMAT",
            format!("Audio format {:?} is not accepted", assets.audio.format),
            "audio.format",
        ));
    }
    if assets.audio.sample_rate < audio_rules.min_sample_rate {
        errors.push(ValidationIssue::error(
            "SAMPLE_RATE",
            format!(
                "Sample rate {} Hz is below the {} Hz minimum",
                assets.audio.sample_rate, audio_rules.min_sample_rate
            ),
            "audio.sampleRate",
        ));
    }
    if assets.audio.bit_depth < audio_rules.min_bit_depth {
        errors.push(ValidationIssue::error(
            "BIT_DEPTH",
            format!(
                "Bit depth {} is below the {}-bit minimum",
                assets.audio.bit_depth, audio_rules.min_bit_depth
            ),
            "audio.bitDepth",
        ));
    }

    let cover = &assets.cover_art;
    if !cover_rules.allowed_formats.contains(&cover.format) {
        errors.push(ValidationIssue::error(
            "COVER_FORMAT",
            format!("Cover format {:?} is not accepted", cover.format),
            "coverArt.format",
        ));
    }
    if cover.width != cover.height {
        errors.push(ValidationIssue::error(
            "COVER_NOT_SQUARE",
            format!("Cover art must be square, got {}x{}", cover.width, cover.height),
            "coverArt",
        ));
    }
    if cover.width < cover_rules.min_width || cover.height < cover_rules.min_height {
        errors.push(ValidationIssue::error(
            "COVER_TOO_SMALL",
            format!(
                "Cover art {}x{} is below the {}x{} minimum",
                cover.width, cover.height, cover_rules.min_width, cover_rules.min_height
            ),
            "coverArt",
        ));
    }
    if cover.width > cover_rules.max_width || cover.height > cover_rules.max_height {
        errors.push(ValidationIssue::error(
            "COVER_TOO_LARGE",
            format!(
                "Cover art {}x{} exceeds the {}x{} maximum",
                cover.width, cover.height, cover_rules.max_width, cover_rules.max_height
            ),
            "coverArt",
        ));
    }
    if cover.size_bytes > cover_rules.max_size_bytes {
        errors.push(ValidationIssue::error(
            "COVER_FILE_SIZE",
            format!(
                "Cover art file is {} bytes, limit is {}",
                cover.size_bytes, cover_rules.max_size_bytes
            ),
            "coverArt.sizeBytes",
        ));
    }

    ValidationOutcome::from_findings(errors, Vec::new())
}

fn field_is_empty(metadata: &CatalogMetadata, field: &str) -> bool {
    match field {
        "trackTitle" => metadata.track_title.is_empty(),
        "artistName" => metadata.artist_name.is_empty(),
        "genre" => metadata.genre.is_empty(),
        "releaseDate" => metadata.release_date.is_empty(),
        "language" => metadata.language.as_deref().unwrap_or("").is_empty(),
        "labelName" => metadata.label_name.as_deref().unwrap_or("").is_empty(),
        // Unknown rule keys never block a submission.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AudioAsset, AudioFormat, AudioRules, CoverArtAsset, CoverArtRules, DistributorId,
        ImageFormat, MetadataRules, PricingModel, PricingRules, TimingRules,
    };

    fn requirements() -> DistributorRequirements {
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

    fn assets() -> ReleaseAssets {
        ReleaseAssets {
            audio: AudioAsset {
                path: "/tmp/master.wav".into(),
                format: AudioFormat::Wav,
                sample_rate: 44_100,
                bit_depth: 16,
                size_bytes: 40_000_000,
            },
            cover_art: CoverArtAsset {
                path: "/tmp/cover.jpg".into(),
                format: ImageFormat::Jpg,
                width: 3000,
                height: 3000,
                size_bytes: 4_000_000,
            },
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2029, 1, 1).unwrap()
    }

    #[test]
    fn test_clean_inputs_pass() {
        assert!(check_metadata(&metadata(), &requirements(), today()).is_valid);
        assert!(check_assets(&assets(), &requirements()).is_valid);
    }

    #[test]
    fn test_missing_required_field() {
        let mut m = metadata();
        m.genre = String::new();
        let outcome = check_metadata(&m, &requirements(), today());
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors[0].code, "MISSING_FIELD");
        assert_eq!(outcome.errors[0].field.as_deref(), Some("genre"));
    }

    #[test]
    fn test_bad_identifiers_flagged() {
        let mut m = metadata();
        m.isrc = Some("not-an-isrc".into());
        m.upc = Some("1234".into());
        let outcome = check_metadata(&m, &requirements(), today());
        let codes: Vec<&str> = outcome.errors.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"INVALID_ISRC"));
        assert!(codes.contains(&"INVALID_UPC"));
    }

    #[test]
    fn test_short_lead_time_is_a_warning() {
        let mut m = metadata();
        m.release_date = "2029-01-03".into();
        let outcome = check_metadata(&m, &requirements(), today());
        assert!(outcome.is_valid);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("lead time"));
    }

    #[test]
    fn test_unparseable_release_date_is_an_error() {
        let mut m = metadata();
        m.release_date = "next friday".into();
        let outcome = check_metadata(&m, &requirements(), today());
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors[0].code, "INVALID_RELEASE_DATE");
    }

    #[test]
    fn test_undersized_cover_rejected() {
        let mut a = assets();
        a.cover_art.width = 800;
        a.cover_art.height = 800;
        let outcome = check_assets(&a, &requirements());
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors[0].code, "COVER_TOO_SMALL");
    }

    #[test]
    fn test_non_square_cover_rejected() {
        let mut a = assets();
        a.cover_art.height = 2000;
        let outcome = check_assets(&a, &requirements());
        assert!(outcome.errors.iter().any(|e| e.code == "COVER_NOT_SQUARE"));
    }

    #[test]
    fn test_unsupported_audio_format_rejected() {
        let mut a = assets();
        a.audio.format = AudioFormat::Mp3;
        a.audio.sample_rate = 22_050;
        let outcome = check_assets(&a, &requirements());
        let codes: Vec<&str> = outcome.errors.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"AUDIO_FORMAT"));
        assert!(codes.contains(&"SAMPLE_RATE"));
    }
}
