//! Enrichment and session-credit message builders.
//!
//! Two outbound-only message kinds accompany the release notification:
//! an enrichment message carrying promotional copy, biographies and lyrics,
//! and a session-credit message carrying per-recording contributor and
//! studio-session data. Both reuse the release message header block and the
//! mapper's reference tokens.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::models::CatalogMetadata;

use super::mapper::MessageOptions;
use super::types::MessageHeader;

// =============================================================================
// Enrichment message
// =============================================================================

/// Promotional copy for one release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromotionalDetails {
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_message: Option<String>,
}

/// One artist biography block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistBiography {
    pub artist_name: String,
    pub biography_text: String,
}

/// Lyrics block attached to a recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LyricsBlock {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One recording entry in the enrichment message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResource {
    pub resource_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<LyricsBlock>,
}

/// One release entry in the enrichment message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRelease {
    pub release_reference: String,
    pub territory_code: String,
    pub display_artist_name: String,
    pub promotional: PromotionalDetails,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub biographies: Vec<ArtistBiography>,
    pub resources: Vec<EnrichmentResource>,
}

/// Media-enrichment message (promotional copy, biographies, lyrics).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentMessage {
    pub schema_version: String,
    pub header: MessageHeader,
    pub releases: Vec<EnrichmentRelease>,
}

/// Build an enrichment message from catalog metadata.
pub fn build_enrichment(metadata: &CatalogMetadata, options: MessageOptions) -> EnrichmentMessage {
    let biographies = metadata
        .description
        .as_ref()
        .map(|text| {
            vec![ArtistBiography {
                artist_name: metadata.artist_name.clone(),
                biography_text: text.clone(),
            }]
        })
        .unwrap_or_default();

    let resources = vec![EnrichmentResource {
        resource_reference: "A1".to_string(),
        isrc: metadata.isrc.clone(),
        lyrics: metadata.lyrics.as_ref().map(|text| LyricsBlock {
            text: text.clone(),
            language: metadata.language.clone(),
        }),
    }];

    EnrichmentMessage {
        schema_version: "1.0".to_string(),
        header: MessageHeader {
            message_id: options.message_id,
            sender: options.sender,
            recipient: options.recipient,
            created_date_time: options.created_date_time,
            control_type: options.control_type,
        },
        releases: vec![EnrichmentRelease {
            release_reference: "R1".to_string(),
            territory_code: "Worldwide".to_string(),
            display_artist_name: metadata.artist_name.clone(),
            promotional: PromotionalDetails {
                headline: metadata.display_title().to_string(),
                marketing_message: metadata.description.clone(),
            },
            biographies,
            resources,
        }],
    }
}

/// Document form of an enrichment message, root `EnrichmentMessage`.
pub fn build_enrichment_document(message: &EnrichmentMessage) -> String {
    let releases: Vec<Value> = message
        .releases
        .iter()
        .map(|r| {
            let mut obj = Map::new();
            obj.insert("ReleaseReference".into(), json!(r.release_reference));
            obj.insert("TerritoryCode".into(), json!(r.territory_code));
            obj.insert("DisplayArtistName".into(), json!(r.display_artist_name));
            obj.insert(
                "PromotionalDetails".into(),
                json!({
                    "Headline": r.promotional.headline,
                    "MarketingMessage": r.promotional.marketing_message,
                }),
            );
            if !r.biographies.is_empty() {
                obj.insert(
                    "ArtistBiography".into(),
                    Value::Array(
                        r.biographies
                            .iter()
                            .map(|b| {
                                json!({
                                    "ArtistName": b.artist_name,
                                    "BiographyText": b.biography_text,
                                })
                            })
                            .collect(),
                    ),
                );
            }
            obj.insert(
                "Resource".into(),
                Value::Array(
                    r.resources
                        .iter()
                        .map(|res| {
                            let mut entry = Map::new();
                            entry.insert(
                                "ResourceReference".into(),
                                json!(res.resource_reference),
                            );
                            if let Some(ref isrc) = res.isrc {
                                entry.insert("ResourceId".into(), json!({ "ISRC": isrc }));
                            }
                            if let Some(ref lyrics) = res.lyrics {
                                entry.insert(
                                    "Lyrics".into(),
                                    json!({
                                        "Text": lyrics.text,
                                        "LanguageAndScriptCode": lyrics.language,
                                    }),
                                );
                            }
                            Value::Object(entry)
                        })
                        .collect(),
                ),
            );
            Value::Object(obj)
        })
        .collect();

    let mut doc = Map::new();
    doc.insert(
        "EnrichmentMessage".into(),
        json!({
            "MessageSchemaVersionId": message.schema_version,
            "MessageHeader": {
                "MessageId": message.header.message_id,
                "MessageSender": {
                    "PartyId": message.header.sender.party_id,
                    "PartyName": message.header.sender.party_name,
                },
                "MessageRecipient": {
                    "PartyId": message.header.recipient.party_id,
                    "PartyName": message.header.recipient.party_name,
                },
                "MessageCreatedDateTime": message.header.created_date_time,
                "MessageControlType": message.header.control_type.as_str(),
            },
            "ReleaseList": { "Release": releases },
        }),
    );
    serde_json::to_string_pretty(&Value::Object(doc)).unwrap_or_default()
}

// =============================================================================
// Session-credit message
// =============================================================================

/// One credited participant on a recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionContributor {
    pub party_name: String,
    pub roles: Vec<String>,
}

/// One studio session attached to a recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudioSession {
    pub session_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    pub participants: Vec<SessionContributor>,
}

/// One recording entry in the session-credit message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecording {
    pub resource_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,
    pub title: String,
    pub contributors: Vec<SessionContributor>,
    pub sessions: Vec<StudioSession>,
}

/// Session-credit message (recording credits and studio sessions).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreditMessage {
    pub schema_version: String,
    pub header: MessageHeader,
    pub recordings: Vec<SessionRecording>,
}

/// Build a session-credit message from catalog metadata.
///
/// Split-sheet entries are carried as recording credits; the session date
/// falls back to the release date when no session data is on file.
pub fn build_session_credits(
    metadata: &CatalogMetadata,
    options: MessageOptions,
) -> SessionCreditMessage {
    let contributors: Vec<SessionContributor> = metadata
        .splits
        .iter()
        .map(|split| SessionContributor {
            party_name: split.legal_name.clone(),
            roles: vec![split.role.as_label().to_string()],
        })
        .collect();

    let sessions = vec![StudioSession {
        session_date: metadata.release_date.clone(),
        studio_name: None,
        country_code: None,
        participants: contributors.clone(),
    }];

    SessionCreditMessage {
        schema_version: "1.1".to_string(),
        header: MessageHeader {
            message_id: options.message_id,
            sender: options.sender,
            recipient: options.recipient,
            created_date_time: options.created_date_time,
            control_type: options.control_type,
        },
        recordings: vec![SessionRecording {
            resource_reference: "A1".to_string(),
            isrc: metadata.isrc.clone(),
            title: metadata.track_title.clone(),
            contributors,
            sessions,
        }],
    }
}

/// Document form of a session-credit message, root `SessionCreditMessage`.
pub fn build_session_credits_document(message: &SessionCreditMessage) -> String {
    let recordings: Vec<Value> = message
        .recordings
        .iter()
        .map(|rec| {
            let contributors: Vec<Value> = rec
                .contributors
                .iter()
                .map(|c| json!({ "PartyName": c.party_name, "Role": c.roles }))
                .collect();
            let sessions: Vec<Value> = rec
                .sessions
                .iter()
                .map(|s| {
                    json!({
                        "SessionDate": s.session_date,
                        "StudioName": s.studio_name,
                        "CountryCode": s.country_code,
                        "Participant": s.participants
                            .iter()
                            .map(|p| json!({ "PartyName": p.party_name, "Role": p.roles }))
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            let mut obj = Map::new();
            obj.insert("ResourceReference".into(), json!(rec.resource_reference));
            if let Some(ref isrc) = rec.isrc {
                obj.insert("ResourceId".into(), json!({ "ISRC": isrc }));
            }
            obj.insert("Title".into(), json!({ "TitleText": rec.title }));
            obj.insert("Contributor".into(), Value::Array(contributors));
            obj.insert("StudioSession".into(), Value::Array(sessions));
            Value::Object(obj)
        })
        .collect();

    let mut doc = Map::new();
    doc.insert(
        "SessionCreditMessage".into(),
        json!({
            "MessageSchemaVersionId": message.schema_version,
            "MessageHeader": {
                "MessageId": message.header.message_id,
                "MessageSender": {
                    "PartyId": message.header.sender.party_id,
                    "PartyName": message.header.sender.party_name,
                },
                "MessageRecipient": {
                    "PartyId": message.header.recipient.party_id,
                    "PartyName": message.header.recipient.party_name,
                },
                "MessageCreatedDateTime": message.header.created_date_time,
                "MessageControlType": message.header.control_type.as_str(),
            },
            "SoundRecordingList": { "SoundRecording": recordings },
        }),
    );
    serde_json::to_string_pretty(&Value::Object(doc)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::Party;

    fn metadata() -> CatalogMetadata {
        CatalogMetadata {
            release_id: "rel-1".into(),
            release_title: None,
            track_title: "Midnight City".into(),
            artist_name: "M83".into(),
            isrc: Some("USM831100012".into()),
            upc: None,
            catalog_number: None,
            label_name: None,
            genre: "Electronic".into(),
            sub_genre: None,
            language: Some("en".into()),
            release_date: "2011-10-18".into(),
            explicit: false,
            instrumental: false,
            duration_secs: None,
            territories: vec![],
            splits: vec![crate::models::RoyaltySplit {
                contributor_id: "a".into(),
                legal_name: "M83".into(),
                role: crate::models::SplitRole::Songwriter,
                percentage: 100.0,
            }],
            description: Some("Anthemic synth single.".into()),
            lyrics: Some("Waiting in a car...".into()),
            ai_disclosure: None,
        }
    }

    fn options() -> MessageOptions {
        MessageOptions {
            message_id: "MSG-2".into(),
            sender: Party {
                party_id: "P1".into(),
                party_name: "Sender".into(),
            },
            recipient: Party {
                party_id: "P2".into(),
                party_name: "Recipient".into(),
            },
            created_date_time: "2024-03-01T12:00:00Z".into(),
            control_type: Default::default(),
            deals: Vec::new(),
        }
    }

    #[test]
    fn test_enrichment_carries_bio_and_lyrics() {
        let message = build_enrichment(&metadata(), options());
        let release = &message.releases[0];

        assert_eq!(release.promotional.headline, "Midnight City");
        assert_eq!(release.biographies.len(), 1);
        assert_eq!(release.biographies[0].artist_name, "M83");
        let lyrics = release.resources[0].lyrics.as_ref().unwrap();
        assert!(lyrics.text.starts_with("Waiting"));
        assert_eq!(lyrics.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_enrichment_without_description_has_no_bio() {
        let mut m = metadata();
        m.description = None;
        m.lyrics = None;
        let message = build_enrichment(&m, options());

        assert!(message.releases[0].biographies.is_empty());
        assert!(message.releases[0].resources[0].lyrics.is_none());
    }

    #[test]
    fn test_session_credits_carry_split_roles() {
        let message = build_session_credits(&metadata(), options());
        let recording = &message.recordings[0];

        assert_eq!(recording.resource_reference, "A1");
        assert_eq!(recording.contributors[0].party_name, "M83");
        assert_eq!(recording.contributors[0].roles, vec!["songwriter"]);
        assert_eq!(recording.sessions[0].session_date, "2011-10-18");
        assert_eq!(recording.sessions[0].participants.len(), 1);
    }

    #[test]
    fn test_documents_have_expected_roots() {
        let enrichment = build_enrichment(&metadata(), options());
        let doc = build_enrichment_document(&enrichment);
        assert!(doc.contains("\"EnrichmentMessage\""));
        assert!(doc.contains("Midnight City"));

        let credits = build_session_credits(&metadata(), options());
        let doc = build_session_credits_document(&credits);
        assert!(doc.contains("\"SessionCreditMessage\""));
        assert!(doc.contains("USM831100012"));
    }
}
