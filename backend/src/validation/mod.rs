//! Schema and business-rule validation for interchange documents.
//!
//! Two layers run before a document leaves the system or is accepted into
//! it:
//!
//! ## Schema layer
//!
//! The document form is checked against a JSON Schema (Draft 7) embedded at
//! compile time from `schemas/release-message.schema.json`. This catches
//! structural defects: wrong root, missing header, title-less releases.
//!
//! ## Business-rule layer
//!
//! [`check_release_message`] runs logical rules schema validation cannot
//! express: party ids present, at least one release, each release carrying
//! a product identifier (ICPN or catalog number) and a title.

use serde_json::Value;

use crate::message::ReleaseMessage;

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one entry per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Boolean-only variant of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

fn release_message_schema() -> Value {
    serde_json::from_str(include_str!("../../schemas/release-message.schema.json"))
        .expect("Invalid embedded schema")
}

/// Validate a release-notification document against the embedded schema.
pub fn validate_release_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&release_message_schema(), data)
}

/// Quick check against the embedded release-document schema.
pub fn is_valid_release_document(data: &Value) -> bool {
    is_valid(&release_message_schema(), data)
}

/// Business rules for a parsed release message.
///
/// Returns one finding per violated rule; empty means the message is
/// acceptable for submission.
pub fn check_release_message(message: &ReleaseMessage) -> Vec<String> {
    let mut errors = Vec::new();

    if message.header.message_id.is_empty() {
        errors.push("MessageId is missing".to_string());
    }
    if message.header.sender.party_id.is_empty() {
        errors.push("MessageSender PartyId is missing".to_string());
    }

    if message.releases.is_empty() {
        errors.push("No releases found in message".to_string());
    } else {
        for (index, release) in message.releases.iter().enumerate() {
            if release.release_id.icpn.is_none() && release.release_id.catalog_number.is_none() {
                errors.push(format!(
                    "Release {}: must have an ICPN or catalog number",
                    index + 1
                ));
            }
            if release.title.is_empty() {
                errors.push(format!("Release {}: title is missing", index + 1));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        map_release_notification, parse_release_message, MessageOptions, Party,
    };
    use crate::models::{CatalogMetadata, RoyaltySplit, SplitRole};
    use serde_json::json;

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
            release_date: "2024-06-01".into(),
            explicit: false,
            instrumental: false,
            duration_secs: None,
            territories: vec![],
            splits: vec![RoyaltySplit {
                contributor_id: "a".into(),
                legal_name: "Test Artist".into(),
                role: SplitRole::Performer,
                percentage: 100.0,
            }],
            description: None,
            lyrics: None,
            ai_disclosure: None,
        }
    }

    #[test]
    fn test_built_document_passes_schema() {
        let message = map_release_notification(
            &metadata(),
            MessageOptions::new(
                Party {
                    party_id: "P1".into(),
                    party_name: "Sender".into(),
                },
                Party {
                    party_id: "P2".into(),
                    party_name: "Recipient".into(),
                },
            ),
        );
        let document: Value =
            serde_json::from_str(&crate::message::build_release_message(&message)).unwrap();
        assert!(is_valid_release_document(&document));
    }

    #[test]
    fn test_unknown_root_fails_schema() {
        let document = json!({ "SomethingElse": {} });
        assert!(!is_valid_release_document(&document));
    }

    #[test]
    fn test_missing_header_fails_schema() {
        let document = json!({ "NewReleaseMessage": { "ReleaseList": {} } });
        let result = validate_release_document(&document);
        assert!(result.is_err());
        assert!(!result.unwrap_err().is_empty());
    }

    #[test]
    fn test_business_rules_flag_missing_product_id() {
        let document = r#"{
            "NewReleaseMessage": {
                "MessageHeader": {
                    "MessageId": "MSG-1",
                    "MessageSender": { "PartyId": "P1", "PartyName": "S" }
                },
                "ReleaseList": {
                    "Release": {
                        "ReleaseReference": "R1",
                        "Title": { "TitleText": "No Product Id" }
                    }
                }
            }
        }"#;
        let message = parse_release_message(document).unwrap();
        let errors = check_release_message(&message);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ICPN or catalog number"));
    }

    #[test]
    fn test_business_rules_flag_empty_message() {
        let message = parse_release_message(r#"{"NewReleaseMessage": {}}"#).unwrap();
        let errors = check_release_message(&message);
        assert!(errors.iter().any(|e| e.contains("MessageId")));
        assert!(errors.iter().any(|e| e.contains("No releases")));
    }
}
