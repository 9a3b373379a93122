//! Interchange codec: release-notification documents and sales reports.
//!
//! The release notification is a hierarchical JSON document with a
//! `NewReleaseMessage` (or `PurgeReleaseMessage`) root. Repeatable elements
//! (`Release`, `SoundRecording`, `Image`, `ReleaseDeal`, `Contributor`,
//! `TerritoryCode`, `UseType`, `ReleaseResourceReference`, `AiToolUsed`)
//! are always read through [`seq`], so a single element never collapses to
//! a scalar and positional access downstream stays valid.
//!
//! The sales report is a tab-delimited flat file with a header row. Rows
//! shorter than the header are tolerated: missing trailing fields read as
//! empty strings.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::{MessageError, MessageResult};
use crate::models::{
    AiDisclosure, ReportSummary, ReportingPeriod, SalesReport, Transaction, UsageType,
};

use super::types::{
    CommercialModel, Contributor, ContributorRole, Deal, Genre, MessageControlType, MessageHeader,
    MessageKind, ParentalWarning, Party, Release, ReleaseId, ReleaseMessage, ReleaseType,
    Resource, ResourceId, ResourceKind, UseType as DealUseType,
};

/// Schema version stamped on built messages.
pub const MESSAGE_SCHEMA_VERSION: &str = "4.3";

// =============================================================================
// Sequence coercion helpers
// =============================================================================

/// Read a repeatable element as an ordered sequence.
///
/// A missing element is an empty sequence; a single object is a one-element
/// sequence; an array is itself. Never a scalar.
fn seq<'a>(value: Option<&'a Value>) -> Vec<&'a Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

/// String content of a field, empty string when absent.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// String content of a field, `None` when absent or empty.
fn opt_text(value: Option<&Value>) -> Option<String> {
    let s = text(value);
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Repeatable element flattened into strings.
fn text_seq(value: Option<&Value>) -> Vec<String> {
    seq(value).into_iter().map(|v| text(Some(v))).collect()
}

// =============================================================================
// Release message parsing
// =============================================================================

/// Parse a release-notification document.
///
/// Fails with [`MessageError::MalformedMessage`] when neither a new-release
/// nor a purge-release root is present.
pub fn parse_release_message(content: &str) -> MessageResult<ReleaseMessage> {
    let doc: Value = serde_json::from_str(content)?;

    let (kind, root) = if let Some(root) = doc.get(MessageKind::NewRelease.root_name()) {
        (MessageKind::NewRelease, root)
    } else if let Some(root) = doc.get(MessageKind::PurgeRelease.root_name()) {
        (MessageKind::PurgeRelease, root)
    } else {
        return Err(MessageError::MalformedMessage {
            missing: "NewReleaseMessage or PurgeReleaseMessage".into(),
        });
    };

    let schema_version = opt_text(root.get("MessageSchemaVersionId"))
        .unwrap_or_else(|| MESSAGE_SCHEMA_VERSION.to_string());

    let releases = seq(root.get("ReleaseList").and_then(|l| l.get("Release")))
        .into_iter()
        .map(parse_release)
        .collect();

    let resource_list = root.get("ResourceList");
    let mut resources: Vec<Resource> = Vec::new();
    for value in seq(resource_list.and_then(|l| l.get("SoundRecording"))) {
        resources.push(parse_resource(value, ResourceKind::SoundRecording));
    }
    for value in seq(resource_list.and_then(|l| l.get("Image"))) {
        resources.push(parse_resource(value, ResourceKind::Image));
    }

    let deals = seq(root.get("DealList").and_then(|l| l.get("ReleaseDeal")))
        .into_iter()
        .map(parse_deal)
        .collect();

    Ok(ReleaseMessage {
        schema_version,
        kind,
        header: parse_header(root.get("MessageHeader")),
        releases,
        resources,
        deals,
    })
}

fn parse_header(value: Option<&Value>) -> MessageHeader {
    let header = value.cloned().unwrap_or(Value::Null);
    MessageHeader {
        message_id: text(header.get("MessageId")),
        sender: parse_party(header.get("MessageSender")),
        recipient: parse_party(header.get("MessageRecipient")),
        created_date_time: text(header.get("MessageCreatedDateTime")),
        control_type: MessageControlType::from_label(&text(header.get("MessageControlType"))),
    }
}

fn parse_party(value: Option<&Value>) -> Party {
    Party {
        party_id: text(value.and_then(|v| v.get("PartyId"))),
        party_name: text(value.and_then(|v| v.get("PartyName"))),
    }
}

fn parse_release(value: &Value) -> Release {
    let release_id = value.get("ReleaseId");
    Release {
        release_reference: text(value.get("ReleaseReference")),
        release_id: ReleaseId {
            icpn: opt_text(release_id.and_then(|v| v.get("ICPN"))),
            catalog_number: opt_text(release_id.and_then(|v| v.get("CatalogNumber"))),
        },
        release_type: ReleaseType::from_label(&text(value.get("ReleaseType"))),
        title: text(value.get("Title").and_then(|t| t.get("TitleText"))),
        display_artist_name: text(value.get("DisplayArtistName")),
        label_name: opt_text(value.get("LabelName")),
        genre: Genre {
            genre: text(value.get("Genre").and_then(|g| g.get("GenreText"))),
            sub_genre: opt_text(value.get("Genre").and_then(|g| g.get("SubGenre"))),
        },
        parental_warning: ParentalWarning::from_label(&text(value.get("ParentalWarningType"))),
        release_date: opt_text(value.get("ReleaseDate")),
        contributors: parse_contributors(value.get("Contributor")),
        resource_references: text_seq(
            value
                .get("ReleaseResourceReferenceList")
                .and_then(|l| l.get("ReleaseResourceReference")),
        ),
        ai_disclosure: parse_ai_disclosure(value.get("AiGenerationInfo")),
    }
}

fn parse_contributors(value: Option<&Value>) -> Vec<Contributor> {
    seq(value)
        .into_iter()
        .map(|v| Contributor {
            name: text(v.get("PartyName")),
            role: ContributorRole::from_label(&text(v.get("Role"))),
            sequence_number: v.get("SequenceNumber").and_then(|n| n.as_u64()).unwrap_or(0) as u32,
        })
        .collect()
}

fn parse_resource(value: &Value, kind: ResourceKind) -> Resource {
    let resource_id = value.get("ResourceId");
    Resource {
        resource_reference: text(value.get("ResourceReference")),
        kind,
        resource_id: ResourceId {
            isrc: opt_text(resource_id.and_then(|v| v.get("ISRC"))),
            proprietary_id: opt_text(resource_id.and_then(|v| v.get("ProprietaryId"))),
        },
        title: text(value.get("Title").and_then(|t| t.get("TitleText"))),
        display_artist_name: opt_text(value.get("DisplayArtistName")),
        duration_secs: parse_duration(value.get("Duration")),
        contributors: parse_contributors(value.get("Contributor")),
        is_instrumental: value.get("IsInstrumental").and_then(|v| v.as_bool()),
        language: opt_text(value.get("LanguageOfPerformance")),
        parental_warning: opt_text(value.get("ParentalWarningType"))
            .map(|label| ParentalWarning::from_label(&label)),
        ai_disclosure: parse_ai_disclosure(value.get("AiGenerationInfo")),
    }
}

/// Duration is carried as `PT{seconds}S`.
fn parse_duration(value: Option<&Value>) -> Option<u32> {
    let raw = opt_text(value)?;
    raw.strip_prefix("PT")?.strip_suffix('S')?.parse().ok()
}

fn parse_deal(value: &Value) -> Deal {
    let terms = value.get("DealTerms");
    let validity = terms.and_then(|t| t.get("ValidityPeriod"));
    Deal {
        deal_reference: text(value.get("DealReference")),
        commercial_model: CommercialModel::from_label(&text(
            terms.and_then(|t| t.get("CommercialModelType")),
        )),
        use_types: seq(terms.and_then(|t| t.get("Usage")).and_then(|u| u.get("UseType")))
            .into_iter()
            .filter_map(|v| DealUseType::from_label(&text(Some(v))))
            .collect(),
        territories: text_seq(terms.and_then(|t| t.get("TerritoryCode"))),
        start_date: text(validity.and_then(|v| v.get("StartDate"))),
        end_date: opt_text(validity.and_then(|v| v.get("EndDate"))),
        takedown: terms
            .and_then(|t| t.get("TakeDown"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
    }
}

fn parse_ai_disclosure(value: Option<&Value>) -> Option<AiDisclosure> {
    let value = value?;
    Some(AiDisclosure {
        is_fully_ai_generated: value
            .get("IsFullyAiGenerated")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        is_partially_ai_generated: value
            .get("IsPartiallyAiGenerated")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        tools_used: text_seq(value.get("AiToolUsed")),
        human_contribution: opt_text(value.get("HumanContributionDescription")),
    })
}

// =============================================================================
// Release message building
// =============================================================================

/// Build the document form of a release message.
///
/// The exact structural inverse of [`parse_release_message`] for every field
/// the mapper populates; repeatable elements are always emitted as arrays.
pub fn build_release_message(message: &ReleaseMessage) -> String {
    let sound_recordings: Vec<Value> = message
        .resources
        .iter()
        .filter(|r| r.kind == ResourceKind::SoundRecording)
        .map(build_resource)
        .collect();
    let images: Vec<Value> = message
        .resources
        .iter()
        .filter(|r| r.kind == ResourceKind::Image)
        .map(build_resource)
        .collect();

    let root = json!({
        "MessageSchemaVersionId": message.schema_version,
        "MessageHeader": build_header(&message.header),
        "ReleaseList": {
            "Release": message.releases.iter().map(build_release).collect::<Vec<_>>(),
        },
        "ResourceList": {
            "SoundRecording": sound_recordings,
            "Image": images,
        },
        "DealList": {
            "ReleaseDeal": message.deals.iter().map(build_deal).collect::<Vec<_>>(),
        },
    });

    let mut doc = Map::new();
    doc.insert(message.kind.root_name().to_string(), root);
    serde_json::to_string_pretty(&Value::Object(doc)).unwrap_or_default()
}

fn build_header(header: &MessageHeader) -> Value {
    json!({
        "MessageId": header.message_id,
        "MessageSender": {
            "PartyId": header.sender.party_id,
            "PartyName": header.sender.party_name,
        },
        "MessageRecipient": {
            "PartyId": header.recipient.party_id,
            "PartyName": header.recipient.party_name,
        },
        "MessageCreatedDateTime": header.created_date_time,
        "MessageControlType": header.control_type.as_str(),
    })
}

fn build_release(release: &Release) -> Value {
    let mut obj = Map::new();
    obj.insert("ReleaseReference".into(), json!(release.release_reference));

    let mut release_id = Map::new();
    if let Some(ref icpn) = release.release_id.icpn {
        release_id.insert("ICPN".into(), json!(icpn));
    }
    if let Some(ref catalog) = release.release_id.catalog_number {
        release_id.insert("CatalogNumber".into(), json!(catalog));
    }
    obj.insert("ReleaseId".into(), Value::Object(release_id));

    obj.insert("ReleaseType".into(), json!(release.release_type.as_str()));
    obj.insert("Title".into(), json!({ "TitleText": release.title }));
    obj.insert("DisplayArtistName".into(), json!(release.display_artist_name));
    if let Some(ref label) = release.label_name {
        obj.insert("LabelName".into(), json!(label));
    }

    let mut genre = Map::new();
    genre.insert("GenreText".into(), json!(release.genre.genre));
    if let Some(ref sub) = release.genre.sub_genre {
        genre.insert("SubGenre".into(), json!(sub));
    }
    obj.insert("Genre".into(), Value::Object(genre));

    obj.insert(
        "ParentalWarningType".into(),
        json!(release.parental_warning.as_str()),
    );
    if let Some(ref date) = release.release_date {
        obj.insert("ReleaseDate".into(), json!(date));
    }
    obj.insert("Contributor".into(), build_contributors(&release.contributors));
    obj.insert(
        "ReleaseResourceReferenceList".into(),
        json!({ "ReleaseResourceReference": release.resource_references }),
    );
    if let Some(ref disclosure) = release.ai_disclosure {
        obj.insert("AiGenerationInfo".into(), build_ai_disclosure(disclosure));
    }

    Value::Object(obj)
}

fn build_contributors(contributors: &[Contributor]) -> Value {
    Value::Array(
        contributors
            .iter()
            .map(|c| {
                json!({
                    "PartyName": c.name,
                    "Role": c.role.as_str(),
                    "SequenceNumber": c.sequence_number,
                })
            })
            .collect(),
    )
}

fn build_resource(resource: &Resource) -> Value {
    let mut obj = Map::new();
    obj.insert("ResourceReference".into(), json!(resource.resource_reference));

    let mut resource_id = Map::new();
    if let Some(ref isrc) = resource.resource_id.isrc {
        resource_id.insert("ISRC".into(), json!(isrc));
    }
    if let Some(ref proprietary) = resource.resource_id.proprietary_id {
        resource_id.insert("ProprietaryId".into(), json!(proprietary));
    }
    obj.insert("ResourceId".into(), Value::Object(resource_id));

    obj.insert("Title".into(), json!({ "TitleText": resource.title }));
    if let Some(ref artist) = resource.display_artist_name {
        obj.insert("DisplayArtistName".into(), json!(artist));
    }
    if let Some(secs) = resource.duration_secs {
        obj.insert("Duration".into(), json!(format!("PT{}S", secs)));
    }
    obj.insert("Contributor".into(), build_contributors(&resource.contributors));
    if let Some(instrumental) = resource.is_instrumental {
        obj.insert("IsInstrumental".into(), json!(instrumental));
    }
    if let Some(ref language) = resource.language {
        obj.insert("LanguageOfPerformance".into(), json!(language));
    }
    if let Some(warning) = resource.parental_warning {
        obj.insert("ParentalWarningType".into(), json!(warning.as_str()));
    }
    if let Some(ref disclosure) = resource.ai_disclosure {
        obj.insert("AiGenerationInfo".into(), build_ai_disclosure(disclosure));
    }

    Value::Object(obj)
}

fn build_deal(deal: &Deal) -> Value {
    let mut validity = Map::new();
    validity.insert("StartDate".into(), json!(deal.start_date));
    if let Some(ref end) = deal.end_date {
        validity.insert("EndDate".into(), json!(end));
    }

    json!({
        "DealReference": deal.deal_reference,
        "DealTerms": {
            "CommercialModelType": deal.commercial_model.as_str(),
            "Usage": {
                "UseType": deal.use_types.iter().map(|u| u.as_str()).collect::<Vec<_>>(),
            },
            "TerritoryCode": deal.territories,
            "ValidityPeriod": Value::Object(validity),
            "TakeDown": deal.takedown,
        },
    })
}

fn build_ai_disclosure(disclosure: &AiDisclosure) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "IsFullyAiGenerated".into(),
        json!(disclosure.is_fully_ai_generated),
    );
    obj.insert(
        "IsPartiallyAiGenerated".into(),
        json!(disclosure.is_partially_ai_generated),
    );
    if !disclosure.tools_used.is_empty() {
        obj.insert("AiToolUsed".into(), json!(disclosure.tools_used));
    }
    if let Some(ref human) = disclosure.human_contribution {
        obj.insert("HumanContributionDescription".into(), json!(human));
    }
    Value::Object(obj)
}

// =============================================================================
// Sales report parsing
// =============================================================================

/// Header labels recognized for each transaction field, in priority order.
const ISRC_COLUMNS: [&str; 2] = ["ISRC", "ResourceISRC"];
const TITLE_COLUMNS: [&str; 2] = ["Title", "TrackTitle"];
const USAGE_TYPE_COLUMNS: [&str; 2] = ["UsageType", "TransactionType"];
const USAGE_COUNT_COLUMNS: [&str; 2] = ["UsageCount", "Quantity"];
const REVENUE_COLUMNS: [&str; 2] = ["Revenue", "Amount"];
const CURRENCY_COLUMNS: [&str; 1] = ["Currency"];
const TERRITORY_COLUMNS: [&str; 2] = ["Territory", "Country"];
const SERVICE_COLUMNS: [&str; 2] = ["ServiceName", "DSP"];
const TRANSACTION_ID_COLUMNS: [&str; 1] = ["TransactionId"];

/// Parse a tab-delimited sales report.
///
/// The first line is the header; each following line is one usage
/// transaction. Rows shorter than the header are tolerated by treating the
/// missing trailing fields as empty strings.
pub fn parse_sales_report(content: &str) -> MessageResult<SalesReport> {
    let line_count = content.lines().filter(|l| !l.trim().is_empty()).count();
    if line_count < 2 {
        return Err(MessageError::ReportTooShort(line_count));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MessageError::ReportRow(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |names: &[&str]| -> Option<usize> {
        names
            .iter()
            .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
    };

    let isrc_col = column(&ISRC_COLUMNS);
    let title_col = column(&TITLE_COLUMNS);
    let usage_type_col = column(&USAGE_TYPE_COLUMNS);
    let usage_count_col = column(&USAGE_COUNT_COLUMNS);
    let revenue_col = column(&REVENUE_COLUMNS);
    let currency_col = column(&CURRENCY_COLUMNS);
    let territory_col = column(&TERRITORY_COLUMNS);
    let service_col = column(&SERVICE_COLUMNS);
    let transaction_id_col = column(&TRANSACTION_ID_COLUMNS);

    let mut transactions = Vec::new();
    let mut currency_code = String::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| MessageError::ReportRow(e.to_string()))?;
        let field = |col: Option<usize>| -> String {
            col.and_then(|i| record.get(i))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        if currency_code.is_empty() {
            currency_code = field(currency_col);
        }

        let transaction_id = match field(transaction_id_col) {
            id if id.is_empty() => format!("TX-{}", index),
            id => id,
        };
        let territory = match field(territory_col) {
            t if t.is_empty() => "US".to_string(),
            t => t,
        };

        transactions.push(Transaction {
            transaction_id,
            isrc: field(isrc_col),
            track_title: Some(field(title_col)).filter(|t| !t.is_empty()),
            usage_type: UsageType::from_label(&field(usage_type_col)),
            usage_count: field(usage_count_col).parse().unwrap_or(0),
            revenue_amount: field(revenue_col).parse().unwrap_or(0.0),
            territory_code: territory,
            service_name: Some(field(service_col)).filter(|s| !s.is_empty()),
        });
    }

    if currency_code.is_empty() {
        currency_code = "USD".to_string();
    }

    let mut report = SalesReport {
        report_id: format!("DSR-{}", Uuid::new_v4()),
        reporting_period: ReportingPeriod::default(),
        currency_code,
        transactions,
        summary: ReportSummary::default(),
    };
    report.recompute_summary();
    Ok(report)
}

/// Parse report bytes, auto-detecting the encoding first.
///
/// Distributor reports arrive in UTF-8, ISO-8859 or Windows-1252 depending
/// on the backoffice that produced them.
pub fn parse_sales_report_bytes(bytes: &[u8]) -> MessageResult<SalesReport> {
    let encoding = detect_encoding(bytes);
    let content = decode_report_bytes(bytes, &encoding)?;
    parse_sales_report(&content)
}

/// Detect the encoding of raw report bytes.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode report bytes with the given encoding.
pub fn decode_report_bytes(bytes: &[u8], encoding: &str) -> MessageResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => Ok(String::from_utf8_lossy(bytes).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::*;

    fn sample_message() -> ReleaseMessage {
        ReleaseMessage {
            schema_version: MESSAGE_SCHEMA_VERSION.to_string(),
            kind: MessageKind::NewRelease,
            header: MessageHeader {
                message_id: "MSG-1".into(),
                sender: Party {
                    party_id: "PADPIDA001".into(),
                    party_name: "Mute Records".into(),
                },
                recipient: Party {
                    party_id: "PADPIDB002".into(),
                    party_name: "Distributor".into(),
                },
                created_date_time: "2024-03-01T12:00:00Z".into(),
                control_type: MessageControlType::LiveMessage,
            },
            releases: vec![Release {
                release_reference: "R1".into(),
                release_id: ReleaseId {
                    icpn: Some("123456789012".into()),
                    catalog_number: Some("MUTE123".into()),
                },
                release_type: ReleaseType::Single,
                title: "Midnight City".into(),
                display_artist_name: "M83".into(),
                label_name: Some("Mute Records".into()),
                genre: Genre {
                    genre: "Electronic".into(),
                    sub_genre: None,
                },
                parental_warning: ParentalWarning::NotExplicit,
                release_date: Some("2011-10-18".into()),
                contributors: vec![Contributor {
                    name: "M83".into(),
                    role: ContributorRole::MainArtist,
                    sequence_number: 1,
                }],
                resource_references: vec!["A1".into(), "IMG1".into()],
                ai_disclosure: None,
            }],
            resources: vec![
                Resource {
                    resource_reference: "A1".into(),
                    kind: ResourceKind::SoundRecording,
                    resource_id: ResourceId {
                        isrc: Some("USM831100012".into()),
                        proprietary_id: None,
                    },
                    title: "Midnight City".into(),
                    display_artist_name: Some("M83".into()),
                    duration_secs: Some(244),
                    contributors: vec![Contributor {
                        name: "M83".into(),
                        role: ContributorRole::MainArtist,
                        sequence_number: 1,
                    }],
                    is_instrumental: Some(false),
                    language: Some("en".into()),
                    parental_warning: Some(ParentalWarning::NotExplicit),
                    ai_disclosure: None,
                },
                Resource {
                    resource_reference: "IMG1".into(),
                    kind: ResourceKind::Image,
                    resource_id: ResourceId {
                        isrc: None,
                        proprietary_id: Some("IMG-USM831100012".into()),
                    },
                    title: "Front Cover Image".into(),
                    display_artist_name: None,
                    duration_secs: None,
                    contributors: vec![],
                    is_instrumental: None,
                    language: None,
                    parental_warning: None,
                    ai_disclosure: None,
                },
            ],
            deals: vec![Deal {
                deal_reference: "D1".into(),
                commercial_model: CommercialModel::SubscriptionModel,
                use_types: vec![DealUseType::OnDemandStream, DealUseType::PermanentDownload],
                territories: vec!["Worldwide".into()],
                start_date: "2011-10-18".into(),
                end_date: None,
                takedown: false,
            }],
        }
    }

    #[test]
    fn test_missing_root_is_malformed() {
        let result = parse_release_message(r#"{"SomethingElse": {}}"#);
        let err = result.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("NewReleaseMessage"));
        assert!(msg.contains("PurgeReleaseMessage"));
    }

    #[test]
    fn test_purge_root_is_accepted() {
        let message = parse_release_message(r#"{"PurgeReleaseMessage": {}}"#).unwrap();
        assert_eq!(message.kind, MessageKind::PurgeRelease);
        assert!(message.releases.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_mapped_fields() {
        let original = sample_message();
        let document = build_release_message(&original);
        let parsed = parse_release_message(&document).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_single_elements_parse_as_sequences() {
        // Producer emitted bare objects where lists are expected.
        let document = r#"{
            "NewReleaseMessage": {
                "MessageHeader": { "MessageId": "MSG-9" },
                "ReleaseList": {
                    "Release": {
                        "ReleaseReference": "R1",
                        "Title": { "TitleText": "Solo" },
                        "DisplayArtistName": "One Artist",
                        "Contributor": {
                            "PartyName": "One Artist",
                            "Role": "MainArtist",
                            "SequenceNumber": 1
                        },
                        "ReleaseResourceReferenceList": {
                            "ReleaseResourceReference": "A1"
                        }
                    }
                },
                "ResourceList": {
                    "SoundRecording": {
                        "ResourceReference": "A1",
                        "ResourceId": { "ISRC": "USXYZ2400001" },
                        "Title": { "TitleText": "Solo" }
                    }
                },
                "DealList": {
                    "ReleaseDeal": {
                        "DealReference": "D1",
                        "DealTerms": {
                            "CommercialModelType": "SubscriptionModel",
                            "Usage": { "UseType": "OnDemandStream" },
                            "TerritoryCode": "Worldwide",
                            "ValidityPeriod": { "StartDate": "2024-01-01" }
                        }
                    }
                }
            }
        }"#;

        let message = parse_release_message(document).unwrap();
        assert_eq!(message.releases.len(), 1);
        assert_eq!(message.resources.len(), 1);
        assert_eq!(message.deals.len(), 1);
        // Positional access must hold on one-element sequences.
        assert_eq!(message.releases[0].contributors[0].name, "One Artist");
        assert_eq!(message.releases[0].resource_references[0], "A1");
        assert_eq!(message.deals[0].territories[0], "Worldwide");
        assert_eq!(message.deals[0].use_types[0], DealUseType::OnDemandStream);
    }

    #[test]
    fn test_sales_report_parsing() {
        let content = "ISRC\tTitle\tUsageType\tUsageCount\tRevenue\tCurrency\tTerritory\tServiceName\n\
                       USM831100012\tMidnight City\tOnDemandStream\t1500\t6.45\tUSD\tUS\tSpotify\n\
                       USM831100012\tMidnight City\tDownload\t3\t2.97\tUSD\tDE\tiTunes\n";
        let report = parse_sales_report(content).unwrap();

        assert_eq!(report.transactions.len(), 2);
        assert_eq!(report.currency_code, "USD");
        assert_eq!(report.transactions[0].usage_type, UsageType::OnDemandStream);
        assert_eq!(report.transactions[0].usage_count, 1500);
        assert_eq!(report.transactions[1].territory_code, "DE");
        assert_eq!(report.summary.total_streams, 1500);
        assert_eq!(report.summary.total_downloads, 3);
        assert!((report.summary.total_revenue - 9.42).abs() < 1e-9);
    }

    #[test]
    fn test_short_rows_read_missing_fields_as_empty() {
        let content = "ISRC\tTitle\tUsageType\tUsageCount\tRevenue\tCurrency\tTerritory\n\
                       USM831100012\tMidnight City\tDownload\n";
        let report = parse_sales_report(content).unwrap();

        assert_eq!(report.transactions.len(), 1);
        let txn = &report.transactions[0];
        assert_eq!(txn.usage_count, 0);
        assert_eq!(txn.revenue_amount, 0.0);
        assert_eq!(txn.territory_code, "US");
        assert_eq!(report.currency_code, "USD");
    }

    #[test]
    fn test_header_only_report_is_too_short() {
        let result = parse_sales_report("ISRC\tUsageType\tRevenue\n");
        assert!(matches!(result, Err(MessageError::ReportTooShort(1))));
    }

    #[test]
    fn test_alternate_report_columns() {
        let content = "ResourceISRC\tTrackTitle\tTransactionType\tQuantity\tAmount\tCountry\tDSP\n\
                       GBAYE0601498\tSong\tstreaming\t10\t0.05\tFR\tDeezer\n";
        let report = parse_sales_report(content).unwrap();

        let txn = &report.transactions[0];
        assert_eq!(txn.isrc, "GBAYE0601498");
        assert_eq!(txn.usage_type, UsageType::OnDemandStream);
        assert_eq!(txn.territory_code, "FR");
        assert_eq!(txn.service_name.as_deref(), Some("Deezer"));
    }

    #[test]
    fn test_latin1_report_bytes_decode() {
        // "Société" in ISO-8859-1 inside a service name column.
        let mut content: Vec<u8> = b"ISRC\tUsageType\tUsageCount\tRevenue\tServiceName\n".to_vec();
        content.extend_from_slice(b"FRXXX2400001\tDownload\t1\t0.99\tSoci\xE9t\xE9\n");
        let report = parse_sales_report_bytes(&content).unwrap();

        assert_eq!(report.transactions.len(), 1);
        let service = report.transactions[0].service_name.as_deref().unwrap();
        assert!(service.starts_with("Soci"));
    }
}
