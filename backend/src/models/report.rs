//! Sales/usage report model.
//!
//! A report is a discrete batch of usage transactions for a period. The
//! summary is derived from the transaction list and recomputed whenever the
//! list changes, never mutated independently.

use serde::{Deserialize, Serialize};

// =============================================================================
// Usage Type
// =============================================================================

/// Classification of one usage transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UsageType {
    OnDemandStream,
    ProgrammedStream,
    Download,
    RingtoneDownload,
    Other,
}

impl UsageType {
    /// Parse a usage-type label as distributors write them.
    ///
    /// Exact labels are matched first, then a fuzzy match on the family
    /// keyword, since report vocabularies vary by service.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "ondemandstream" | "on-demand stream" => Self::OnDemandStream,
            "programmedstream" | "programmed stream" => Self::ProgrammedStream,
            "download" | "permanentdownload" => Self::Download,
            "ringtonedownload" | "ringtone" => Self::RingtoneDownload,
            _ if normalized.contains("programmed") => Self::ProgrammedStream,
            _ if normalized.contains("stream") => Self::OnDemandStream,
            _ if normalized.contains("ringtone") => Self::RingtoneDownload,
            _ if normalized.contains("download") => Self::Download,
            _ => Self::Other,
        }
    }

    /// Whether the usage counts toward stream totals.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::OnDemandStream | Self::ProgrammedStream)
    }

    /// Whether the usage counts toward download totals.
    pub fn is_download(&self) -> bool {
        matches!(self, Self::Download | Self::RingtoneDownload)
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// One usage transaction from a sales report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    /// ISRC of the consumed recording; resolvable against the catalog.
    pub isrc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_title: Option<String>,
    pub usage_type: UsageType,
    pub usage_count: u64,
    pub revenue_amount: f64,
    pub territory_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

// =============================================================================
// Reporting Period and Summary
// =============================================================================

/// Inclusive date range a report covers.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportingPeriod {
    pub start_date: String,
    pub end_date: String,
}

/// Derived totals over a report's transaction list.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_usage_count: u64,
    pub total_revenue: f64,
    pub total_streams: u64,
    pub total_downloads: u64,
}

// =============================================================================
// Sales Report
// =============================================================================

/// A parsed sales report batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub report_id: String,
    pub reporting_period: ReportingPeriod,
    pub currency_code: String,
    pub transactions: Vec<Transaction>,
    pub summary: ReportSummary,
}

impl SalesReport {
    /// Recompute the derived summary from the transaction list.
    pub fn recompute_summary(&mut self) {
        let mut summary = ReportSummary::default();
        for txn in &self.transactions {
            summary.total_usage_count += txn.usage_count;
            summary.total_revenue += txn.revenue_amount;
            if txn.usage_type.is_stream() {
                summary.total_streams += txn.usage_count;
            } else if txn.usage_type.is_download() {
                summary.total_downloads += txn.usage_count;
            }
        }
        self.summary = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(usage_type: UsageType, count: u64, revenue: f64) -> Transaction {
        Transaction {
            transaction_id: "TX-1".into(),
            isrc: "USM831100012".into(),
            track_title: None,
            usage_type,
            usage_count: count,
            revenue_amount: revenue,
            territory_code: "US".into(),
            service_name: None,
        }
    }

    #[test]
    fn test_usage_type_labels() {
        assert_eq!(UsageType::from_label("OnDemandStream"), UsageType::OnDemandStream);
        assert_eq!(UsageType::from_label("Programmed Stream"), UsageType::ProgrammedStream);
        assert_eq!(UsageType::from_label("subscription streaming"), UsageType::OnDemandStream);
        assert_eq!(UsageType::from_label("Download"), UsageType::Download);
        assert_eq!(UsageType::from_label("Ringtone"), UsageType::RingtoneDownload);
        assert_eq!(UsageType::from_label("Sync License"), UsageType::Other);
    }

    #[test]
    fn test_summary_recompute() {
        let mut report = SalesReport {
            report_id: "RPT-1".into(),
            reporting_period: ReportingPeriod::default(),
            currency_code: "USD".into(),
            transactions: vec![
                txn(UsageType::OnDemandStream, 100, 0.45),
                txn(UsageType::Download, 2, 1.98),
                txn(UsageType::Other, 5, 0.10),
            ],
            summary: ReportSummary::default(),
        };
        report.recompute_summary();

        assert_eq!(report.summary.total_usage_count, 107);
        assert_eq!(report.summary.total_streams, 100);
        assert_eq!(report.summary.total_downloads, 2);
        assert!((report.summary.total_revenue - 2.53).abs() < 1e-9);
    }
}
