//! Royalty engine: folds sales-report transactions against the catalog and
//! splits net revenue across contributors.
//!
//! The engine is pure computation over already-parsed inputs. Transactions
//! whose ISRC has no catalog entry are logged and skipped, never fatal; a
//! report may reference works outside the current catalog. All monetary
//! figures are assumed to share one reporting currency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::logs::log_warning;
use crate::models::{CatalogMetadata, ReportingPeriod, SalesReport, SplitRole};

// =============================================================================
// Fee Configuration
// =============================================================================

/// Fee percentages applied to gross revenue before splitting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    /// Distributor's cut, percent of gross.
    pub distributor_fee_percent: f64,
    /// Platform's cut, percent of gross.
    pub platform_fee_percent: f64,
}

// =============================================================================
// Payments
// =============================================================================

/// Settlement state of one contributor payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Paid,
    Failed,
}

/// One contributor's share of a calculation's net revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorPayment {
    pub contributor_id: String,
    pub contributor_name: String,
    pub role: SplitRole,
    pub split_percentage: f64,
    pub gross_amount: f64,
    /// Equal to `gross_amount` until withholding is applied downstream.
    pub net_amount: f64,
    pub payment_status: PaymentStatus,
}

// =============================================================================
// Royalty Calculation
// =============================================================================

/// Aggregated usage and revenue for one matched recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyCalculation {
    pub release_id: String,
    pub isrc: String,
    pub total_streams: u64,
    pub total_downloads: u64,
    pub gross_revenue: f64,
    pub distributor_fees: f64,
    pub platform_fees: f64,
    pub net_revenue: f64,
    pub contributor_payments: Vec<ContributorPayment>,
    pub period: ReportingPeriod,
    pub currency_code: String,
}

impl RoyaltyCalculation {
    fn empty(isrc: &str, metadata: &CatalogMetadata, report: &SalesReport) -> Self {
        Self {
            release_id: metadata.release_id.clone(),
            isrc: isrc.to_string(),
            total_streams: 0,
            total_downloads: 0,
            gross_revenue: 0.0,
            distributor_fees: 0.0,
            platform_fees: 0.0,
            net_revenue: 0.0,
            contributor_payments: Vec::new(),
            period: report.reporting_period.clone(),
            currency_code: report.currency_code.clone(),
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Aggregate a sales report against the catalog and compute contributor
/// payments.
///
/// Returns one calculation per matched ISRC, in first-seen transaction
/// order. Splits are applied to net revenue as declared; sheets that do not
/// sum to 100 are warned about but never normalized.
pub fn calculate_royalties(
    report: &SalesReport,
    catalog: &HashMap<String, CatalogMetadata>,
    config: &FeeConfig,
) -> Vec<RoyaltyCalculation> {
    let mut calculations: Vec<RoyaltyCalculation> = Vec::new();
    let mut index_by_isrc: HashMap<String, usize> = HashMap::new();

    for txn in &report.transactions {
        if txn.isrc.is_empty() {
            continue;
        }
        let metadata = match catalog.get(&txn.isrc) {
            Some(m) => m,
            None => {
                log_warning(format!(
                    "No catalog entry for ISRC {}, skipping transaction {}",
                    txn.isrc, txn.transaction_id
                ));
                continue;
            }
        };

        let index = *index_by_isrc.entry(txn.isrc.clone()).or_insert_with(|| {
            calculations.push(RoyaltyCalculation::empty(&txn.isrc, metadata, report));
            calculations.len() - 1
        });
        let calc = &mut calculations[index];

        if txn.usage_type.is_stream() {
            calc.total_streams += txn.usage_count;
        } else if txn.usage_type.is_download() {
            calc.total_downloads += txn.usage_count;
        }
        // Revenue counts whatever the usage type.
        calc.gross_revenue += txn.revenue_amount;
    }

    for calc in &mut calculations {
        let metadata = &catalog[&calc.isrc];

        calc.distributor_fees = calc.gross_revenue * (config.distributor_fee_percent / 100.0);
        calc.platform_fees = calc.gross_revenue * (config.platform_fee_percent / 100.0);
        calc.net_revenue = calc.gross_revenue - calc.distributor_fees - calc.platform_fees;

        if !metadata.splits_balanced() {
            log_warning(format!(
                "Splits for ISRC {} sum to {:.2}%, applying as declared",
                calc.isrc,
                metadata.split_total()
            ));
        }
        calc.contributor_payments = split_net_revenue(calc.net_revenue, metadata);
    }

    calculations
}

/// Apply the split sheet to a net amount, one payment per split.
fn split_net_revenue(net_amount: f64, metadata: &CatalogMetadata) -> Vec<ContributorPayment> {
    metadata
        .splits
        .iter()
        .map(|split| {
            let amount = net_amount * (split.percentage / 100.0);
            ContributorPayment {
                contributor_id: split.contributor_id.clone(),
                contributor_name: split.legal_name.clone(),
                role: split.role,
                split_percentage: split.percentage,
                gross_amount: amount,
                net_amount: amount,
                payment_status: PaymentStatus::Pending,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportSummary, RoyaltySplit, Transaction, UsageType};

    fn metadata(isrc: &str, splits: Vec<(f64, SplitRole, &str)>) -> CatalogMetadata {
        CatalogMetadata {
            release_id: "rel-1".into(),
            release_title: None,
            track_title: "Test Track".into(),
            artist_name: "Test Artist".into(),
            isrc: Some(isrc.into()),
            upc: Some("123456789012".into()),
            catalog_number: None,
            label_name: None,
            genre: "Pop".into(),
            sub_genre: None,
            language: None,
            release_date: "2024-01-01".into(),
            explicit: false,
            instrumental: false,
            duration_secs: None,
            territories: vec![],
            splits: splits
                .into_iter()
                .map(|(percentage, role, name)| RoyaltySplit {
                    contributor_id: name.to_lowercase(),
                    legal_name: name.into(),
                    role,
                    percentage,
                })
                .collect(),
            description: None,
            lyrics: None,
            ai_disclosure: None,
        }
    }

    fn report(transactions: Vec<Transaction>) -> SalesReport {
        let mut report = SalesReport {
            report_id: "RPT-1".into(),
            reporting_period: ReportingPeriod {
                start_date: "2025-01-01".into(),
                end_date: "2025-01-31".into(),
            },
            currency_code: "USD".into(),
            transactions,
            summary: ReportSummary::default(),
        };
        report.recompute_summary();
        report
    }

    fn txn(isrc: &str, usage_type: UsageType, count: u64, revenue: f64) -> Transaction {
        Transaction {
            transaction_id: format!("TX-{}", isrc),
            isrc: isrc.into(),
            track_title: None,
            usage_type,
            usage_count: count,
            revenue_amount: revenue,
            territory_code: "US".into(),
            service_name: None,
        }
    }

    #[test]
    fn test_even_split_no_fee() {
        // Two contributors at 50/50, $200 gross, 0% fee.
        let mut catalog = HashMap::new();
        catalog.insert(
            "US0000000001".to_string(),
            metadata(
                "US0000000001",
                vec![(50.0, SplitRole::Performer, "A"), (50.0, SplitRole::Producer, "B")],
            ),
        );
        let report = report(vec![txn("US0000000001", UsageType::Download, 2, 200.0)]);

        let results = calculate_royalties(&report, &catalog, &FeeConfig::default());

        assert_eq!(results.len(), 1);
        let calc = &results[0];
        assert!((calc.net_revenue - 200.0).abs() < 1e-6);
        assert_eq!(calc.contributor_payments.len(), 2);
        for payment in &calc.contributor_payments {
            assert!((payment.gross_amount - 100.0).abs() < 1e-6);
            assert_eq!(payment.payment_status, PaymentStatus::Pending);
        }
    }

    #[test]
    fn test_single_contributor_with_distributor_fee() {
        // One contributor at 100%, $100 gross, 10% distributor fee.
        let mut catalog = HashMap::new();
        catalog.insert(
            "US0000000002".to_string(),
            metadata("US0000000002", vec![(100.0, SplitRole::Songwriter, "Solo")]),
        );
        let report = report(vec![txn(
            "US0000000002",
            UsageType::OnDemandStream,
            1000,
            100.0,
        )]);
        let config = FeeConfig {
            distributor_fee_percent: 10.0,
            platform_fee_percent: 0.0,
        };

        let results = calculate_royalties(&report, &catalog, &config);

        let calc = &results[0];
        assert!((calc.distributor_fees - 10.0).abs() < 1e-6);
        assert!((calc.net_revenue - 90.0).abs() < 1e-6);
        assert_eq!(calc.contributor_payments.len(), 1);
        assert!((calc.contributor_payments[0].gross_amount - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_unmatched_isrc_skipped_without_error() {
        // Both transactions reference a recording outside the catalog.
        let catalog = HashMap::new();
        let report = report(vec![
            txn("ZZ9999999999", UsageType::Download, 1, 50.0),
            txn("ZZ9999999999", UsageType::OnDemandStream, 10, 0.05),
        ]);

        let results = calculate_royalties(&report, &catalog, &FeeConfig::default());
        assert!(results.is_empty());
    }

    #[test]
    fn test_gross_equals_net_plus_fees() {
        let mut catalog = HashMap::new();
        catalog.insert(
            "US0000000003".to_string(),
            metadata("US0000000003", vec![(100.0, SplitRole::Performer, "X")]),
        );
        let report = report(vec![
            txn("US0000000003", UsageType::OnDemandStream, 300, 1.23),
            txn("US0000000003", UsageType::Download, 5, 4.95),
            txn("US0000000003", UsageType::Other, 2, 0.37),
        ]);
        let config = FeeConfig {
            distributor_fee_percent: 15.0,
            platform_fee_percent: 5.0,
        };

        let calc = &calculate_royalties(&report, &catalog, &config)[0];
        assert!(
            (calc.gross_revenue - (calc.net_revenue + calc.distributor_fees + calc.platform_fees))
                .abs()
                < 1e-6
        );
        // Revenue from the Other-typed transaction still counted.
        assert!((calc.gross_revenue - 6.55).abs() < 1e-6);
        assert_eq!(calc.total_streams, 300);
        assert_eq!(calc.total_downloads, 5);
    }

    #[test]
    fn test_balanced_splits_sum_to_net_revenue() {
        let mut catalog = HashMap::new();
        catalog.insert(
            "US0000000004".to_string(),
            metadata(
                "US0000000004",
                vec![
                    (33.34, SplitRole::Songwriter, "A"),
                    (33.33, SplitRole::Producer, "B"),
                    (33.33, SplitRole::Performer, "C"),
                ],
            ),
        );
        let report = report(vec![txn("US0000000004", UsageType::Download, 1, 99.99)]);

        let calc = &calculate_royalties(&report, &catalog, &FeeConfig::default())[0];
        let paid: f64 = calc.contributor_payments.iter().map(|p| p.gross_amount).sum();
        assert!((paid - calc.net_revenue).abs() < 1e-6);
    }

    #[test]
    fn test_unbalanced_splits_applied_as_declared() {
        // 60/30 sheet is never normalized; payout covers 90% of net.
        let mut catalog = HashMap::new();
        catalog.insert(
            "US0000000005".to_string(),
            metadata(
                "US0000000005",
                vec![(60.0, SplitRole::Songwriter, "A"), (30.0, SplitRole::Producer, "B")],
            ),
        );
        let report = report(vec![txn("US0000000005", UsageType::Download, 1, 100.0)]);

        let calc = &calculate_royalties(&report, &catalog, &FeeConfig::default())[0];
        assert!((calc.contributor_payments[0].gross_amount - 60.0).abs() < 1e-6);
        assert!((calc.contributor_payments[1].gross_amount - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_transactions_fold_into_one_calculation_per_isrc() {
        let mut catalog = HashMap::new();
        catalog.insert(
            "US0000000006".to_string(),
            metadata("US0000000006", vec![(100.0, SplitRole::Performer, "X")]),
        );
        catalog.insert(
            "US0000000007".to_string(),
            metadata("US0000000007", vec![(100.0, SplitRole::Performer, "Y")]),
        );
        let report = report(vec![
            txn("US0000000006", UsageType::OnDemandStream, 10, 0.05),
            txn("US0000000007", UsageType::OnDemandStream, 20, 0.10),
            txn("US0000000006", UsageType::OnDemandStream, 30, 0.15),
        ]);

        let results = calculate_royalties(&report, &catalog, &FeeConfig::default());
        assert_eq!(results.len(), 2);
        // First-seen order is preserved.
        assert_eq!(results[0].isrc, "US0000000006");
        assert_eq!(results[0].total_streams, 40);
        assert_eq!(results[1].isrc, "US0000000007");
    }
}
