//! Songcast CLI - release delivery and royalty settlement
//!
//! # Main Commands
//!
//! ```bash
//! songcast serve                          # Start HTTP server (port 3000)
//! songcast map metadata.json             # Build a release-notification document
//! songcast submit -m meta.json -a assets.json --to tunecore,cdbaby
//! songcast royalties -r report.tsv -c catalog.json --fee 15
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! songcast parse message.json            # Parse + business-rule check a document
//! songcast report sales.tsv              # Parse a sales report and show totals
//! songcast status REL-1                  # Poll deployment statuses
//! songcast earnings REL-1 --from 2025-01-01 --to 2025-01-31
//! songcast deployments list              # Inspect the deployment store
//! ```

use clap::{Parser, Subcommand};
use songcast::{
    build_enrichment, build_enrichment_document, build_release_message, build_session_credits,
    build_session_credits_document, calculate_royalties, check_release_message,
    map_release_notification, parse_release_message, parse_sales_report_bytes, AppConfig,
    CatalogMetadata, CdBabyAdapter, DeploymentStore, DistributionOrchestrator, DistributorId,
    FanOutRequest, FeeConfig, FileCredentialStore, MessageOptions, Party, ReleaseAssets,
    TuneCoreAdapter,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "songcast")]
#[command(about = "Deliver releases to music distributors and settle royalties", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a release-notification document from catalog metadata
    Map {
        /// Catalog metadata JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the enrichment document
        #[arg(long)]
        enrichment: Option<PathBuf>,

        /// Also write the session-credit document
        #[arg(long)]
        credits: Option<PathBuf>,

        /// Recipient party id (default: GenericRecipient)
        #[arg(short, long)]
        recipient: Option<String>,
    },

    /// Parse a release-notification document and run business checks
    Parse {
        /// Document file
        input: PathBuf,
    },

    /// Parse a sales report and print its totals
    Report {
        /// Tab-delimited report file
        input: PathBuf,
    },

    /// Calculate royalties from a sales report against a catalog
    Royalties {
        /// Tab-delimited report file
        #[arg(short, long)]
        report: PathBuf,

        /// Catalog JSON file (array of metadata entries)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Distributor fee percent
        #[arg(long, default_value = "0")]
        fee: f64,

        /// Platform fee percent
        #[arg(long, default_value = "0")]
        platform_fee: f64,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Submit a release to one or more distributors
    Submit {
        /// Catalog metadata JSON file
        #[arg(short, long)]
        metadata: PathBuf,

        /// Release assets JSON file
        #[arg(short, long)]
        assets: PathBuf,

        /// Comma-separated distributor ids
        #[arg(long)]
        to: String,

        /// Skip distributors whose pre-validation fails
        #[arg(long)]
        skip_failed: bool,
    },

    /// Poll deployment statuses for one release
    Status {
        /// Internal release id
        release_id: String,
    },

    /// Aggregate earnings for one release
    Earnings {
        /// Internal release id
        release_id: String,

        /// Period start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Period end (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },

    /// Inspect the deployment store
    Deployments {
        #[command(subcommand)]
        action: DeploymentAction,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: from SONGCAST_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum DeploymentAction {
    /// List stored deployments
    List {
        /// Only deployments of this release
        #[arg(short, long)]
        release: Option<String>,
    },

    /// Reset the deployment store
    Clear,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let result = match cli.command {
        Commands::Map {
            input,
            output,
            enrichment,
            credits,
            recipient,
        } => cmd_map(
            &config,
            &input,
            output.as_deref(),
            enrichment.as_deref(),
            credits.as_deref(),
            recipient.as_deref(),
        ),

        Commands::Parse { input } => cmd_parse(&input),

        Commands::Report { input } => cmd_report(&input),

        Commands::Royalties {
            report,
            catalog,
            fee,
            platform_fee,
            output,
        } => cmd_royalties(&report, &catalog, fee, platform_fee, output.as_deref()),

        Commands::Submit {
            metadata,
            assets,
            to,
            skip_failed,
        } => cmd_submit(&config, &metadata, &assets, &to, skip_failed).await,

        Commands::Status { release_id } => cmd_status(&config, &release_id).await,

        Commands::Earnings {
            release_id,
            from,
            to,
        } => cmd_earnings(&config, &release_id, from, to).await,

        Commands::Deployments { action } => cmd_deployments(&config, action),

        Commands::Serve { port } => cmd_serve(&config, port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Build the orchestrator the CLI commands run against.
fn build_orchestrator(config: &AppConfig) -> Arc<DistributionOrchestrator> {
    Arc::new(
        DistributionOrchestrator::builder()
            .register(Arc::new(TuneCoreAdapter::new()))
            .register(Arc::new(CdBabyAdapter::new(
                config.staging_dir.clone(),
                config.gateway_root.clone(),
                config.sender_party(),
            )))
            .store(Arc::new(DeploymentStore::with_dir(&config.store_dir)))
            .credentials(Arc::new(FileCredentialStore::with_dir(
                &config.credentials_dir,
            )))
            .build(),
    )
}

fn read_metadata(path: &Path) -> Result<CatalogMetadata, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn cmd_map(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
    enrichment: Option<&Path>,
    credits: Option<&Path>,
    recipient: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Mapping: {}", input.display());
    let metadata = read_metadata(input)?;

    let recipient = Party {
        party_id: recipient.unwrap_or("GenericRecipient").to_string(),
        party_name: "Distributor".to_string(),
    };
    let options = || MessageOptions::new(config.sender_party(), recipient.clone());

    let message = map_release_notification(&metadata, options());
    eprintln!(
        "   {} release(s), {} resource(s), {} deal(s)",
        message.releases.len(),
        message.resources.len(),
        message.deals.len()
    );
    write_output(&build_release_message(&message), output)?;

    if let Some(path) = enrichment {
        let doc = build_enrichment_document(&build_enrichment(&metadata, options()));
        fs::write(path, doc)?;
        eprintln!("   Enrichment written to: {}", path.display());
    }
    if let Some(path) = credits {
        let doc = build_session_credits_document(&build_session_credits(&metadata, options()));
        fs::write(path, doc)?;
        eprintln!("   Session credits written to: {}", path.display());
    }

    Ok(())
}

fn cmd_parse(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing: {}", input.display());

    let content = fs::read_to_string(input)?;
    let message = parse_release_message(&content)?;

    eprintln!("   Kind: {:?}", message.kind);
    eprintln!("   Message id: {}", message.header.message_id);
    eprintln!("   Releases: {}", message.releases.len());
    eprintln!("   Resources: {}", message.resources.len());
    eprintln!("   Deals: {}", message.deals.len());

    let errors = check_release_message(&message);
    if errors.is_empty() {
        eprintln!("   Business rules: OK");
    } else {
        eprintln!("   Business rules: {} finding(s)", errors.len());
        for error in &errors {
            eprintln!("     - {}", error);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_report(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Reading report: {}", input.display());

    let bytes = fs::read(input)?;
    let report = parse_sales_report_bytes(&bytes)?;

    eprintln!("   Transactions: {}", report.transactions.len());
    eprintln!("   Currency: {}", report.currency_code);
    eprintln!("   Streams: {}", report.summary.total_streams);
    eprintln!("   Downloads: {}", report.summary.total_downloads);
    eprintln!("   Revenue: {:.2}", report.summary.total_revenue);

    Ok(())
}

fn cmd_royalties(
    report_path: &Path,
    catalog_path: &Path,
    fee: f64,
    platform_fee: f64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Report:  {}", report_path.display());
    eprintln!("Catalog: {}", catalog_path.display());

    let bytes = fs::read(report_path)?;
    let report = parse_sales_report_bytes(&bytes)?;

    let entries: Vec<CatalogMetadata> = serde_json::from_str(&fs::read_to_string(catalog_path)?)?;
    let catalog: HashMap<String, CatalogMetadata> = entries
        .into_iter()
        .filter_map(|entry| entry.isrc.clone().map(|isrc| (isrc, entry)))
        .collect();
    eprintln!("   {} catalog entries", catalog.len());

    let config = FeeConfig {
        distributor_fee_percent: fee,
        platform_fee_percent: platform_fee,
    };
    let calculations = calculate_royalties(&report, &catalog, &config);

    eprintln!("   {} matched recording(s)", calculations.len());
    for calc in &calculations {
        eprintln!(
            "   {} gross {:.2} fees {:.2} net {:.2} ({} payments)",
            calc.isrc,
            calc.gross_revenue,
            calc.distributor_fees + calc.platform_fees,
            calc.net_revenue,
            calc.contributor_payments.len()
        );
    }

    let json = serde_json::to_string_pretty(&calculations)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_submit(
    config: &AppConfig,
    metadata_path: &Path,
    assets_path: &Path,
    to: &str,
    skip_failed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let metadata = read_metadata(metadata_path)?;
    let assets: ReleaseAssets = serde_json::from_str(&fs::read_to_string(assets_path)?)?;

    let mut distributors = Vec::new();
    for token in to.split(',') {
        match DistributorId::from_str_id(token) {
            Some(id) => distributors.push(id),
            None => return Err(format!("Unknown distributor: {}", token).into()),
        }
    }

    let orchestrator = build_orchestrator(config);

    // Connect from stored credentials; a distributor without them still
    // gets a structured failed entry from the fan-out.
    for id in &distributors {
        if let Err(e) = orchestrator.connect(*id, None).await {
            eprintln!("   Could not connect {}: {}", id, e);
        }
    }

    let result = orchestrator
        .clone()
        .submit_to_many(FanOutRequest {
            metadata,
            assets,
            distributors,
            skip_failed_validation: skip_failed,
        })
        .await;

    eprintln!(
        "\nSubmitted to {} distributor(s): {} ok, {} failed, {} pending",
        result.summary.total_distributors,
        result.summary.success_count,
        result.summary.failed_count,
        result.summary.pending_count
    );
    for submission in &result.submissions {
        let marker = if submission.result.success { "+" } else { "-" };
        eprintln!(
            " {} {}: {:?}",
            marker, submission.distributor_id, submission.result.status
        );
        for error in &submission.result.errors {
            eprintln!("     [{}] {}", error.code, error.message);
        }
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_status(
    config: &AppConfig,
    release_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = build_orchestrator(config);
    for id in orchestrator.registered() {
        let _ = orchestrator.connect(id, None).await;
    }

    let reports = orchestrator.refresh_release_status(release_id).await;
    if reports.is_empty() {
        eprintln!("No deployments for release: {}", release_id);
        return Ok(());
    }

    for report in &reports {
        match (&report.status, &report.error) {
            (Some(status), _) => eprintln!("   {}: {:?}", report.distributor_id, status),
            (None, Some(error)) => eprintln!("   {}: error ({})", report.distributor_id, error),
            _ => eprintln!("   {}: unknown", report.distributor_id),
        }
    }
    Ok(())
}

async fn cmd_earnings(
    config: &AppConfig,
    release_id: &str,
    from: String,
    to: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = build_orchestrator(config);
    for id in orchestrator.registered() {
        let _ = orchestrator.connect(id, None).await;
    }

    let period = songcast::DateRange {
        start_date: from,
        end_date: to,
    };
    let earnings = orchestrator.aggregated_earnings(release_id, &period).await;

    eprintln!(
        "Earnings for {} ({} distributor(s)):",
        release_id,
        earnings.by_distributor.len()
    );
    eprintln!("   Streams:   {}", earnings.total_streams);
    eprintln!("   Downloads: {}", earnings.total_downloads);
    eprintln!(
        "   Net:       {:.2} {}",
        earnings.total_net_revenue, earnings.currency_code
    );

    println!("{}", serde_json::to_string_pretty(&earnings)?);
    Ok(())
}

fn cmd_deployments(
    config: &AppConfig,
    action: DeploymentAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = DeploymentStore::with_dir(&config.store_dir);

    match action {
        DeploymentAction::List { release } => {
            let deployments = match release {
                Some(ref id) => store.for_release(id),
                None => store.all(None),
            };
            if deployments.is_empty() {
                eprintln!("No deployments stored yet.");
                return Ok(());
            }
            for d in &deployments {
                println!(
                    "{}  {}  {}  {:?}  {}",
                    d.id,
                    d.internal_release_id,
                    d.distributor_id,
                    d.status,
                    d.external_id.as_deref().unwrap_or("-")
                );
            }
        }

        DeploymentAction::Clear => {
            store.clear()?;
            eprintln!("Deployment store cleared.");
        }
    }

    Ok(())
}

async fn cmd_serve(
    config: &AppConfig,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = build_orchestrator(config);
    songcast::server::start_server(port.unwrap_or(config.port), orchestrator).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
