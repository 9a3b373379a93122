//! HTTP server for the distribution API.
//!
//! A thin operational surface over the orchestrator; the heavy lifting
//! stays in the library.
//!
//! # API Endpoints
//!
//! | Method | Path                                  | Description                      |
//! |--------|---------------------------------------|----------------------------------|
//! | GET    | `/health`                             | Health check                     |
//! | GET    | `/api/distributors`                   | Connection status per distributor|
//! | POST   | `/api/distributors/{id}/connect`      | Connect one distributor          |
//! | POST   | `/api/releases`                       | Fan-out release submission       |
//! | GET    | `/api/releases`                       | Deployment listing               |
//! | GET    | `/api/releases/{id}/status`           | Status sweep for one release     |
//! | GET    | `/api/releases/{id}/earnings`         | Aggregated earnings              |
//! | POST   | `/api/deployments/{id}/takedown`      | Request takedown                 |
//! | POST   | `/api/royalties`                      | Royalty calculation from a report|
//! | GET    | `/api/logs`                           | SSE stream for real-time logs    |

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{
    error_response, ConnectRequest, EarningsQuery, RoyaltiesRequest, RoyaltiesResponse,
    SubmitReleaseRequest, SubmitReleaseResponse,
};
use crate::distribution::{DistributionOrchestrator, FanOutRequest};
use crate::message::parse_sales_report;
use crate::models::{DateRange, DistributorId};
use crate::royalty::calculate_royalties;

type ApiError = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(message)))
}

/// Start the HTTP server.
pub async fn start_server(
    port: u16,
    orchestrator: Arc<DistributionOrchestrator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/distributors", get(distributors))
        .route("/api/distributors/{id}/connect", post(connect_distributor))
        .route("/api/releases", post(submit_release).get(list_deployments))
        .route("/api/releases/{id}/status", get(release_status))
        .route("/api/releases/{id}/earnings", get(release_earnings))
        .route("/api/deployments/{id}/takedown", post(takedown))
        .route("/api/royalties", post(royalties))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(orchestrator);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Songcast server running on http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "songcast",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Connection status across registered distributors
async fn distributors(State(orchestrator): State<Arc<DistributionOrchestrator>>) -> Json<Value> {
    let status = orchestrator.connection_status().await;
    Json(json!({ "distributors": status }))
}

/// Connect one distributor, saving or loading credentials
async fn connect_distributor(
    State(orchestrator): State<Arc<DistributionOrchestrator>>,
    Path(id): Path<String>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<Value>, ApiError> {
    let distributor_id = parse_distributor(&id)?;
    orchestrator
        .connect(distributor_id, request.credentials)
        .await
        .map_err(|e| bad_request(&e.to_string()))?;
    Ok(Json(json!({ "status": "connected", "distributor": distributor_id })))
}

/// Fan-out submission endpoint
async fn submit_release(
    State(orchestrator): State<Arc<DistributionOrchestrator>>,
    Json(request): Json<SubmitReleaseRequest>,
) -> Result<Json<SubmitReleaseResponse>, ApiError> {
    if request.distributors.is_empty() {
        return Err(bad_request("No distributors requested"));
    }

    let result = orchestrator
        .submit_to_many(FanOutRequest {
            metadata: request.metadata,
            assets: request.assets,
            distributors: request.distributors,
            skip_failed_validation: request.skip_failed_validation,
        })
        .await;

    Ok(Json(SubmitReleaseResponse::from(result)))
}

/// Deployment listing
async fn list_deployments(
    State(orchestrator): State<Arc<DistributionOrchestrator>>,
) -> Json<Value> {
    Json(json!({ "deployments": orchestrator.deployments(None) }))
}

/// Status sweep for one internal release id
async fn release_status(
    State(orchestrator): State<Arc<DistributionOrchestrator>>,
    Path(id): Path<String>,
) -> Json<Value> {
    let reports = orchestrator.refresh_release_status(&id).await;
    Json(json!({ "releaseId": id, "statuses": reports }))
}

/// Aggregated earnings for one release over one period
async fn release_earnings(
    State(orchestrator): State<Arc<DistributionOrchestrator>>,
    Path(id): Path<String>,
    Query(query): Query<EarningsQuery>,
) -> Json<Value> {
    let period = DateRange {
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let earnings = orchestrator.aggregated_earnings(&id, &period).await;
    Json(json!(earnings))
}

/// Takedown request for one deployment
async fn takedown(
    State(orchestrator): State<Arc<DistributionOrchestrator>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match orchestrator.takedown(&id).await {
        Some(submission) => Ok(Json(json!(submission))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(error_response("Unknown deployment id")),
        )),
    }
}

/// Royalty calculation from a raw report plus catalog
async fn royalties(
    Json(request): Json<RoyaltiesRequest>,
) -> Result<Json<RoyaltiesResponse>, ApiError> {
    let report =
        parse_sales_report(&request.report_text).map_err(|e| bad_request(&e.to_string()))?;

    let catalog: HashMap<String, _> = request
        .catalog
        .into_iter()
        .filter_map(|entry| entry.isrc.clone().map(|isrc| (isrc, entry)))
        .collect();

    let calculations = calculate_royalties(&report, &catalog, &request.fee_config);
    Ok(Json(RoyaltiesResponse::new(
        report.report_id.clone(),
        report.currency_code.clone(),
        calculations,
    )))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn parse_distributor(id: &str) -> Result<DistributorId, ApiError> {
    DistributorId::from_str_id(id)
        .ok_or_else(|| bad_request(&format!("Unknown distributor: {}", id)))
}
