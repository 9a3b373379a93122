//! HTTP API module.
//!
//! Thin axum surface over the orchestrator plus the SSE log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::{log_error, log_info, log_success, log_warning, LogBroadcaster, LogEntry, LogLevel};
pub use server::start_server;
pub use types::{
    error_response, ConnectRequest, EarningsQuery, RoyaltiesRequest, RoyaltiesResponse,
    SubmitReleaseRequest, SubmitReleaseResponse,
};
