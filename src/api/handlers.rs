use crate::models::PaymentInput;
use crate::service::ReconService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Request body: reconciliation sources. All fields optional; the ledger
/// falls back to the configured default, payments may arrive inline or as a
/// CSV path (inline wins when both are given).
#[derive(Debug, Deserialize)]
pub struct MatchPaymentsRequest {
    pub ledger: Option<PathBuf>,
    pub payments: Option<Vec<PaymentInput>>,
    pub payments_file: Option<PathBuf>,
}

/// Error body for failed runs.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

/// Request body: discrepancy items reported for summarizing.
#[derive(Debug, Deserialize)]
pub struct SummarizeDiscrepanciesRequest {
    #[serde(default)]
    pub issues: Vec<Value>,
}

/// Response body: discrepancy count and echo.
#[derive(Debug, Serialize)]
pub struct DiscrepancySummary {
    pub status: &'static str,
    pub discrepancies: usize,
    pub items: Vec<Value>,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Run one reconciliation pass over the posted sources.
pub async fn match_payments(
    State(service): State<Arc<ReconService>>,
    Json(req): Json<MatchPaymentsRequest>,
) -> Response {
    match service.reconcile(
        req.ledger.as_deref(),
        req.payments.as_deref(),
        req.payments_file.as_deref(),
    ) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            tracing::error!("reconciliation run failed: {}", e);
            let response = ErrorResponse {
                status: "error",
                message: format!("Error: {}", e),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// Count and echo discrepancy items reported by a client for follow-up.
pub async fn summarize_discrepancies(
    Json(req): Json<SummarizeDiscrepanciesRequest>,
) -> Response {
    let summary = DiscrepancySummary {
        status: "success",
        discrepancies: req.issues.len(),
        items: req.issues,
    };
    (StatusCode::OK, Json(summary)).into_response()
}
