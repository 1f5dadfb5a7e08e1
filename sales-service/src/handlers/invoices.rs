//! Waiting-invoice queue and conversion endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::error::SalesError;
use crate::models::{Invoice, InvoiceType};
use crate::services::metrics::record_conversion;
use crate::services::WaitingFilter;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct WaitingQuery {
    #[serde(rename = "type")]
    pub invoice_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WaitingInvoicesResponse {
    pub count: usize,
    pub invoices: Vec<Invoice>,
}

/// List waiting invoices, oldest first.
pub async fn list_waiting(
    State(state): State<AppState>,
    Query(query): Query<WaitingQuery>,
) -> Result<Json<WaitingInvoicesResponse>, AppError> {
    let invoice_type = query
        .invoice_type
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<InvoiceType>)
        .transpose()?;

    let invoices = state
        .lifecycle
        .list_waiting(WaitingFilter { invoice_type })
        .await?;

    tracing::debug!(count = invoices.len(), invoice_type = ?invoice_type, "Listed waiting invoices");

    Ok(Json(WaitingInvoicesResponse {
        count: invoices.len(),
        invoices,
    }))
}

/// Convert a waiting invoice to active.
pub async fn convert_to_active(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<Invoice>, AppError> {
    match state.lifecycle.convert_to_active(&invoice_id).await {
        Ok(invoice) => {
            record_conversion("converted");
            tracing::info!(
                invoice_id = %invoice.id,
                invoice_type = invoice.invoice_type.as_str(),
                total = %invoice.total,
                "Invoice converted to active"
            );
            Ok(Json(invoice))
        }
        Err(e) => {
            record_conversion(e.kind());
            match e {
                SalesError::AlreadyConverted(_) => {
                    tracing::debug!(invoice_id = %invoice_id, "Invoice already converted")
                }
                SalesError::Storage(_) => {
                    tracing::error!(invoice_id = %invoice_id, error = %e, "Conversion failed")
                }
                _ => tracing::info!(invoice_id = %invoice_id, error = %e, "Conversion rejected"),
            }
            Err(e.into())
        }
    }
}
