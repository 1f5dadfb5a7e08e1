//! Rep dashboard endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;

use crate::models::{Period, PerformanceSnapshot};
use crate::services::metrics::record_snapshot;
use crate::startup::AppState;

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub period: Option<String>,
}

/// Performance snapshot for one rep; `period` defaults to `month`.
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(rep_id): Path<String>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<PerformanceSnapshot>, AppError> {
    let period = match query.period.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse::<Period>().inspect_err(|_| record_snapshot("invalid", "error"))?,
        None => Period::Month,
    };

    let snapshot = state
        .aggregator
        .compute_snapshot(&rep_id, period)
        .await
        .inspect_err(|e| {
            record_snapshot(period.as_str(), e.kind());
            tracing::warn!(rep_id = %rep_id, period = %period, error = %e, "Snapshot failed");
        })?;

    record_snapshot(period.as_str(), "ok");
    tracing::debug!(
        rep_id = %rep_id,
        period = %period,
        sales_total = %snapshot.sales_total,
        overdue = snapshot.overdue_invoices.len(),
        "Snapshot computed"
    );

    Ok(Json(snapshot))
}
