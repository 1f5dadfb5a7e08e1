//! Storage interfaces the lifecycle manager and aggregator depend on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SalesError;
use crate::models::{Invoice, InvoiceFilter, Payment, SalesRep, TimeWindow};

/// Invoice storage: filtered reads plus the one conditional state update.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>, SalesError>;

    /// Invoices matching `filter`, in no particular order.
    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, SalesError>;

    /// Move the invoice from `waiting` to `active` if, and only if, it is
    /// still `waiting` at the moment of the update. `Ok(None)` means the
    /// guard did not match (already active, or no such invoice).
    async fn activate_if_waiting(
        &self,
        invoice_id: &str,
        activated_at: DateTime<Utc>,
    ) -> Result<Option<Invoice>, SalesError>;

    async fn health_check(&self) -> Result<(), SalesError> {
        Ok(())
    }
}

/// Read access to collected payments.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Payments against invoices owned by `owner_id` with `paid_at` inside
    /// `window`.
    async fn payments_for_rep(
        &self,
        owner_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Payment>, SalesError>;
}

/// Rep lookup, including the admin-configured monthly target.
#[async_trait]
pub trait RepDirectory: Send + Sync {
    async fn find_rep(&self, rep_id: &str) -> Result<Option<SalesRep>, SalesError>;
}
