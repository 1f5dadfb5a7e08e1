//! Waiting -> active invoice lifecycle.

use chrono::Utc;
use std::sync::Arc;

use super::store::InvoiceStore;
use crate::error::SalesError;
use crate::models::{Invoice, InvoiceFilter, InvoiceState, InvoiceType};

/// Filter accepted by [`InvoiceLifecycleManager::list_waiting`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitingFilter {
    pub invoice_type: Option<InvoiceType>,
}

/// Owns the single legal transition of an invoice.
#[derive(Clone)]
pub struct InvoiceLifecycleManager {
    store: Arc<dyn InvoiceStore>,
}

impl InvoiceLifecycleManager {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self { store }
    }

    /// Waiting invoices, oldest first, ties broken by id.
    pub async fn list_waiting(&self, filter: WaitingFilter) -> Result<Vec<Invoice>, SalesError> {
        let mut invoices = self
            .store
            .list_invoices(&InvoiceFilter {
                state: Some(InvoiceState::Waiting),
                invoice_type: filter.invoice_type,
                owner_id: None,
            })
            .await?;

        invoices.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(invoices)
    }

    /// Commit a waiting invoice.
    ///
    /// Exactly one of any number of concurrent calls for the same invoice
    /// succeeds; the rest, and every later call, get
    /// [`SalesError::AlreadyConverted`]. An invoice that became active
    /// without being converted yields [`SalesError::InvalidState`].
    pub async fn convert_to_active(&self, invoice_id: &str) -> Result<Invoice, SalesError> {
        let existing = self
            .store
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| SalesError::NotFound(format!("Invoice {}", invoice_id)))?;

        if existing.state == InvoiceState::Active {
            return Err(Self::rejection(&existing));
        }

        match self.store.activate_if_waiting(invoice_id, Utc::now()).await? {
            Some(invoice) => Ok(invoice),
            // The guard saw a non-waiting row: another converter committed
            // between our read and our update.
            None => Err(SalesError::AlreadyConverted(invoice_id.to_string())),
        }
    }

    fn rejection(invoice: &Invoice) -> SalesError {
        if invoice.activated_at.is_some() {
            SalesError::AlreadyConverted(invoice.id.clone())
        } else {
            SalesError::InvalidState(format!(
                "Invoice {} is already active and was not converted from waiting",
                invoice.id
            ))
        }
    }
}
