//! In-process store backed by `DashMap`.
//!
//! Each invoice lives in its own map entry, so the conditional activation
//! only locks the shard holding that invoice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::store::{InvoiceStore, PaymentLedger, RepDirectory};
use crate::error::SalesError;
use crate::models::{Invoice, InvoiceFilter, Payment, SalesRep, TimeWindow};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    invoices: DashMap<String, Invoice>,
    payments: DashMap<String, Payment>,
    reps: DashMap<String, SalesRep>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an invoice, as the order-entry side would.
    pub fn insert_invoice(&self, invoice: Invoice) {
        self.invoices.insert(invoice.id.clone(), invoice);
    }

    /// Record a payment. Its rep is resolved through the invoice on read.
    pub fn record_payment(&self, payment: Payment) {
        self.payments.insert(payment.id.clone(), payment);
    }

    pub fn upsert_rep(&self, rep: SalesRep) {
        self.reps.insert(rep.id.clone(), rep);
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>, SalesError> {
        Ok(self.invoices.get(invoice_id).map(|entry| entry.value().clone()))
    }

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, SalesError> {
        Ok(self
            .invoices
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn activate_if_waiting(
        &self,
        invoice_id: &str,
        activated_at: DateTime<Utc>,
    ) -> Result<Option<Invoice>, SalesError> {
        // The write guard is held across check and update.
        let Some(mut entry) = self.invoices.get_mut(invoice_id) else {
            return Ok(None);
        };
        if entry.activate(activated_at) {
            Ok(Some(entry.value().clone()))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl PaymentLedger for InMemoryStore {
    async fn payments_for_rep(
        &self,
        owner_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Payment>, SalesError> {
        let payments = self
            .payments
            .iter()
            .filter(|entry| window.contains(entry.paid_at))
            .filter_map(|entry| {
                let owner = self.invoices.get(&entry.invoice_id)?.owner_id.clone();
                (owner == owner_id).then(|| Payment {
                    owner_id: owner,
                    ..entry.value().clone()
                })
            })
            .collect();
        Ok(payments)
    }
}

#[async_trait]
impl RepDirectory for InMemoryStore {
    async fn find_rep(&self, rep_id: &str) -> Result<Option<SalesRep>, SalesError> {
        Ok(self.reps.get(rep_id).map(|entry| entry.value().clone()))
    }
}
