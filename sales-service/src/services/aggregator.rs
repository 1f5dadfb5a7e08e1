//! Sales-rep performance aggregation.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::store::{InvoiceStore, PaymentLedger, RepDirectory};
use crate::error::SalesError;
use crate::models::{
    target_ratio, InvoiceFilter, InvoiceState, InvoiceType, MonthWindow, OverdueInvoice, Period,
    PerformanceSnapshot, TargetProgress,
};

/// How periods map onto wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationSettings {
    pub timezone: Tz,
    pub month_window: MonthWindow,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            month_window: MonthWindow::Rolling,
        }
    }
}

/// Computes read-only performance snapshots. Holds no state between calls.
#[derive(Clone)]
pub struct PerformanceAggregator {
    invoices: Arc<dyn InvoiceStore>,
    payments: Arc<dyn PaymentLedger>,
    reps: Arc<dyn RepDirectory>,
    settings: AggregationSettings,
}

impl PerformanceAggregator {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        payments: Arc<dyn PaymentLedger>,
        reps: Arc<dyn RepDirectory>,
        settings: AggregationSettings,
    ) -> Self {
        Self {
            invoices,
            payments,
            reps,
            settings,
        }
    }

    pub fn settings(&self) -> AggregationSettings {
        self.settings
    }

    pub async fn compute_snapshot(
        &self,
        rep_id: &str,
        period: Period,
    ) -> Result<PerformanceSnapshot, SalesError> {
        self.compute_snapshot_at(rep_id, period, Utc::now()).await
    }

    /// Snapshot as of `now`. Identical inputs over identical store contents
    /// give identical output.
    pub async fn compute_snapshot_at(
        &self,
        rep_id: &str,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<PerformanceSnapshot, SalesError> {
        let rep = self
            .reps
            .find_rep(rep_id)
            .await?
            .ok_or_else(|| SalesError::NotFound(format!("Sales rep {}", rep_id)))?;

        let window = period.window(now, self.settings.timezone, self.settings.month_window);
        let today = now.with_timezone(&self.settings.timezone).date_naive();

        let active = self
            .invoices
            .list_invoices(&InvoiceFilter {
                state: Some(InvoiceState::Active),
                invoice_type: None,
                owner_id: Some(rep_id.to_string()),
            })
            .await?;

        let mut sales_total = Decimal::ZERO;
        let mut invoice_count = 0u64;
        for invoice in active
            .iter()
            .filter(|i| i.invoice_type == InvoiceType::Sale && window.contains(i.created_at))
        {
            sales_total += invoice.total;
            invoice_count += 1;
        }

        // Overdue receivables ignore the window: they stay visible until paid.
        let mut overdue_invoices: Vec<OverdueInvoice> = active
            .into_iter()
            .filter(|i| i.is_overdue(today))
            .map(|i| OverdueInvoice::classify(i, today))
            .collect();
        overdue_invoices.sort_by(|a, b| {
            a.invoice
                .due_date
                .cmp(&b.invoice.due_date)
                .then_with(|| a.invoice.id.cmp(&b.invoice.id))
        });

        let collections_total = self
            .payments
            .payments_for_rep(rep_id, &window)
            .await?
            .iter()
            .filter(|p| window.contains(p.paid_at))
            .map(|p| p.amount)
            .sum::<Decimal>();

        let target = rep.target();
        let ratio = target_ratio(sales_total, target);

        Ok(PerformanceSnapshot {
            rep_id: rep.id,
            period,
            window_start: window.start,
            window_end: window.end,
            sales_total,
            invoice_count,
            collections_total,
            target,
            target_ratio: ratio,
            remaining_to_target: (target - sales_total).max(Decimal::ZERO),
            progress: TargetProgress::from_ratio(target, ratio),
            overdue_invoices,
        })
    }
}
