//! Performance snapshot returned to rep dashboards.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::{Invoice, Period};

/// Receivable aging bucket, by whole days past the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AgingBucket {
    #[serde(rename = "days_1_30")]
    Days1To30,
    #[serde(rename = "days_31_60")]
    Days31To60,
    #[serde(rename = "days_61_90")]
    Days61To90,
    #[serde(rename = "over_90")]
    Over90,
}

impl AgingBucket {
    pub fn from_days(days_overdue: i64) -> Self {
        match days_overdue {
            i64::MIN..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }
}

/// An overdue invoice with its urgency classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueInvoice {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub days_overdue: i64,
    pub aging: AgingBucket,
}

impl OverdueInvoice {
    /// Classify `invoice` against `today`. Callers only pass invoices that
    /// have a due date in the past.
    pub fn classify(invoice: Invoice, today: NaiveDate) -> Self {
        let days_overdue = invoice
            .due_date
            .map(|due| (today - due).num_days())
            .unwrap_or(0);
        Self {
            aging: AgingBucket::from_days(days_overdue),
            days_overdue,
            invoice,
        }
    }
}

/// Qualitative band for the target ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetProgress {
    NoTarget,
    AtRisk,
    Behind,
    OnTrack,
    Achieved,
}

impl TargetProgress {
    pub fn from_ratio(target: Decimal, ratio: u8) -> Self {
        if target <= Decimal::ZERO {
            return TargetProgress::NoTarget;
        }
        match ratio {
            100..=u8::MAX => TargetProgress::Achieved,
            70..=99 => TargetProgress::OnTrack,
            40..=69 => TargetProgress::Behind,
            _ => TargetProgress::AtRisk,
        }
    }
}

/// Percentage of `target` reached by `sales_total`, rounded half away from
/// zero and clamped to `[0, 100]`. Zero when there is no positive target.
pub fn target_ratio(sales_total: Decimal, target: Decimal) -> u8 {
    if target <= Decimal::ZERO || sales_total <= Decimal::ZERO {
        return 0;
    }

    let percent = sales_total
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(target))
        .map(|p| p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero));

    match percent {
        Some(p) => p.min(Decimal::ONE_HUNDRED).to_u8().unwrap_or(100),
        // Overflow only happens when sales dwarf the target.
        None => 100,
    }
}

/// Point-in-time performance of one rep. Recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
    pub rep_id: String,
    pub period: Period,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub sales_total: Decimal,
    pub invoice_count: u64,
    pub collections_total: Decimal,
    pub target: Decimal,
    pub target_ratio: u8,
    pub remaining_to_target: Decimal,
    pub progress: TargetProgress,
    pub overdue_invoices: Vec<OverdueInvoice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn test_target_ratio_values() {
        assert_eq!(target_ratio(d(750_000), d(1_000_000)), 75);
        assert_eq!(target_ratio(d(0), d(1_000_000)), 0);
        assert_eq!(target_ratio(d(2_000_000), d(1_000_000)), 100);
    }

    #[test]
    fn test_target_ratio_zero_target() {
        assert_eq!(target_ratio(d(500), Decimal::ZERO), 0);
        assert_eq!(target_ratio(Decimal::ZERO, Decimal::ZERO), 0);
    }

    #[test]
    fn test_target_ratio_rounds_half_up() {
        // 1/8 = 12.5% -> 13
        assert_eq!(target_ratio(d(1), d(8)), 13);
        // 1/3 = 33.33% -> 33
        assert_eq!(target_ratio(d(1), d(3)), 33);
        // 0.4% -> 0
        assert_eq!(target_ratio(d(4), d(1_000)), 0);
    }

    #[test]
    fn test_target_ratio_bounds() {
        for sales in [0, 1, 7, 499, 995, 1_000, 1_004, 1_005, 10_000, 999_999_999] {
            for target in [1, 3, 1_000, 7_777] {
                let ratio = target_ratio(d(sales), d(target));
                assert!(ratio <= 100, "sales={} target={} ratio={}", sales, target, ratio);
            }
        }
        assert_eq!(target_ratio(Decimal::MAX, Decimal::new(1, 28)), 100);
    }

    #[test]
    fn test_aging_buckets() {
        assert_eq!(AgingBucket::from_days(1), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::from_days(30), AgingBucket::Days1To30);
        assert_eq!(AgingBucket::from_days(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::from_days(90), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::from_days(91), AgingBucket::Over90);
    }

    #[test]
    fn test_progress_bands() {
        assert_eq!(TargetProgress::from_ratio(Decimal::ZERO, 0), TargetProgress::NoTarget);
        assert_eq!(TargetProgress::from_ratio(d(10), 100), TargetProgress::Achieved);
        assert_eq!(TargetProgress::from_ratio(d(10), 75), TargetProgress::OnTrack);
        assert_eq!(TargetProgress::from_ratio(d(10), 40), TargetProgress::Behind);
        assert_eq!(TargetProgress::from_ratio(d(10), 39), TargetProgress::AtRisk);
    }
}
