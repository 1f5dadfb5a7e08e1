//! Performance snapshot integration tests for sales-service.

mod common;

use chrono::NaiveDate;
use common::{amount, deferred_sale, spawn_app, spawn_app_with, utc};
use sales_service::models::{
    AgingBucket, MonthWindow, Payment, Period, SalesRep, TargetProgress,
};
use sales_service::services::AggregationSettings;
use sales_service::SalesError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_snapshot_scenario_r1_month() {
    let app = spawn_app();
    let now = utc(2024, 3, 20, 12);
    app.store
        .upsert_rep(SalesRep::new("R1", "Rep One").with_target(amount(1_000_000)));
    app.store
        .insert_invoice(deferred_sale("S-1", "R1", 500_000, utc(2024, 3, 1, 10)).into_active());
    app.store
        .insert_invoice(deferred_sale("S-2", "R1", 250_000, utc(2024, 3, 18, 10)).into_active());

    let snapshot = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Month, now)
        .await
        .unwrap();

    assert_eq!(snapshot.sales_total, amount(750_000));
    assert_eq!(snapshot.invoice_count, 2);
    assert_eq!(snapshot.target, amount(1_000_000));
    assert_eq!(snapshot.target_ratio, 75);
    assert_eq!(snapshot.remaining_to_target, amount(250_000));
    assert_eq!(snapshot.progress, TargetProgress::OnTrack);
}

#[tokio::test]
async fn test_snapshot_scenario_empty_rep() {
    let app = spawn_app();
    app.store.upsert_rep(SalesRep::new("R2", "Rep Two"));

    let snapshot = app
        .state
        .aggregator
        .compute_snapshot_at("R2", Period::Today, utc(2024, 3, 20, 12))
        .await
        .unwrap();

    assert_eq!(snapshot.sales_total, amount(0));
    assert_eq!(snapshot.invoice_count, 0);
    assert_eq!(snapshot.collections_total, amount(0));
    assert_eq!(snapshot.target_ratio, 0);
    assert!(snapshot.overdue_invoices.is_empty());
}

#[tokio::test]
async fn test_unknown_rep_is_not_found() {
    let app = spawn_app();
    let err = app
        .state
        .aggregator
        .compute_snapshot_at("R404", Period::Week, utc(2024, 3, 20, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, SalesError::NotFound(_)));
}

#[tokio::test]
async fn test_overdue_ordering() {
    let app = spawn_app();
    app.store.upsert_rep(SalesRep::new("R1", "Rep One"));
    for (id, due) in [
        ("INV-A", date(2024, 1, 1)),
        ("INV-B", date(2024, 1, 5)),
        ("INV-C", date(2024, 1, 3)),
        ("INV-D", date(2024, 1, 3)),
    ] {
        app.store.insert_invoice(
            deferred_sale(id, "R1", 100, utc(2023, 12, 1, 9))
                .with_due_date(due)
                .with_remaining_amount(amount(100))
                .into_active(),
        );
    }

    let snapshot = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Month, utc(2024, 2, 1, 9))
        .await
        .unwrap();

    let order: Vec<_> = snapshot
        .overdue_invoices
        .iter()
        .map(|o| (o.invoice.id.as_str(), o.invoice.due_date.unwrap()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("INV-A", date(2024, 1, 1)),
            ("INV-C", date(2024, 1, 3)),
            ("INV-D", date(2024, 1, 3)),
            ("INV-B", date(2024, 1, 5)),
        ]
    );
    assert_eq!(snapshot.overdue_invoices[0].days_overdue, 31);
    assert_eq!(snapshot.overdue_invoices[0].aging, AgingBucket::Days31To60);
    assert_eq!(snapshot.overdue_invoices[3].aging, AgingBucket::Days1To30);
}

#[tokio::test]
async fn test_snapshot_is_pure() {
    let app = spawn_app();
    let now = utc(2024, 3, 20, 12);
    app.store
        .upsert_rep(SalesRep::new("R1", "Rep One").with_target(amount(900)));
    for n in 0..10 {
        app.store.insert_invoice(
            deferred_sale(&format!("S-{}", n), "R1", 10 * (n + 1), utc(2024, 3, 10 + n as u32, 8))
                .with_due_date(date(2024, 3, 1 + n as u32))
                .with_remaining_amount(amount(5))
                .into_active(),
        );
    }
    app.store.record_payment(Payment {
        id: "PM-1".to_string(),
        invoice_id: "S-1".to_string(),
        owner_id: String::new(),
        amount: amount(15),
        paid_at: utc(2024, 3, 19, 9),
    });

    let first = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Month, now)
        .await
        .unwrap();
    let second = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Month, now)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(first.collections_total, amount(15));
}

#[tokio::test]
async fn test_snapshot_does_not_mutate_invoices() {
    let app = spawn_app();
    app.store.upsert_rep(SalesRep::new("R1", "Rep One"));
    app.store
        .insert_invoice(deferred_sale("W-1", "R1", 100, utc(2024, 3, 20, 8)));

    app.state
        .aggregator
        .compute_snapshot_at("R1", Period::Today, utc(2024, 3, 20, 12))
        .await
        .unwrap();

    let waiting = app
        .state
        .lifecycle
        .list_waiting(Default::default())
        .await
        .unwrap();
    assert_eq!(waiting.len(), 1);
}

#[tokio::test]
async fn test_conversion_counts_toward_sales() {
    let app = spawn_app();
    let now = utc(2024, 3, 20, 12);
    app.store
        .upsert_rep(SalesRep::new("R1", "Rep One").with_target(amount(200)));
    app.store
        .insert_invoice(deferred_sale("S-1", "R1", 100, utc(2024, 3, 20, 8)));

    let before = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Today, now)
        .await
        .unwrap();
    assert_eq!(before.sales_total, amount(0));

    app.state.lifecycle.convert_to_active("S-1").await.unwrap();

    let after = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Today, now)
        .await
        .unwrap();
    assert_eq!(after.sales_total, amount(100));
    assert_eq!(after.target_ratio, 50);
    assert_eq!(after.progress, TargetProgress::Behind);
}

#[tokio::test]
async fn test_calendar_month_window() {
    let app = spawn_app_with(AggregationSettings {
        timezone: chrono_tz::Tz::UTC,
        month_window: MonthWindow::Calendar,
    });
    app.store.upsert_rep(SalesRep::new("R1", "Rep One"));
    app.store
        .insert_invoice(deferred_sale("FEB", "R1", 400, utc(2024, 2, 25, 8)).into_active());
    app.store
        .insert_invoice(deferred_sale("MAR", "R1", 100, utc(2024, 3, 2, 8)).into_active());

    let snapshot = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Month, utc(2024, 3, 10, 12))
        .await
        .unwrap();
    assert_eq!(snapshot.sales_total, amount(100));
    assert_eq!(snapshot.window_start, utc(2024, 3, 1, 0));
}

#[tokio::test]
async fn test_timezone_decides_today() {
    let app = spawn_app_with(AggregationSettings {
        timezone: chrono_tz::Asia::Baghdad,
        month_window: MonthWindow::Rolling,
    });
    app.store.upsert_rep(SalesRep::new("R1", "Rep One"));
    // 22:00 UTC on the 19th is 01:00 on the 20th in Baghdad.
    app.store
        .insert_invoice(deferred_sale("LATE", "R1", 70, utc(2024, 3, 19, 22)).into_active());
    app.store
        .insert_invoice(deferred_sale("EARLY", "R1", 30, utc(2024, 3, 19, 20)).into_active());

    let snapshot = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Today, utc(2024, 3, 20, 9))
        .await
        .unwrap();
    assert_eq!(snapshot.sales_total, amount(70));
    assert_eq!(snapshot.invoice_count, 1);
}

#[tokio::test]
async fn test_payment_recorded_before_invoice_counts() {
    let app = spawn_app();
    let now = utc(2024, 3, 20, 12);
    app.store.upsert_rep(SalesRep::new("R1", "Rep One"));
    app.store.record_payment(Payment {
        id: "PM-1".to_string(),
        invoice_id: "S-1".to_string(),
        owner_id: String::new(),
        amount: amount(100),
        paid_at: utc(2024, 3, 20, 9),
    });
    app.store
        .insert_invoice(deferred_sale("S-1", "R1", 400, utc(2024, 2, 1, 10)).into_active());

    let snapshot = app
        .state
        .aggregator
        .compute_snapshot_at("R1", Period::Today, now)
        .await
        .unwrap();

    assert_eq!(snapshot.collections_total, amount(100));
}
