//! Common test utilities for sales-service integration tests.

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sales_service::models::{Invoice, InvoiceType, PaymentTerms};
use sales_service::services::{init_metrics, AggregationSettings, InMemoryStore};
use sales_service::startup::{router, AppState};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,sales_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Test application wired over an in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
}

#[allow(dead_code)]
impl TestApp {
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(AggregationSettings::default())
}

#[allow(dead_code)]
pub fn spawn_app_with(settings: AggregationSettings) -> TestApp {
    init_tracing();
    init_metrics();

    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), store.clone(), store.clone(), settings);
    TestApp { store, state }
}

#[allow(dead_code)]
pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn amount(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// Deferred-terms sale invoice in `waiting`.
#[allow(dead_code)]
pub fn deferred_sale(id: &str, owner: &str, total: i64, created_at: DateTime<Utc>) -> Invoice {
    Invoice::waiting(id, InvoiceType::Sale, amount(total), owner, created_at)
        .with_payment_terms(PaymentTerms::Deferred)
}
