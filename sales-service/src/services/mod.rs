//! Services module for sales-service.

pub mod aggregator;
pub mod database;
pub mod lifecycle;
pub mod memory;
pub mod metrics;
pub mod store;

pub use aggregator::{AggregationSettings, PerformanceAggregator};
pub use database::Database;
pub use lifecycle::{InvoiceLifecycleManager, WaitingFilter};
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{InvoiceStore, PaymentLedger, RepDirectory};
