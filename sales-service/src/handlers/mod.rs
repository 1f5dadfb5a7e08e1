//! HTTP handlers for sales-service.

pub mod health;
pub mod invoices;
pub mod performance;
