//! Sales Service - invoice activation and sales-rep performance.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use error::SalesError;
