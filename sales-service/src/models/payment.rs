//! Payment model for sales-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment collected against an invoice. Read-only here; recorded by the
/// collections side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    /// Rep owning the invoice the payment settles.
    pub owner_id: String,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}
