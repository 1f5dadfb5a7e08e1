//! Domain models for sales-service.

mod invoice;
mod payment;
mod period;
mod rep;
mod snapshot;

pub use invoice::{Counterparty, Invoice, InvoiceFilter, InvoiceState, InvoiceType, PaymentTerms};
pub use payment::Payment;
pub use period::{MonthWindow, Period, TimeWindow};
pub use rep::SalesRep;
pub use snapshot::{target_ratio, AgingBucket, OverdueInvoice, PerformanceSnapshot, TargetProgress};
