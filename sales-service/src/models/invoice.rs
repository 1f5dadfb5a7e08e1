//! Invoice model for sales-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SalesError;

/// Invoice type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Sale,
    Purchase,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Sale => "sale",
            InvoiceType::Purchase => "purchase",
        }
    }
}

impl FromStr for InvoiceType {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(InvoiceType::Sale),
            "purchase" => Ok(InvoiceType::Purchase),
            other => Err(SalesError::Validation(format!(
                "unknown invoice type '{}', expected sale or purchase",
                other
            ))),
        }
    }
}

/// Invoice lifecycle state. `Waiting` moves to `Active` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    Waiting,
    Active,
}

impl InvoiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceState::Waiting => "waiting",
            InvoiceState::Active => "active",
        }
    }
}

impl FromStr for InvoiceState {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(InvoiceState::Waiting),
            "active" => Ok(InvoiceState::Active),
            other => Err(SalesError::Validation(format!(
                "unknown invoice state '{}'",
                other
            ))),
        }
    }
}

/// How the counterparty settles the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    #[default]
    Cash,
    Deferred,
}

impl PaymentTerms {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentTerms::Cash => "cash",
            PaymentTerms::Deferred => "deferred",
        }
    }
}

impl FromStr for PaymentTerms {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentTerms::Cash),
            "deferred" => Ok(PaymentTerms::Deferred),
            other => Err(SalesError::Validation(format!(
                "unknown payment terms '{}'",
                other
            ))),
        }
    }
}

/// The other side of the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Counterparty {
    Customer { name: String },
    Supplier { name: String },
    #[default]
    Unknown,
}

impl Counterparty {
    /// Resolve the loosely-populated `customer_name` / `supplier_name`
    /// columns into one variant. The column matching the invoice type wins;
    /// the other one is only a fallback.
    pub fn resolve(
        invoice_type: InvoiceType,
        customer_name: Option<String>,
        supplier_name: Option<String>,
    ) -> Self {
        let customer = customer_name.filter(|n| !n.trim().is_empty());
        let supplier = supplier_name.filter(|n| !n.trim().is_empty());

        match (invoice_type, customer, supplier) {
            (InvoiceType::Sale, Some(name), _) => Counterparty::Customer { name },
            (InvoiceType::Purchase, _, Some(name)) => Counterparty::Supplier { name },
            (_, Some(name), None) => Counterparty::Customer { name },
            (_, None, Some(name)) => Counterparty::Supplier { name },
            _ => Counterparty::Unknown,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Counterparty::Customer { name } | Counterparty::Supplier { name } => Some(name.as_str()),
            Counterparty::Unknown => None,
        }
    }
}

/// Invoice document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: Option<String>,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    pub state: InvoiceState,
    pub payment_terms: PaymentTerms,
    pub counterparty: Counterparty,
    pub total: Decimal,
    pub remaining_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub owner_id: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Set only by the waiting -> active conversion.
    pub activated_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// A freshly entered invoice, held in `waiting`.
    pub fn waiting(
        id: impl Into<String>,
        invoice_type: InvoiceType,
        total: Decimal,
        owner_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let owner_id = owner_id.into();
        Self {
            id: id.into(),
            invoice_number: None,
            invoice_type,
            state: InvoiceState::Waiting,
            payment_terms: PaymentTerms::Cash,
            counterparty: Counterparty::Unknown,
            total,
            remaining_amount: None,
            due_date: None,
            created_by: owner_id.clone(),
            owner_id,
            created_at,
            activated_at: None,
        }
    }

    pub fn with_payment_terms(mut self, terms: PaymentTerms) -> Self {
        self.payment_terms = terms;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparty = counterparty;
        self
    }

    pub fn with_invoice_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = Some(number.into());
        self
    }

    pub fn with_remaining_amount(mut self, remaining: Decimal) -> Self {
        self.remaining_amount = Some(remaining);
        self
    }

    /// Mark as active without going through conversion, for documents the
    /// order-entry side commits directly.
    pub fn into_active(mut self) -> Self {
        self.state = InvoiceState::Active;
        self
    }

    /// Sale invoices on deferred terms carry a collection obligation.
    pub fn is_receivable(&self) -> bool {
        self.invoice_type == InvoiceType::Sale && self.payment_terms == PaymentTerms::Deferred
    }

    /// Unpaid balance; zero while waiting or when nothing is owed.
    pub fn outstanding(&self) -> Decimal {
        match self.state {
            InvoiceState::Active => self.remaining_amount.unwrap_or(Decimal::ZERO),
            InvoiceState::Waiting => Decimal::ZERO,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.outstanding() > Decimal::ZERO && self.due_date.is_some_and(|due| due < today)
    }

    /// Apply the waiting -> active transition in place. Returns `false`
    /// (leaving the invoice untouched) when it is not waiting.
    pub fn activate(&mut self, at: DateTime<Utc>) -> bool {
        if self.state != InvoiceState::Waiting {
            return false;
        }
        self.state = InvoiceState::Active;
        self.activated_at = Some(at);
        if self.is_receivable() && self.remaining_amount.is_none() {
            self.remaining_amount = Some(self.total);
        }
        true
    }
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub state: Option<InvoiceState>,
    pub invoice_type: Option<InvoiceType>,
    pub owner_id: Option<String>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.state.is_none_or(|s| s == invoice.state)
            && self.invoice_type.is_none_or(|t| t == invoice.invoice_type)
            && self
                .owner_id
                .as_deref()
                .is_none_or(|owner| owner == invoice.owner_id)
    }
}
