//! PostgreSQL store for sales-service.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use tracing::{info, instrument};

use super::metrics::DB_QUERY_DURATION;
use super::store::{InvoiceStore, PaymentLedger, RepDirectory};
use crate::error::SalesError;
use crate::models::{Counterparty, Invoice, InvoiceFilter, Payment, SalesRep, TimeWindow};

const INVOICE_COLUMNS: &str = "invoice_id, invoice_number, invoice_type, state, payment_terms, \
    customer_name, supplier_name, total, remaining_amount, due_date, owner_id, created_by, \
    created_at, activated_at";

/// Raw `invoices` row. Converted to [`Invoice`] at this boundary so the
/// counterparty columns are resolved exactly once.
#[derive(Debug, FromRow)]
struct InvoiceRow {
    invoice_id: String,
    invoice_number: Option<String>,
    invoice_type: String,
    state: String,
    payment_terms: String,
    customer_name: Option<String>,
    supplier_name: Option<String>,
    total: Decimal,
    remaining_amount: Option<Decimal>,
    due_date: Option<NaiveDate>,
    owner_id: String,
    created_by: String,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = SalesError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let corrupt = |e: SalesError| {
            SalesError::Storage(anyhow::anyhow!(
                "Invoice {} has an unreadable column: {}",
                row.invoice_id,
                e
            ))
        };
        let invoice_type = row.invoice_type.parse().map_err(corrupt)?;
        let state = row.state.parse().map_err(corrupt)?;
        let payment_terms = row.payment_terms.parse().map_err(corrupt)?;

        Ok(Invoice {
            counterparty: Counterparty::resolve(invoice_type, row.customer_name, row.supplier_name),
            id: row.invoice_id,
            invoice_number: row.invoice_number,
            invoice_type,
            state,
            payment_terms,
            total: row.total,
            remaining_amount: row.remaining_amount,
            due_date: row.due_date,
            owner_id: row.owner_id,
            created_by: row.created_by,
            created_at: row.created_at,
            activated_at: row.activated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    payment_id: String,
    invoice_id: String,
    owner_id: String,
    amount: Decimal,
    paid_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: row.payment_id,
            invoice_id: row.invoice_id,
            owner_id: row.owner_id,
            amount: row.amount,
            paid_at: row.paid_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RepRow {
    rep_id: String,
    name: String,
    monthly_target: Option<Decimal>,
}

fn db_error(context: &str, err: sqlx::Error) -> SalesError {
    SalesError::Storage(anyhow::anyhow!("{}: {}", context, err))
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "sales-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, SalesError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| db_error("Failed to connect", e))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), SalesError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| SalesError::Storage(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for Database {
    #[instrument(skip(self))]
    async fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>, SalesError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices WHERE invoice_id = $1",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get invoice", e))?;

        timer.observe_duration();

        row.map(Invoice::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, SalesError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {}
            FROM invoices
            WHERE ($1::text IS NULL OR state = $1)
              AND ($2::text IS NULL OR invoice_type = $2)
              AND ($3::text IS NULL OR owner_id = $3)
            ORDER BY created_at, invoice_id
            "#,
            INVOICE_COLUMNS
        ))
        .bind(filter.state.map(|s| s.as_str()))
        .bind(filter.invoice_type.map(|t| t.as_str()))
        .bind(filter.owner_id.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list invoices", e))?;

        timer.observe_duration();

        rows.into_iter().map(Invoice::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn activate_if_waiting(
        &self,
        invoice_id: &str,
        activated_at: DateTime<Utc>,
    ) -> Result<Option<Invoice>, SalesError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["activate_invoice"])
            .start_timer();

        // The state predicate makes this a compare-and-set: of several
        // concurrent updates only one finds the row still waiting.
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            UPDATE invoices
            SET state = 'active',
                activated_at = $2,
                remaining_amount = CASE
                    WHEN invoice_type = 'sale' AND payment_terms = 'deferred' AND remaining_amount IS NULL
                    THEN total
                    ELSE remaining_amount
                END
            WHERE invoice_id = $1 AND state = 'waiting'
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .bind(activated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to activate invoice", e))?;

        timer.observe_duration();

        let invoice = row.map(Invoice::try_from).transpose()?;
        if let Some(ref inv) = invoice {
            info!(
                invoice_id = %inv.id,
                remaining_amount = ?inv.remaining_amount,
                "Invoice activated"
            );
        }

        Ok(invoice)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), SalesError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Health check failed", e))?;
        Ok(())
    }
}

#[async_trait]
impl PaymentLedger for Database {
    #[instrument(skip(self), fields(window_start = %window.start, window_end = %window.end))]
    async fn payments_for_rep(
        &self,
        owner_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Payment>, SalesError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["payments_for_rep"])
            .start_timer();

        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT p.payment_id, p.invoice_id, i.owner_id, p.amount, p.paid_at
            FROM payments p
            JOIN invoices i ON i.invoice_id = p.invoice_id
            WHERE i.owner_id = $1 AND p.paid_at >= $2 AND p.paid_at < $3
            ORDER BY p.paid_at, p.payment_id
            "#,
        )
        .bind(owner_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list payments", e))?;

        timer.observe_duration();

        Ok(rows.into_iter().map(Payment::from).collect())
    }
}

#[async_trait]
impl RepDirectory for Database {
    #[instrument(skip(self))]
    async fn find_rep(&self, rep_id: &str) -> Result<Option<SalesRep>, SalesError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_rep"])
            .start_timer();

        let row = sqlx::query_as::<_, RepRow>(
            "SELECT rep_id, name, monthly_target FROM sales_reps WHERE rep_id = $1",
        )
        .bind(rep_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get sales rep", e))?;

        timer.observe_duration();

        Ok(row.map(|r| SalesRep {
            id: r.rep_id,
            name: r.name,
            monthly_target: r.monthly_target,
        }))
    }
}
