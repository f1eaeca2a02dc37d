use crate::domain::invoice::{Invoice, InvoicePatch};
use crate::domain::penalty::PenaltySchedule;
use crate::domain::ports::{ClockRef, InvoiceStore, InvoiceStoreBox};
use crate::error::{Result, SettlementError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// An invoice the run had to skip, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFailure {
    pub invoice_id: String,
    pub invoice_number: String,
    pub reason: String,
}

impl InvoiceFailure {
    fn new(invoice: &Invoice, error: &SettlementError) -> Self {
        Self {
            invoice_id: invoice.id.clone(),
            invoice_number: invoice.invoice_number.clone(),
            reason: error.to_string(),
        }
    }
}

/// Everything a single settlement pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementReport {
    /// The calendar day the run evaluated due dates against.
    pub as_of: NaiveDate,
    /// Invoices marked overdue or re-penalized, in scan order.
    pub settled: Vec<Invoice>,
    /// Invoices skipped because of bad data.
    pub failures: Vec<InvoiceFailure>,
}

/// Payload returned to the caller that triggered the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    pub message: String,
    pub settled_count: usize,
    pub settled_invoices: Vec<String>,
}

impl SettlementReport {
    fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            settled: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn summary(&self) -> SettlementSummary {
        SettlementSummary {
            message: "Settlement process completed successfully.".to_string(),
            settled_count: self.settled.len(),
            settled_invoices: self
                .settled
                .iter()
                .map(|invoice| invoice.invoice_number.clone())
                .collect(),
        }
    }
}

/// Marks past-due invoices as overdue and assigns their progressive penalty.
///
/// The engine owns the store and clock it was given. Runs are serialized: a
/// call that arrives while another run is in flight waits for it to finish.
pub struct SettlementEngine {
    store: InvoiceStoreBox,
    clock: ClockRef,
    schedule: PenaltySchedule,
    run_lock: Mutex<()>,
}

impl SettlementEngine {
    /// Creates a new `SettlementEngine` with the default penalty schedule.
    ///
    /// # Arguments
    ///
    /// * `store` - The invoice store to scan and update.
    /// * `clock` - The source of "today" for each run.
    pub fn new(store: InvoiceStoreBox, clock: ClockRef) -> Self {
        Self::with_schedule(store, clock, PenaltySchedule::default())
    }

    pub fn with_schedule(store: InvoiceStoreBox, clock: ClockRef, schedule: PenaltySchedule) -> Self {
        Self {
            store,
            clock,
            schedule,
            run_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &dyn InvoiceStore {
        self.store.as_ref()
    }

    /// Runs one settlement pass and returns the invoices it touched.
    pub async fn settle_due_invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self.run().await?.settled)
    }

    /// Runs one settlement pass.
    ///
    /// Bad data on a single invoice is logged and recorded in the report's
    /// `failures`; the pass continues. Store errors end the pass.
    pub async fn run(&self) -> Result<SettlementReport> {
        let _running = self.run_lock.lock().await;

        let today = self.clock.today();
        info!(%today, "Starting automated settlement process");
        let mut report = SettlementReport::new(today);

        let candidates: Vec<Invoice> = self
            .store
            .all_invoices()
            .await?
            .into_iter()
            .filter(|invoice| invoice.status.is_settleable())
            .collect();

        if candidates.is_empty() {
            info!("No funded or overdue invoices to process");
            return Ok(report);
        }
        info!(count = candidates.len(), "Found invoices to process");

        for invoice in candidates {
            let due_date = match Self::validate(&invoice) {
                Ok(due_date) => due_date,
                Err(e) => {
                    warn!(
                        invoice = %invoice.invoice_number,
                        error = %e,
                        "Failed to apply penalty to invoice"
                    );
                    report.failures.push(InvoiceFailure::new(&invoice, &e));
                    continue;
                }
            };

            let Some(assessment) = self.schedule.assess(invoice.amount, due_date, today) else {
                continue;
            };

            match self
                .store
                .update(&invoice.id, InvoicePatch::overdue(assessment.penalty))
                .await
            {
                Ok(Some(updated)) => {
                    info!(
                        invoice = %updated.invoice_number,
                        days_overdue = assessment.days_overdue,
                        weeks_overdue = assessment.weeks_overdue,
                        rate = %assessment.rate,
                        penalty = %assessment.penalty.round_dp(2),
                        "Invoice is overdue, penalty applied"
                    );
                    report.settled.push(updated);
                }
                Ok(None) => debug!(invoice = %invoice.id, "Invoice left the store mid-run, skipping"),
                // The invoice changed under us (e.g. repaid) and no longer accepts the patch.
                Err(e @ SettlementError::ValidationError(_)) => {
                    warn!(
                        invoice = %invoice.invoice_number,
                        error = %e,
                        "Failed to apply penalty to invoice"
                    );
                    report.failures.push(InvoiceFailure::new(&invoice, &e));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            settled = report.settled.len(),
            failed = report.failures.len(),
            "Automated settlement process finished"
        );
        Ok(report)
    }

    fn validate(invoice: &Invoice) -> Result<NaiveDate> {
        if invoice.amount < Decimal::ZERO {
            return Err(SettlementError::ValidationError(format!(
                "Invoice amount must not be negative, got {}",
                invoice.amount
            )));
        }
        invoice.parse_due_date()
    }
}
