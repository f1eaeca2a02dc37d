use super::invoice::{Invoice, InvoicePatch};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Storage port for invoices, shared with the rest of the platform.
///
/// `all_invoices` yields invoices in the store's iteration order; settlement
/// reports follow that order. `update` must apply a patch atomically and
/// returns `None` when the invoice is no longer present.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn store(&self, invoice: Invoice) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Invoice>>;
    async fn all_invoices(&self) -> Result<Vec<Invoice>>;
    async fn update(&self, id: &str, patch: InvoicePatch) -> Result<Option<Invoice>>;
}

pub type InvoiceStoreBox = Box<dyn InvoiceStore>;

/// Time source for settlement runs.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The current UTC calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub type ClockRef = Arc<dyn Clock>;
