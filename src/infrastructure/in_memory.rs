use crate::domain::invoice::{Invoice, InvoicePatch};
use crate::domain::ports::InvoiceStore;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for invoices.
///
/// Uses `Arc<RwLock<Vec<Invoice>>>` so listing follows insertion order and
/// clones share the same ledger. Patches are applied under the write lock.
#[derive(Default, Clone)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<RwLock<Vec<Invoice>>>,
}

impl InMemoryInvoiceStore {
    /// Creates a new, empty in-memory invoice store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `invoices`, in order.
    pub fn with_invoices(invoices: Vec<Invoice>) -> Self {
        Self {
            invoices: Arc::new(RwLock::new(invoices)),
        }
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn store(&self, invoice: Invoice) -> Result<()> {
        invoice.validate()?;
        let mut invoices = self.invoices.write().await;
        match invoices.iter_mut().find(|existing| existing.id == invoice.id) {
            Some(existing) => *existing = invoice,
            None => invoices.push(invoice),
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>> {
        let invoices = self.invoices.read().await;
        Ok(invoices.iter().find(|invoice| invoice.id == id).cloned())
    }

    async fn all_invoices(&self) -> Result<Vec<Invoice>> {
        let invoices = self.invoices.read().await;
        Ok(invoices.clone())
    }

    async fn update(&self, id: &str, patch: InvoicePatch) -> Result<Option<Invoice>> {
        let mut invoices = self.invoices.write().await;
        let Some(invoice) = invoices.iter_mut().find(|invoice| invoice.id == id) else {
            return Ok(None);
        };
        invoice.apply(patch)?;
        Ok(Some(invoice.clone()))
    }
}
