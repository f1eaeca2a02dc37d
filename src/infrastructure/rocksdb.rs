use crate::domain::invoice::{Invoice, InvoicePatch};
use crate::domain::ports::InvoiceStore;
use crate::error::{Result, SettlementError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing invoices, keyed by invoice id.
pub const CF_INVOICES: &str = "invoices";

/// A persistent invoice store using RocksDB.
///
/// Invoices are stored as JSON under their id. Listing follows key order.
/// `update` is a read-modify-write guarded by a store-wide lock, so patches
/// from concurrent callers never interleave.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "invoices" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_invoices = ColumnFamilyDescriptor::new(CF_INVOICES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_invoices])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn put(&self, invoice: &Invoice) -> Result<()> {
        let cf = self.invoices_cf()?;
        let value = serde_json::to_vec(invoice)?;
        self.db.put_cf(cf, invoice.id.as_bytes(), value)?;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Option<Invoice>> {
        let cf = self.invoices_cf()?;
        match self.db.get_pinned_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn invoices_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_INVOICES).ok_or_else(|| {
            SettlementError::InternalError(Box::new(std::io::Error::other(
                "Invoices column family not found",
            )))
        })
    }
}

#[async_trait]
impl InvoiceStore for RocksDBStore {
    async fn store(&self, invoice: Invoice) -> Result<()> {
        invoice.validate()?;
        let _guard = self.write_lock.lock().await;
        self.put(&invoice)
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>> {
        self.read(id)
    }

    async fn all_invoices(&self) -> Result<Vec<Invoice>> {
        let cf = self.invoices_cf()?;
        let mut invoices = Vec::new();

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            invoices.push(serde_json::from_slice(&value)?);
        }

        Ok(invoices)
    }

    async fn update(&self, id: &str, patch: InvoicePatch) -> Result<Option<Invoice>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut invoice) = self.read(id)? else {
            return Ok(None);
        };
        invoice.apply(patch)?;
        self.put(&invoice)?;
        Ok(Some(invoice))
    }
}
