use crate::domain::invoice::{Invoice, InvoiceId, InvoicePayment, InvoiceRecord, PaymentStatus};
use crate::domain::ports::PaymentLedger;
use crate::error::StorageError;
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, ErrorKind, IteratorMode, Options, TransactionDB,
    TransactionDBOptions,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Column Family for storing invoice rows.
pub const CF_INVOICES: &str = "invoices";
/// Column Family for storing payment attempts, keyed by invoice id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment ledger backed by RocksDB.
///
/// Invoices and payment attempts live in separate Column Families under the same
/// big-endian invoice key. The database is opened as a `TransactionDB` so that
/// claim, confirm and release run as pessimistic transactions holding an
/// exclusive lock on the payment key: the existence check and the write commit
/// together or not at all. RocksDB's own lock file keeps a second process from
/// opening the same database.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBLedger {
    db: Arc<TransactionDB>,
}

impl RocksDBLedger {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("invoices" and "payments") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_invoices = ColumnFamilyDescriptor::new(CF_INVOICES, Options::default());
        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());

        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            vec![cf_invoices, cf_payments],
        )?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or(StorageError::MissingColumnFamily(name))
    }

    fn payment_status(&self, id: InvoiceId) -> Result<Option<PaymentStatus>, StorageError> {
        let payments = self.cf(CF_PAYMENTS)?;
        match self.db.get_cf(payments, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn invoice_records(&self) -> Result<Vec<InvoiceRecord>, StorageError> {
        let invoices = self.cf(CF_INVOICES)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(invoices, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

/// Another transaction holds the payment key: someone else is claiming or
/// finalizing this invoice right now.
fn is_contention(err: &rocksdb::Error) -> bool {
    matches!(err.kind(), ErrorKind::Busy | ErrorKind::TimedOut)
}

#[async_trait]
impl PaymentLedger for RocksDBLedger {
    async fn insert_invoice(&self, invoice: InvoiceRecord) -> Result<(), StorageError> {
        let invoices = self.cf(CF_INVOICES)?;
        let value = serde_json::to_vec(&invoice)?;
        self.db.put_cf(invoices, invoice.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn fetch_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StorageError> {
        let invoices = self.cf(CF_INVOICES)?;
        let Some(bytes) = self.db.get_cf(invoices, id.to_be_bytes())? else {
            return Ok(None);
        };
        let record: InvoiceRecord = serde_json::from_slice(&bytes)?;
        Ok(Some(Invoice::project(&record, self.payment_status(id)?)))
    }

    async fn fetch_invoices(&self) -> Result<Vec<Invoice>, StorageError> {
        let mut invoices = Vec::new();
        for record in self.invoice_records()? {
            let payment = self.payment_status(record.id)?;
            invoices.push(Invoice::project(&record, payment));
        }
        Ok(invoices)
    }

    async fn fetch_pending_invoices(&self) -> Result<Vec<Invoice>, StorageError> {
        let mut pending = Vec::new();
        for record in self.invoice_records()? {
            if self.payment_status(record.id)?.is_none() {
                pending.push(Invoice::project(&record, None));
            }
        }
        Ok(pending)
    }

    async fn fetch_payment(&self, id: InvoiceId) -> Result<Option<InvoicePayment>, StorageError> {
        Ok(self
            .payment_status(id)?
            .map(|status| InvoicePayment { invoice: id, status }))
    }

    async fn fetch_payments(&self) -> Result<Vec<InvoicePayment>, StorageError> {
        let payments = self.cf(CF_PAYMENTS)?;
        let mut result = Vec::new();
        for item in self.db.iterator_cf(payments, IteratorMode::Start) {
            let (key, value) = item?;
            let key: [u8; 4] = key.as_ref().try_into().map_err(|_| {
                StorageError::Backend(format!("Malformed payment key of {} bytes", key.len()))
            })?;
            result.push(InvoicePayment {
                invoice: InvoiceId::from_be_bytes(key),
                status: serde_json::from_slice(&value)?,
            });
        }
        Ok(result)
    }

    async fn claim_payment(&self, id: InvoiceId) -> Result<bool, StorageError> {
        let invoices = self.cf(CF_INVOICES)?;
        let payments = self.cf(CF_PAYMENTS)?;
        let key = id.to_be_bytes();

        let txn = self.db.transaction();
        if txn.get_cf(invoices, key)?.is_none() {
            return Err(StorageError::UnknownInvoice(id));
        }
        match txn.get_for_update_cf(payments, key, true) {
            Ok(Some(_)) => {
                debug!(invoice = id, "Claim lost, payment attempt already exists");
                return Ok(false);
            }
            Ok(None) => {}
            Err(e) if is_contention(&e) => {
                debug!(invoice = id, error = %e, "Claim lost, payment key locked by another transaction");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }
        txn.put_cf(payments, key, serde_json::to_vec(&PaymentStatus::Started)?)?;
        match txn.commit() {
            Ok(()) => Ok(true),
            Err(e) if is_contention(&e) => {
                debug!(invoice = id, error = %e, "Claim lost, commit conflicted with another transaction");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn confirm_paid(&self, id: InvoiceId) -> Result<bool, StorageError> {
        let payments = self.cf(CF_PAYMENTS)?;
        let key = id.to_be_bytes();

        let txn = self.db.transaction();
        let Some(bytes) = txn.get_for_update_cf(payments, key, true)? else {
            return Ok(false);
        };
        let status: PaymentStatus = serde_json::from_slice(&bytes)?;
        if status != PaymentStatus::Started {
            return Ok(false);
        }
        txn.put_cf(payments, key, serde_json::to_vec(&PaymentStatus::Paid)?)?;
        txn.commit()?;
        Ok(true)
    }

    async fn release_failed(&self, id: InvoiceId) -> Result<bool, StorageError> {
        let payments = self.cf(CF_PAYMENTS)?;
        let key = id.to_be_bytes();

        let txn = self.db.transaction();
        let Some(bytes) = txn.get_for_update_cf(payments, key, true)? else {
            return Ok(false);
        };
        let status: PaymentStatus = serde_json::from_slice(&bytes)?;
        if status != PaymentStatus::Started {
            return Ok(false);
        }
        txn.delete_cf(payments, key)?;
        txn.commit()?;
        Ok(true)
    }
}
