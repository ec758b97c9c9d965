use crate::domain::invoice::{Invoice, InvoiceId, InvoicePayment, InvoiceRecord, PaymentStatus};
use crate::domain::ports::PaymentLedger;
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    invoices: HashMap<InvoiceId, InvoiceRecord>,
    payments: HashMap<InvoiceId, PaymentStatus>,
}

impl Tables {
    fn project(&self, record: &InvoiceRecord) -> Invoice {
        Invoice::project(record, self.payments.get(&record.id).copied())
    }
}

/// A thread-safe in-memory payment ledger.
///
/// Both tables live behind one `Arc<RwLock<..>>` so reads see a consistent join
/// and every mutation of a payment attempt happens under a single write guard.
/// Clones share the same tables. Atomicity only holds for tasks sharing this
/// instance; use the RocksDB ledger when state must outlive the process.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryLedger {
    async fn insert_invoice(&self, invoice: InvoiceRecord) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    async fn fetch_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.invoices.get(&id).map(|record| tables.project(record)))
    }

    async fn fetch_invoices(&self) -> Result<Vec<Invoice>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .invoices
            .values()
            .map(|record| tables.project(record))
            .collect())
    }

    async fn fetch_pending_invoices(&self) -> Result<Vec<Invoice>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .invoices
            .values()
            .filter(|record| !tables.payments.contains_key(&record.id))
            .map(|record| tables.project(record))
            .collect())
    }

    async fn fetch_payment(&self, id: InvoiceId) -> Result<Option<InvoicePayment>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .get(&id)
            .map(|&status| InvoicePayment { invoice: id, status }))
    }

    async fn fetch_payments(&self) -> Result<Vec<InvoicePayment>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .iter()
            .map(|(&invoice, &status)| InvoicePayment { invoice, status })
            .collect())
    }

    async fn claim_payment(&self, id: InvoiceId) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.invoices.contains_key(&id) {
            return Err(StorageError::UnknownInvoice(id));
        }
        match tables.payments.entry(id) {
            Entry::Occupied(existing) => {
                debug!(invoice = id, status = ?existing.get(), "Claim lost, payment attempt already exists");
                Ok(false)
            }
            Entry::Vacant(slot) => {
                slot.insert(PaymentStatus::Started);
                Ok(true)
            }
        }
    }

    async fn confirm_paid(&self, id: InvoiceId) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        match tables.payments.get_mut(&id) {
            Some(status) if *status == PaymentStatus::Started => {
                *status = PaymentStatus::Paid;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_failed(&self, id: InvoiceId) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.payments.get(&id) == Some(&PaymentStatus::Started) {
            tables.payments.remove(&id);
            debug!(invoice = id, "Payment attempt released");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
