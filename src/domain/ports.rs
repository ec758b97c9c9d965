use super::invoice::{Invoice, InvoiceId, InvoicePayment, InvoiceRecord};
use crate::error::{ProviderError, StorageError};
use async_trait::async_trait;

/// Durable record of invoices and their payment attempts.
///
/// All mutation of payment state goes through `claim_payment`, `confirm_paid`
/// and `release_failed`. At most one payment attempt may exist per invoice, and
/// `claim_payment` must create it with a single atomic insert-if-absent.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Stores an invoice row, replacing any previous row with the same id.
    /// Payment attempts are left untouched.
    async fn insert_invoice(&self, invoice: InvoiceRecord) -> Result<(), StorageError>;

    async fn fetch_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StorageError>;

    async fn fetch_invoices(&self) -> Result<Vec<Invoice>, StorageError>;

    /// Invoices with no payment attempt, in no particular order.
    async fn fetch_pending_invoices(&self) -> Result<Vec<Invoice>, StorageError>;

    async fn fetch_payment(&self, id: InvoiceId) -> Result<Option<InvoicePayment>, StorageError>;

    async fn fetch_payments(&self) -> Result<Vec<InvoicePayment>, StorageError>;

    /// Creates a `Started` attempt. Returns `false` if any attempt already
    /// exists, whether in progress or paid.
    async fn claim_payment(&self, id: InvoiceId) -> Result<bool, StorageError>;

    /// Moves a `Started` attempt to `Paid`. Returns `false` if there was none.
    async fn confirm_paid(&self, id: InvoiceId) -> Result<bool, StorageError>;

    /// Deletes a `Started` attempt. Never touches a `Paid` one.
    async fn release_failed(&self, id: InvoiceId) -> Result<bool, StorageError>;
}

/// External capability that charges the customer for an invoice.
///
/// `Ok(true)` means charged, `Ok(false)` means a well-formed rejection, and any
/// error leaves the outcome unknown.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn charge(&self, invoice: &Invoice) -> Result<bool, ProviderError>;
}

pub type LedgerBox = Box<dyn PaymentLedger>;
pub type PaymentProviderBox = Box<dyn PaymentProvider>;
