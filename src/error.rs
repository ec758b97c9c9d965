use crate::domain::invoice::{CustomerId, InvoiceId};
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = BillingError> = std::result::Result<T, E>;

/// Failures of the ledger's storage primitives.
///
/// Losing a claim race is not one of these: `claim_payment` reports it as `Ok(false)`.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invoice {0} does not exist in the ledger")]
    UnknownInvoice(InvoiceId),
    #[error("Column family '{0}' not found")]
    MissingColumnFamily(&'static str),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors raised by a payment provider.
///
/// Every variant leaves the outcome of the charge indeterminate.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error while contacting payment provider: {0}")]
    Network(String),
    #[error("Customer {0} is unknown to the payment provider")]
    CustomerNotFound(CustomerId),
    #[error("Currency of invoice {invoice} does not match customer {customer}")]
    CurrencyMismatch {
        invoice: InvoiceId,
        customer: CustomerId,
    },
    #[error("Payment provider did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Invoice {0} was not found")]
    InvoiceNotFound(InvoiceId),
    #[error("Payment for invoice {0} was not found")]
    InvoicePaymentNotFound(InvoiceId),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
