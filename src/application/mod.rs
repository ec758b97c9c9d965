//! Application layer containing the billing orchestration.
//!
//! `BillingService` runs the charge protocol against the ledger and the payment
//! provider. `InvoiceService` answers read-side queries, including which
//! invoices are stuck in progress and need manual reconciliation.

pub mod billing;
pub mod invoices;
