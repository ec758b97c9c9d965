use super::invoice::InvoiceId;
use serde::Serialize;
use std::fmt;

/// Outcome of one run of the charge protocol for an invoice.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeOutcome {
    /// The provider confirmed the charge and the attempt is now terminal.
    Paid,
    /// Another attempt exists for the invoice, in flight or already paid.
    FailedConcurrentPayment,
    /// The provider declined; the invoice is open for a future attempt.
    FailedRejected,
    /// Whether the customer was charged could not be established.
    /// The attempt stays in progress until someone reconciles it by hand.
    Unknown,
}

impl fmt::Display for ChargeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self {
            ChargeOutcome::Paid => "PAID",
            ChargeOutcome::FailedConcurrentPayment => "FAILED_CONCURRENT_PAYMENT",
            ChargeOutcome::FailedRejected => "FAILED_REJECTED",
            ChargeOutcome::Unknown => "UNKNOWN",
        };
        f.write_str(outcome)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct ChargeResult {
    pub invoice: InvoiceId,
    pub outcome: ChargeOutcome,
}

impl ChargeResult {
    pub fn new(invoice: InvoiceId, outcome: ChargeOutcome) -> Self {
        Self { invoice, outcome }
    }
}
