use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type InvoiceId = u32;
pub type CustomerId = u32;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Dkk,
    Sek,
    Gbp,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Dkk => "DKK",
            Currency::Sek => "SEK",
            Currency::Gbp => "GBP",
        };
        f.write_str(code)
    }
}

/// A monetary amount in a given currency.
///
/// Amounts are not validated here; invoices arrive already priced.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct Money {
    pub value: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }
}

/// The persisted invoice row.
///
/// Carries no status: the status of an invoice is always projected from its
/// payment attempt at read time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub customer: CustomerId,
    pub amount: Decimal,
    pub currency: Currency,
}

impl InvoiceRecord {
    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }
}

/// Status of the single payment attempt an invoice may have.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Started,
    Paid,
}

/// The at-most-one payment attempt recorded for an invoice.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct InvoicePayment {
    pub invoice: InvoiceId,
    pub status: PaymentStatus,
}

impl InvoicePayment {
    pub fn started(invoice: InvoiceId) -> Self {
        Self {
            invoice,
            status: PaymentStatus::Started,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    InProgress,
    Paid,
}

impl InvoiceStatus {
    /// Projects the invoice status from its payment attempt, if any.
    pub fn from_payment(payment: Option<PaymentStatus>) -> Self {
        match payment {
            None => InvoiceStatus::Pending,
            Some(PaymentStatus::Started) => InvoiceStatus::InProgress,
            Some(PaymentStatus::Paid) => InvoiceStatus::Paid,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::InProgress => "IN_PROGRESS",
            InvoiceStatus::Paid => "PAID",
        };
        f.write_str(status)
    }
}

/// Read view of an invoice: the stored row joined with its derived status.
#[derive(Debug, PartialEq, Clone)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer: CustomerId,
    pub amount: Money,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn project(record: &InvoiceRecord, payment: Option<PaymentStatus>) -> Self {
        Self {
            id: record.id,
            customer: record.customer,
            amount: record.money(),
            status: InvoiceStatus::from_payment(payment),
        }
    }
}
