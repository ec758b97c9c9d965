#![allow(dead_code)]

use async_trait::async_trait;
use invoice_billing::domain::invoice::{Currency, Invoice, InvoiceId, InvoiceRecord};
use invoice_billing::domain::ports::{PaymentLedger, PaymentProvider};
use invoice_billing::error::ProviderError;
use invoice_billing::infrastructure::in_memory::InMemoryLedger;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What a `FakeProvider` answers to every charge.
#[derive(Clone, Copy)]
pub enum Answer {
    Charge,
    Reject,
    Fail,
}

/// Provider double that answers the same way every time and counts its calls.
#[derive(Clone)]
pub struct FakeProvider {
    answer: Answer,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn new(answer: Answer) -> Self {
        Self {
            answer,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn charge(&self, _invoice: &Invoice) -> Result<bool, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Give racing callers a chance to run while this charge is in flight.
        tokio::task::yield_now().await;
        match self.answer {
            Answer::Charge => Ok(true),
            Answer::Reject => Ok(false),
            Answer::Fail => Err(ProviderError::Network("connection reset".to_string())),
        }
    }
}

pub fn invoice_record(id: InvoiceId) -> InvoiceRecord {
    InvoiceRecord {
        id,
        customer: 1,
        amount: dec!(8.88),
        currency: Currency::Usd,
    }
}

/// In-memory ledger holding invoices with the given ids, all pending.
pub async fn ledger_with(ids: &[InvoiceId]) -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    for &id in ids {
        ledger.insert_invoice(invoice_record(id)).await.unwrap();
    }
    ledger
}

pub fn write_invoices_csv(path: &Path, ids: &[InvoiceId]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["id", "customer", "amount", "currency"])?;
    for id in ids {
        wtr.write_record([id.to_string().as_str(), "1", "10.00", "EUR"])?;
    }

    wtr.flush()?;
    Ok(())
}
