use crate::domain::invoice::{Invoice, InvoiceId, InvoicePayment, InvoiceStatus};
use crate::domain::ports::LedgerBox;
use crate::error::{BillingError, Result};

/// Read-side queries over invoices and their payment attempts.
pub struct InvoiceService {
    ledger: LedgerBox,
}

impl InvoiceService {
    pub fn new(ledger: LedgerBox) -> Self {
        Self { ledger }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Invoice>> {
        Ok(self.ledger.fetch_invoices().await?)
    }

    pub async fn fetch(&self, id: InvoiceId) -> Result<Invoice> {
        self.ledger
            .fetch_invoice(id)
            .await?
            .ok_or(BillingError::InvoiceNotFound(id))
    }

    pub async fn fetch_all_payments(&self) -> Result<Vec<InvoicePayment>> {
        Ok(self.ledger.fetch_payments().await?)
    }

    pub async fn fetch_payment(&self, invoice_id: InvoiceId) -> Result<InvoicePayment> {
        self.fetch(invoice_id).await?;
        self.ledger
            .fetch_payment(invoice_id)
            .await?
            .ok_or(BillingError::InvoicePaymentNotFound(invoice_id))
    }

    /// Invoices whose payment attempt is started but not finished.
    ///
    /// Outside of a running batch these are the frozen attempts left by an
    /// unknown charge outcome, and they need reconciling by hand.
    pub async fn fetch_in_progress(&self) -> Result<Vec<Invoice>> {
        let mut invoices = self.fetch_all().await?;
        invoices.retain(|invoice| invoice.status == InvoiceStatus::InProgress);
        Ok(invoices)
    }
}
