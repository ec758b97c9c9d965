use crate::domain::charge::{ChargeOutcome, ChargeResult};
use crate::domain::invoice::{Invoice, InvoiceId};
use crate::domain::ports::{LedgerBox, PaymentProviderBox};
use crate::error::{BillingError, ProviderError, Result};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingConfig {
    /// Upper bound on a single provider call. An expired call counts as an
    /// unknown outcome, exactly like a network failure.
    pub charge_timeout: Option<Duration>,
}

/// Charges invoices through the payment provider without ever charging one twice.
///
/// The only coordination between concurrent attempts is the ledger's
/// `claim_payment`: whoever creates the payment attempt is the only caller
/// allowed to talk to the provider for that invoice.
pub struct BillingService {
    ledger: LedgerBox,
    provider: PaymentProviderBox,
    config: BillingConfig,
}

impl BillingService {
    /// Creates a new `BillingService` with no provider timeout.
    ///
    /// # Arguments
    ///
    /// * `ledger` - The store of invoices and payment attempts.
    /// * `provider` - The external payment provider.
    pub fn new(ledger: LedgerBox, provider: PaymentProviderBox) -> Self {
        Self::with_config(ledger, provider, BillingConfig::default())
    }

    pub fn with_config(
        ledger: LedgerBox,
        provider: PaymentProviderBox,
        config: BillingConfig,
    ) -> Self {
        Self {
            ledger,
            provider,
            config,
        }
    }

    /// Runs the charge protocol for one invoice.
    ///
    /// Fails with `InvoiceNotFound` for an unknown id and with `Storage` when a
    /// ledger primitive fails. Every other ending is reported as a `ChargeResult`:
    ///
    /// * claim lost: `FailedConcurrentPayment`, the provider is not called.
    /// * provider charged: the attempt is confirmed, `Paid`.
    /// * provider declined: the attempt is released, `FailedRejected`.
    /// * provider errored or timed out: the attempt is left `Started`, `Unknown`.
    pub async fn charge_invoice(&self, invoice_id: InvoiceId) -> Result<ChargeResult> {
        let invoice = self
            .ledger
            .fetch_invoice(invoice_id)
            .await?
            .ok_or(BillingError::InvoiceNotFound(invoice_id))?;

        if !self.ledger.claim_payment(invoice_id).await? {
            debug!(invoice = invoice_id, "Payment already in progress or paid");
            return Ok(ChargeResult::new(
                invoice_id,
                ChargeOutcome::FailedConcurrentPayment,
            ));
        }

        let outcome = match self.charge_once(&invoice).await {
            Ok(true) => {
                let confirmed = self
                    .ledger
                    .confirm_paid(invoice_id)
                    .await
                    .inspect_err(|e| {
                        error!(
                            invoice = invoice_id,
                            error = %e,
                            "Charged invoice could not be confirmed, payment left in progress for manual review"
                        )
                    })?;
                if !confirmed {
                    warn!(
                        invoice = invoice_id,
                        "Charged invoice had no started payment to confirm"
                    );
                }
                ChargeOutcome::Paid
            }
            Ok(false) => {
                self.ledger.release_failed(invoice_id).await?;
                ChargeOutcome::FailedRejected
            }
            Err(e) => {
                // The customer may have been charged. Leave the attempt in place.
                error!(
                    invoice = invoice_id,
                    error = %e,
                    "Charge outcome unknown, payment left in progress for manual review"
                );
                ChargeOutcome::Unknown
            }
        };

        info!(invoice = invoice_id, %outcome, "Charge finished");
        Ok(ChargeResult::new(invoice_id, outcome))
    }

    /// Charges every pending invoice, one after another.
    ///
    /// Fails only if the pending invoices cannot be listed. A failure while
    /// charging one invoice is logged and that invoice is left out of the
    /// results; the rest are still charged.
    pub async fn charge_pending_invoices(&self) -> Result<Vec<ChargeResult>> {
        let pending = self.ledger.fetch_pending_invoices().await?;
        info!(count = pending.len(), "Charging pending invoices");

        let mut results = Vec::with_capacity(pending.len());
        for invoice in pending {
            match self.charge_invoice(invoice.id).await {
                Ok(result) => results.push(result),
                Err(e) => error!(invoice = invoice.id, error = %e, "Failed to charge invoice"),
            }
        }
        Ok(results)
    }

    async fn charge_once(&self, invoice: &Invoice) -> std::result::Result<bool, ProviderError> {
        let charge = self.provider.charge(invoice);
        match self.config.charge_timeout {
            Some(limit) => tokio::time::timeout(limit, charge)
                .await
                .map_err(|_| ProviderError::Timeout(limit))?,
            None => charge.await,
        }
    }
}
