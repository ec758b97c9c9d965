use crate::domain::charge::ChargeResult;
use crate::domain::invoice::Invoice;
use crate::error::Result;
use std::io::Write;

/// Writes charge results as `invoice,outcome` rows.
pub struct ChargeResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ChargeResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_results<I>(&mut self, results: I) -> Result<()>
    where
        I: IntoIterator<Item = ChargeResult>,
    {
        self.writer.write_record(["invoice", "outcome"])?;
        for result in results {
            self.writer
                .write_record([result.invoice.to_string(), result.outcome.to_string()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes invoices with their derived status as `id,customer,amount,currency,status` rows.
pub struct InvoiceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> InvoiceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_invoices<I>(&mut self, invoices: I) -> Result<()>
    where
        I: IntoIterator<Item = Invoice>,
    {
        self.writer
            .write_record(["id", "customer", "amount", "currency", "status"])?;
        for invoice in invoices {
            self.writer.write_record([
                invoice.id.to_string(),
                invoice.customer.to_string(),
                invoice.amount.value.normalize().to_string(),
                invoice.amount.currency.to_string(),
                invoice.status.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
