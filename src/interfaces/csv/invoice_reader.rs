use crate::domain::invoice::InvoiceRecord;
use crate::error::{BillingError, Result};
use std::io::Read;

/// Imports invoice rows shaped `id, customer, amount, currency`.
///
/// Padding around fields is ignored, so `1, 7, 8.88, USD` parses the same as
/// `1,7,8.88,USD`. Rows must carry all four columns.
pub struct InvoiceReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InvoiceReader<R> {
    /// Wraps a file, stdin or an in-memory buffer.
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Parses rows one at a time as the iterator is driven. A malformed row
    /// yields an error for that row only and the next row is still read.
    pub fn invoices(self) -> impl Iterator<Item = Result<InvoiceRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(BillingError::from))
    }
}
