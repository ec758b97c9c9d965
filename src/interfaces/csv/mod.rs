pub mod invoice_reader;
pub mod result_writer;
