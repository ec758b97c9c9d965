//! Domain model: invoices, payment attempts, charge results and the ports
//! through which the application reaches storage and the payment provider.

pub mod charge;
pub mod invoice;
pub mod ports;
