use clap::{Parser, Subcommand};
use invoice_billing::application::billing::{BillingConfig, BillingService};
use invoice_billing::application::invoices::InvoiceService;
use invoice_billing::domain::invoice::{CustomerId, InvoiceId};
use invoice_billing::domain::ports::{LedgerBox, PaymentLedger};
use invoice_billing::infrastructure::in_memory::InMemoryLedger;
use invoice_billing::infrastructure::provider::{SimulatedPaymentProvider, SimulatedProviderConfig};
#[cfg(feature = "storage-rocksdb")]
use invoice_billing::infrastructure::rocksdb::RocksDBLedger;
use invoice_billing::interfaces::csv::invoice_reader::InvoiceReader;
use invoice_billing::interfaces::csv::result_writer::{ChargeResultWriter, InvoiceWriter};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Invoices CSV (id, customer, amount, currency) to load before running the command
    #[arg(long, global = true)]
    invoices: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Probability that the simulated provider declines a charge
    #[arg(long, global = true, default_value_t = 0.0)]
    reject_rate: f64,

    /// Probability that the simulated provider fails with a network error
    #[arg(long, global = true, default_value_t = 0.0)]
    failure_rate: f64,

    /// Simulated provider latency in milliseconds
    #[arg(long, global = true, default_value_t = 0)]
    latency_ms: u64,

    /// Seed for the simulated provider
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Customer id the simulated provider has no account for (repeatable)
    #[arg(long = "unknown-customer", global = true)]
    unknown_customers: Vec<CustomerId>,

    /// Give up on a provider call after this many milliseconds (outcome becomes UNKNOWN)
    #[arg(long, global = true)]
    charge_timeout_ms: Option<u64>,

    /// Log filter, e.g. "info" or "invoice_billing=debug"
    #[arg(long, global = true, env = "BILLING_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Charge every invoice that has no payment attempt
    ChargePending,
    /// Charge a single invoice
    Charge { invoice_id: InvoiceId },
    /// List invoices with their current status
    Status,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_ledger(db_path: Option<PathBuf>) -> Result<LedgerBox> {
    match db_path {
        Some(path) => {
            let ledger = RocksDBLedger::open(path).into_diagnostic()?;
            Ok(Box::new(ledger))
        }
        None => Ok(Box::new(InMemoryLedger::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_ledger(db_path: Option<PathBuf>) -> Result<LedgerBox> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryLedger::new()))
}

async fn import_invoices(ledger: &dyn PaymentLedger, path: PathBuf) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let reader = InvoiceReader::new(file);
    for record in reader.invoices() {
        match record {
            Ok(invoice) => ledger.insert_invoice(invoice).await.into_diagnostic()?,
            Err(e) => tracing::error!(error = %e, "Error reading invoice"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let ledger = open_ledger(cli.db_path)?;
    if let Some(path) = cli.invoices {
        import_invoices(ledger.as_ref(), path).await?;
    }

    let provider = SimulatedPaymentProvider::new(SimulatedProviderConfig {
        reject_rate: cli.reject_rate,
        failure_rate: cli.failure_rate,
        latency: Duration::from_millis(cli.latency_ms),
        seed: cli.seed,
        unknown_customers: cli.unknown_customers.into_iter().collect(),
        ..Default::default()
    });
    let config = BillingConfig {
        charge_timeout: cli.charge_timeout_ms.map(Duration::from_millis),
    };

    let stdout = io::stdout();
    let mut results = match cli.command {
        Command::Status => {
            let mut invoices = InvoiceService::new(ledger)
                .fetch_all()
                .await
                .into_diagnostic()?;
            invoices.sort_by_key(|invoice| invoice.id);
            InvoiceWriter::new(stdout.lock())
                .write_invoices(invoices)
                .into_diagnostic()?;
            return Ok(());
        }
        Command::Charge { invoice_id } => {
            let billing = BillingService::with_config(ledger, Box::new(provider), config);
            vec![billing.charge_invoice(invoice_id).await.into_diagnostic()?]
        }
        Command::ChargePending => {
            let billing = BillingService::with_config(ledger, Box::new(provider), config);
            billing.charge_pending_invoices().await.into_diagnostic()?
        }
    };

    results.sort_by_key(|result| result.invoice);
    ChargeResultWriter::new(stdout.lock())
        .write_results(results)
        .into_diagnostic()?;

    Ok(())
}
