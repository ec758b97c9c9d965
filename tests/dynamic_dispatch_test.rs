mod common;

use common::{Answer, FakeProvider, invoice_record};
use invoice_billing::domain::ports::{LedgerBox, PaymentProviderBox};
use invoice_billing::infrastructure::in_memory::InMemoryLedger;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let ledger: LedgerBox = Box::new(InMemoryLedger::new());
    let provider: PaymentProviderBox = Box::new(FakeProvider::new(Answer::Charge));

    // Verify Send + Sync by spawning tasks
    let handle = tokio::spawn(async move {
        ledger.insert_invoice(invoice_record(1)).await.unwrap();
        let invoice = ledger.fetch_invoice(1).await.unwrap().unwrap();
        let charged = provider.charge(&invoice).await.unwrap();
        (ledger.claim_payment(1).await.unwrap(), charged)
    });

    let (claimed, charged) = handle.await.unwrap();
    assert!(claimed);
    assert!(charged);
}
