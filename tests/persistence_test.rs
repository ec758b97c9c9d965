#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::invoice_record;
use invoice_billing::domain::ports::PaymentLedger;
use invoice_billing::infrastructure::rocksdb::RocksDBLedger;
use std::process::Command;
use tempfile::tempdir;

fn run(args: &[&str], db_path: &std::path::Path) -> String {
    let output = Command::new(cargo_bin!("invoice-billing"))
        .arg("--db-path")
        .arg(db_path)
        .args(args)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_frozen_invoice_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: the provider fails, every invoice is frozen in progress
    let first = run(
        &[
            "--invoices",
            "tests/fixtures/invoices.csv",
            "--failure-rate",
            "1.0",
            "charge-pending",
        ],
        &db_path,
    );
    assert!(first.contains("1,UNKNOWN"));

    // 2. Second run against the same DB: nothing is pending, nothing is retried
    let second = run(&["charge-pending"], &db_path);
    assert_eq!(second.trim(), "invoice,outcome");

    let third = run(&["charge", "1"], &db_path);
    assert!(third.contains("1,FAILED_CONCURRENT_PAYMENT"));

    let status = run(&["status"], &db_path);
    assert!(status.contains("1,1,8.88,USD,IN_PROGRESS"));
}

#[test]
fn test_paid_invoice_stays_paid_after_reimport() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    run(&["--invoices", "tests/fixtures/invoices.csv", "charge", "3"], &db_path);
    let status = run(&["--invoices", "tests/fixtures/invoices.csv", "status"], &db_path);

    assert!(status.contains("3,2,45.5,EUR,PAID"));
    assert!(status.contains("1,1,8.88,USD,PENDING"));
}

#[test]
fn test_lost_claim_is_logged_at_debug() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    run(&["--invoices", "tests/fixtures/invoices.csv", "charge", "1"], &db_path);

    let output = Command::new(cargo_bin!("invoice-billing"))
        .arg("--db-path")
        .arg(&db_path)
        .args(["--log-level", "invoice_billing=debug", "charge", "1"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("1,FAILED_CONCURRENT_PAYMENT"));
    assert!(stderr.contains("Claim lost, payment attempt already exists"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_rocksdb_concurrent_claims() {
    let dir = tempdir().unwrap();
    let ledger = RocksDBLedger::open(dir.path()).unwrap();
    ledger.insert_invoice(invoice_record(1)).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.claim_payment(1).await.unwrap() })
        })
        .collect();

    let mut claimed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            claimed += 1;
        }
    }
    assert_eq!(claimed, 1);
}
