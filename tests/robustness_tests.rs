use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_malformed_invoice_rows_are_skipped() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id, customer, amount, currency").unwrap();
    writeln!(file, "1, 1, 10.00, EUR").unwrap();
    writeln!(file, "2, 1, 10.00, XYZ").unwrap(); // Unknown currency
    writeln!(file, "abc, 1, 10.00, EUR").unwrap(); // Non-integer id
    writeln!(file, "4, 1, not_a_number, EUR").unwrap(); // Text in amount field
    writeln!(file, "5, 2, 3.50, DKK").unwrap();

    let mut cmd = Command::new(cargo_bin!("invoice-billing"));
    cmd.arg("--invoices").arg(file.path()).arg("charge-pending");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading invoice"))
        .stdout(predicate::str::contains("1,PAID"))
        .stdout(predicate::str::contains("5,PAID"))
        .stdout(predicate::str::contains("2,").not())
        .stdout(predicate::str::contains("4,").not());
}

#[test]
fn test_missing_invoice_file_fails() {
    let mut cmd = Command::new(cargo_bin!("invoice-billing"));
    cmd.args(["--invoices", "does/not/exist.csv", "charge-pending"]);

    cmd.assert().failure();
}
