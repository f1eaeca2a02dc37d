use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn ledger(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id,invoiceNumber,amount,dueDate,status").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

#[test]
fn test_due_date_boundary() {
    let file = ledger(&[
        "1,INV-TODAY,1000,2024-10-01,funded",
        "2,INV-YESTERDAY,1000,2024-09-30,funded",
    ]);

    let mut cmd = Command::new(cargo_bin!("paymint-settlement"));
    cmd.arg("settle").arg(file.path()).args(["--as-of", "2024-10-01"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,INV-TODAY,,,1000,,2024-10-01,,funded,"))
        .stdout(predicate::str::contains(
            "2,INV-YESTERDAY,,,1000,,2024-09-30,,overdue,1",
        ));
}

#[test]
fn test_cap_far_past_due() {
    let file = ledger(&["1,INV-OLD,1000,1999-01-01,funded"]);

    let mut cmd = Command::new(cargo_bin!("paymint-settlement"));
    cmd.arg("settle").arg(file.path()).args(["--as-of", "2024-10-01"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,INV-OLD,,,1000,,1999-01-01,,overdue,5"));
}

#[test]
fn test_extreme_decimal_precision() {
    let file = ledger(&["1,INV-TINY,0.0001,2024-09-30,funded"]);

    let mut cmd = Command::new(cargo_bin!("paymint-settlement"));
    cmd.arg("settle").arg(file.path()).args(["--as-of", "2024-10-01"]);

    // Penalties are stored unrounded.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "1,INV-TINY,,,0.0001,,2024-09-30,,overdue,0.0000001",
        ));
}

#[test]
fn test_timestamp_due_date() {
    let file = ledger(&["1,INV-TS,1000,2024-09-21T18:00:00Z,funded"]);

    let mut cmd = Command::new(cargo_bin!("paymint-settlement"));
    cmd.arg("settle").arg(file.path()).args(["--as-of", "2024-10-01"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "1,INV-TS,,,1000,,2024-09-21T18:00:00Z,,overdue,2",
        ));
}
