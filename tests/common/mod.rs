use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const STATUSES: [&str; 4] = ["pending", "funded", "repaid", "overdue"];

/// Day the generated ledgers are meant to be settled against.
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
}

/// Writes `rows` random invoices with due dates up to 60 days either side of
/// `reference_date()`. Returns how many of them a run on that date settles.
pub fn generate_ledger(path: &Path, rows: usize, seed: u64) -> Result<usize, Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = StdRng::seed_from_u64(seed);

    wtr.write_record(["id", "invoiceNumber", "amount", "dueDate", "status", "penalty"])?;

    let mut expected = 0;
    for i in 1..=rows {
        let status = STATUSES[rng.gen_range(0..STATUSES.len())];
        let offset = rng.gen_range(0..=120u64);
        let due = reference_date()
            .checked_sub_days(Days::new(60))
            .and_then(|d| d.checked_add_days(Days::new(offset)))
            .unwrap();
        let cents: u64 = rng.gen_range(100..10_000_000);
        let penalty = if status == "overdue" { "0.01" } else { "" };

        if (status == "funded" || status == "overdue") && due < reference_date() {
            expected += 1;
        }

        wtr.write_record([
            i.to_string(),
            format!("INV-{:06}", i),
            format!("{}.{:02}", cents / 100, cents % 100),
            due.format("%Y-%m-%d").to_string(),
            status.to_string(),
            penalty.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(expected)
}
