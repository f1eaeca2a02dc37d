use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use paymint_settlement::application::settlement::SettlementEngine;
use paymint_settlement::domain::penalty::{
    INITIAL_PENALTY_RATE, MAX_PENALTY_RATE, PenaltySchedule, WEEKLY_PENALTY_INCREASE,
};
use paymint_settlement::domain::ports::{ClockRef, InvoiceStoreBox};
use paymint_settlement::infrastructure::clock::{FixedClock, SystemClock};
use paymint_settlement::infrastructure::in_memory::InMemoryInvoiceStore;
#[cfg(feature = "storage-rocksdb")]
use paymint_settlement::infrastructure::rocksdb::RocksDBStore;
use paymint_settlement::interfaces::csv::invoice_reader::InvoiceReader;
use paymint_settlement::interfaces::csv::invoice_writer::InvoiceWriter;
use paymint_settlement::{interfaces, observability};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one settlement pass and print the updated invoice ledger as CSV.
    Settle {
        #[command(flatten)]
        ledger: LedgerArgs,

        /// Evaluate due dates as of this day (YYYY-MM-DD) instead of today.
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Print the JSON run summary instead of the ledger.
        #[arg(long)]
        summary: bool,
    },
    /// Serve the HTTP settlement trigger.
    Serve {
        #[command(flatten)]
        ledger: LedgerArgs,

        #[arg(long, default_value = "127.0.0.1:9400")]
        addr: SocketAddr,
    },
}

#[derive(Args)]
struct LedgerArgs {
    /// Invoice ledger CSV loaded into the store before running.
    input: Option<PathBuf>,

    /// Penalty rate during the first week overdue.
    #[arg(long, default_value_t = INITIAL_PENALTY_RATE)]
    initial_rate: Decimal,

    /// Rate increase per full week overdue.
    #[arg(long, default_value_t = WEEKLY_PENALTY_INCREASE)]
    weekly_increase: Decimal,

    /// Ceiling for the penalty rate.
    #[arg(long, default_value_t = MAX_PENALTY_RATE)]
    max_rate: Decimal,
}

impl LedgerArgs {
    fn schedule(&self) -> Result<PenaltySchedule> {
        PenaltySchedule::new(self.initial_rate, self.weekly_increase, self.max_rate).into_diagnostic()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init(cli.log_json);

    let store = open_store(cli.db_path)?;

    match cli.command {
        Command::Settle {
            ledger,
            as_of,
            summary,
        } => {
            let schedule = ledger.schedule()?;
            load_ledger(&store, ledger.input).await?;

            let clock: ClockRef = match as_of {
                Some(date) => Arc::new(FixedClock::at_date(date)),
                None => Arc::new(SystemClock),
            };
            let engine = SettlementEngine::with_schedule(store, clock, schedule);
            let report = engine.run().await.into_diagnostic()?;

            if summary {
                let json = serde_json::to_string(&report.summary()).into_diagnostic()?;
                println!("{}", json);
            } else {
                let invoices = engine.store().all_invoices().await.into_diagnostic()?;
                let stdout = io::stdout();
                let mut writer = InvoiceWriter::new(stdout.lock());
                writer.write_invoices(&invoices).into_diagnostic()?;
            }
        }
        Command::Serve { ledger, addr } => {
            let schedule = ledger.schedule()?;
            load_ledger(&store, ledger.input).await?;

            let engine = SettlementEngine::with_schedule(store, Arc::new(SystemClock), schedule);
            interfaces::http::serve(Arc::new(engine), addr)
                .await
                .into_diagnostic()?;
        }
    }

    Ok(())
}

fn open_store(db_path: Option<PathBuf>) -> Result<InvoiceStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryInvoiceStore::new()))
        }
        None => Ok(Box::new(InMemoryInvoiceStore::new())),
    }
}

async fn load_ledger(store: &InvoiceStoreBox, input: Option<PathBuf>) -> Result<()> {
    let Some(input) = input else {
        return Ok(());
    };

    let file = File::open(input).into_diagnostic()?;
    let reader = InvoiceReader::new(file);
    for record in reader.invoices() {
        match record {
            Ok(invoice) => match invoice.validate() {
                Ok(()) => store.store(invoice).await.into_diagnostic()?,
                Err(e) => warn!(error = %e, "Error reading invoice record"),
            },
            Err(e) => warn!(error = %e, "Error reading invoice record"),
        }
    }
    Ok(())
}
