use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

const HEADERS: [&str; 10] = [
    "id",
    "invoiceNumber",
    "issuer",
    "debtor",
    "amount",
    "askAmount",
    "dueDate",
    "riskScore",
    "status",
    "penalty",
];

#[derive(Serialize)]
struct InvoiceRow<'a> {
    id: &'a str,
    invoice_number: &'a str,
    issuer: Option<&'a str>,
    debtor: Option<&'a str>,
    amount: Decimal,
    ask_amount: Option<Decimal>,
    due_date: &'a str,
    risk_score: Option<u8>,
    status: InvoiceStatus,
    penalty: Option<Decimal>,
}

impl<'a> From<&'a Invoice> for InvoiceRow<'a> {
    fn from(invoice: &'a Invoice) -> Self {
        Self {
            id: &invoice.id,
            invoice_number: &invoice.invoice_number,
            issuer: invoice.issuer.as_deref(),
            debtor: invoice.debtor.as_deref(),
            amount: invoice.amount.normalize(),
            ask_amount: invoice.ask_amount.map(|a| a.normalize()),
            due_date: &invoice.due_date,
            risk_score: invoice.risk_score,
            status: invoice.status,
            penalty: invoice.penalty.map(|p| p.normalize()),
        }
    }
}

/// Writes an invoice ledger as CSV, in the column layout `InvoiceReader` reads.
///
/// The header row is always written, so an empty ledger is still a valid file.
/// Decimals are written without trailing zeros; values are not rounded.
pub struct InvoiceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> InvoiceWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_invoices<'a>(&mut self, invoices: impl IntoIterator<Item = &'a Invoice>) -> Result<()> {
        self.writer.write_record(HEADERS)?;
        for invoice in invoices {
            self.writer.serialize(InvoiceRow::from(invoice))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::csv::invoice_reader::InvoiceReader;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writer_output() {
        let mut overdue = Invoice::new("1", "INV-1", dec!(1000.00), "2024-09-21", InvoiceStatus::Overdue);
        overdue.penalty = Some(dec!(2.000));
        let pending = Invoice::new("2", "INV-2", dec!(500), "2024-12-01", InvoiceStatus::Pending);

        let mut buffer = Vec::new();
        InvoiceWriter::new(&mut buffer)
            .write_invoices([&overdue, &pending])
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "id,invoiceNumber,issuer,debtor,amount,askAmount,dueDate,riskScore,status,penalty"
        );
        assert_eq!(lines[1], "1,INV-1,,,1000,,2024-09-21,,overdue,2");
        assert_eq!(lines[2], "2,INV-2,,,500,,2024-12-01,,pending,");
    }

    #[test]
    fn test_written_ledger_reads_back() {
        let mut invoice = Invoice::new("3", "INV-3", dec!(750), "2024-08-20", InvoiceStatus::Overdue);
        invoice.issuer = Some("Apex Logistics".to_string());
        invoice.risk_score = Some(92);
        invoice.penalty = Some(dec!(3.75));

        let mut buffer = Vec::new();
        InvoiceWriter::new(&mut buffer)
            .write_invoices([&invoice])
            .unwrap();

        let read: Vec<Invoice> = InvoiceReader::new(buffer.as_slice())
            .invoices()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read, vec![invoice]);
    }

    #[test]
    fn test_writer_empty_ledger() {
        let mut buffer = Vec::new();
        InvoiceWriter::new(&mut buffer)
            .write_invoices(std::iter::empty())
            .unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "id,invoiceNumber,issuer,debtor,amount,askAmount,dueDate,riskScore,status,penalty\n"
        );
    }
}
