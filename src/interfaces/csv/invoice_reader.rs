use crate::domain::invoice::Invoice;
use crate::error::{Result, SettlementError};
use std::io::Read;

/// Reads an invoice ledger from a CSV source.
///
/// Headers follow the JSON field names (`id`, `invoiceNumber`, `amount`,
/// `dueDate`, `status`, ...). Optional columns may be absent or empty.
pub struct InvoiceReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InvoiceReader<R> {
    /// Creates a new `InvoiceReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes invoices.
    ///
    /// A malformed record yields an `Err` for that record only.
    pub fn invoices(self) -> impl Iterator<Item = Result<Invoice>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SettlementError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::InvoiceStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "id, invoiceNumber, amount, dueDate, status, penalty\n\
                    1, INV-1, 500, 2024-08-15, pending,\n\
                    7, INV-7, 950, 2024-06-15, overdue, 4.75";
        let reader = InvoiceReader::new(data.as_bytes());
        let results: Vec<Result<Invoice>> = reader.invoices().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.invoice_number, "INV-1");
        assert_eq!(first.status, InvoiceStatus::Pending);
        assert_eq!(first.penalty, None);

        let second = results[1].as_ref().unwrap();
        assert_eq!(second.amount, dec!(950));
        assert_eq!(second.penalty, Some(dec!(4.75)));
    }

    #[test]
    fn test_reader_optional_columns() {
        let data = "id,invoiceNumber,issuer,debtor,amount,askAmount,dueDate,riskScore,status\n\
                    3,INV-3,Apex Logistics,QuickHaul,750,720,2024-08-20,92,funded";
        let reader = InvoiceReader::new(data.as_bytes());
        let invoice = reader.invoices().next().unwrap().unwrap();

        assert_eq!(invoice.issuer.as_deref(), Some("Apex Logistics"));
        assert_eq!(invoice.debtor.as_deref(), Some("QuickHaul"));
        assert_eq!(invoice.ask_amount, Some(dec!(720)));
        assert_eq!(invoice.risk_score, Some(92));
        assert_eq!(invoice.penalty, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "id, invoiceNumber, amount, dueDate, status\n\
                    1, INV-1, 500, 2024-08-15, lost\n\
                    2, INV-2, 600, 2024-08-15, funded";
        let reader = InvoiceReader::new(data.as_bytes());
        let results: Vec<Result<Invoice>> = reader.invoices().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_reader_keeps_unparsed_due_date() {
        let data = "id, invoiceNumber, amount, dueDate, status\n\
                    1, INV-1, 500, someday, funded";
        let reader = InvoiceReader::new(data.as_bytes());
        let invoice = reader.invoices().next().unwrap().unwrap();
        assert_eq!(invoice.due_date, "someday");
        assert!(invoice.parse_due_date().is_err());
    }
}
