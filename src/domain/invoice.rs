use crate::error::{Result, SettlementError};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a tokenized invoice.
///
/// `pending → funded → repaid`, or `funded → overdue → repaid`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Funded,
    Repaid,
    Overdue,
}

impl InvoiceStatus {
    /// Whether a settlement run looks at invoices in this state.
    pub fn is_settleable(self) -> bool {
        matches!(self, Self::Funded | Self::Overdue)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Pending, Pending | Funded)
                | (Funded, Funded | Overdue | Repaid)
                | (Overdue, Overdue | Repaid)
                | (Repaid, Repaid)
        )
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Funded => "funded",
            Self::Repaid => "repaid",
            Self::Overdue => "overdue",
        };
        f.write_str(label)
    }
}

/// An invoice as held by the invoice store.
///
/// `due_date` keeps its wire form so that a single malformed record surfaces
/// as a per-invoice error during settlement instead of failing the load.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Opaque unique identifier.
    pub id: String,
    /// Human readable label, only used for logging and reports.
    pub invoice_number: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub debtor: Option<String>,
    /// Face value of the invoice.
    pub amount: Decimal,
    #[serde(default)]
    pub ask_amount: Option<Decimal>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub due_date: String,
    #[serde(default)]
    pub risk_score: Option<u8>,
    pub status: InvoiceStatus,
    /// Late fee accrued as of the last settlement run. Set iff overdue.
    #[serde(default)]
    pub penalty: Option<Decimal>,
}

impl Invoice {
    pub fn new(
        id: impl Into<String>,
        invoice_number: impl Into<String>,
        amount: Decimal,
        due_date: impl Into<String>,
        status: InvoiceStatus,
    ) -> Self {
        Self {
            id: id.into(),
            invoice_number: invoice_number.into(),
            issuer: None,
            debtor: None,
            amount,
            ask_amount: None,
            due_date: due_date.into(),
            risk_score: None,
            status,
            penalty: None,
        }
    }

    pub fn parse_due_date(&self) -> Result<NaiveDate> {
        parse_due_date(&self.due_date)
    }

    /// Applies a partial update, keeping `penalty` set iff the invoice is overdue
    /// and only moving the status forward.
    pub fn apply(&mut self, patch: InvoicePatch) -> Result<()> {
        let status = patch.status.unwrap_or(self.status);
        if !self.status.can_transition_to(status) {
            return Err(SettlementError::ValidationError(format!(
                "Invoice {} cannot move from {} to {}",
                self.invoice_number, self.status, status
            )));
        }

        let penalty = match (status, patch.penalty) {
            (InvoiceStatus::Overdue, Some(penalty)) if penalty < Decimal::ZERO => {
                return Err(SettlementError::ValidationError(
                    "Penalty must not be negative".to_string(),
                ));
            }
            (InvoiceStatus::Overdue, Some(penalty)) => Some(penalty),
            (InvoiceStatus::Overdue, None) if self.penalty.is_some() => self.penalty,
            (InvoiceStatus::Overdue, None) => {
                return Err(SettlementError::ValidationError(format!(
                    "Overdue invoice {} requires a penalty",
                    self.invoice_number
                )));
            }
            (_, Some(_)) => {
                return Err(SettlementError::ValidationError(format!(
                    "Penalty only applies to overdue invoices, not {}",
                    status
                )));
            }
            (_, None) => None,
        };

        self.status = status;
        self.penalty = penalty;
        Ok(())
    }

    /// Checks a whole record: `penalty` is set iff the invoice is overdue, and
    /// is never negative.
    pub fn validate(&self) -> Result<()> {
        match (self.status, self.penalty) {
            (InvoiceStatus::Overdue, Some(penalty)) if penalty < Decimal::ZERO => Err(
                SettlementError::ValidationError(format!(
                    "Invoice {} has a negative penalty",
                    self.invoice_number
                )),
            ),
            (InvoiceStatus::Overdue, Some(_)) => Ok(()),
            (InvoiceStatus::Overdue, None) => Err(SettlementError::ValidationError(format!(
                "Overdue invoice {} requires a penalty",
                self.invoice_number
            ))),
            (status, Some(_)) => Err(SettlementError::ValidationError(format!(
                "Invoice {} is {} but carries a penalty",
                self.invoice_number, status
            ))),
            (_, None) => Ok(()),
        }
    }
}

/// Partial update accepted by [`crate::domain::ports::InvoiceStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InvoicePatch {
    pub status: Option<InvoiceStatus>,
    pub penalty: Option<Decimal>,
}

impl InvoicePatch {
    pub fn overdue(penalty: Decimal) -> Self {
        Self {
            status: Some(InvoiceStatus::Overdue),
            penalty: Some(penalty),
        }
    }

    pub fn status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(status),
            penalty: None,
        }
    }
}

/// Parses a due date into its calendar day.
///
/// Timestamps are reduced to their UTC date; time of day is dropped.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|date_err| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc).date_naive())
                .map_err(|_| date_err)
        })
        .map_err(|source| SettlementError::InvalidDueDate {
            value: raw.to_string(),
            source,
        })
}
