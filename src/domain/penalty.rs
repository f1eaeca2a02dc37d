use crate::error::{Result, SettlementError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Rate applied during the first week past due (0.1%).
pub const INITIAL_PENALTY_RATE: Decimal = dec!(0.001);
/// Added to the rate for every full week overdue (0.1%).
pub const WEEKLY_PENALTY_INCREASE: Decimal = dec!(0.001);
/// Ceiling for the rate (0.5%), reached at four weeks overdue.
pub const MAX_PENALTY_RATE: Decimal = dec!(0.005);

/// Progressive late-fee schedule.
///
/// The rate starts at `initial_rate`, grows by `weekly_increase` per full week
/// overdue and is capped at `max_rate`. Rates are fractions of the invoice
/// amount, so all of them live in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltySchedule {
    initial_rate: Decimal,
    weekly_increase: Decimal,
    max_rate: Decimal,
}

/// Outcome of assessing one overdue invoice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyAssessment {
    pub days_overdue: i64,
    pub weeks_overdue: u32,
    pub rate: Decimal,
    pub penalty: Decimal,
}

impl Default for PenaltySchedule {
    fn default() -> Self {
        Self {
            initial_rate: INITIAL_PENALTY_RATE,
            weekly_increase: WEEKLY_PENALTY_INCREASE,
            max_rate: MAX_PENALTY_RATE,
        }
    }
}

impl PenaltySchedule {
    pub fn new(initial_rate: Decimal, weekly_increase: Decimal, max_rate: Decimal) -> Result<Self> {
        for (name, rate) in [
            ("initial rate", initial_rate),
            ("weekly increase", weekly_increase),
            ("max rate", max_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(SettlementError::ValidationError(format!(
                    "Penalty {} must be between 0 and 1, got {}",
                    name, rate
                )));
            }
        }
        if initial_rate > max_rate {
            return Err(SettlementError::ValidationError(format!(
                "Initial penalty rate {} exceeds max rate {}",
                initial_rate, max_rate
            )));
        }

        Ok(Self {
            initial_rate,
            weekly_increase,
            max_rate,
        })
    }

    pub fn initial_rate(&self) -> Decimal {
        self.initial_rate
    }

    pub fn weekly_increase(&self) -> Decimal {
        self.weekly_increase
    }

    pub fn max_rate(&self) -> Decimal {
        self.max_rate
    }

    /// Whole 7-day periods between `due` and `today`; zero when not past due.
    pub fn weeks_overdue(due: NaiveDate, today: NaiveDate) -> u32 {
        let days = (today - due).num_days();
        if days <= 0 {
            return 0;
        }
        u32::try_from(days / 7).unwrap_or(u32::MAX)
    }

    pub fn rate_for_weeks(&self, weeks: u32) -> Decimal {
        let ramp = self.initial_rate + self.weekly_increase * Decimal::from(weeks);
        ramp.min(self.max_rate)
    }

    /// Returns `None` unless `due` is strictly before `today`.
    ///
    /// The penalty is recomputed from `amount` on every call; it does not add
    /// to a penalty assessed earlier.
    pub fn assess(
        &self,
        amount: Decimal,
        due: NaiveDate,
        today: NaiveDate,
    ) -> Option<PenaltyAssessment> {
        if due >= today {
            return None;
        }

        let weeks_overdue = Self::weeks_overdue(due, today);
        let rate = self.rate_for_weeks(weeks_overdue);
        Some(PenaltyAssessment {
            days_overdue: (today - due).num_days(),
            weeks_overdue,
            rate,
            penalty: amount * rate,
        })
    }
}
