use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::frequency::Frequency;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A recurring obligation owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    /// Anchor due date as supplied by the caller. Parsed on use; bills whose
    /// value does not parse are left out of projections.
    #[serde(default)]
    pub next_due: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub autopay: bool,
}

impl Bill {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        next_due: NaiveDate,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            next_due: next_due.format(DUE_DATE_FORMAT).to_string(),
            frequency,
            paid: false,
            autopay: false,
        }
    }

    pub fn with_autopay(mut self, autopay: bool) -> Self {
        self.autopay = autopay;
        self
    }

    /// Parses `next_due` as a calendar date. Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
    pub fn due_anchor(&self) -> Option<NaiveDate> {
        let raw = self.next_due.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|stamp| stamp.date_naive())
            })
    }

    /// Explains why the bill cannot take part in a projection, if it cannot.
    pub fn projection_defect(&self) -> Option<BillDefect> {
        if self.name.trim().is_empty() {
            return Some(BillDefect::MissingName);
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Some(BillDefect::InvalidAmount);
        }
        if self.due_anchor().is_none() {
            return Some(BillDefect::UnparsableDueDate);
        }
        None
    }
}

/// Reasons a bill is excluded from a projection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillDefect {
    MissingName,
    InvalidAmount,
    UnparsableDueDate,
}

impl std::fmt::Display for BillDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BillDefect::MissingName => "bill has no name",
            BillDefect::InvalidAmount => "amount is negative or not a number",
            BillDefect::UnparsableDueDate => "next due date does not parse",
        };
        f.write_str(label)
    }
}

/// Paid and unpaid sums across a bill list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BillTotals {
    pub total: f64,
    pub paid: f64,
    pub unpaid: f64,
}

impl BillTotals {
    pub fn from_bills(bills: &[Bill]) -> Self {
        let mut totals = BillTotals::default();
        for bill in bills.iter().filter(|bill| bill.amount.is_finite()) {
            totals.total += bill.amount;
            if !bill.paid {
                totals.unpaid += bill.amount;
            }
        }
        totals.paid = totals.total - totals.unpaid;
        totals
    }
}
