//! Cash-flow projection over recurring bills.
//!
//! A projection walks two balance tracks. The expected track starts from the
//! settings balance (carried forward to the schedule start) and subtracts
//! every bill occurrence in the window. The actual track starts from the
//! current account balance and replays only the rows dated today or later.
//! The gap between the two minima is the extra payment needed.

pub mod export;
pub mod summary;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    errors::{ProjectionError, StoreError},
    ledger::{frequency::shift_month, generate, Bill, BillDefect, Occurrence, Settings},
    storage::ProjectionHistoryStore,
    time::{Clock, SystemClock},
    utils::round_cents,
};

pub use export::{csv_file_name, to_csv, write_csv};
pub use summary::{BufferStatus, ProjectionSummary};

pub const STARTING_BALANCE_LABEL: &str = "Starting Balance";

/// One ledger line of a projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub name: String,
    pub amount: f64,
    pub balance: f64,
    pub below_buffer: bool,
    /// Absent on the synthetic starting row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<Uuid>,
    #[serde(default)]
    pub autopay: bool,
}

impl LedgerRow {
    fn starting(date: NaiveDate, balance: f64, buffer: Option<f64>) -> Self {
        Self {
            date,
            name: STARTING_BALANCE_LABEL.to_string(),
            amount: 0.0,
            balance,
            below_buffer: is_below(balance, buffer),
            bill_id: None,
            autopay: false,
        }
    }

    fn from_occurrence(occurrence: Occurrence, balance: f64, buffer: Option<f64>) -> Self {
        Self {
            date: occurrence.date,
            name: occurrence.name,
            amount: occurrence.amount,
            balance,
            below_buffer: is_below(balance, buffer),
            bill_id: Some(occurrence.bill_id),
            autopay: occurrence.autopay,
        }
    }
}

/// A bill left out of a projection and the reason why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedBill {
    pub bill_id: Uuid,
    pub name: String,
    pub reason: BillDefect,
}

/// Immutable outcome of one projection run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionResult {
    pub generated_at: DateTime<Utc>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub entries: Vec<LedgerRow>,
    pub lowest_expected_balance: f64,
    pub actual_minimum_balance: Option<f64>,
    pub extra_payment_needed: f64,
    #[serde(default)]
    pub summary: ProjectionSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_bills: Vec<SkippedBill>,
}

/// Builds a projection without touching any history store.
///
/// Fails only when the settings lack a usable start date or start balance;
/// malformed bills are skipped and reported in `skipped_bills`.
pub fn build_projection(
    bills: &[Bill],
    settings: &Settings,
    schedule_start: Option<NaiveDate>,
    clock: &dyn Clock,
) -> Result<ProjectionResult, ProjectionError> {
    let settings_start = settings.start_date.ok_or_else(|| {
        ProjectionError::Validation("start date is missing or not a valid date".into())
    })?;
    let start_balance = settings
        .start_balance
        .filter(|balance| balance.is_finite())
        .ok_or_else(|| ProjectionError::Validation("start balance must be a number".into()))?;

    let start = schedule_start.unwrap_or(settings_start);
    let months = i32::try_from(settings.effective_months())
        .map_err(|_| ProjectionError::Validation("months to project is too large".into()))?;
    let end = shift_month(start, months).ok_or_else(|| {
        ProjectionError::Validation("projection window exceeds the supported date range".into())
    })?;

    let (eligible, skipped_bills) = partition_bills(bills);
    let buffer = settings.buffer();

    let opening = if start != settings_start {
        carry_forward(&eligible, start_balance, settings_start, start)
    } else {
        start_balance
    };
    debug!(%start, %end, opening, bills = eligible.len(), "projecting bill schedule");

    let mut occurrences: Vec<Occurrence> = eligible
        .iter()
        .flat_map(|bill| generate(bill, start, end))
        .collect();
    // Stable: same-date occurrences keep bill order.
    occurrences.sort_by_key(|occurrence| occurrence.date);

    let mut entries = Vec::with_capacity(occurrences.len() + 1);
    entries.push(LedgerRow::starting(start, opening, buffer));
    let mut balance = opening;
    let mut lowest = opening;
    let mut lowest_date = start;
    for occurrence in occurrences {
        balance = round_cents(balance - occurrence.amount);
        if balance < lowest {
            lowest = balance;
            lowest_date = occurrence.date;
        }
        entries.push(LedgerRow::from_occurrence(occurrence, balance, buffer));
    }

    let actual_minimum_balance = settings
        .current_account_balance
        .filter(|balance| balance.is_finite())
        .map(|current| actual_minimum(&entries, current, clock.today()));
    let extra_payment_needed = actual_minimum_balance
        .map(|actual| round_cents((lowest - actual).max(0.0)))
        .unwrap_or(0.0);

    let summary =
        ProjectionSummary::from_rows(&entries, lowest, lowest_date, buffer.unwrap_or(0.0));

    Ok(ProjectionResult {
        generated_at: clock.now(),
        start,
        end,
        entries,
        lowest_expected_balance: lowest,
        actual_minimum_balance,
        extra_payment_needed,
        summary,
        skipped_bills,
    })
}

/// Runs projections and records each result in a bounded history.
#[derive(Clone)]
pub struct ProjectionEngine {
    clock: Arc<dyn Clock>,
    history: Arc<dyn ProjectionHistoryStore>,
}

impl ProjectionEngine {
    pub fn new(clock: Arc<dyn Clock>, history: Arc<dyn ProjectionHistoryStore>) -> Self {
        Self { clock, history }
    }

    pub fn with_system_clock(history: Arc<dyn ProjectionHistoryStore>) -> Self {
        Self::new(Arc::new(SystemClock), history)
    }

    /// Projects `bills` and pushes the result onto the history.
    ///
    /// History failures are logged and do not affect the returned result.
    pub fn project(
        &self,
        bills: &[Bill],
        settings: &Settings,
        schedule_start: Option<NaiveDate>,
    ) -> Result<ProjectionResult, ProjectionError> {
        let result = build_projection(bills, settings, schedule_start, self.clock.as_ref())?;
        match self.history.push(result.clone()) {
            Ok(()) => info!(
                start = %result.start,
                end = %result.end,
                rows = result.entries.len(),
                "projection recorded"
            ),
            Err(err) => warn!(error = %err, "projection history unavailable; result not cached"),
        }
        Ok(result)
    }

    /// Most recent cached projection, if any.
    pub fn last_projection(&self) -> Result<Option<ProjectionResult>, StoreError> {
        self.history.latest()
    }

    pub fn history(&self) -> Result<Vec<ProjectionResult>, StoreError> {
        self.history.get()
    }
}

fn partition_bills(bills: &[Bill]) -> (Vec<&Bill>, Vec<SkippedBill>) {
    let mut eligible = Vec::with_capacity(bills.len());
    let mut skipped = Vec::new();
    for bill in bills {
        match bill.projection_defect() {
            None => eligible.push(bill),
            Some(reason) => {
                warn!(bill = %bill.id, name = %bill.name, %reason, "skipping bill");
                skipped.push(SkippedBill {
                    bill_id: bill.id,
                    name: bill.name.clone(),
                    reason,
                });
            }
        }
    }
    (eligible, skipped)
}

/// Balance at `until` after paying every occurrence in `[from, until)`.
fn carry_forward(bills: &[&Bill], balance: f64, from: NaiveDate, until: NaiveDate) -> f64 {
    let Some(last) = until.pred_opt().filter(|last| *last >= from) else {
        return balance;
    };
    let mut interim: Vec<Occurrence> = bills
        .iter()
        .flat_map(|bill| generate(bill, from, last))
        .collect();
    interim.sort_by_key(|occurrence| occurrence.date);
    debug!(count = interim.len(), "carrying balance forward to schedule start");
    interim
        .iter()
        .fold(balance, |balance, occurrence| round_cents(balance - occurrence.amount))
}

/// Minimum of the actual track, seeded at `current`.
fn actual_minimum(entries: &[LedgerRow], current: f64, today: NaiveDate) -> f64 {
    let mut balance = current;
    let mut minimum = current;
    for row in entries.iter().filter(|row| row.date >= today) {
        balance = round_cents(balance - row.amount);
        minimum = minimum.min(balance);
    }
    minimum
}

fn is_below(balance: f64, buffer: Option<f64>) -> bool {
    buffer.is_some_and(|buffer| balance < buffer)
}
