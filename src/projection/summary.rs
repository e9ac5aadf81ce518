use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::LedgerRow;
use crate::utils::round_cents;

/// How comfortably the lowest expected balance clears the buffer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BufferStatus {
    #[default]
    Ok,
    Warning,
    Danger,
}

impl BufferStatus {
    pub fn classify(lowest: f64, buffer: f64) -> Self {
        if lowest >= buffer * 1.5 {
            BufferStatus::Ok
        } else if lowest >= buffer {
            BufferStatus::Warning
        } else {
            BufferStatus::Danger
        }
    }
}

impl fmt::Display for BufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BufferStatus::Ok => "OK",
            BufferStatus::Warning => "Warning",
            BufferStatus::Danger => "Danger",
        };
        f.write_str(label)
    }
}

/// Aggregates over the bill rows of a projection. The starting row is not counted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectionSummary {
    pub bill_count: usize,
    pub total_outflow: f64,
    pub autopay_total: f64,
    pub manual_count: usize,
    pub below_buffer_count: usize,
    pub lowest_balance_date: NaiveDate,
    pub buffer_status: BufferStatus,
}

impl ProjectionSummary {
    pub(crate) fn from_rows(
        rows: &[LedgerRow],
        lowest: f64,
        lowest_date: NaiveDate,
        buffer: f64,
    ) -> Self {
        let mut summary = ProjectionSummary {
            lowest_balance_date: lowest_date,
            buffer_status: BufferStatus::classify(lowest, buffer),
            ..Default::default()
        };
        for row in rows {
            if row.below_buffer {
                summary.below_buffer_count += 1;
            }
            if row.bill_id.is_none() {
                continue;
            }
            summary.bill_count += 1;
            summary.total_outflow += row.amount;
            if row.autopay {
                summary.autopay_total += row.amount;
            } else {
                summary.manual_count += 1;
            }
        }
        summary.total_outflow = round_cents(summary.total_outflow);
        summary.autopay_total = round_cents(summary.autopay_total);
        summary
    }
}
