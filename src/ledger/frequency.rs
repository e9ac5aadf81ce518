use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// How often a bill comes due.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    #[default]
    Monthly,
    Biweekly,
    Weekly,
    /// Non-recurring. Unrecognized frequency labels also land here.
    Once,
}

impl Frequency {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Frequency::Monthly,
            "biweekly" => Frequency::Biweekly,
            "weekly" => Frequency::Weekly,
            _ => Frequency::Once,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Biweekly => "biweekly",
            Frequency::Weekly => "weekly",
            Frequency::Once => "once",
        }
    }

    pub fn is_recurring(self) -> bool {
        !matches!(self, Frequency::Once)
    }

    /// Returns the `step`-th occurrence counted from `anchor`, or `None` once the
    /// schedule has no occurrence at that step.
    ///
    /// Monthly steps are always measured from the anchor, so a bill due on the
    /// 31st clamps to shorter month ends without drifting afterwards.
    pub fn nth_after(self, anchor: NaiveDate, step: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Monthly => shift_month(anchor, i32::try_from(step).ok()?),
            Frequency::Biweekly => {
                anchor.checked_add_signed(Duration::try_days(14 * i64::from(step))?)
            }
            Frequency::Weekly => anchor.checked_add_signed(Duration::try_days(7 * i64::from(step))?),
            Frequency::Once => (step == 0).then_some(anchor),
        }
    }

    /// Smallest step whose occurrence is not earlier than `from`.
    pub fn first_step_on_or_after(self, anchor: NaiveDate, from: NaiveDate) -> u32 {
        if anchor >= from {
            return 0;
        }
        let estimate = match self {
            Frequency::Monthly => {
                let months = (from.year() - anchor.year()) * 12 + from.month() as i32
                    - anchor.month() as i32;
                months.max(0) as u32
            }
            Frequency::Biweekly => ((from - anchor).num_days() / 14).max(0) as u32,
            Frequency::Weekly => ((from - anchor).num_days() / 7).max(0) as u32,
            Frequency::Once => return 1,
        };
        let mut step = estimate.saturating_sub(1);
        while let Some(date) = self.nth_after(anchor, step) {
            if date >= from {
                break;
            }
            step += 1;
        }
        step
    }
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        Frequency::parse(&value)
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Monthly => "Monthly",
            Frequency::Biweekly => "Biweekly",
            Frequency::Weekly => "Weekly",
            Frequency::Once => "Once",
        };
        f.write_str(label)
    }
}

/// Adds calendar months, clamping the day to the end of the target month.
///
/// Returns `None` when the result leaves the representable date range.
pub fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date
        .year()
        .checked_mul(12)?
        .checked_add(date.month0() as i32)?
        .checked_add(months)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_falls_back_to_once() {
        assert_eq!(Frequency::parse("Monthly"), Frequency::Monthly);
        assert_eq!(Frequency::parse(" biweekly "), Frequency::Biweekly);
        assert_eq!(Frequency::parse("weekly"), Frequency::Weekly);
        assert_eq!(Frequency::parse("quarterly"), Frequency::Once);
        assert_eq!(Frequency::parse(""), Frequency::Once);
    }

    #[test]
    fn shift_month_clamps_to_month_end() {
        assert_eq!(shift_month(date(2025, 1, 31), 1), Some(date(2025, 2, 28)));
        assert_eq!(shift_month(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(shift_month(date(2025, 12, 15), 1), Some(date(2026, 1, 15)));
        assert_eq!(shift_month(date(2025, 3, 31), -1), Some(date(2025, 2, 28)));
    }

    #[test]
    fn shift_month_out_of_range_is_none() {
        assert_eq!(shift_month(date(2025, 1, 1), i32::MAX), None);
        assert_eq!(shift_month(date(2025, 1, 1), i32::MIN), None);
        assert_eq!(Frequency::Monthly.nth_after(date(2025, 1, 1), u32::MAX), None);
    }

    #[test]
    fn monthly_steps_stay_anchored() {
        let anchor = date(2025, 1, 31);
        let monthly = Frequency::Monthly;
        assert_eq!(monthly.nth_after(anchor, 1), Some(date(2025, 2, 28)));
        assert_eq!(monthly.nth_after(anchor, 2), Some(date(2025, 3, 31)));
        assert_eq!(monthly.nth_after(anchor, 3), Some(date(2025, 4, 30)));
    }

    #[test]
    fn once_has_a_single_step() {
        let anchor = date(2025, 6, 1);
        assert_eq!(Frequency::Once.nth_after(anchor, 0), Some(anchor));
        assert_eq!(Frequency::Once.nth_after(anchor, 1), None);
    }

    #[test]
    fn first_step_skips_past_occurrences() {
        let anchor = date(2025, 1, 31);
        let step = Frequency::Monthly.first_step_on_or_after(anchor, date(2025, 3, 1));
        assert_eq!(step, 2);

        let weekly = Frequency::Weekly.first_step_on_or_after(date(2025, 1, 1), date(2025, 1, 15));
        assert_eq!(weekly, 2);
        let weekly = Frequency::Weekly.first_step_on_or_after(date(2025, 1, 1), date(2025, 1, 16));
        assert_eq!(weekly, 3);
    }

    #[test]
    fn serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&Frequency::Biweekly).unwrap();
        assert_eq!(json, "\"biweekly\"");
        let parsed: Frequency = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(parsed, Frequency::Once);
    }
}
