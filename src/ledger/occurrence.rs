//! Expansion of recurring bills into dated occurrences.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{bill::Bill, frequency::Frequency};

pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// A single dated instance of a bill. Generated fresh for each projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Occurrence {
    pub bill_id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub amount: f64,
    pub autopay: bool,
}

/// Lazy, ordered walk over a bill's occurrences inside an inclusive window.
///
/// The iterator holds no state beyond its position, so re-creating it with the
/// same inputs yields the same sequence.
#[derive(Debug, Clone)]
pub struct OccurrenceIter<'a> {
    bill: &'a Bill,
    anchor: NaiveDate,
    frequency: Frequency,
    step: u32,
    end: NaiveDate,
    done: bool,
}

impl<'a> OccurrenceIter<'a> {
    /// Returns `None` when the bill's due date does not parse.
    pub fn new(bill: &'a Bill, start: NaiveDate, end_inclusive: NaiveDate) -> Option<Self> {
        let anchor = bill.due_anchor()?;
        let frequency = bill.frequency;
        Some(Self {
            bill,
            anchor,
            frequency,
            step: frequency.first_step_on_or_after(anchor, start),
            end: end_inclusive,
            done: start > end_inclusive,
        })
    }
}

impl Iterator for OccurrenceIter<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        if self.done {
            return None;
        }
        let date = match self.frequency.nth_after(self.anchor, self.step) {
            Some(date) if date <= self.end => date,
            _ => {
                self.done = true;
                return None;
            }
        };
        self.step += 1;
        Some(Occurrence {
            bill_id: self.bill.id,
            date,
            name: self.bill.name.clone(),
            amount: self.bill.amount,
            autopay: self.bill.autopay,
        })
    }
}

impl std::iter::FusedIterator for OccurrenceIter<'_> {}

/// Occurrences of `bill` with `start <= date <= end_inclusive`, in date order.
///
/// A bill whose due date does not parse yields nothing.
pub fn generate(
    bill: &Bill,
    start: NaiveDate,
    end_inclusive: NaiveDate,
) -> impl Iterator<Item = Occurrence> + '_ {
    OccurrenceIter::new(bill, start, end_inclusive)
        .into_iter()
        .flatten()
}

/// The next occurrence of each bill due within `days` of `reference`, sorted by date.
pub fn upcoming_bills(bills: &[Bill], reference: NaiveDate, days: i64) -> Vec<Occurrence> {
    let end = Duration::try_days(days.max(0))
        .and_then(|span| reference.checked_add_signed(span))
        .unwrap_or(NaiveDate::MAX);
    let mut upcoming: Vec<Occurrence> = bills
        .iter()
        .filter(|bill| bill.projection_defect().is_none())
        .filter_map(|bill| generate(bill, reference, end).next())
        .collect();
    upcoming.sort_by_key(|occurrence| occurrence.date);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates(bill: &Bill, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        generate(bill, start, end).map(|occ| occ.date).collect()
    }

    #[test]
    fn month_end_anchor_clamps_without_drift() {
        let bill = Bill::new("Card", 100.0, date(2025, 1, 31), Frequency::Monthly);
        assert_eq!(
            dates(&bill, date(2025, 1, 1), date(2025, 5, 31)),
            vec![
                date(2025, 1, 31),
                date(2025, 2, 28),
                date(2025, 3, 31),
                date(2025, 4, 30),
                date(2025, 5, 31),
            ]
        );
    }

    #[test]
    fn fast_forward_preserves_phase() {
        let bill = Bill::new("Gym", 20.0, date(2024, 12, 6), Frequency::Biweekly);
        assert_eq!(
            dates(&bill, date(2025, 1, 1), date(2025, 1, 31)),
            vec![date(2025, 1, 3), date(2025, 1, 17), date(2025, 1, 31)]
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let bill = Bill::new("Paper", 5.0, date(2025, 1, 1), Frequency::Weekly);
        let found = dates(&bill, date(2025, 1, 8), date(2025, 1, 22));
        assert_eq!(found, vec![date(2025, 1, 8), date(2025, 1, 15), date(2025, 1, 22)]);
    }

    #[test]
    fn every_occurrence_lies_inside_the_window() {
        let start = date(2025, 2, 10);
        let end = date(2025, 9, 3);
        for frequency in [
            Frequency::Monthly,
            Frequency::Biweekly,
            Frequency::Weekly,
            Frequency::Once,
        ] {
            for offset in [-400i64, -31, 0, 17, 200] {
                let bill = Bill::new("Any", 1.0, start + Duration::days(offset), frequency);
                for found in dates(&bill, start, end) {
                    assert!(start <= found && found <= end, "{frequency} {found}");
                }
            }
        }
    }

    #[test]
    fn once_bills_emit_at_most_one_occurrence() {
        let inside = Bill::new("Deposit", 300.0, date(2025, 3, 1), Frequency::Once);
        assert_eq!(
            dates(&inside, date(2025, 1, 1), date(2025, 12, 31)),
            vec![date(2025, 3, 1)]
        );
        let before = Bill::new("Deposit", 300.0, date(2024, 3, 1), Frequency::Once);
        assert!(dates(&before, date(2025, 1, 1), date(2025, 12, 31)).is_empty());
    }

    #[test]
    fn unparsable_due_date_yields_nothing() {
        let mut bill = Bill::new("Broken", 10.0, date(2025, 1, 1), Frequency::Weekly);
        bill.next_due = String::new();
        assert!(dates(&bill, date(2025, 1, 1), date(2025, 3, 1)).is_empty());
    }

    #[test]
    fn iterator_is_restartable() {
        let bill = Bill::new("Water", 40.0, date(2025, 1, 15), Frequency::Monthly);
        let first = dates(&bill, date(2025, 1, 1), date(2025, 12, 31));
        let second = dates(&bill, date(2025, 1, 1), date(2025, 12, 31));
        assert_eq!(first.len(), 12);
        assert_eq!(first, second);
    }

    #[test]
    fn upcoming_lists_next_due_within_days() {
        let rent = Bill::new("Rent", 1200.0, date(2025, 1, 1), Frequency::Monthly);
        let power = Bill::new("Power", 90.0, date(2025, 1, 12), Frequency::Monthly);
        let water = Bill::new("Water", 40.0, date(2025, 1, 20), Frequency::Monthly);

        let upcoming = upcoming_bills(&[water, power, rent], date(2025, 2, 8), 7);
        let names: Vec<_> = upcoming.iter().map(|occ| occ.name.as_str()).collect();
        assert_eq!(names, vec!["Power"]);
        assert_eq!(upcoming[0].date, date(2025, 2, 12));
    }

    #[test]
    fn upcoming_with_huge_horizon_reaches_every_bill() {
        let rent = Bill::new("Rent", 1200.0, date(2025, 1, 1), Frequency::Monthly);
        let fee = Bill::new("Renewal", 60.0, date(2031, 6, 1), Frequency::Once);

        let upcoming = upcoming_bills(&[fee, rent], date(2025, 1, 2), i64::MAX);
        let found: Vec<_> = upcoming.iter().map(|occ| occ.date).collect();
        assert_eq!(found, vec![date(2025, 2, 1), date(2031, 6, 1)]);

        assert!(upcoming_bills(&[], NaiveDate::MAX, 30).is_empty());
    }
}
