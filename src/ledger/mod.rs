//! Bill and settings models plus the occurrence generator.

pub mod bill;
pub mod frequency;
pub mod occurrence;
pub mod settings;

pub use bill::{Bill, BillDefect, BillTotals};
pub use frequency::Frequency;
pub use occurrence::{generate, upcoming_bills, Occurrence, OccurrenceIter};
pub use settings::Settings;
