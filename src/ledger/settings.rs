use chrono::NaiveDate;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

pub const DEFAULT_MONTHS_TO_PROJECT: u32 = 3;

/// Projection parameters. One active set at a time, owned by the caller.
///
/// Values that arrive in the wrong shape (a date that does not parse, a
/// balance sent as text) deserialize to `None` so that validation can
/// report them instead of the whole document failing to load. A malformed
/// buffer or window length falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub start_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_buffer")]
    pub buffer_amount: f64,
    #[serde(
        default = "Settings::default_months_to_project",
        deserialize_with = "lenient_months"
    )]
    pub months_to_project: u32,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub current_account_balance: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_date: None,
            start_balance: Some(0.0),
            buffer_amount: 0.0,
            months_to_project: DEFAULT_MONTHS_TO_PROJECT,
            current_account_balance: Some(0.0),
        }
    }
}

impl Settings {
    pub fn new(start_date: NaiveDate, start_balance: f64) -> Self {
        Self {
            start_date: Some(start_date),
            start_balance: Some(start_balance),
            ..Self::default()
        }
    }

    pub fn default_months_to_project() -> u32 {
        DEFAULT_MONTHS_TO_PROJECT
    }

    /// Window length in months; zero falls back to the default.
    pub fn effective_months(&self) -> u32 {
        if self.months_to_project == 0 {
            DEFAULT_MONTHS_TO_PROJECT
        } else {
            self.months_to_project
        }
    }

    /// Buffer threshold, or `None` when no buffer is configured.
    pub fn buffer(&self) -> Option<f64> {
        (self.buffer_amount.is_finite() && self.buffer_amount > 0.0).then_some(self.buffer_amount)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
    #[allow(dead_code)]
    Other(IgnoredAny),
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Text(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Number(value) if value.is_finite() => Some(value),
        _ => None,
    })
}

fn lenient_buffer<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_amount(deserializer)?.unwrap_or(0.0))
}

fn lenient_months<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Number(value)
            if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) =>
        {
            value as u32
        }
        _ => DEFAULT_MONTHS_TO_PROJECT,
    })
}
