//! Birth date representations
//!
//! A birth date reaches the registry in one of three shapes: a plain calendar
//! date parsed from the form, the timestamp the document store keeps at rest,
//! or an ISO-like string. [`BirthDate`] names each shape explicitly and
//! [`BirthDate::to_input_value`] resolves any of them to the `YYYY-MM-DD`
//! representation of a date input.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Date format used by form date inputs
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp as stored by the document database (seconds + nanos since epoch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendTimestamp {
    /// Whole seconds since the Unix epoch
    pub seconds: i64,

    /// Sub-second part; valid values are `0..1_000_000_000`
    pub nanos: i32,
}

impl BackendTimestamp {
    /// Creates a timestamp from raw parts without checking them
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Timestamp at UTC midnight of `date`
    pub fn from_date(date: NaiveDate) -> Self {
        let seconds = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        Self { seconds, nanos: 0 }
    }

    /// Parses an RFC 3339 timestamp such as `1990-05-17T00:00:00Z`
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        let parsed = DateTime::parse_from_rfc3339(value).ok()?;
        let utc = parsed.with_timezone(&Utc);
        Some(Self {
            seconds: utc.timestamp(),
            nanos: utc.timestamp_subsec_nanos() as i32,
        })
    }

    /// Converts to a native date-time, `None` when the parts are out of range
    pub fn to_date_time(&self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        if nanos >= 1_000_000_000 {
            return None;
        }
        DateTime::from_timestamp(self.seconds, nanos)
    }

    /// RFC 3339 rendering used on the wire
    pub fn to_rfc3339(&self) -> Option<String> {
        self.to_date_time()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// A birth date in one of the shapes the registry handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthDate {
    /// Calendar date, as parsed from the form
    Native(NaiveDate),

    /// Timestamp as kept by the record store
    Timestamp(BackendTimestamp),

    /// ISO-like string, e.g. `1990-05-17` or `1990-05-17T00:00:00Z`
    Iso(String),
}

impl BirthDate {
    /// Parses the value of a date input (`YYYY-MM-DD`)
    pub fn parse_input(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value.trim(), INPUT_DATE_FORMAT)
            .ok()
            .map(BirthDate::Native)
    }

    /// Resolves to a calendar date if the underlying value converts
    pub fn to_native(&self) -> Option<NaiveDate> {
        match self {
            BirthDate::Native(date) => Some(*date),
            BirthDate::Timestamp(ts) => ts.to_date_time().map(|dt| dt.date_naive()),
            BirthDate::Iso(value) => {
                NaiveDate::parse_from_str(leading_date(value), INPUT_DATE_FORMAT).ok()
            }
        }
    }

    /// Timestamp to persist for this birth date
    pub fn to_timestamp(&self) -> Option<BackendTimestamp> {
        match self {
            BirthDate::Timestamp(ts) => Some(*ts),
            other => other.to_native().map(BackendTimestamp::from_date),
        }
    }

    /// `YYYY-MM-DD` for a date input, or an empty string if it cannot convert
    ///
    /// Never fails: a timestamp whose parts are out of range and an empty
    /// string both yield `""`.
    pub fn to_input_value(&self) -> String {
        match self {
            BirthDate::Native(date) => date.format(INPUT_DATE_FORMAT).to_string(),
            BirthDate::Timestamp(ts) => match ts.to_date_time() {
                Some(dt) => dt.date_naive().format(INPUT_DATE_FORMAT).to_string(),
                None => {
                    tracing::warn!(
                        seconds = ts.seconds,
                        nanos = ts.nanos,
                        "Birth date timestamp cannot be converted to a date"
                    );
                    String::new()
                }
            },
            BirthDate::Iso(value) => leading_date(value).to_string(),
        }
    }
}

impl From<NaiveDate> for BirthDate {
    fn from(date: NaiveDate) -> Self {
        BirthDate::Native(date)
    }
}

impl From<BackendTimestamp> for BirthDate {
    fn from(ts: BackendTimestamp) -> Self {
        BirthDate::Timestamp(ts)
    }
}

fn leading_date(value: &str) -> &str {
    value.split('T').next().unwrap_or_default()
}
