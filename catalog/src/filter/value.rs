//! Typed conversions from raw operand text.

use chrono::{Days, NaiveDate, TimeDelta};

use super::error::{ParseFailure, SchemaFault, ValueError};

/// Parse a base-10, optionally signed integer. Surrounding whitespace is ignored.
pub fn parse_integer(text: &str) -> Result<i64, ValueError> {
    text.trim().parse::<i64>().map_err(|_| ValueError::Integer {
        text: text.to_string(),
    })
}

/// Parse a `[[h:]m:]s` duration into seconds.
///
/// Components are read right to left as seconds, minutes and hours. Each one
/// is integer-parsed on its own, so `1:75` is accepted as 135 seconds.
pub fn parse_duration(text: &str) -> Result<i64, ParseFailure> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() > 3 {
        return Err(SchemaFault::DurationComponents {
            text: text.to_string(),
        }
        .into());
    }

    let invalid = || ValueError::Duration {
        text: text.to_string(),
    };

    let mut total: i64 = 0;
    let mut mult: i64 = 1;
    for part in parts.iter().rev() {
        let value = parse_integer(part).map_err(|_| invalid())?;
        total = value
            .checked_mul(mult)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(invalid)?;
        mult *= 60;
    }
    Ok(total)
}

/// Parse a calendar date: `today`, `yesterday` or `YYYY-MM-DD`.
pub fn parse_date(text: &str, today: NaiveDate) -> Result<NaiveDate, ValueError> {
    let normalized = text.trim().to_lowercase();
    let invalid = || ValueError::Date {
        text: text.to_string(),
    };

    match normalized.as_str() {
        "today" => return Ok(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)).ok_or_else(invalid),
        _ => {}
    }

    let fields: Vec<&str> = normalized.split('-').collect();
    let [year, month, day] = fields.as_slice() else {
        return Err(invalid());
    };

    let year = parse_integer(year).map_err(|_| invalid())?;
    let month = parse_integer(month).map_err(|_| invalid())?;
    let day = parse_integer(day).map_err(|_| invalid())?;

    let year = i32::try_from(year).map_err(|_| invalid())?;
    let month = u32::try_from(month).map_err(|_| invalid())?;
    let day = u32::try_from(day).map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Unit for relative `last`/`nolast` date windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "hour" => Some(TimeUnit::Hour),
            "day" => Some(TimeUnit::Day),
            "week" => Some(TimeUnit::Week),
            "month" => Some(TimeUnit::Month),
            "year" => Some(TimeUnit::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        }
    }

    /// Fixed length of one unit. Months and years are mean lengths, not
    /// calendar arithmetic.
    pub fn length(&self) -> TimeDelta {
        match self {
            TimeUnit::Hour => TimeDelta::seconds(3_600),
            TimeUnit::Day => TimeDelta::seconds(86_400),
            TimeUnit::Week => TimeDelta::days(7),
            // 30.43685 days
            TimeUnit::Month => TimeDelta::milliseconds(2_629_743_840),
            // 365.24220 days
            TimeUnit::Year => TimeDelta::milliseconds(31_556_926_080),
        }
    }

    /// Span covered by `count` units, saturating instead of overflowing.
    pub fn span(&self, count: i64) -> TimeDelta {
        let millis = self.length().num_milliseconds().saturating_mul(count);
        TimeDelta::try_milliseconds(millis).unwrap_or(if millis < 0 {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        })
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
