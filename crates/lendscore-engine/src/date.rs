use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Accepts `YYYY-MM-DD` or an ISO-8601 datetime whose first ten characters are the date.
pub fn parse_transaction_date(value: &str) -> Option<NaiveDate> {
    let candidate = value.trim();
    let date_part = match candidate.len() {
        10 => candidate,
        len if len > 10 => {
            let separator = candidate.as_bytes()[10];
            if separator != b'T' && separator != b' ' {
                return None;
            }
            candidate.get(..10)?
        }
        _ => return None,
    };
    if !looks_like_iso_date(date_part) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let current_month = i32::try_from(date.month()).unwrap_or(1);
    let mut raw_month = current_month + months;
    let mut year = date.year();

    while raw_month > 12 {
        raw_month -= 12;
        year += 1;
    }
    while raw_month < 1 {
        raw_month += 12;
        year -= 1;
    }

    let month_u32 = u32::try_from(raw_month).unwrap_or(1);
    let day = date.day().min(days_in_month(year, month_u32));
    if let Some(result) = NaiveDate::from_ymd_opt(year, month_u32, day) {
        return result;
    }
    date
}

/// Calendar month key used for recurrence grouping.
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Rolling observation window anchored at the latest transaction date.
///
/// Month `k` covers `(anchor - (k + 1) months, anchor - k months]`, so month 0 is the
/// most recent. A transaction is inside the window when it falls in one of the
/// `months` rolling months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationWindow {
    pub anchor: NaiveDate,
    pub start_exclusive: NaiveDate,
    pub months: u32,
}

impl ObservationWindow {
    pub fn new(anchor: NaiveDate, months: u32) -> Self {
        let span = i32::try_from(months).unwrap_or(i32::MAX);
        Self {
            anchor,
            start_exclusive: add_months_clamped(anchor, -span),
            months,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date > self.start_exclusive && date <= self.anchor
    }

    pub fn rolling_month_index(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        for offset in 0..self.months {
            let lower = add_months_clamped(self.anchor, -(offset as i32 + 1));
            if date > lower {
                return Some(offset as usize);
            }
        }
        None
    }

    /// True when `date` is at most `days` days before the anchor. The cutoff day itself counts.
    pub fn within_lookback(&self, date: NaiveDate, days: i64) -> bool {
        date <= self.anchor && date >= self.anchor - Duration::days(days)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1);
    let first_current = NaiveDate::from_ymd_opt(year, month, 1);
    match (first_current, first_next) {
        (Some(current), Some(next)) => u32::try_from((next - current).num_days()).unwrap_or(31),
        _ => 31,
    }
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}
