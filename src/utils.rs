use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    last_day_of_month(date.year(), date.month())
}

pub fn next_month_end(date: NaiveDate) -> NaiveDate {
    let year = if date.month() == 12 {
        date.year() + 1
    } else {
        date.year()
    };

    let month = if date.month() == 12 {
        1
    } else {
        date.month() + 1
    };

    last_day_of_month(year, month)
}

/// Weeks run Sunday through Saturday, matching the dashboard's calendar.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
        .unwrap()
}

pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date).checked_add_days(Days::new(6)).unwrap()
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub fn is_same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}

/// Whole calendar months elapsed between two dates, ignoring partial months.
pub fn complete_months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let mut months = months_between(start, end);
    if end.day() < start.day() {
        months -= 1;
    }
    months
}

/// Upstream dates arrive either as plain dates or RFC 3339 timestamps.
pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }

    None
}

/// Money fields arrive as optional decimal strings; anything unparseable
/// contributes zero.
pub fn parse_amount(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

pub fn parse_decimal(value: Option<&str>) -> Decimal {
    value
        .and_then(|v| v.trim().parse::<Decimal>().ok())
        .unwrap_or_default()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a chart value back into a 2-decimal currency amount for
/// drift-free accumulation.
pub fn to_money(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp(2)
}
