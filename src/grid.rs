use crate::schema::PayCadence;
use crate::utils::{month_end, next_month_end, week_end, week_start};
use crate::Point;
use chrono::{Days, Months, NaiveDate};

/// Fixed lookback window for every series the dashboard can show.
pub const LOOKBACK_MONTHS: u32 = 24;

pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(LOOKBACK_MONTHS))
        .unwrap()
}

/// Produces the zero-filled grid for one cadence over [today - 2y, today].
///
/// Buckets are dated at their bucket end (Saturday for weeks, last day for
/// months); a bucket whose end falls past `today` is not emitted, so every
/// returned date lies inside the window. Recomputed on every call.
pub fn empty_points(cadence: PayCadence, today: NaiveDate) -> Vec<Point> {
    let start = lookback_start(today);

    let dates = match cadence {
        PayCadence::Daily => day_dates(start, today),
        PayCadence::Weekly => week_end_dates(start, today),
        PayCadence::Biweekly => week_end_dates(start, today)
            .into_iter()
            .step_by(2)
            .collect(),
        PayCadence::Monthly => month_end_dates(start, today),
    };

    dates
        .into_iter()
        .map(|date| Point { date, value: 0.0 })
        .collect()
}

fn day_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;

    while current <= end {
        dates.push(current);
        current = current.checked_add_days(Days::new(1)).unwrap();
    }

    dates
}

fn week_end_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = week_start(start);

    loop {
        let bucket_end = week_end(current);
        if bucket_end > end {
            break;
        }
        dates.push(bucket_end);
        current = current.checked_add_days(Days::new(7)).unwrap();
    }

    dates
}

fn month_end_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = month_end(start);

    while current <= end {
        dates.push(current);
        current = next_month_end(current);
    }

    dates
}
