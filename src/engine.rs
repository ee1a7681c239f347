use crate::accounts::{ConnectedAccount, TOTAL_COLOR, TOTAL_ID, TOTAL_NAME};
use crate::grid::empty_points;
use crate::normalize::{normalize_activities, normalize_payouts, ActivityRecords, PayoutRecords};
use crate::schema::{
    AccountKind, Activity, DataRequest, Granularity, MetricKind, PayCadence, Payout,
};
use crate::totals::{sum_activity_breakdowns, sum_payout_breakdowns, PayComponentTotals};
use crate::utils::{is_same_month, is_same_week, month_end, round2, to_money, week_end};
use crate::{AccountSeries, DashboardData, Point};
use chrono::NaiveDate;
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The three point-series metrics. Hourly buckets average; everything else
/// sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesKind {
    Income,
    Hours,
    Hourly,
}

impl SeriesKind {
    fn bucket_value(self, chunk: &[Point]) -> f64 {
        let sum: f64 = chunk.iter().map(|p| p.value).sum();
        match self {
            Self::Hourly => round2(sum / chunk.len() as f64),
            Self::Income | Self::Hours => sum,
        }
    }
}

struct BucketedSeries {
    raw_points: Vec<Point>,
    points: Vec<Point>,
}

struct ActivityBuckets {
    daily: Vec<Point>,
    weekly: Vec<Point>,
    monthly: Vec<Point>,
}

impl ActivityBuckets {
    fn select(&self, granularity: Granularity) -> Vec<Point> {
        match granularity {
            Granularity::Daily => self.daily.clone(),
            Granularity::Weekly => self.weekly.clone(),
            Granularity::Monthly => self.monthly.clone(),
        }
    }
}

/// Runs the full aggregation for one request: per-account filtering,
/// grid merging, re-bucketing, and cross-account totals. Pure function of
/// its inputs; `today` anchors the 2-year window and the in-progress
/// week/month exclusions.
pub fn aggregate(
    accounts: &[ConnectedAccount],
    payouts: &[Payout],
    activities: &[Activity],
    request: &DataRequest,
    today: NaiveDate,
) -> DashboardData {
    let start = request.period.start_date(today);

    let mut income_series = Vec::new();
    let mut hours_series = Vec::new();
    let mut hourly_series = Vec::new();
    let mut pay_totals = Vec::new();

    for account in accounts {
        match account.kind {
            AccountKind::Employer | AccountKind::Platform => {
                let account_payouts: Vec<Payout> = payouts
                    .iter()
                    .filter(|payout| payout.account == account.id)
                    .cloned()
                    .collect();

                let Some(records) = normalize_payouts(&account_payouts) else {
                    debug!("account {} contributes no payout series", account.id);
                    continue;
                };

                let [income, hours, hourly] =
                    bucket_payout_series(&records, start, request.granularity, today);

                income_series.push(account_series(account, income));
                hours_series.push(account_series(account, hours));
                hourly_series.push(account_series(account, hourly));
                pay_totals.push(sum_payout_breakdowns(&records.breakdowns, start));
            }
            AccountKind::Other => {
                let account_activities: Vec<Activity> = activities
                    .iter()
                    .filter(|activity| activity.account == account.id)
                    .cloned()
                    .collect();

                let records = normalize_activities(&account_activities, today);
                let [income, hours, hourly] =
                    bucket_activity_series(&records, start, request.granularity);

                income_series.push(account_series(account, income));
                hours_series.push(account_series(account, hours));
                hourly_series.push(account_series(account, hourly));
                pay_totals.push(sum_activity_breakdowns(&records.breakdowns, start));
            }
        }
    }

    match request.metric {
        MetricKind::Income => DashboardData::Income(with_total(income_series)),
        MetricKind::Hours => DashboardData::Hours(with_total(hours_series)),
        MetricKind::Hourly => DashboardData::Hourly(hourly_series),
        MetricKind::TotalPay => {
            DashboardData::TotalPay(PayComponentTotals::combine(pay_totals.iter()))
        }
    }
}

fn account_series(account: &ConnectedAccount, bucketed: BucketedSeries) -> AccountSeries {
    AccountSeries {
        account_id: account.id.clone(),
        name: account.name.clone(),
        color: account.color.clone(),
        points: bucketed.points,
        raw_points: bucketed.raw_points,
    }
}

fn bucket_payout_series(
    records: &PayoutRecords,
    start: NaiveDate,
    granularity: Granularity,
    today: NaiveDate,
) -> [BucketedSeries; 3] {
    [
        bucket_payout_metric(&records.income, records.cadence, start, granularity, today),
        bucket_payout_metric(&records.hours, records.cadence, start, granularity, today),
        bucket_payout_metric(&records.hourly, records.cadence, start, granularity, today),
    ]
}

/// Payout-sourced bucketing: filter to the window, re-date to native bucket
/// ends, merge into the zero grid (actuals win, duplicates sum), then apply
/// the cadence/granularity compatibility rule.
fn bucket_payout_metric(
    points: &[Point],
    cadence: PayCadence,
    start: NaiveDate,
    granularity: Granularity,
    today: NaiveDate,
) -> BucketedSeries {
    let mut actual: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for point in points.iter().filter(|p| p.date >= start) {
        let bucket_date = match cadence {
            PayCadence::Monthly => month_end(point.date),
            _ => week_end(point.date),
        };
        *actual.entry(bucket_date).or_default() += to_money(point.value);
    }

    let mut merged: BTreeMap<NaiveDate, f64> = empty_points(cadence, today)
        .into_iter()
        .filter(|p| p.date >= start && p.date < today)
        .map(|p| (p.date, 0.0))
        .collect();

    for (date, value) in actual {
        merged.insert(date, value.to_f64().unwrap_or(0.0));
    }

    let raw_points: Vec<Point> = merged
        .iter()
        .map(|(&date, &value)| Point { date, value })
        .collect();

    let points = match (granularity, cadence) {
        (Granularity::Monthly, PayCadence::Monthly) => raw_points
            .iter()
            .filter(|p| !is_same_month(p.date, today))
            .copied()
            .collect(),
        (Granularity::Monthly, PayCadence::Weekly) => collapse_to_months(&raw_points, today),
        (Granularity::Weekly, PayCadence::Weekly) => raw_points
            .iter()
            .filter(|p| !is_same_week(p.date, today))
            .copied()
            .collect(),
        // Remaining combinations (daily charts of payout data, coarse charts
        // of daily/biweekly cadences) have no defined rendering: empty.
        _ => Vec::new(),
    };

    BucketedSeries { raw_points, points }
}

/// Collapses week-end points into month-end sums, leaving out the month
/// still in progress.
fn collapse_to_months(points: &[Point], today: NaiveDate) -> Vec<Point> {
    let mut months: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for point in points {
        if is_same_month(point.date, today) {
            continue;
        }
        *months.entry(month_end(point.date)).or_default() += to_money(point.value);
    }

    months
        .into_iter()
        .map(|(date, value)| Point {
            date,
            value: value.to_f64().unwrap_or(0.0),
        })
        .collect()
}

fn bucket_activity_series(
    records: &ActivityRecords,
    start: NaiveDate,
    granularity: Granularity,
) -> [BucketedSeries; 3] {
    [
        pick_activity_buckets(&records.income, SeriesKind::Income, start, granularity),
        pick_activity_buckets(&records.hours, SeriesKind::Hours, start, granularity),
        pick_activity_buckets(&records.hourly, SeriesKind::Hourly, start, granularity),
    ]
}

fn pick_activity_buckets(
    points: &[Point],
    kind: SeriesKind,
    start: NaiveDate,
    granularity: Granularity,
) -> BucketedSeries {
    let buckets = bucket_activity_metric(points, kind, start);
    BucketedSeries {
        points: buckets.select(granularity),
        raw_points: buckets.daily,
    }
}

/// Activity-sourced bucketing: slice the dense daily series at the window
/// start, then chunk into weeks of 7 and months of 31, dropping the trailing
/// partial chunk. All three granularities come out of one pass.
fn bucket_activity_metric(points: &[Point], kind: SeriesKind, start: NaiveDate) -> ActivityBuckets {
    let begin = points
        .iter()
        .position(|p| p.date >= start)
        .unwrap_or(points.len());
    let sliced = &points[begin..];

    let weekly = sliced
        .chunks_exact(7)
        .map(|chunk| Point {
            date: week_end(chunk[0].date),
            value: kind.bucket_value(chunk),
        })
        .collect();

    let monthly = sliced
        .chunks_exact(31)
        .map(|chunk| Point {
            date: month_end(chunk[0].date),
            value: kind.bucket_value(chunk),
        })
        .collect();

    ActivityBuckets {
        daily: sliced.to_vec(),
        weekly,
        monthly,
    }
}

/// Prepends the cross-account "Total" series: for every date present in any
/// account's chosen-granularity series, the 2-decimal sum across accounts.
fn with_total(series: Vec<AccountSeries>) -> Vec<AccountSeries> {
    let mut sums: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for account in &series {
        for point in &account.points {
            *sums.entry(point.date).or_default() += to_money(point.value);
        }
    }

    let totals: Vec<Point> = sums
        .into_iter()
        .map(|(date, value)| Point {
            date,
            value: value.to_f64().unwrap_or(0.0),
        })
        .collect();

    let mut result = Vec::with_capacity(series.len() + 1);
    result.push(AccountSeries {
        account_id: TOTAL_ID.to_string(),
        name: TOTAL_NAME.to_string(),
        color: TOTAL_COLOR.to_string(),
        points: totals.clone(),
        raw_points: totals,
    });
    result.extend(series);
    result
}
