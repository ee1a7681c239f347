use crate::grid::empty_points;
use crate::schema::{Activity, ListTotal, PayCadence, Payout};
use crate::utils::{parse_amount, parse_decimal, parse_loose_date, round2};
use crate::Point;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Per-metric point series for one payout-sourced account, keyed by payout
/// end dates. Gap-filling against the zero grid happens later, in the
/// aggregation step.
#[derive(Debug, Clone)]
pub struct PayoutRecords {
    pub cadence: PayCadence,
    pub income: Vec<Point>,
    pub hours: Vec<Point>,
    pub hourly: Vec<Point>,
    pub breakdowns: Vec<PayoutBreakdown>,
}

/// Dated pay-component breakdown of a single payout. Components stay as
/// `Decimal` so window totals can be summed without float drift.
#[derive(Debug, Clone)]
pub struct PayoutBreakdown {
    pub date: NaiveDate,
    pub base: Decimal,
    pub bonus: Decimal,
    pub commission: Decimal,
    pub other: Decimal,
    pub overtime: Decimal,
    pub net_pay: Decimal,
    pub taxes: Decimal,
    pub deductions: Decimal,
    pub reimbursements: Decimal,
}

/// Dense daily series for one activity-sourced account. Output length is
/// fixed by the 2-year grid regardless of how sparse the activity data is.
#[derive(Debug, Clone)]
pub struct ActivityRecords {
    pub income: Vec<Point>,
    pub hours: Vec<Point>,
    pub hourly: Vec<Point>,
    pub breakdowns: Vec<ActivityBreakdown>,
}

#[derive(Debug, Clone)]
pub struct ActivityBreakdown {
    pub date: NaiveDate,
    pub total: Decimal,
    pub pay: Decimal,
    pub bonus: Decimal,
    pub tips: Decimal,
    pub fees: Decimal,
}

#[derive(Default)]
struct DayTotals {
    total: Decimal,
    pay: Decimal,
    bonus: Decimal,
    tips: Decimal,
    fees: Decimal,
    seconds: i64,
}

fn component_amount(total: &Option<ListTotal>) -> Decimal {
    parse_decimal(total.as_ref().and_then(|t| t.amount.as_deref()))
}

/// Converts raw payouts into per-metric points and dated breakdowns.
///
/// Returns `None` when the account has no payouts or no payout carries a
/// parseable pay period, in which case the account contributes no series at
/// all. Records with unparseable end dates are dropped.
pub fn normalize_payouts(payouts: &[Payout]) -> Option<PayoutRecords> {
    let cadence = payouts.iter().find_map(|payout| {
        let period = payout.payout_period.as_ref()?;
        let start = parse_loose_date(period.start_date.as_deref()?)?;
        let end = parse_loose_date(period.end_date.as_deref()?)?;
        Some(PayCadence::from_period_days((end - start).num_days()))
    });

    let Some(cadence) = cadence else {
        debug!("account has no payout with a usable pay period, skipping");
        return None;
    };

    let mut income = Vec::new();
    let mut hours = Vec::new();
    let mut hourly = Vec::new();
    let mut breakdowns = Vec::new();

    for payout in payouts {
        let end_date = payout
            .payout_period
            .as_ref()
            .and_then(|period| period.end_date.as_deref())
            .and_then(parse_loose_date);

        let Some(date) = end_date else {
            debug!("payout {} has no parseable end date, dropped", payout.id);
            continue;
        };

        let net_pay = parse_amount(payout.net_pay.as_deref());
        let worked_hours = parse_amount(payout.hours.as_deref());
        let rate = if worked_hours > 0.0 {
            round2(net_pay / worked_hours)
        } else {
            0.0
        };

        income.push(Point {
            date,
            value: round2(net_pay),
        });
        hours.push(Point {
            date,
            value: worked_hours * 3600.0,
        });
        hourly.push(Point { date, value: rate });

        let totals = &payout.gross_pay_list_totals;
        breakdowns.push(PayoutBreakdown {
            date,
            base: component_amount(&totals.base),
            bonus: component_amount(&totals.bonus),
            commission: component_amount(&totals.commission),
            other: component_amount(&totals.other),
            overtime: component_amount(&totals.overtime),
            net_pay: parse_decimal(payout.net_pay.as_deref()),
            taxes: parse_decimal(payout.taxes.as_deref()),
            deductions: parse_decimal(payout.deductions.as_deref()),
            reimbursements: parse_decimal(payout.reimbursements.as_deref()),
        });
    }

    if income.is_empty() {
        debug!("account has payouts but none with a usable end date, skipping");
        return None;
    }

    income.sort_by_key(|p| p.date);
    hours.sort_by_key(|p| p.date);
    hourly.sort_by_key(|p| p.date);
    breakdowns.sort_by_key(|b| b.date);

    Some(PayoutRecords {
        cadence,
        income,
        hours,
        hourly,
        breakdowns,
    })
}

/// Buckets raw activities into per-day sums, then walks the full 2-year
/// daily grid so every calendar day yields a point.
pub fn normalize_activities(activities: &[Activity], today: NaiveDate) -> ActivityRecords {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();

    for activity in activities {
        let Some(date) = activity.end_date.as_deref().and_then(parse_loose_date) else {
            debug!(
                "activity {} has no parseable end date, dropped",
                activity.id
            );
            continue;
        };

        let day = days.entry(date).or_default();
        day.total += parse_decimal(activity.income.total.as_deref());
        day.pay += parse_decimal(activity.income.pay.as_deref());
        day.bonus += parse_decimal(activity.income.bonus.as_deref());
        day.tips += parse_decimal(activity.income.tips.as_deref());
        day.fees += parse_decimal(activity.income.fees.as_deref());
        day.seconds += activity.duration.unwrap_or(0);
    }

    let grid = empty_points(PayCadence::Daily, today);
    let mut income = Vec::with_capacity(grid.len());
    let mut hours = Vec::with_capacity(grid.len());
    let mut hourly = Vec::with_capacity(grid.len());
    let mut breakdowns = Vec::with_capacity(grid.len());

    for point in &grid {
        let date = point.date;

        let (earned, seconds) = match days.get(&date) {
            Some(day) => (day.total.to_f64().unwrap_or(0.0), day.seconds),
            None => (0.0, 0),
        };

        let rate = if seconds > 0 && earned > 0.0 {
            round2(earned / (seconds as f64 / 3600.0))
        } else {
            0.0
        };

        income.push(Point {
            date,
            value: earned,
        });
        hours.push(Point {
            date,
            value: seconds as f64,
        });
        hourly.push(Point { date, value: rate });

        breakdowns.push(match days.get(&date) {
            Some(day) => ActivityBreakdown {
                date,
                total: day.total,
                pay: day.pay,
                bonus: day.bonus,
                tips: day.tips,
                fees: day.fees,
            },
            None => ActivityBreakdown {
                date,
                total: Decimal::ZERO,
                pay: Decimal::ZERO,
                bonus: Decimal::ZERO,
                tips: Decimal::ZERO,
                fees: Decimal::ZERO,
            },
        });
    }

    ActivityRecords {
        income,
        hours,
        hourly,
        breakdowns,
    }
}
