//! # Income Series Builder
//!
//! A library for turning raw payroll and gig-platform records into dense,
//! chart-ready income time series.
//!
//! ## Core Concepts
//!
//! - **Payouts**: payroll disbursements from employer/platform accounts,
//!   arriving on a declared cadence (daily, weekly, biweekly, monthly)
//! - **Activities**: individual units of gig work, summed into daily buckets
//! - **Zero Grid**: a dense, zero-filled series over a fixed 2-year window
//!   that actual records are merged onto, so charts never have gaps
//! - **Aggregation**: window filtering, cadence-aware re-bucketing, and
//!   cross-account totals, all as a pure function of the inputs and "today"
//!
//! ## Example
//!
//! ```rust,ignore
//! use income_series_builder::*;
//! use chrono::Local;
//!
//! let source = SourceData {
//!     accounts: Some(accounts),
//!     payouts: Some(payouts),
//!     activities: Some(activities),
//! };
//!
//! let request = DataRequest {
//!     metric: MetricKind::Income,
//!     period: Period::Ytd,
//!     granularity: Granularity::Monthly,
//! };
//!
//! let data = build_dashboard(&source, &request, Local::now().date_naive());
//! ```

pub mod accounts;
pub mod early_pay;
pub mod engine;
pub mod error;
pub mod grid;
pub mod normalize;
pub mod schema;
pub mod totals;
pub mod utils;

#[cfg(feature = "argyle")]
pub mod argyle;

pub use accounts::{all_synced, prepare_accounts, ConnectedAccount};
pub use early_pay::{EarlyPayConfig, EarlyPayDecision};
pub use engine::aggregate;
pub use error::{IncomeSeriesError, Result};
pub use grid::empty_points;
pub use schema::*;
pub use totals::PayComponentTotals;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A single chart point: one date bucket and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: f64,
}

/// One account's series at the requested granularity, plus the merged
/// native-cadence points it was derived from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSeries {
    pub account_id: String,
    pub name: String,
    pub color: String,
    pub points: Vec<Point>,
    pub raw_points: Vec<Point>,
}

/// Result of one aggregation call, tagged by the requested metric so each
/// metric's aggregation rule and result shape are fixed at compile time.
///
/// `Loading` is returned while upstream data is absent or still syncing;
/// callers must not render partial aggregates.
#[derive(Debug, Clone, Serialize)]
pub enum DashboardData {
    Loading,
    Income(Vec<AccountSeries>),
    Hours(Vec<AccountSeries>),
    Hourly(Vec<AccountSeries>),
    TotalPay(PayComponentTotals),
}

impl DashboardData {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Everything the pipeline consumes, as fetched from upstream. `None` marks
/// a collection that has not arrived yet and forces a `Loading` result.
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub accounts: Option<Vec<Account>>,
    pub payouts: Option<Vec<Payout>>,
    pub activities: Option<Vec<Activity>>,
}

/// Builds the requested dashboard view from already-fetched source data.
///
/// Returns [`DashboardData::Loading`] until all three collections are
/// present and every connected account has finished syncing; after that the
/// result is deterministic for a given `today`.
pub fn build_dashboard(
    source: &SourceData,
    request: &DataRequest,
    today: NaiveDate,
) -> DashboardData {
    let (Some(accounts), Some(payouts), Some(activities)) =
        (&source.accounts, &source.payouts, &source.activities)
    else {
        debug!("source data incomplete, reporting loading state");
        return DashboardData::Loading;
    };

    let prepared = prepare_accounts(accounts);

    if !all_synced(&prepared) {
        debug!("one or more accounts still syncing, reporting loading state");
        return DashboardData::Loading;
    }

    info!(
        "aggregating {:?} over {:?} at {:?} granularity for {} accounts",
        request.metric,
        request.period,
        request.granularity,
        prepared.len()
    );

    engine::aggregate(&prepared, payouts, activities, request, today)
}
