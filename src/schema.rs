use crate::error::Result;
use crate::utils::week_start;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A connected income source as reported by the payroll API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub link_item: String,
    #[serde(default)]
    pub was_connected: bool,
    #[serde(default)]
    pub status: String,
    pub link_item_details: LinkItemDetails,
    #[serde(default)]
    pub availability: Availability,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkItemDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Availability {
    #[serde(default)]
    pub activities: AvailabilityEntry,
    #[serde(default)]
    pub payouts: AvailabilityEntry,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub available_from: Option<DateTime<Utc>>,
}

/// Account classification. Employer and platform accounts pay out on a
/// declared cadence; everything else is treated as gig/on-demand work whose
/// history is reconstructed from activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Employer,
    Platform,
    Other,
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        match self.link_item_details.kind.as_str() {
            "employer" => AccountKind::Employer,
            "platform" => AccountKind::Platform,
            _ => AccountKind::Other,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.availability.activities.status == "synced"
            && self.availability.payouts.status == "synced"
    }
}

/// One payroll disbursement event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub account: String,
    #[serde(default)]
    pub payout_period: Option<PayoutPeriod>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gross_pay: Option<String>,
    #[serde(default)]
    pub net_pay: Option<String>,
    #[serde(default)]
    pub taxes: Option<String>,
    #[serde(default)]
    pub deductions: Option<String>,
    #[serde(default)]
    pub reimbursements: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub gross_pay_list_totals: GrossPayListTotals,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutPeriod {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrossPayListTotals {
    #[serde(default)]
    pub base: Option<ListTotal>,
    #[serde(default)]
    pub bonus: Option<ListTotal>,
    #[serde(default)]
    pub commission: Option<ListTotal>,
    #[serde(default)]
    pub other: Option<ListTotal>,
    #[serde(default)]
    pub overtime: Option<ListTotal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTotal {
    #[serde(default)]
    pub amount: Option<String>,
}

/// One unit-of-work record for a gig/on-demand account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub account: String,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Duration of the activity in seconds.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub income: ActivityIncome,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityIncome {
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub pay: Option<String>,
    #[serde(default)]
    pub bonus: Option<String>,
    #[serde(default)]
    pub tips: Option<String>,
    #[serde(default)]
    pub fees: Option<String>,
}

/// An employment relationship, consumed by the early-pay decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employment {
    pub id: String,
    pub account: String,
    #[serde(default)]
    pub hire_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub base_pay: Option<BasePay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasePay {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Native payout cadence of an account, inferred from the length of its
/// first declared pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayCadence {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl PayCadence {
    /// 1 day is daily, 7 days weekly, anything above 28 monthly, and the
    /// remainder biweekly.
    pub fn from_period_days(days: i64) -> Self {
        if days > 28 {
            Self::Monthly
        } else if days == 1 {
            Self::Daily
        } else if days == 7 {
            Self::Weekly
        } else {
            Self::Biweekly
        }
    }
}

/// Requested chart bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

/// Requested reporting window, resolved to a start date relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Ytd,
    Mtd,
    Wtd,
    Last12m,
    Last3m,
    Last4w,
    Last7d,
    All,
}

impl Period {
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Ytd => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap(),
            Self::Mtd => NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap(),
            Self::Wtd => week_start(today),
            Self::Last12m => today.checked_sub_months(Months::new(12)).unwrap(),
            Self::Last3m => today.checked_sub_months(Months::new(3)).unwrap(),
            Self::Last4w => today.checked_sub_days(Days::new(28)).unwrap(),
            Self::Last7d => today.checked_sub_days(Days::new(7)).unwrap(),
            Self::All => today.checked_sub_months(Months::new(24)).unwrap(),
        }
    }
}

/// The metric being charted. Each variant carries its own aggregation rule
/// and result shape, so there is no string dispatch anywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Income,
    Hours,
    Hourly,
    TotalPay,
}

/// Parameters of one aggregation call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DataRequest {
    #[serde(rename = "type")]
    pub metric: MetricKind,
    pub period: Period,
    pub granularity: Granularity,
}

pub fn parse_accounts(json: &str) -> Result<Vec<Account>> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_payouts(json: &str) -> Result<Vec<Payout>> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_activities(json: &str) -> Result<Vec<Activity>> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_employments(json: &str) -> Result<Vec<Employment>> {
    Ok(serde_json::from_str(json)?)
}
