use crate::schema::{Account, AccountKind, BasePay, Employment, Payout};
use crate::utils::{complete_months_between, last_day_of_month, parse_amount};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unit the configured thresholds are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdCycle {
    #[default]
    Month,
    Week,
}

/// Eligibility thresholds for the early-pay offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarlyPayConfig {
    /// Minimum combined pay across sources.
    pub pay: f64,
    /// Minimum tenure at any single source.
    pub duration: f64,
    #[serde(default)]
    pub pay_cycle: ThresholdCycle,
    #[serde(default)]
    pub duration_cycle: ThresholdCycle,
}

impl EarlyPayConfig {
    /// Normalizes weekly-cycle thresholds to monthly terms.
    fn monthly_thresholds(&self) -> (f64, f64) {
        let pay = match self.pay_cycle {
            ThresholdCycle::Week => self.pay * 4.0,
            ThresholdCycle::Month => self.pay,
        };
        let duration = match self.duration_cycle {
            ThresholdCycle::Week => self.duration / 4.0,
            ThresholdCycle::Month => self.duration,
        };
        (pay, duration)
    }
}

/// How much can be advanced: a catch-up amount for the elapsed part of the
/// pay cycle, then a per-day drip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AdvanceAmounts {
    pub initial: f64,
    pub daily: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CriteriaMet {
    pub duration: bool,
    pub pay: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarlyPayDecision {
    pub approved: bool,
    /// Combined monthly pay across all sources.
    pub monthly: f64,
    /// Tenure in whole months, one entry per source.
    pub durations: Vec<i32>,
    /// Advance amounts summed over sources not already drawing early pay.
    pub combined: AdvanceAmounts,
    /// Advance amounts per account.
    pub payouts: BTreeMap<String, AdvanceAmounts>,
    pub criteria: CriteriaMet,
}

/// Converts a declared base pay to a monthly figure. Hourly pay assumes
/// twenty 8-hour days a month.
pub fn monthly_pay(base_pay: &BasePay) -> f64 {
    let amount = parse_amount(base_pay.amount.as_deref());

    match base_pay.period.as_str() {
        "hourly" => amount * 20.0 * 8.0,
        "weekly" => amount * 4.0,
        "biweekly" | "semimonthly" => amount * 2.0,
        "monthly" => amount,
        "annual" => amount / 12.0,
        _ => amount,
    }
}

fn advance_amounts(monthly: f64, today: NaiveDate) -> AdvanceAmounts {
    let days_in_month = f64::from(last_day_of_month(today.year(), today.month()).day());
    let cycle_factor = f64::from(today.day()) / days_in_month;

    AdvanceAmounts {
        initial: cycle_factor * monthly,
        daily: monthly / days_in_month,
    }
}

/// Evaluates the early-pay offer over already-fetched data.
///
/// Employer/platform accounts use the employment's hire date and declared
/// base pay; gig accounts use the activities `available_from` date for
/// tenure and summed payout gross pay as the monthly figure. Accounts whose
/// tenure or pay cannot be established contribute nothing.
pub fn evaluate(
    accounts: &[Account],
    employments: &[Employment],
    payouts: &[Payout],
    config: &EarlyPayConfig,
    active_accounts: &[String],
    today: NaiveDate,
) -> EarlyPayDecision {
    let (pay_threshold, duration_threshold) = config.monthly_thresholds();

    let mut monthly_total = 0.0;
    let mut durations = Vec::new();
    let mut combined = AdvanceAmounts::default();
    let mut per_account = BTreeMap::new();

    let eligible = accounts
        .iter()
        .filter(|account| account.was_connected && account.status != "error");

    for account in eligible {
        let source = match account.kind() {
            AccountKind::Employer | AccountKind::Platform => {
                employment_source(account, employments, today)
            }
            AccountKind::Other => gig_source(account, payouts, today),
        };

        let Some((monthly, tenure_months)) = source else {
            continue;
        };

        let amounts = advance_amounts(monthly, today);

        monthly_total += monthly;
        durations.push(tenure_months);
        per_account.insert(account.id.clone(), amounts);

        if !active_accounts.iter().any(|id| id == &account.id) {
            combined.initial += amounts.initial;
            combined.daily += amounts.daily;
        }
    }

    let criteria = CriteriaMet {
        duration: durations
            .iter()
            .any(|&months| f64::from(months) > duration_threshold),
        pay: monthly_total > pay_threshold,
    };

    EarlyPayDecision {
        approved: criteria.duration && criteria.pay,
        monthly: monthly_total,
        durations,
        combined,
        payouts: per_account,
        criteria,
    }
}

fn employment_source(
    account: &Account,
    employments: &[Employment],
    today: NaiveDate,
) -> Option<(f64, i32)> {
    let employment = employments.iter().find(|e| e.account == account.id);

    let Some(employment) = employment else {
        debug!("account {} has no employment record", account.id);
        return None;
    };

    let Some(hired) = employment.hire_datetime.map(|dt| dt.date_naive()) else {
        debug!("employment for account {} has no hire date", account.id);
        return None;
    };

    let monthly = employment.base_pay.as_ref().map(monthly_pay).unwrap_or(0.0);
    Some((monthly, complete_months_between(hired, today)))
}

fn gig_source(account: &Account, payouts: &[Payout], today: NaiveDate) -> Option<(f64, i32)> {
    let Some(available_from) = account
        .availability
        .activities
        .available_from
        .map(|dt| dt.date_naive())
    else {
        debug!("account {} has no activity history start", account.id);
        return None;
    };

    let monthly: f64 = payouts
        .iter()
        .filter(|payout| payout.account == account.id)
        .map(|payout| parse_amount(payout.gross_pay.as_deref()))
        .sum();

    Some((monthly, complete_months_between(available_from, today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Availability, AvailabilityEntry, LinkItemDetails};
    use chrono::{TimeZone, Utc};

    fn base_pay(amount: &str, period: &str) -> BasePay {
        BasePay {
            amount: Some(amount.to_string()),
            period: period.to_string(),
            currency: Some("USD".to_string()),
        }
    }

    fn employer_account(id: &str) -> Account {
        Account {
            id: id.to_string(),
            link_item: format!("li-{id}"),
            was_connected: true,
            status: "done".to_string(),
            link_item_details: LinkItemDetails {
                name: format!("Employer {id}"),
                kind: "employer".to_string(),
            },
            availability: Availability::default(),
        }
    }

    fn gig_account(id: &str, available_from: (i32, u32, u32)) -> Account {
        let (year, month, day) = available_from;
        let mut account = employer_account(id);
        account.link_item_details.kind = "gig".to_string();
        account.availability = Availability {
            activities: AvailabilityEntry {
                status: "synced".to_string(),
                available_from: Some(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()),
            },
            payouts: AvailabilityEntry::default(),
        };
        account
    }

    fn employment(account: &str, hired: (i32, u32, u32), pay: BasePay) -> Employment {
        Employment {
            id: format!("emp-{account}"),
            account: account.to_string(),
            hire_datetime: Some(
                Utc.with_ymd_and_hms(hired.0, hired.1, hired.2, 0, 0, 0).unwrap(),
            ),
            base_pay: Some(pay),
        }
    }

    fn config(pay: f64, duration: f64) -> EarlyPayConfig {
        EarlyPayConfig {
            pay,
            duration,
            pay_cycle: ThresholdCycle::Month,
            duration_cycle: ThresholdCycle::Month,
        }
    }

    #[test]
    fn test_monthly_pay_conversions() {
        assert_eq!(monthly_pay(&base_pay("20", "hourly")), 3200.0);
        assert_eq!(monthly_pay(&base_pay("500", "weekly")), 2000.0);
        assert_eq!(monthly_pay(&base_pay("1000", "biweekly")), 2000.0);
        assert_eq!(monthly_pay(&base_pay("1000", "semimonthly")), 2000.0);
        assert_eq!(monthly_pay(&base_pay("3000", "monthly")), 3000.0);
        assert_eq!(monthly_pay(&base_pay("36000", "annual")), 3000.0);
        assert_eq!(monthly_pay(&base_pay("42", "unknown")), 42.0);
    }

    #[test]
    fn test_advance_amounts_mid_cycle() {
        // June has 30 days; on the 15th half the cycle has elapsed.
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let amounts = advance_amounts(3000.0, today);

        assert_eq!(amounts.initial, 1500.0);
        assert_eq!(amounts.daily, 100.0);
    }

    #[test]
    fn test_approved_when_both_criteria_met() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let accounts = vec![employer_account("acc-1")];
        let employments = vec![employment("acc-1", (2022, 1, 10), base_pay("3000", "monthly"))];

        let decision = evaluate(&accounts, &employments, &[], &config(2000.0, 6.0), &[], today);

        assert!(decision.approved);
        assert!(decision.criteria.duration);
        assert!(decision.criteria.pay);
        assert_eq!(decision.monthly, 3000.0);
        assert_eq!(decision.durations, vec![29]);
        assert_eq!(decision.combined.daily, 100.0);
    }

    #[test]
    fn test_rejected_on_short_tenure() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let accounts = vec![employer_account("acc-1")];
        let employments = vec![employment("acc-1", (2024, 3, 1), base_pay("5000", "monthly"))];

        let decision = evaluate(&accounts, &employments, &[], &config(2000.0, 6.0), &[], today);

        assert!(!decision.approved);
        assert!(!decision.criteria.duration);
        assert!(decision.criteria.pay);
    }

    #[test]
    fn test_gig_account_uses_payout_gross_and_availability() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let accounts = vec![gig_account("acc-2", (2023, 1, 5))];

        let payouts: Vec<Payout> = ["1200.00", "1300.00"]
            .iter()
            .enumerate()
            .map(|(i, gross)| Payout {
                id: format!("p-{i}"),
                account: "acc-2".to_string(),
                payout_period: None,
                currency: None,
                gross_pay: Some(gross.to_string()),
                net_pay: None,
                taxes: None,
                deductions: None,
                reimbursements: None,
                hours: None,
                gross_pay_list_totals: Default::default(),
            })
            .collect();

        let decision = evaluate(&accounts, &[], &payouts, &config(2000.0, 12.0), &[], today);

        assert!(decision.approved);
        assert_eq!(decision.monthly, 2500.0);
        assert_eq!(decision.durations, vec![17]);
    }

    #[test]
    fn test_active_accounts_excluded_from_combined() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let accounts = vec![employer_account("acc-1")];
        let employments = vec![employment("acc-1", (2022, 1, 10), base_pay("3000", "monthly"))];

        let decision = evaluate(
            &accounts,
            &employments,
            &[],
            &config(2000.0, 6.0),
            &["acc-1".to_string()],
            today,
        );

        assert_eq!(decision.combined, AdvanceAmounts::default());
        assert!(decision.payouts.contains_key("acc-1"));
    }

    #[test]
    fn test_weekly_threshold_cycles_normalize() {
        let config = EarlyPayConfig {
            pay: 500.0,
            duration: 8.0,
            pay_cycle: ThresholdCycle::Week,
            duration_cycle: ThresholdCycle::Week,
        };

        let (pay, duration) = config.monthly_thresholds();
        assert_eq!(pay, 2000.0);
        assert_eq!(duration, 2.0);
    }
}
