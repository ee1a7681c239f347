use crate::normalize::{ActivityBreakdown, PayoutBreakdown};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Pay-component sums over the requested window, accumulated with exact
/// decimal arithmetic. One instance per account, combined into a single
/// cross-account object for `TotalPay` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayComponentTotals {
    pub base: Decimal,
    pub bonus: Decimal,
    pub commission: Decimal,
    pub overtime: Decimal,
    pub other: Decimal,
    pub reimbursements: Decimal,
    pub net_pay: Decimal,
    pub taxes: Decimal,
    pub deductions: Decimal,
    pub fees: Decimal,
    pub tips: Decimal,
    pub gross: Decimal,
    pub net: Decimal,
}

impl PayComponentTotals {
    pub fn merge(&mut self, other: &Self) {
        self.base += other.base;
        self.bonus += other.bonus;
        self.commission += other.commission;
        self.overtime += other.overtime;
        self.other += other.other;
        self.reimbursements += other.reimbursements;
        self.net_pay += other.net_pay;
        self.taxes += other.taxes;
        self.deductions += other.deductions;
        self.fees += other.fees;
        self.tips += other.tips;
        self.gross += other.gross;
        self.net += other.net;
    }

    pub fn combine<'a, I: IntoIterator<Item = &'a Self>>(totals: I) -> Self {
        let mut combined = Self::default();
        for total in totals {
            combined.merge(total);
        }
        combined
    }
}

/// Sums payout breakdowns dated on or after `start`.
///
/// Gross = base + overtime + bonus + other + reimbursements;
/// net = net pay - taxes - deductions.
pub fn sum_payout_breakdowns(
    breakdowns: &[PayoutBreakdown],
    start: NaiveDate,
) -> PayComponentTotals {
    let mut totals = PayComponentTotals::default();

    for breakdown in breakdowns.iter().filter(|b| b.date >= start) {
        totals.base += breakdown.base;
        totals.bonus += breakdown.bonus;
        totals.commission += breakdown.commission;
        totals.other += breakdown.other;
        totals.overtime += breakdown.overtime;
        totals.net_pay += breakdown.net_pay;
        totals.taxes += breakdown.taxes;
        totals.deductions += breakdown.deductions;
        totals.reimbursements += breakdown.reimbursements;

        totals.gross += breakdown.base
            + breakdown.overtime
            + breakdown.bonus
            + breakdown.other
            + breakdown.reimbursements;
        totals.net += breakdown.net_pay - breakdown.taxes - breakdown.deductions;
    }

    totals
}

/// Sums activity breakdowns dated on or after `start`. Activity base pay
/// lands in `base`; gross = pay + bonus + tips and net = gross - fees.
pub fn sum_activity_breakdowns(
    breakdowns: &[ActivityBreakdown],
    start: NaiveDate,
) -> PayComponentTotals {
    let mut totals = PayComponentTotals::default();

    for breakdown in breakdowns.iter().filter(|b| b.date >= start) {
        let gross = breakdown.pay + breakdown.bonus + breakdown.tips;

        totals.base += breakdown.pay;
        totals.bonus += breakdown.bonus;
        totals.tips += breakdown.tips;
        totals.fees += breakdown.fees;
        totals.gross += gross;
        totals.net += gross - breakdown.fees;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payout_breakdown(date: NaiveDate, net_pay: Decimal) -> PayoutBreakdown {
        PayoutBreakdown {
            date,
            base: dec!(1000.00),
            bonus: dec!(0.10),
            commission: Decimal::ZERO,
            other: Decimal::ZERO,
            overtime: dec!(0.20),
            net_pay,
            taxes: dec!(200.00),
            deductions: dec!(50.00),
            reimbursements: Decimal::ZERO,
        }
    }

    #[test]
    fn test_payout_sums_are_exact() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let breakdowns = vec![
            payout_breakdown(date, dec!(800.00)),
            payout_breakdown(date, dec!(800.00)),
        ];

        let totals = sum_payout_breakdowns(&breakdowns, date);

        // 0.10 + 0.20 twice, with no float drift.
        assert_eq!(totals.bonus, dec!(0.20));
        assert_eq!(totals.overtime, dec!(0.40));
        assert_eq!(totals.gross, dec!(2000.60));
        assert_eq!(totals.net, dec!(1100.00));
    }

    #[test]
    fn test_payout_window_filtering() {
        let early = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let breakdowns = vec![
            payout_breakdown(early, dec!(700.00)),
            payout_breakdown(late, dec!(800.00)),
        ];

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let totals = sum_payout_breakdowns(&breakdowns, start);

        assert_eq!(totals.net_pay, dec!(800.00));
    }

    #[test]
    fn test_activity_gross_and_net() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let breakdowns = vec![ActivityBreakdown {
            date,
            total: dec!(60.00),
            pay: dec!(45.00),
            bonus: dec!(5.00),
            tips: dec!(10.00),
            fees: dec!(3.50),
        }];

        let totals = sum_activity_breakdowns(&breakdowns, date);

        assert_eq!(totals.base, dec!(45.00));
        assert_eq!(totals.gross, dec!(60.00));
        assert_eq!(totals.net, dec!(56.50));
        assert_eq!(totals.commission, Decimal::ZERO);
    }

    #[test]
    fn test_combine_accounts() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let payroll = sum_payout_breakdowns(&[payout_breakdown(date, dec!(800.00))], date);
        let gig = sum_activity_breakdowns(
            &[ActivityBreakdown {
                date,
                total: dec!(60.00),
                pay: dec!(45.00),
                bonus: dec!(5.00),
                tips: dec!(10.00),
                fees: dec!(3.50),
            }],
            date,
        );

        let combined = PayComponentTotals::combine([&payroll, &gig]);

        assert_eq!(combined.base, dec!(1045.00));
        assert_eq!(combined.gross, payroll.gross + gig.gross);
        assert_eq!(combined.net, payroll.net + gig.net);
    }
}
