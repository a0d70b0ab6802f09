use serde::Serialize;

use super::types::{Inputs, Metrics};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExtraPaymentUse {
    PayDownLoan,
    Invest,
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectionStart {
    pub home_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub monthly_rate: f64,
    pub starting_investment: f64,
    pub annual_income: f64,
}

impl ProjectionStart {
    /// Seeds the projection from the current purchase: whatever cash is left
    /// after closing becomes the opening investment balance.
    pub fn from_metrics(inputs: &Inputs, metrics: &Metrics) -> Self {
        Self {
            home_price: inputs.home_price,
            down_payment: metrics.down_payment,
            loan_amount: metrics.loan_amount,
            monthly_payment: metrics.piti,
            monthly_rate: inputs.interest_rate / 12.0,
            starting_investment: metrics.cash_remaining,
            annual_income: metrics.gross_monthly_income * 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Assumptions {
    pub appreciation_rate: f64,
    pub investment_return: f64,
    pub salary_growth_rate: f64,
    pub extra_monthly: f64,
    pub extra_use: ExtraPaymentUse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: u32,
    pub home_value: f64,
    pub loan_balance: f64,
    pub home_equity: f64,
    pub equity_gained: f64,
    pub investment_balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
    pub annual_income: f64,
}

/// Year-by-year walk of the purchase: one snapshot per year from 0 through
/// the horizon. Rebuilding from the same start replays the same sequence.
#[derive(Debug, Clone)]
pub struct Projection {
    assumptions: Assumptions,
    horizon_years: u32,
    down_payment: f64,
    monthly_payment: f64,
    monthly_rate: f64,
    year: u32,
    home_value: f64,
    loan_balance: f64,
    investment_balance: f64,
    cumulative_interest: f64,
    cumulative_principal: f64,
    annual_income: f64,
}

impl Projection {
    pub fn new(start: ProjectionStart, assumptions: Assumptions, horizon_years: u32) -> Self {
        Self {
            assumptions,
            horizon_years,
            down_payment: start.down_payment,
            monthly_payment: start.monthly_payment,
            monthly_rate: start.monthly_rate,
            year: 0,
            home_value: start.home_price,
            loan_balance: start.loan_amount,
            investment_balance: start.starting_investment,
            cumulative_interest: 0.0,
            cumulative_principal: 0.0,
            annual_income: start.annual_income,
        }
    }

    fn advance_year(&mut self) {
        self.annual_income *= 1.0 + self.assumptions.salary_growth_rate;
        self.home_value *= 1.0 + self.assumptions.appreciation_rate;

        for _ in 0..12 {
            if self.loan_balance > 0.0 {
                let interest = self.loan_balance * self.monthly_rate;
                // Principal never overshoots the balance, so the loan cannot
                // go negative.
                let principal = (self.monthly_payment - interest).min(self.loan_balance);
                self.loan_balance -= principal;
                self.cumulative_interest += interest;
                self.cumulative_principal += principal;

                if self.assumptions.extra_monthly > 0.0 {
                    match self.assumptions.extra_use {
                        ExtraPaymentUse::Invest => {
                            self.investment_balance += self.assumptions.extra_monthly;
                        }
                        ExtraPaymentUse::PayDownLoan => {
                            let extra = self.assumptions.extra_monthly.min(self.loan_balance);
                            self.loan_balance -= extra;
                            self.cumulative_principal += extra;
                        }
                    }
                }
            }
        }

        self.investment_balance *= 1.0 + self.assumptions.investment_return;
    }

    fn snapshot(&self) -> YearSnapshot {
        let home_equity = self.home_value - self.loan_balance;
        YearSnapshot {
            year: self.year,
            home_value: self.home_value,
            loan_balance: self.loan_balance.max(0.0),
            home_equity,
            equity_gained: home_equity - self.down_payment,
            investment_balance: self.investment_balance,
            cumulative_interest: self.cumulative_interest,
            cumulative_principal: self.cumulative_principal,
            annual_income: self.annual_income,
        }
    }
}

impl Iterator for Projection {
    type Item = YearSnapshot;

    fn next(&mut self) -> Option<YearSnapshot> {
        if self.year > self.horizon_years {
            return None;
        }
        if self.year > 0 {
            self.advance_year();
        }
        let snapshot = self.snapshot();
        self.year += 1;
        Some(snapshot)
    }
}

pub fn project(
    start: ProjectionStart,
    assumptions: Assumptions,
    horizon_years: u32,
) -> Vec<YearSnapshot> {
    Projection::new(start, assumptions, horizon_years).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn flat_assumptions() -> Assumptions {
        Assumptions {
            appreciation_rate: 0.0,
            investment_return: 0.0,
            salary_growth_rate: 0.0,
            extra_monthly: 0.0,
            extra_use: ExtraPaymentUse::PayDownLoan,
        }
    }

    fn sample_start() -> ProjectionStart {
        ProjectionStart {
            home_price: 750_000.0,
            down_payment: 150_000.0,
            loan_amount: 600_000.0,
            monthly_payment: 3_891.6,
            monthly_rate: 0.0675 / 12.0,
            starting_investment: 20_000.0,
            annual_income: 250_000.0,
        }
    }

    #[test]
    fn horizon_produces_one_snapshot_per_year_inclusive() {
        let years = project(sample_start(), flat_assumptions(), 10);
        assert_eq!(years.len(), 11);
        assert_eq!(years.first().map(|y| y.year), Some(0));
        assert_eq!(years.last().map(|y| y.year), Some(10));
    }

    #[test]
    fn year_zero_reports_the_untouched_start_state() {
        let years = project(sample_start(), flat_assumptions(), 5);
        let opening = &years[0];
        assert_close(opening.home_value, 750_000.0, 1e-9);
        assert_close(opening.loan_balance, 600_000.0, 1e-9);
        assert_close(opening.home_equity, 150_000.0, 1e-9);
        assert_close(opening.equity_gained, 0.0, 1e-9);
        assert_close(opening.investment_balance, 20_000.0, 1e-9);
        assert_close(opening.cumulative_interest, 0.0, 1e-12);
        assert_close(opening.cumulative_principal, 0.0, 1e-12);
    }

    #[test]
    fn growth_rates_compound_annually() {
        let mut assumptions = flat_assumptions();
        assumptions.appreciation_rate = 0.04;
        assumptions.salary_growth_rate = 0.03;
        let years = project(sample_start(), assumptions, 3);

        assert_close(years[3].home_value, 750_000.0 * 1.04f64.powi(3), 1e-6);
        assert_close(years[3].annual_income, 250_000.0 * 1.03f64.powi(3), 1e-6);
    }

    #[test]
    fn payments_split_into_interest_and_principal() {
        let years = project(sample_start(), flat_assumptions(), 1);
        let after_one = &years[1];

        let paid = 3_891.6 * 12.0;
        assert_close(
            after_one.cumulative_interest + after_one.cumulative_principal,
            paid,
            1e-6,
        );
        assert_close(
            after_one.loan_balance,
            600_000.0 - after_one.cumulative_principal,
            1e-6,
        );
        // Early in a 30-year loan most of the payment is interest.
        assert!(after_one.cumulative_interest > after_one.cumulative_principal);
    }

    #[test]
    fn zero_rate_loan_amortizes_straight_line_and_stops_at_zero() {
        let start = ProjectionStart {
            home_price: 120_000.0,
            down_payment: 0.0,
            loan_amount: 12_000.0,
            monthly_payment: 1_000.0,
            monthly_rate: 0.0,
            starting_investment: 0.0,
            annual_income: 0.0,
        };
        let years = project(start, flat_assumptions(), 2);

        assert_close(years[1].loan_balance, 0.0, 1e-9);
        assert_close(years[1].cumulative_principal, 12_000.0, 1e-9);
        assert_close(years[1].cumulative_interest, 0.0, 1e-12);
        // Nothing left to pay in year two.
        assert_close(years[2].cumulative_principal, 12_000.0, 1e-9);
        assert!(years[2].loan_balance >= 0.0);
    }

    #[test]
    fn extra_payment_strategies_diverge() {
        let mut paydown = flat_assumptions();
        paydown.extra_monthly = 500.0;
        let mut invest = paydown;
        invest.extra_use = ExtraPaymentUse::Invest;

        let after_paydown = project(sample_start(), paydown, 5);
        let after_invest = project(sample_start(), invest, 5);

        assert!(after_paydown[5].loan_balance < after_invest[5].loan_balance);
        assert_close(
            after_invest[5].investment_balance,
            20_000.0 + 500.0 * 60.0,
            1e-6,
        );
        assert_close(after_paydown[5].investment_balance, 20_000.0, 1e-9);
    }

    #[test]
    fn investment_compounds_after_the_year_contributions() {
        let mut assumptions = flat_assumptions();
        assumptions.investment_return = 0.10;
        assumptions.extra_monthly = 100.0;
        assumptions.extra_use = ExtraPaymentUse::Invest;

        let years = project(sample_start(), assumptions, 1);
        assert_close(
            years[1].investment_balance,
            (20_000.0 + 1_200.0) * 1.10,
            1e-6,
        );
    }

    #[test]
    fn equity_is_value_less_balance() {
        let mut assumptions = flat_assumptions();
        assumptions.appreciation_rate = 0.05;
        let years = project(sample_start(), assumptions, 8);
        for snapshot in &years {
            assert_close(
                snapshot.home_equity,
                snapshot.home_value - snapshot.loan_balance,
                1e-6,
            );
            assert_close(
                snapshot.equity_gained,
                snapshot.home_equity - 150_000.0,
                1e-6,
            );
        }
    }

    #[test]
    fn a_fresh_projection_replays_identically() {
        let mut assumptions = flat_assumptions();
        assumptions.appreciation_rate = 0.04;
        assumptions.investment_return = 0.07;
        assumptions.salary_growth_rate = 0.03;

        let first: Vec<YearSnapshot> =
            Projection::new(sample_start(), assumptions, 12).collect();
        let second: Vec<YearSnapshot> =
            Projection::new(sample_start(), assumptions, 12).collect();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert!(a.home_value == b.home_value);
            assert!(a.loan_balance == b.loan_balance);
            assert!(a.investment_balance == b.investment_balance);
            assert!(a.cumulative_interest == b.cumulative_interest);
        }
    }
}
