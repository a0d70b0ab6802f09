use super::types::{Cadence, Inputs, Metrics};

/// Down-payment fraction at or above which no PMI is charged.
pub const PMI_CUTOFF: f64 = 0.20;

pub fn compute_metrics(inputs: &Inputs) -> Metrics {
    let gross_monthly_income = gross_monthly_income(inputs);
    let monthly_debt = monthly_debt(inputs);

    let loan_amount = inputs.home_price * (1.0 - inputs.down_payment_pct);
    let principal_interest =
        principal_and_interest(loan_amount, inputs.interest_rate, inputs.term_years);

    // Tax and insurance are charged on the full price; PMI on the loan only.
    let monthly_tax = inputs.home_price * inputs.property_tax_rate / 12.0;
    let monthly_insurance = inputs.home_price * inputs.insurance_rate / 12.0;
    let monthly_pmi = if inputs.down_payment_pct < PMI_CUTOFF {
        loan_amount * inputs.pmi_rate / 12.0
    } else {
        0.0
    };

    let piti = principal_interest
        + monthly_tax
        + monthly_insurance
        + monthly_pmi
        + inputs.upkeep_monthly;

    let down_payment = inputs.home_price * inputs.down_payment_pct;
    let closing_costs = inputs.home_price * inputs.closing_cost_pct;
    let reserves = piti * f64::from(inputs.reserve_months);
    let total_cash_needed = down_payment + closing_costs + reserves + inputs.renovation_budget;

    let net_worth = inputs.total_assets - inputs.total_liabilities;
    let home_equity = down_payment;

    Metrics {
        gross_monthly_income,
        monthly_debt,
        loan_amount,
        principal_interest,
        monthly_tax,
        monthly_insurance,
        monthly_pmi,
        monthly_upkeep: inputs.upkeep_monthly,
        piti,
        front_end: ratio(piti, gross_monthly_income),
        back_end: ratio(piti + monthly_debt, gross_monthly_income),
        down_payment,
        closing_costs,
        reserves,
        total_cash_needed,
        cash_remaining: inputs.cash_available - total_cash_needed,
        net_worth,
        home_equity,
        equity_share_of_net_worth: if net_worth > 0.0 {
            home_equity / net_worth
        } else {
            0.0
        },
        survival_months: ratio(inputs.cash_available, piti),
    }
}

pub fn gross_monthly_income(inputs: &Inputs) -> f64 {
    let combined = inputs.primary_income + inputs.partner_income;
    match inputs.income_basis {
        Cadence::Annual => combined / 12.0,
        Cadence::Monthly => combined,
    }
}

pub fn monthly_debt(inputs: &Inputs) -> f64 {
    inputs.debts.iter().map(|d| d.monthly_amount()).sum()
}

/// Monthly payment per unit of loan for a fully amortizing fixed-rate loan.
/// A zero rate degrades to straight-line repayment; a zero term to zero.
pub fn payment_factor(annual_rate: f64, term_years: u32) -> f64 {
    let n = f64::from(term_years) * 12.0;
    if n == 0.0 {
        return 0.0;
    }
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return 1.0 / n;
    }
    let growth = (1.0 + r).powf(n);
    r * growth / (growth - 1.0)
}

pub fn principal_and_interest(loan: f64, annual_rate: f64, term_years: u32) -> f64 {
    loan * payment_factor(annual_rate, term_years)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
