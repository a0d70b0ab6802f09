use serde::Serialize;

use super::engine::{PMI_CUTOFF, compute_metrics, payment_factor};
use super::thresholds::{Tier, TierLimits};
use super::types::{Inputs, Metrics};

const CASH_SEARCH_STEP_UP: f64 = 10_000.0;
const CASH_SEARCH_STEP_DOWN: f64 = 5_000.0;
const CASH_SEARCH_TOLERANCE: f64 = 1_000.0;
const CASH_SEARCH_MAX_ITERATIONS: u32 = 20;
const PRICE_FLOOR: f64 = 100_000.0;
const DP_BRACKET_MAX: f64 = 0.95;
const DP_TOLERANCE: f64 = 1e-4;
const DP_MAX_ITERATIONS: u32 = 25;
const RATIO_SLACK: f64 = 1e-9;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TargetField {
    HomePrice,
    MonthlyPayment,
    CashRemaining,
    DownPaymentPct,
}

/// At most one variable is solved for; picking a target releases any other.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LockState {
    Unlocked,
    Target(TargetField),
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassChecks {
    pub front_end: bool,
    pub back_end: bool,
    pub cash: bool,
    pub overall: bool,
}

impl PassChecks {
    fn new(front_end: f64, back_end: f64, cash_remaining: f64, limits: &TierLimits) -> Self {
        let front_end = front_end <= limits.front_end + RATIO_SLACK;
        let back_end = back_end <= limits.back_end + RATIO_SLACK;
        let cash = cash_remaining >= 0.0;
        Self {
            front_end,
            back_end,
            cash,
            overall: front_end && back_end && cash,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioEvaluation {
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub piti: f64,
    pub front_end: f64,
    pub back_end: f64,
    pub total_cash_needed: f64,
    pub cash_remaining: f64,
    pub checks: PassChecks,
}

impl ScenarioEvaluation {
    fn from_metrics(inputs: &Inputs, metrics: &Metrics, limits: &TierLimits) -> Self {
        Self {
            home_price: inputs.home_price,
            down_payment_pct: inputs.down_payment_pct,
            piti: metrics.piti,
            front_end: metrics.front_end,
            back_end: metrics.back_end,
            total_cash_needed: metrics.total_cash_needed,
            cash_remaining: metrics.cash_remaining,
            checks: PassChecks::new(
                metrics.front_end,
                metrics.back_end,
                metrics.cash_remaining,
                limits,
            ),
        }
    }
}

/// A numeric `value` may still fail its checks; `None` means the tier has no
/// feasible solution at all and must not be read as a number.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub tier: Tier,
    pub achievable: bool,
    pub value: Option<f64>,
    pub evaluation: Option<ScenarioEvaluation>,
}

impl ScenarioResult {
    fn unachievable(tier: Tier) -> Self {
        Self {
            tier,
            achievable: false,
            value: None,
            evaluation: None,
        }
    }

    fn solved(tier: Tier, value: f64, evaluation: ScenarioEvaluation) -> Self {
        Self {
            tier,
            achievable: true,
            value: Some(value),
            evaluation: Some(evaluation),
        }
    }
}

pub fn solve(inputs: &Inputs, lock: LockState, table: &[TierLimits]) -> Option<Vec<ScenarioResult>> {
    match lock {
        LockState::Unlocked => None,
        LockState::Target(target) => Some(solve_scenarios(inputs, target, table)),
    }
}

pub fn solve_scenarios(
    inputs: &Inputs,
    target: TargetField,
    table: &[TierLimits],
) -> Vec<ScenarioResult> {
    table
        .iter()
        .map(|limits| match target {
            TargetField::HomePrice => solve_home_price(inputs, limits),
            TargetField::MonthlyPayment => solve_monthly_payment(inputs, limits),
            TargetField::CashRemaining => solve_cash_remaining(inputs, limits),
            TargetField::DownPaymentPct => solve_down_payment(inputs, limits),
        })
        .collect()
}

/// Tightest payment the tier allows: the front-end cap on housing alone, or
/// the back-end cap net of existing obligations, whichever binds first.
fn max_affordable_piti(metrics: &Metrics, limits: &TierLimits) -> f64 {
    let front_cap = limits.front_end * metrics.gross_monthly_income;
    let back_cap = limits.back_end * metrics.gross_monthly_income - metrics.monthly_debt;
    front_cap.min(back_cap)
}

fn with_price(inputs: &Inputs, home_price: f64) -> Inputs {
    let mut candidate = inputs.clone();
    candidate.home_price = home_price;
    candidate
}

fn with_down_payment(inputs: &Inputs, down_payment_pct: f64) -> Inputs {
    let mut candidate = inputs.clone();
    candidate.down_payment_pct = down_payment_pct;
    candidate
}

fn solve_home_price(inputs: &Inputs, limits: &TierLimits) -> ScenarioResult {
    let base = compute_metrics(inputs);
    // Upkeep does not scale with price; take it off the budget up front.
    let budget = max_affordable_piti(&base, limits) - inputs.upkeep_monthly;
    let financed = 1.0 - inputs.down_payment_pct;
    if budget <= 0.0 || financed <= 0.0 {
        return ScenarioResult::unachievable(limits.tier);
    }

    let tax_ins_monthly = (inputs.property_tax_rate + inputs.insurance_rate) / 12.0;
    let pmi_monthly = if inputs.down_payment_pct < PMI_CUTOFF {
        inputs.pmi_rate / 12.0
    } else {
        0.0
    };
    // Full monthly cost per unit of loan. Tax and insurance are priced off
    // the home, hence the division by the financed share.
    let combined = payment_factor(inputs.interest_rate, inputs.term_years)
        + tax_ins_monthly / financed
        + pmi_monthly;
    if combined <= 0.0 {
        return ScenarioResult::unachievable(limits.tier);
    }

    let max_price = budget / combined / financed;
    let candidate = with_price(inputs, max_price);
    let metrics = compute_metrics(&candidate);
    ScenarioResult::solved(
        limits.tier,
        max_price,
        ScenarioEvaluation::from_metrics(&candidate, &metrics, limits),
    )
}

fn solve_monthly_payment(inputs: &Inputs, limits: &TierLimits) -> ScenarioResult {
    let base = compute_metrics(inputs);
    let payment = max_affordable_piti(&base, limits);
    if payment <= 0.0 {
        return ScenarioResult::unachievable(limits.tier);
    }

    // Price stays fixed for a payment target; reserves are sized off the
    // solved payment.
    let total_cash_needed = base.down_payment
        + base.closing_costs
        + payment * f64::from(inputs.reserve_months)
        + inputs.renovation_budget;
    let cash_remaining = inputs.cash_available - total_cash_needed;
    let front_end = payment / base.gross_monthly_income;
    let back_end = (payment + base.monthly_debt) / base.gross_monthly_income;

    let evaluation = ScenarioEvaluation {
        home_price: inputs.home_price,
        down_payment_pct: inputs.down_payment_pct,
        piti: payment,
        front_end,
        back_end,
        total_cash_needed,
        cash_remaining,
        checks: PassChecks::new(front_end, back_end, cash_remaining, limits),
    };
    ScenarioResult::solved(limits.tier, payment, evaluation)
}

/// Cash buffer each tier aims to keep after closing.
fn cash_buffer_target(tier: Tier) -> f64 {
    match tier {
        Tier::Conservative => 100_000.0,
        Tier::Moderate => 50_000.0,
        Tier::Aggressive => 25_000.0,
    }
}

fn solve_cash_remaining(inputs: &Inputs, limits: &TierLimits) -> ScenarioResult {
    let target = cash_buffer_target(limits.tier);

    let mut price = inputs.home_price;
    let mut converged = false;
    for _ in 0..CASH_SEARCH_MAX_ITERATIONS {
        let remaining = compute_metrics(&with_price(inputs, price)).cash_remaining;
        if (remaining - target).abs() <= CASH_SEARCH_TOLERANCE {
            converged = true;
            break;
        }
        price = if remaining > target {
            price + CASH_SEARCH_STEP_UP
        } else {
            price - CASH_SEARCH_STEP_DOWN
        };
    }
    if !converged {
        return ScenarioResult::unachievable(limits.tier);
    }

    let candidate = with_price(inputs, price.max(PRICE_FLOOR));
    let metrics = compute_metrics(&candidate);
    ScenarioResult::solved(
        limits.tier,
        target,
        ScenarioEvaluation::from_metrics(&candidate, &metrics, limits),
    )
}

fn solve_down_payment(inputs: &Inputs, limits: &TierLimits) -> ScenarioResult {
    #[cfg(debug_assertions)]
    check_ratio_monotonicity(inputs);

    let feasible = |down_payment_pct: f64| {
        let metrics = compute_metrics(&with_down_payment(inputs, down_payment_pct));
        metrics.front_end <= limits.front_end + RATIO_SLACK
            && metrics.back_end <= limits.back_end + RATIO_SLACK
    };

    let solved = if feasible(0.0) {
        0.0
    } else if !feasible(DP_BRACKET_MAX) {
        return ScenarioResult::unachievable(limits.tier);
    } else {
        // Ratios fall as the fraction rises, so bisect toward the lowest
        // fraction the caps allow.
        let mut low = 0.0;
        let mut high = DP_BRACKET_MAX;
        let mut iterations = 0;
        while iterations < DP_MAX_ITERATIONS && high - low > DP_TOLERANCE {
            iterations += 1;
            let mid = (low + high) * 0.5;
            if feasible(mid) {
                high = mid;
            } else {
                low = mid;
            }
        }
        high
    };

    let candidate = with_down_payment(inputs, solved);
    let metrics = compute_metrics(&candidate);
    ScenarioResult::solved(
        limits.tier,
        solved,
        ScenarioEvaluation::from_metrics(&candidate, &metrics, limits),
    )
}

/// A larger down payment must never raise either ratio; a violation is a
/// defect in the payment model, not an infeasible scenario.
#[cfg(debug_assertions)]
fn check_ratio_monotonicity(inputs: &Inputs) {
    let mut prev_front = f64::INFINITY;
    let mut prev_back = f64::INFINITY;
    for step in 0..=4 {
        let fraction = DP_BRACKET_MAX * f64::from(step) / 4.0;
        let metrics = compute_metrics(&with_down_payment(inputs, fraction));
        debug_assert!(
            metrics.front_end <= prev_front + RATIO_SLACK
                && metrics.back_end <= prev_back + RATIO_SLACK,
            "housing ratios increased with a larger down payment at {fraction}"
        );
        prev_front = metrics.front_end;
        prev_back = metrics.back_end;
    }
}
