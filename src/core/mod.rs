mod engine;
mod projection;
mod solver;
mod thresholds;
mod types;

pub use engine::{
    PMI_CUTOFF, compute_metrics, gross_monthly_income, monthly_debt, payment_factor,
    principal_and_interest,
};
pub use projection::{
    Assumptions, ExtraPaymentUse, Projection, ProjectionStart, YearSnapshot, project,
};
pub use solver::{
    LockState, PassChecks, ScenarioEvaluation, ScenarioResult, TargetField, solve, solve_scenarios,
};
pub use thresholds::{CapKind, THRESHOLDS, ThresholdTable, Tier, TierLimits, classify};
pub use types::{Cadence, Inputs, Metrics, Obligation};
