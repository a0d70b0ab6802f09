use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cadence {
    Annual,
    Monthly,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obligation {
    pub amount: f64,
    pub cadence: Cadence,
}

impl Obligation {
    pub fn monthly(amount: f64) -> Self {
        Self {
            amount,
            cadence: Cadence::Monthly,
        }
    }

    pub fn annual(amount: f64) -> Self {
        Self {
            amount,
            cadence: Cadence::Annual,
        }
    }

    pub fn monthly_amount(&self) -> f64 {
        match self.cadence {
            Cadence::Monthly => self.amount,
            Cadence::Annual => self.amount / 12.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub primary_income: f64,
    pub partner_income: f64,
    pub income_basis: Cadence,
    pub debts: Vec<Obligation>,
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub closing_cost_pct: f64,
    pub renovation_budget: f64,
    pub interest_rate: f64,
    pub term_years: u32,
    pub property_tax_rate: f64,
    pub insurance_rate: f64,
    pub upkeep_monthly: f64,
    pub reserve_months: u32,
    pub pmi_rate: f64,
    pub cash_available: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub gross_monthly_income: f64,
    pub monthly_debt: f64,
    pub loan_amount: f64,
    pub principal_interest: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_pmi: f64,
    pub monthly_upkeep: f64,
    pub piti: f64,
    pub front_end: f64,
    pub back_end: f64,
    pub down_payment: f64,
    pub closing_costs: f64,
    pub reserves: f64,
    pub total_cash_needed: f64,
    pub cash_remaining: f64,
    pub net_worth: f64,
    pub home_equity: f64,
    pub equity_share_of_net_worth: f64,
    pub survival_months: f64,
}
