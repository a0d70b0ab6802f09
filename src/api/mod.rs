use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Assumptions, Cadence, CapKind, ExtraPaymentUse, Inputs, LockState, Metrics, Obligation,
    ProjectionStart, ScenarioResult, THRESHOLDS, TargetField, Tier, YearSnapshot, classify,
    compute_metrics, project, solve,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCadence {
    Annual,
    Monthly,
}

impl From<CliCadence> for Cadence {
    fn from(value: CliCadence) -> Self {
        match value {
            CliCadence::Annual => Cadence::Annual,
            CliCadence::Monthly => Cadence::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTargetField {
    HomePrice,
    MonthlyPayment,
    CashRemaining,
    DownPaymentPct,
}

impl From<CliTargetField> for TargetField {
    fn from(value: CliTargetField) -> Self {
        match value {
            CliTargetField::HomePrice => TargetField::HomePrice,
            CliTargetField::MonthlyPayment => TargetField::MonthlyPayment,
            CliTargetField::CashRemaining => TargetField::CashRemaining,
            CliTargetField::DownPaymentPct => TargetField::DownPaymentPct,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliExtraPaymentUse {
    Paydown,
    Invest,
}

impl From<CliExtraPaymentUse> for ExtraPaymentUse {
    fn from(value: CliExtraPaymentUse) -> Self {
        match value {
            CliExtraPaymentUse::Paydown => ExtraPaymentUse::PayDownLoan,
            CliExtraPaymentUse::Invest => ExtraPaymentUse::Invest,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiCadence {
    Annual,
    Monthly,
}

impl From<ApiCadence> for CliCadence {
    fn from(value: ApiCadence) -> Self {
        match value {
            ApiCadence::Annual => CliCadence::Annual,
            ApiCadence::Monthly => CliCadence::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTargetField {
    #[serde(alias = "homePrice", alias = "home_price", alias = "price")]
    HomePrice,
    #[serde(alias = "monthlyPayment", alias = "monthly_payment", alias = "piti")]
    MonthlyPayment,
    #[serde(alias = "cashRemaining", alias = "cash_remaining")]
    CashRemaining,
    #[serde(alias = "downPaymentPct", alias = "down_payment_pct", alias = "down-payment")]
    DownPaymentPct,
}

impl From<ApiTargetField> for CliTargetField {
    fn from(value: ApiTargetField) -> Self {
        match value {
            ApiTargetField::HomePrice => CliTargetField::HomePrice,
            ApiTargetField::MonthlyPayment => CliTargetField::MonthlyPayment,
            ApiTargetField::CashRemaining => CliTargetField::CashRemaining,
            ApiTargetField::DownPaymentPct => CliTargetField::DownPaymentPct,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiExtraPaymentUse {
    #[serde(alias = "pay-down-loan", alias = "payDownLoan")]
    Paydown,
    Invest,
}

impl From<ApiExtraPaymentUse> for CliExtraPaymentUse {
    fn from(value: ApiExtraPaymentUse) -> Self {
        match value {
            ApiExtraPaymentUse::Paydown => CliExtraPaymentUse::Paydown,
            ApiExtraPaymentUse::Invest => CliExtraPaymentUse::Invest,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum TierRating {
    Conservative,
    Moderate,
    Aggressive,
    ExceedsAll,
}

impl From<Option<Tier>> for TierRating {
    fn from(value: Option<Tier>) -> Self {
        match value {
            Some(Tier::Conservative) => TierRating::Conservative,
            Some(Tier::Moderate) => TierRating::Moderate,
            Some(Tier::Aggressive) => TierRating::Aggressive,
            None => TierRating::ExceedsAll,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EvaluatePayload {
    primary_income: Option<f64>,
    partner_income: Option<f64>,
    income_basis: Option<ApiCadence>,

    other_debt: Option<f64>,
    car_payment: Option<f64>,
    credit_line_payment: Option<f64>,
    debt_basis: Option<ApiCadence>,

    home_price: Option<f64>,
    down_payment_pct: Option<f64>,
    interest_rate: Option<f64>,
    term_years: Option<u32>,

    property_tax_rate: Option<f64>,
    insurance_rate: Option<f64>,
    pmi_rate: Option<f64>,
    closing_cost_pct: Option<f64>,
    upkeep_monthly: Option<f64>,
    reserve_months: Option<u32>,
    renovation_budget: Option<f64>,

    cash_available: Option<f64>,
    total_assets: Option<f64>,
    total_liabilities: Option<f64>,

    target: Option<ApiTargetField>,

    include_projection: Option<bool>,
    horizon_years: Option<u32>,
    appreciation_rate: Option<f64>,
    investment_return: Option<f64>,
    salary_growth_rate: Option<f64>,
    extra_monthly: Option<f64>,
    extra_use: Option<ApiExtraPaymentUse>,
}

#[derive(Parser, Debug)]
#[command(
    name = "homeworth",
    about = "Home affordability engine (PITI, DTI ratios, cash to close, tiered scenario solving)"
)]
struct Cli {
    #[arg(long, default_value_t = 170_000.0, help = "First earner gross income")]
    primary_income: f64,
    #[arg(long, default_value_t = 80_000.0, help = "Second earner gross income")]
    partner_income: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliCadence::Annual,
        help = "Whether the income figures are annual or monthly"
    )]
    income_basis: CliCadence,
    #[arg(
        long,
        default_value_t = 500.0,
        help = "Recurring debt payments outside the mortgage (cards, loans)"
    )]
    other_debt: f64,
    #[arg(long, default_value_t = 0.0, help = "Car loan payment")]
    car_payment: f64,
    #[arg(long, default_value_t = 0.0, help = "Margin or HELOC payment")]
    credit_line_payment: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliCadence::Monthly,
        help = "Whether the debt figures are annual or monthly"
    )]
    debt_basis: CliCadence,
    #[arg(long, default_value_t = 750_000.0)]
    home_price: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Down payment as percent of price; PMI applies under 20"
    )]
    down_payment_pct: f64,
    #[arg(long, default_value_t = 6.75, help = "Annual mortgage rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30)]
    term_years: u32,
    #[arg(
        long,
        default_value_t = 1.25,
        help = "Annual property tax in percent of price"
    )]
    property_tax_rate: f64,
    #[arg(
        long,
        default_value_t = 0.40,
        help = "Annual insurance plus HOA in percent of price"
    )]
    insurance_rate: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Annual PMI in percent of the loan"
    )]
    pmi_rate: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "One-time closing costs in percent of price"
    )]
    closing_cost_pct: f64,
    #[arg(long, default_value_t = 250.0, help = "Flat monthly upkeep budget")]
    upkeep_monthly: f64,
    #[arg(
        long,
        default_value_t = 6,
        help = "Months of the full payment held back as reserves at close"
    )]
    reserve_months: u32,
    #[arg(long, default_value_t = 0.0, help = "One-time renovation budget")]
    renovation_budget: f64,
    #[arg(long, default_value_t = 200_000.0, help = "Liquid cash on hand")]
    cash_available: f64,
    #[arg(long, default_value_t = 400_000.0)]
    total_assets: f64,
    #[arg(long, default_value_t = 50_000.0)]
    total_liabilities: f64,
    #[arg(
        long,
        value_enum,
        help = "Variable to solve for across the risk tiers"
    )]
    target: Option<CliTargetField>,
    #[arg(long, default_value_t = 10, help = "Projection horizon in years")]
    horizon_years: u32,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Annual home appreciation in percent"
    )]
    appreciation_rate: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Annual investment return in percent"
    )]
    investment_return: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual salary growth in percent")]
    salary_growth_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Extra monthly amount toward the loan or investments"
    )]
    extra_monthly: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliExtraPaymentUse::Paydown,
        help = "Where the extra monthly amount goes"
    )]
    extra_use: CliExtraPaymentUse,
}

#[derive(Debug, Clone, Copy)]
struct ProjectionRequest {
    horizon_years: u32,
    assumptions: Assumptions,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    target: Option<TargetField>,
    projection: Option<ProjectionRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Ratings {
    front_end: TierRating,
    back_end: TierRating,
    net_worth: TierRating,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    horizon_years: u32,
    years: Vec<YearSnapshot>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateResponse {
    metrics: Metrics,
    ratings: Ratings,
    scenarios: Option<Vec<ScenarioResult>>,
    projection: Option<ProjectionResponse>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInfo {
    service: &'static str,
    endpoints: [&'static str; 1],
}

fn build_inputs(cli: &Cli) -> Result<Inputs, String> {
    for (name, value) in [
        ("--primary-income", cli.primary_income),
        ("--partner-income", cli.partner_income),
        ("--other-debt", cli.other_debt),
        ("--car-payment", cli.car_payment),
        ("--credit-line-payment", cli.credit_line_payment),
        ("--home-price", cli.home_price),
        ("--upkeep-monthly", cli.upkeep_monthly),
        ("--renovation-budget", cli.renovation_budget),
        ("--cash-available", cli.cash_available),
        ("--total-assets", cli.total_assets),
        ("--total-liabilities", cli.total_liabilities),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    if !(0.0..100.0).contains(&cli.down_payment_pct) {
        return Err("--down-payment-pct must be at least 0 and below 100".to_string());
    }

    for (name, rate) in [
        ("--interest-rate", cli.interest_rate),
        ("--property-tax-rate", cli.property_tax_rate),
        ("--insurance-rate", cli.insurance_rate),
        ("--pmi-rate", cli.pmi_rate),
        ("--closing-cost-pct", cli.closing_cost_pct),
    ] {
        if !(0.0..=100.0).contains(&rate) {
            return Err(format!("{name} must be between 0 and 100"));
        }
    }

    if cli.term_years == 0 {
        return Err("--term-years must be > 0".to_string());
    }

    if cli.reserve_months == 0 {
        return Err("--reserve-months must be > 0".to_string());
    }

    let debt_basis: Cadence = cli.debt_basis.into();
    let debts = [cli.other_debt, cli.car_payment, cli.credit_line_payment]
        .into_iter()
        .filter(|amount| *amount > 0.0)
        .map(|amount| Obligation {
            amount,
            cadence: debt_basis,
        })
        .collect();

    Ok(Inputs {
        primary_income: cli.primary_income,
        partner_income: cli.partner_income,
        income_basis: cli.income_basis.into(),
        debts,
        home_price: cli.home_price,
        down_payment_pct: cli.down_payment_pct / 100.0,
        closing_cost_pct: cli.closing_cost_pct / 100.0,
        renovation_budget: cli.renovation_budget,
        interest_rate: cli.interest_rate / 100.0,
        term_years: cli.term_years,
        property_tax_rate: cli.property_tax_rate / 100.0,
        insurance_rate: cli.insurance_rate / 100.0,
        upkeep_monthly: cli.upkeep_monthly,
        reserve_months: cli.reserve_months,
        pmi_rate: cli.pmi_rate / 100.0,
        cash_available: cli.cash_available,
        total_assets: cli.total_assets,
        total_liabilities: cli.total_liabilities,
    })
}

fn build_assumptions(cli: &Cli) -> Result<Assumptions, String> {
    for (name, rate) in [
        ("--appreciation-rate", cli.appreciation_rate),
        ("--investment-return", cli.investment_return),
        ("--salary-growth-rate", cli.salary_growth_rate),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    if !cli.extra_monthly.is_finite() || cli.extra_monthly < 0.0 {
        return Err("--extra-monthly must be >= 0".to_string());
    }

    Ok(Assumptions {
        appreciation_rate: cli.appreciation_rate / 100.0,
        investment_return: cli.investment_return / 100.0,
        salary_growth_rate: cli.salary_growth_rate / 100.0,
        extra_monthly: cli.extra_monthly,
        extra_use: cli.extra_use.into(),
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route(
            "/api/evaluate",
            get(evaluate_get_handler).post(evaluate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("homeworth HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> Response {
    json_response(
        StatusCode::OK,
        ServiceInfo {
            service: "homeworth",
            endpoints: ["/api/evaluate"],
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn evaluate_get_handler(Query(payload): Query<EvaluatePayload>) -> Response {
    evaluate_handler_impl(payload)
}

async fn evaluate_post_handler(Json(payload): Json<EvaluatePayload>) -> Response {
    evaluate_handler_impl(payload)
}

fn evaluate_handler_impl(payload: EvaluatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, build_evaluate_response(&request))
}

fn build_evaluate_response(request: &ApiRequest) -> EvaluateResponse {
    let metrics = compute_metrics(&request.inputs);
    let ratings = Ratings {
        front_end: classify(metrics.front_end, CapKind::FrontEnd).into(),
        back_end: classify(metrics.back_end, CapKind::BackEnd).into(),
        net_worth: classify(metrics.equity_share_of_net_worth, CapKind::NetWorth).into(),
    };

    let lock = request
        .target
        .map_or(LockState::Unlocked, LockState::Target);
    let scenarios = solve(&request.inputs, lock, &THRESHOLDS);

    let projection = request.projection.map(|settings| ProjectionResponse {
        horizon_years: settings.horizon_years,
        years: project(
            ProjectionStart::from_metrics(&request.inputs, &metrics),
            settings.assumptions,
            settings.horizon_years,
        ),
    });

    EvaluateResponse {
        metrics,
        ratings,
        scenarios,
        projection,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<EvaluatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: EvaluatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.primary_income {
        cli.primary_income = v;
    }
    if let Some(v) = payload.partner_income {
        cli.partner_income = v;
    }
    if let Some(v) = payload.income_basis {
        cli.income_basis = v.into();
    }

    if let Some(v) = payload.other_debt {
        cli.other_debt = v;
    }
    if let Some(v) = payload.car_payment {
        cli.car_payment = v;
    }
    if let Some(v) = payload.credit_line_payment {
        cli.credit_line_payment = v;
    }
    if let Some(v) = payload.debt_basis {
        cli.debt_basis = v.into();
    }

    if let Some(v) = payload.home_price {
        cli.home_price = v;
    }
    if let Some(v) = payload.down_payment_pct {
        cli.down_payment_pct = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.term_years {
        cli.term_years = v;
    }

    if let Some(v) = payload.property_tax_rate {
        cli.property_tax_rate = v;
    }
    if let Some(v) = payload.insurance_rate {
        cli.insurance_rate = v;
    }
    if let Some(v) = payload.pmi_rate {
        cli.pmi_rate = v;
    }
    if let Some(v) = payload.closing_cost_pct {
        cli.closing_cost_pct = v;
    }
    if let Some(v) = payload.upkeep_monthly {
        cli.upkeep_monthly = v;
    }
    if let Some(v) = payload.reserve_months {
        cli.reserve_months = v;
    }
    if let Some(v) = payload.renovation_budget {
        cli.renovation_budget = v;
    }

    if let Some(v) = payload.cash_available {
        cli.cash_available = v;
    }
    if let Some(v) = payload.total_assets {
        cli.total_assets = v;
    }
    if let Some(v) = payload.total_liabilities {
        cli.total_liabilities = v;
    }

    if let Some(v) = payload.target {
        cli.target = Some(v.into());
    }

    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }
    if let Some(v) = payload.appreciation_rate {
        cli.appreciation_rate = v;
    }
    if let Some(v) = payload.investment_return {
        cli.investment_return = v;
    }
    if let Some(v) = payload.salary_growth_rate {
        cli.salary_growth_rate = v;
    }
    if let Some(v) = payload.extra_monthly {
        cli.extra_monthly = v;
    }
    if let Some(v) = payload.extra_use {
        cli.extra_use = v.into();
    }

    let inputs = build_inputs(&cli)?;
    let projection = if payload.include_projection.unwrap_or(false) {
        Some(ProjectionRequest {
            horizon_years: cli.horizon_years,
            assumptions: build_assumptions(&cli)?,
        })
    } else {
        None
    };

    Ok(ApiRequest {
        inputs,
        target: cli.target.map(TargetField::from),
        projection,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        primary_income: 170_000.0,
        partner_income: 80_000.0,
        income_basis: CliCadence::Annual,
        other_debt: 500.0,
        car_payment: 0.0,
        credit_line_payment: 0.0,
        debt_basis: CliCadence::Monthly,
        home_price: 750_000.0,
        down_payment_pct: 20.0,
        interest_rate: 6.75,
        term_years: 30,
        property_tax_rate: 1.25,
        insurance_rate: 0.40,
        pmi_rate: 1.0,
        closing_cost_pct: 4.0,
        upkeep_monthly: 250.0,
        reserve_months: 6,
        renovation_budget: 0.0,
        cash_available: 200_000.0,
        total_assets: 400_000.0,
        total_liabilities: 50_000.0,
        target: None,
        horizon_years: 10,
        appreciation_rate: 4.0,
        investment_return: 7.0,
        salary_growth_rate: 3.0,
        extra_monthly: 0.0,
        extra_use: CliExtraPaymentUse::Paydown,
    }
}
