//! Tool-calling surface for AI agents.
//!
//! Every public calculator is exposed as a named tool with a JSON schema generated
//! from its typed argument struct. Schemas are fully inlined (no `$ref` or
//! `definitions`) so they can be handed to any function-calling LLM API as-is.

use crate::config::EngineConfig;
use crate::debt::{amortization_schedule, calculate_debt_payoff, DebtPayoffSimulator};
use crate::error::{EngineError, Result};
use crate::metrics::{
    calculate_financial_health_score, calculate_house_affordability, calculate_loan_payment,
    calculate_portfolio_allocation, calculate_retirement_needs, calculate_tax_estimate,
};
use crate::projection::{
    calculate_compound_interest, calculate_future_value, calculate_monthly_payment,
    calculate_time_to_goal, goal_date, project_savings_with_limits, DEFAULT_COMPOUNDING_FREQUENCY,
};
use crate::schema::{
    AffordabilityInputs, Debt, FilingStatus, HealthInputs, PayoffStrategy, RetirementInputs,
    RiskTolerance,
};
use crate::simulation::GoalSimulator;
use chrono::NaiveDate;
use log::info;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FutureValueArgs {
    #[serde(default)]
    #[schemars(description = "Amount saved today")]
    pub present_value: f64,
    #[serde(default)]
    #[schemars(description = "Amount added at the end of every month")]
    pub monthly_contribution: f64,
    #[schemars(
        description = "Annual rate as a decimal fraction (0.05 for 5%). Defaults to the configured savings rate."
    )]
    pub annual_rate: Option<f64>,
    pub years: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyPaymentArgs {
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[schemars(
        description = "Annual rate as a decimal fraction. Defaults to the configured savings rate."
    )]
    pub annual_rate: Option<f64>,
    #[schemars(description = "Timeframe in years")]
    pub years: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimeToGoalArgs {
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub monthly_contribution: f64,
    #[schemars(
        description = "Annual rate as a decimal fraction. Defaults to the configured savings rate."
    )]
    pub annual_rate: Option<f64>,
    #[schemars(description = "Optional YYYY-MM-DD start date used to report the goal date")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompoundInterestArgs {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: f64,
    #[serde(default = "default_compounding_frequency")]
    #[schemars(description = "Compounding periods per year: 12 monthly, 365 daily, 1 annually")]
    pub compounding_frequency: u32,
}

fn default_compounding_frequency() -> u32 {
    DEFAULT_COMPOUNDING_FREQUENCY
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DebtPayoffArgs {
    pub principal: f64,
    #[schemars(description = "APR as a decimal fraction (0.24 for 24%)")]
    pub annual_rate: f64,
    pub monthly_payment: f64,
    #[serde(default)]
    #[schemars(description = "Include the month-by-month amortization schedule")]
    pub include_schedule: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DebtPayoffMultipleArgs {
    pub debts: Vec<Debt>,
    #[schemars(description = "Total amount available for all debts each month")]
    pub total_monthly_payment: f64,
    #[serde(default)]
    pub strategy: PayoffStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoanPaymentArgs {
    pub principal: f64,
    pub annual_rate: f64,
    #[schemars(description = "Loan term in years")]
    pub years: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaxEstimateArgs {
    pub gross_income: f64,
    #[serde(default)]
    pub filing_status: FilingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioAllocationArgs {
    pub age: u32,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSavingsArgs {
    #[serde(default)]
    pub present_value: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[schemars(
        description = "Annual rate as a decimal fraction. Defaults to the configured savings rate."
    )]
    pub annual_rate: Option<f64>,
    #[schemars(description = "Number of months to project, at most the configured projection limit")]
    pub months: u32,
    #[schemars(description = "Optional YYYY-MM-DD date; each point then carries its month-end date")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SimulateGoalArgs {
    #[serde(default)]
    pub present_value: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[schemars(
        description = "Expected annual return as a decimal fraction. Defaults to the configured investment return."
    )]
    pub annual_rate: Option<f64>,
    pub target_amount: f64,
    pub months: u32,
    #[schemars(description = "Override the configured number of simulated runs")]
    pub runs: Option<u32>,
    #[schemars(description = "Fixed seed for reproducible results")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialTool {
    FutureValue,
    MonthlyPayment,
    TimeToGoal,
    CompoundInterest,
    DebtPayoff,
    DebtPayoffMultiple,
    LoanPayment,
    HouseAffordability,
    RetirementNeeds,
    FinancialHealthScore,
    TaxEstimate,
    PortfolioAllocation,
    ProjectSavings,
    SimulateGoal,
}

impl FinancialTool {
    pub const ALL: [FinancialTool; 14] = [
        FinancialTool::FutureValue,
        FinancialTool::MonthlyPayment,
        FinancialTool::TimeToGoal,
        FinancialTool::CompoundInterest,
        FinancialTool::DebtPayoff,
        FinancialTool::DebtPayoffMultiple,
        FinancialTool::LoanPayment,
        FinancialTool::HouseAffordability,
        FinancialTool::RetirementNeeds,
        FinancialTool::FinancialHealthScore,
        FinancialTool::TaxEstimate,
        FinancialTool::PortfolioAllocation,
        FinancialTool::ProjectSavings,
        FinancialTool::SimulateGoal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FinancialTool::FutureValue => "calculate_future_value",
            FinancialTool::MonthlyPayment => "calculate_monthly_payment",
            FinancialTool::TimeToGoal => "calculate_time_to_goal",
            FinancialTool::CompoundInterest => "calculate_compound_interest",
            FinancialTool::DebtPayoff => "calculate_debt_payoff",
            FinancialTool::DebtPayoffMultiple => "calculate_debt_payoff_multiple",
            FinancialTool::LoanPayment => "calculate_loan_payment",
            FinancialTool::HouseAffordability => "calculate_house_affordability",
            FinancialTool::RetirementNeeds => "calculate_retirement_needs",
            FinancialTool::FinancialHealthScore => "calculate_financial_health_score",
            FinancialTool::TaxEstimate => "calculate_tax_estimate",
            FinancialTool::PortfolioAllocation => "calculate_portfolio_allocation",
            FinancialTool::ProjectSavings => "project_savings",
            FinancialTool::SimulateGoal => "simulate_goal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            FinancialTool::FutureValue => {
                "Project what savings will grow to after a number of years with monthly contributions and monthly compounding."
            }
            FinancialTool::MonthlyPayment => {
                "Monthly contribution needed to reach a savings target within a timeframe. Returns 0 if the current amount is already enough."
            }
            FinancialTool::TimeToGoal => {
                "Number of months until a savings goal is reached. Reports possible=false when the contribution cannot close the gap."
            }
            FinancialTool::CompoundInterest => {
                "Grow a lump sum with compound interest at a chosen compounding frequency."
            }
            FinancialTool::DebtPayoff => {
                "Months and total interest to pay off one debt at a fixed monthly payment. Reports possible=false when the payment does not cover the monthly interest."
            }
            FinancialTool::DebtPayoffMultiple => {
                "Simulate paying off several debts: minimums on all, the rest of the budget on the priority debt (as given, snowball or avalanche). Capped at 50 years."
            }
            FinancialTool::LoanPayment => {
                "Fixed monthly payment, total paid and total interest for an amortizing loan."
            }
            FinancialTool::HouseAffordability => {
                "Maximum home price under the 28% housing / 36% total debt-to-income rule."
            }
            FinancialTool::RetirementNeeds => {
                "Nest egg needed for a retirement income, projected savings, shortfall and extra monthly saving required."
            }
            FinancialTool::FinancialHealthScore => {
                "Score overall financial health 0-100 from savings, debt, spending, investment and credit ratios."
            }
            FinancialTool::TaxEstimate => {
                "Illustrative income tax estimate from progressive brackets after the standard deduction. Not tax advice."
            }
            FinancialTool::PortfolioAllocation => {
                "Age-based stock/bond/cash split adjusted for risk tolerance."
            }
            FinancialTool::ProjectSavings => {
                "Month-by-month savings balance, contributions and interest earned."
            }
            FinancialTool::SimulateGoal => {
                "Monte Carlo estimate of the probability of reaching a savings goal with volatile returns."
            }
        }
    }

    pub fn parameters_schema(self) -> Result<Value> {
        match self {
            FinancialTool::FutureValue => inline_schema::<FutureValueArgs>(),
            FinancialTool::MonthlyPayment => inline_schema::<MonthlyPaymentArgs>(),
            FinancialTool::TimeToGoal => inline_schema::<TimeToGoalArgs>(),
            FinancialTool::CompoundInterest => inline_schema::<CompoundInterestArgs>(),
            FinancialTool::DebtPayoff => inline_schema::<DebtPayoffArgs>(),
            FinancialTool::DebtPayoffMultiple => inline_schema::<DebtPayoffMultipleArgs>(),
            FinancialTool::LoanPayment => inline_schema::<LoanPaymentArgs>(),
            FinancialTool::HouseAffordability => inline_schema::<AffordabilityInputs>(),
            FinancialTool::RetirementNeeds => inline_schema::<RetirementInputs>(),
            FinancialTool::FinancialHealthScore => inline_schema::<HealthInputs>(),
            FinancialTool::TaxEstimate => inline_schema::<TaxEstimateArgs>(),
            FinancialTool::PortfolioAllocation => inline_schema::<PortfolioAllocationArgs>(),
            FinancialTool::ProjectSavings => inline_schema::<ProjectSavingsArgs>(),
            FinancialTool::SimulateGoal => inline_schema::<SimulateGoalArgs>(),
        }
    }

    pub fn definition(self) -> Result<ToolDefinition> {
        Ok(ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema()?,
        })
    }

    pub fn execute(self, arguments: &Value, config: &EngineConfig) -> Result<Value> {
        match self {
            FinancialTool::FutureValue => {
                let args: FutureValueArgs = parse_args(arguments)?;
                let rate = args.annual_rate.unwrap_or(config.rates.savings_rate);
                let value = calculate_future_value(
                    args.present_value,
                    args.monthly_contribution,
                    rate,
                    args.years,
                )?;
                Ok(json!({ "future_value": value, "annual_rate": rate }))
            }
            FinancialTool::MonthlyPayment => {
                let args: MonthlyPaymentArgs = parse_args(arguments)?;
                let rate = args.annual_rate.unwrap_or(config.rates.savings_rate);
                let payment = calculate_monthly_payment(
                    args.target_amount,
                    args.current_amount,
                    rate,
                    args.years,
                )?;
                Ok(json!({ "monthly_payment": payment, "annual_rate": rate }))
            }
            FinancialTool::TimeToGoal => {
                let args: TimeToGoalArgs = parse_args(arguments)?;
                let rate = args.annual_rate.unwrap_or(config.rates.savings_rate);
                let months = calculate_time_to_goal(
                    args.target_amount,
                    args.current_amount,
                    args.monthly_contribution,
                    rate,
                )?;
                let outcome = match months {
                    Some(months) => Some(TimeToGoalOutput {
                        months,
                        years: months as f64 / 12.0,
                        goal_date: args
                            .start_date
                            .map(|start| goal_date(start, months))
                            .transpose()?,
                    }),
                    None => None,
                };
                possible(
                    outcome,
                    "The monthly contribution cannot close the gap to the target; increase the contribution.",
                )
            }
            FinancialTool::CompoundInterest => {
                let args: CompoundInterestArgs = parse_args(arguments)?;
                let amount = calculate_compound_interest(
                    args.principal,
                    args.annual_rate,
                    args.years,
                    args.compounding_frequency,
                )?;
                Ok(json!({ "amount": amount, "interest_earned": amount - args.principal }))
            }
            FinancialTool::DebtPayoff => {
                let args: DebtPayoffArgs = parse_args(arguments)?;
                let payoff =
                    calculate_debt_payoff(args.principal, args.annual_rate, args.monthly_payment)?;
                let schedule = if args.include_schedule {
                    amortization_schedule(args.principal, args.annual_rate, args.monthly_payment)?
                } else {
                    None
                };
                let mut result = possible(
                    payoff,
                    "The payment does not cover the monthly interest; the balance would never be paid off.",
                )?;
                if let (Some(rows), Value::Object(map)) = (schedule, &mut result) {
                    map.insert("schedule".to_string(), serde_json::to_value(rows)?);
                }
                Ok(result)
            }
            FinancialTool::DebtPayoffMultiple => {
                let args: DebtPayoffMultipleArgs = parse_args(arguments)?;
                let result = DebtPayoffSimulator::new(config.debt_limits.clone())
                    .with_strategy(args.strategy)
                    .run(&args.debts, args.total_monthly_payment)?;
                Ok(serde_json::to_value(result)?)
            }
            FinancialTool::LoanPayment => {
                let args: LoanPaymentArgs = parse_args(arguments)?;
                let summary = calculate_loan_payment(args.principal, args.annual_rate, args.years)?;
                Ok(serde_json::to_value(summary)?)
            }
            FinancialTool::HouseAffordability => {
                let args: AffordabilityInputs = parse_args(arguments)?;
                Ok(serde_json::to_value(calculate_house_affordability(&args, config)?)?)
            }
            FinancialTool::RetirementNeeds => {
                let args: RetirementInputs = parse_args(arguments)?;
                Ok(serde_json::to_value(calculate_retirement_needs(&args, config)?)?)
            }
            FinancialTool::FinancialHealthScore => {
                let args: HealthInputs = parse_args(arguments)?;
                let score = calculate_financial_health_score(&args, &config.health_weights)?;
                Ok(serde_json::to_value(score)?)
            }
            FinancialTool::TaxEstimate => {
                let args: TaxEstimateArgs = parse_args(arguments)?;
                let estimate = calculate_tax_estimate(args.gross_income, args.filing_status, config)?;
                Ok(serde_json::to_value(estimate)?)
            }
            FinancialTool::PortfolioAllocation => {
                let args: PortfolioAllocationArgs = parse_args(arguments)?;
                let allocation = calculate_portfolio_allocation(args.age, args.risk_tolerance);
                Ok(serde_json::to_value(allocation)?)
            }
            FinancialTool::ProjectSavings => {
                let args: ProjectSavingsArgs = parse_args(arguments)?;
                let rate = args.annual_rate.unwrap_or(config.rates.savings_rate);
                let points = project_savings_with_limits(
                    args.present_value,
                    args.monthly_contribution,
                    rate,
                    args.months,
                    args.start_date,
                    &config.projection_limits,
                )?;
                Ok(json!({ "annual_rate": rate, "points": points }))
            }
            FinancialTool::SimulateGoal => {
                let args: SimulateGoalArgs = parse_args(arguments)?;
                let mut settings = config.monte_carlo.clone();
                if let Some(runs) = args.runs {
                    settings.runs = runs;
                }
                if args.seed.is_some() {
                    settings.seed = args.seed;
                }
                let rate = args.annual_rate.unwrap_or(config.rates.investment_return);
                let simulation = GoalSimulator::new(settings)
                    .with_limits(config.projection_limits.clone())
                    .simulate(
                    args.present_value,
                    args.monthly_contribution,
                    rate,
                    args.target_amount,
                    args.months,
                )?;
                Ok(serde_json::to_value(simulation)?)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct TimeToGoalOutput {
    months: u32,
    years: f64,
    goal_date: Option<NaiveDate>,
}

fn parse_args<T: DeserializeOwned>(arguments: &Value) -> Result<T> {
    Ok(serde_json::from_value(arguments.clone())?)
}

/// Tags an optional solver result so the calling agent can tell "impossible"
/// apart from a failure.
fn possible<T: Serialize>(outcome: Option<T>, reason: &str) -> Result<Value> {
    match outcome {
        Some(value) => {
            let mut json = serde_json::to_value(value)?;
            if let Value::Object(map) = &mut json {
                map.insert("possible".to_string(), Value::Bool(true));
            }
            Ok(json)
        }
        None => Ok(json!({ "possible": false, "reason": reason })),
    }
}

fn inline_schema<T: JsonSchema>() -> Result<Value> {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(root)?;
    if let Value::Object(map) = &mut value {
        map.remove("title");
        map.remove("definitions");
    }
    Ok(value)
}

pub fn tool_definitions() -> Result<Vec<ToolDefinition>> {
    FinancialTool::ALL
        .into_iter()
        .map(FinancialTool::definition)
        .collect()
}

/// Runs the named tool with JSON arguments and returns its structured result.
pub fn execute_tool(name: &str, arguments: &Value, config: &EngineConfig) -> Result<Value> {
    let tool =
        FinancialTool::from_name(name).ok_or_else(|| EngineError::UnknownTool(name.to_string()))?;
    info!("Executing financial tool {}", name);
    tool.execute(arguments, config)
}
