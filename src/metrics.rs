//! Composite calculators built from the annuity primitives and fixed heuristics.
//!
//! The heuristics (28/36 rule, score thresholds, age-based allocation) are rules
//! of thumb for illustration, not advice. Currency-like outputs are rounded to cents.

use crate::config::{EngineConfig, HealthScoreWeights};
use crate::error::{EngineError, Result};
use crate::schema::{
    AffordabilityInputs, FilingStatus, HealthInputs, RetirementInputs, RiskTolerance,
};
use crate::tvm;
use crate::utils::{round_currency, validate_amount, validate_years};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPaymentSummary {
    pub monthly_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
}

pub fn calculate_loan_payment(
    principal: f64,
    annual_rate: f64,
    years: f64,
) -> Result<LoanPaymentSummary> {
    validate_years("years", years)?;
    let months = years * 12.0;
    let monthly_payment = tvm::amortizing_payment(principal, annual_rate, months)?;
    let total_paid = monthly_payment * months;

    Ok(LoanPaymentSummary {
        monthly_payment: round_currency(monthly_payment),
        total_paid: round_currency(total_paid),
        total_interest: round_currency((total_paid - principal).max(0.0)),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    /// Front-end cap: housing ratio of gross monthly income.
    pub housing_limit: f64,
    /// Back-end cap: total debt ratio of gross monthly income, less existing debts.
    pub total_debt_limit: f64,
    pub max_monthly_payment: f64,
    pub max_loan_amount: f64,
    pub max_home_price: f64,
}

/// Home price reachable under the housing / total-debt ratio rule.
pub fn calculate_house_affordability(
    inputs: &AffordabilityInputs,
    config: &EngineConfig,
) -> Result<AffordabilityResult> {
    validate_amount("annual_income", inputs.annual_income)?;
    validate_amount("monthly_debts", inputs.monthly_debts)?;
    validate_amount("down_payment", inputs.down_payment)?;
    validate_years("years", inputs.years)?;

    let rules = &config.affordability;
    let monthly_income = inputs.annual_income / 12.0;
    let housing_limit = monthly_income * rules.housing_ratio;
    let total_debt_limit = (monthly_income * rules.total_debt_ratio - inputs.monthly_debts).max(0.0);
    let max_monthly_payment = housing_limit.min(total_debt_limit);

    let max_loan_amount =
        tvm::present_value(max_monthly_payment, 0.0, inputs.annual_rate, inputs.years * 12.0)?;

    Ok(AffordabilityResult {
        housing_limit: round_currency(housing_limit),
        total_debt_limit: round_currency(total_debt_limit),
        max_monthly_payment: round_currency(max_monthly_payment),
        max_loan_amount: round_currency(max_loan_amount),
        max_home_price: round_currency(max_loan_amount + inputs.down_payment),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementProjection {
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    /// Desired income grown by inflation to the first year of retirement.
    pub inflation_adjusted_income: f64,
    /// Lump sum at retirement that funds the income stream until life expectancy.
    pub nest_egg_needed: f64,
    pub projected_savings: f64,
    pub shortfall: f64,
    pub required_monthly_contribution: Option<f64>,
    /// Extra monthly saving on top of the current contribution. `None` when there is
    /// no time left to contribute and a shortfall remains.
    pub additional_monthly_contribution: Option<f64>,
    pub on_track: bool,
}

pub fn calculate_retirement_needs(
    inputs: &RetirementInputs,
    config: &EngineConfig,
) -> Result<RetirementProjection> {
    validate_amount("current_savings", inputs.current_savings)?;
    validate_amount("monthly_contribution", inputs.monthly_contribution)?;
    validate_amount("desired_annual_income", inputs.desired_annual_income)?;
    if inputs.retirement_age < inputs.current_age {
        return Err(EngineError::invalid_input(
            "retirement_age",
            format!(
                "{} is before the current age {}",
                inputs.retirement_age, inputs.current_age
            ),
        ));
    }
    if inputs.life_expectancy <= inputs.retirement_age {
        return Err(EngineError::invalid_input(
            "life_expectancy",
            format!(
                "{} must be after the retirement age {}",
                inputs.life_expectancy, inputs.retirement_age
            ),
        ));
    }

    let rates = &config.rates;
    let years_to_retirement = inputs.retirement_age - inputs.current_age;
    let years_in_retirement = inputs.life_expectancy - inputs.retirement_age;
    let accumulation_months = years_to_retirement as f64 * 12.0;

    let inflation_adjusted_income = inputs.desired_annual_income
        * (1.0 + rates.inflation).powf(years_to_retirement as f64);

    let nest_egg_needed = tvm::present_value(
        inflation_adjusted_income / 12.0,
        0.0,
        rates.retirement_return,
        years_in_retirement as f64 * 12.0,
    )?;

    let projected_savings = tvm::future_value(
        inputs.current_savings,
        inputs.monthly_contribution,
        rates.investment_return,
        accumulation_months,
    )?;

    let shortfall = (nest_egg_needed - projected_savings).max(0.0);

    let required_monthly_contribution = if years_to_retirement > 0 {
        Some(tvm::payment(
            inputs.current_savings,
            nest_egg_needed,
            rates.investment_return,
            accumulation_months,
        )?)
    } else if shortfall == 0.0 {
        Some(0.0)
    } else {
        None
    };

    let additional_monthly_contribution = required_monthly_contribution
        .map(|required| round_currency((required - inputs.monthly_contribution).max(0.0)));

    Ok(RetirementProjection {
        years_to_retirement,
        years_in_retirement,
        inflation_adjusted_income: round_currency(inflation_adjusted_income),
        nest_egg_needed: round_currency(nest_egg_needed),
        projected_savings: round_currency(projected_savings),
        shortfall: round_currency(shortfall),
        required_monthly_contribution: required_monthly_contribution.map(round_currency),
        additional_monthly_contribution,
        on_track: shortfall == 0.0,
    })
}

// Score thresholds: the ratio at which a sub-score reaches 100 (or 0 for debt).
const TARGET_SAVINGS_RATE: f64 = 0.20;
const MAX_DEBT_TO_INCOME: f64 = 0.50;
const COMFORTABLE_EXPENSE_RATIO: f64 = 0.50;
const TARGET_INVESTMENT_RATE: f64 = 0.15;
const CREDIT_SCORE_MIN: f64 = 300.0;
const CREDIT_SCORE_MAX: f64 = 850.0;
const NEUTRAL_SUBSCORE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealthScore {
    pub overall_score: f64,
    pub savings_score: f64,
    pub debt_score: f64,
    pub spending_score: f64,
    pub investment_score: f64,
    pub credit_score: f64,
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

pub fn calculate_financial_health_score(
    inputs: &HealthInputs,
    weights: &HealthScoreWeights,
) -> Result<FinancialHealthScore> {
    weights.validate()?;
    validate_amount("savings_rate", inputs.savings_rate)?;
    validate_amount("debt_to_income", inputs.debt_to_income)?;
    validate_amount("expense_ratio", inputs.expense_ratio)?;
    validate_amount("investment_rate", inputs.investment_rate)?;
    if let Some(score) = inputs.credit_score {
        if !(CREDIT_SCORE_MIN..=CREDIT_SCORE_MAX).contains(&score) {
            return Err(EngineError::invalid_input(
                "credit_score",
                format!("{} is outside the 300-850 range", score),
            ));
        }
    }

    let savings = clamp_score(inputs.savings_rate / TARGET_SAVINGS_RATE * 100.0);
    let debt = clamp_score((1.0 - inputs.debt_to_income / MAX_DEBT_TO_INCOME) * 100.0);
    let spending = clamp_score(
        (1.0 - inputs.expense_ratio) / (1.0 - COMFORTABLE_EXPENSE_RATIO) * 100.0,
    );
    let investment = clamp_score(inputs.investment_rate / TARGET_INVESTMENT_RATE * 100.0);
    let credit = inputs
        .credit_score
        .map(|score| {
            clamp_score((score - CREDIT_SCORE_MIN) / (CREDIT_SCORE_MAX - CREDIT_SCORE_MIN) * 100.0)
        })
        .unwrap_or(NEUTRAL_SUBSCORE);

    let overall = savings * weights.savings
        + debt * weights.debt
        + spending * weights.spending
        + investment * weights.investment
        + credit * weights.credit;

    Ok(FinancialHealthScore {
        overall_score: clamp_score(overall).round(),
        savings_score: savings.round(),
        debt_score: debt.round(),
        spending_score: spending.round(),
        investment_score: investment.round(),
        credit_score: credit.round(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTax {
    pub rate: f64,
    pub taxable_amount: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxEstimate {
    pub gross_income: f64,
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub total_tax: f64,
    pub effective_rate: f64,
    pub marginal_rate: f64,
    pub brackets: Vec<BracketTax>,
}

/// Progressive bracket estimate after the standard deduction. Illustrative only.
pub fn calculate_tax_estimate(
    gross_income: f64,
    status: FilingStatus,
    config: &EngineConfig,
) -> Result<TaxEstimate> {
    validate_amount("gross_income", gross_income)?;

    let schedule = config.tax.schedule(status);
    let taxable_income = (gross_income - schedule.standard_deduction).max(0.0);

    let mut brackets = Vec::new();
    let mut total_tax = 0.0;
    let mut marginal_rate = 0.0;
    let mut lower = 0.0;

    for bracket in &schedule.brackets {
        if taxable_income <= lower {
            break;
        }
        let upper = bracket.up_to.unwrap_or(f64::INFINITY);
        let taxable_amount = taxable_income.min(upper) - lower;
        let tax = taxable_amount * bracket.rate;

        total_tax += tax;
        marginal_rate = bracket.rate;
        brackets.push(BracketTax {
            rate: bracket.rate,
            taxable_amount: round_currency(taxable_amount),
            tax: round_currency(tax),
        });
        lower = upper;
    }

    let effective_rate = if gross_income > 0.0 {
        total_tax / gross_income
    } else {
        0.0
    };

    Ok(TaxEstimate {
        gross_income: round_currency(gross_income),
        standard_deduction: schedule.standard_deduction,
        taxable_income: round_currency(taxable_income),
        total_tax: round_currency(total_tax),
        effective_rate,
        marginal_rate,
        brackets,
    })
}

/// Percentages summing to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAllocation {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
}

const STOCK_RULE_BASE: f64 = 110.0;
const MIN_STOCKS: f64 = 10.0;

/// "110 minus age" in stocks, shifted by risk tolerance; the rest in bonds and cash.
pub fn calculate_portfolio_allocation(age: u32, risk: RiskTolerance) -> PortfolioAllocation {
    let (adjustment, cash) = match risk {
        RiskTolerance::Conservative => (-15.0, 10.0),
        RiskTolerance::Moderate => (0.0, 5.0),
        RiskTolerance::Aggressive => (15.0, 2.0),
    };

    let stocks = (STOCK_RULE_BASE - age as f64 + adjustment).clamp(MIN_STOCKS, 100.0 - cash);

    PortfolioAllocation {
        stocks,
        bonds: 100.0 - stocks - cash,
        cash,
    }
}
