use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A level-payment, fixed-rate annuity with monthly compounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnuitySpec {
    #[schemars(description = "Amount already saved (or borrowed) at month 0")]
    pub present_value: f64,

    #[schemars(
        description = "Level monthly contribution (savings) or payment (loans), made at the end of each month"
    )]
    pub payment: f64,

    #[schemars(
        description = "Annual interest rate as a decimal fraction (0.07 for 7%). Never a percentage."
    )]
    pub annual_rate: f64,

    #[schemars(description = "Number of monthly periods")]
    pub periods: f64,
}

impl AnnuitySpec {
    pub fn new(present_value: f64, payment: f64, annual_rate: f64, periods: f64) -> Self {
        Self {
            present_value,
            payment,
            annual_rate,
            periods,
        }
    }

    pub fn from_years(present_value: f64, payment: f64, annual_rate: f64, years: f64) -> Self {
        Self::new(present_value, payment, annual_rate, years * 12.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Debt {
    #[serde(default)]
    #[schemars(description = "Optional label such as 'Visa' or 'Car loan', echoed in payoff events")]
    pub name: Option<String>,

    #[schemars(description = "Outstanding balance, must be non-negative")]
    pub balance: f64,

    #[schemars(description = "Annual interest rate (APR) as a decimal fraction (0.2 for 20%)")]
    pub interest_rate: f64,

    #[schemars(description = "Minimum monthly payment, must be non-negative")]
    pub minimum_payment: f64,
}

impl Debt {
    pub fn new(balance: f64, interest_rate: f64, minimum_payment: f64) -> Self {
        Self {
            name: None,
            balance,
            interest_rate,
            minimum_payment,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStrategy {
    #[default]
    #[schemars(
        description = "Keep the caller's order: the first debt listed receives everything beyond the other minimums"
    )]
    AsGiven,

    #[schemars(description = "Smallest balance first")]
    Snowball,

    #[schemars(description = "Highest interest rate first")]
    Avalanche,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedJoint,
    HeadOfHousehold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    #[schemars(description = "Capital preservation; fewer stocks, more cash")]
    Conservative,
    #[default]
    Moderate,
    #[schemars(description = "Long horizon growth; more stocks, less cash")]
    Aggressive,
}

/// Raw ratios feeding the financial health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthInputs {
    #[schemars(description = "Share of gross income saved each month (0.1 = 10%)")]
    pub savings_rate: f64,

    #[schemars(description = "Monthly debt payments divided by gross monthly income")]
    pub debt_to_income: f64,

    #[schemars(description = "Monthly spending divided by gross monthly income")]
    pub expense_ratio: f64,

    #[schemars(description = "Share of gross income invested each month")]
    pub investment_rate: f64,

    #[serde(default)]
    #[schemars(
        description = "Credit score on the 300-850 scale. Omit when unknown; a neutral sub-score is used."
    )]
    pub credit_score: Option<f64>,
}

impl HealthInputs {
    /// Builds the ratios from monthly amounts. Returns `None` when income is not positive.
    pub fn from_monthly(
        income: f64,
        expenses: f64,
        savings: f64,
        debt_payments: f64,
        investments: f64,
        credit_score: Option<f64>,
    ) -> Option<Self> {
        if income <= 0.0 {
            return None;
        }
        Some(Self {
            savings_rate: savings / income,
            debt_to_income: debt_payments / income,
            expense_ratio: expenses / income,
            investment_rate: investments / income,
            credit_score,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AffordabilityInputs {
    #[schemars(description = "Gross annual household income")]
    pub annual_income: f64,

    #[serde(default)]
    #[schemars(description = "Existing monthly debt payments (car, student loans, cards)")]
    pub monthly_debts: f64,

    #[serde(default)]
    #[schemars(description = "Cash available for the down payment")]
    pub down_payment: f64,

    #[schemars(description = "Mortgage rate as a decimal fraction (0.065 for 6.5%)")]
    pub annual_rate: f64,

    #[schemars(description = "Mortgage term in years")]
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,

    #[schemars(description = "Age the savings must last until")]
    pub life_expectancy: u32,

    #[serde(default)]
    pub current_savings: f64,

    #[serde(default)]
    pub monthly_contribution: f64,

    #[schemars(description = "Desired yearly income in retirement, in today's money")]
    pub desired_annual_income: f64,
}
