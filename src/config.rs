//! Engine assumptions passed explicitly to the composite calculators.
//!
//! Every heuristic constant the calculators rely on (default returns, the 28/36
//! affordability rule, health-score weights, illustrative tax brackets, the debt
//! simulation cap) lives here so callers and tests can substitute their own values.

use crate::error::{EngineError, Result};
use crate::schema::FilingStatus;
use log::info;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RateAssumptions {
    #[schemars(description = "Annual yield on cash savings as a decimal fraction")]
    pub savings_rate: f64,
    #[schemars(description = "Expected annual return while accumulating for retirement")]
    pub investment_return: f64,
    #[schemars(description = "Expected annual return on the nest egg during retirement")]
    pub retirement_return: f64,
    #[schemars(description = "Expected annual inflation")]
    pub inflation: f64,
}

impl Default for RateAssumptions {
    fn default() -> Self {
        Self {
            savings_rate: 0.045,
            investment_return: 0.07,
            retirement_return: 0.05,
            inflation: 0.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AffordabilityRules {
    #[schemars(description = "Max share of gross monthly income spent on housing (front-end ratio)")]
    pub housing_ratio: f64,
    #[schemars(description = "Max share of gross monthly income spent on all debt (back-end ratio)")]
    pub total_debt_ratio: f64,
}

impl Default for AffordabilityRules {
    fn default() -> Self {
        Self {
            housing_ratio: 0.28,
            total_debt_ratio: 0.36,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HealthScoreWeights {
    pub savings: f64,
    pub debt: f64,
    pub spending: f64,
    pub investment: f64,
    pub credit: f64,
}

impl Default for HealthScoreWeights {
    fn default() -> Self {
        Self {
            savings: 0.25,
            debt: 0.25,
            spending: 0.20,
            investment: 0.15,
            credit: 0.15,
        }
    }
}

impl HealthScoreWeights {
    fn as_slice(&self) -> [f64; 5] {
        [
            self.savings,
            self.debt,
            self.spending,
            self.investment,
            self.credit,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let weights = self.as_slice();
        if weights.iter().any(|&w| !w.is_finite() || w < 0.0) {
            return Err(EngineError::InvalidConfig(
                "Health score weights must be non-negative".to_string(),
            ));
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 0.01 {
            return Err(EngineError::InvalidConfig(format!(
                "Health score weights must sum to 1.0 (got {})",
                sum
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxBracket {
    #[schemars(
        description = "Upper bound of taxable income taxed at this rate. Null for the top bracket."
    )]
    pub up_to: Option<f64>,
    #[schemars(description = "Marginal rate as a decimal fraction")]
    pub rate: f64,
}

impl TaxBracket {
    pub fn new(up_to: Option<f64>, rate: f64) -> Self {
        Self { up_to, rate }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxSchedule {
    pub standard_deduction: f64,
    pub brackets: Vec<TaxBracket>,
}

impl TaxSchedule {
    fn validate(&self, label: &str) -> Result<()> {
        if !self.standard_deduction.is_finite() || self.standard_deduction < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "{}: standard deduction must be non-negative",
                label
            )));
        }

        if self.brackets.is_empty() {
            return Err(EngineError::InvalidConfig(format!(
                "{}: at least one tax bracket is required",
                label
            )));
        }

        let mut previous = 0.0;
        for (idx, bracket) in self.brackets.iter().enumerate() {
            if !(0.0..=1.0).contains(&bracket.rate) {
                return Err(EngineError::InvalidConfig(format!(
                    "{}: bracket #{} rate {} outside 0.0..=1.0",
                    label, idx, bracket.rate
                )));
            }

            let is_last = idx == self.brackets.len() - 1;
            match bracket.up_to {
                Some(bound) if bound > previous => previous = bound,
                Some(bound) => {
                    return Err(EngineError::InvalidConfig(format!(
                        "{}: bracket #{} bound {} is not above the previous bound {}",
                        label, idx, bound, previous
                    )))
                }
                None if is_last => {}
                None => {
                    return Err(EngineError::InvalidConfig(format!(
                        "{}: only the last bracket may be open-ended",
                        label
                    )))
                }
            }
        }

        Ok(())
    }
}

/// Illustrative progressive brackets. Not tax advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TaxTable {
    pub single: TaxSchedule,
    pub married_joint: TaxSchedule,
    pub head_of_household: TaxSchedule,
}

impl TaxTable {
    pub fn schedule(&self, status: FilingStatus) -> &TaxSchedule {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedJoint => &self.married_joint,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }
}

const RATES: [f64; 7] = [0.10, 0.12, 0.22, 0.24, 0.32, 0.35, 0.37];

fn schedule_from_bounds(standard_deduction: f64, bounds: [f64; 6]) -> TaxSchedule {
    let mut brackets: Vec<TaxBracket> = bounds
        .iter()
        .zip(RATES.iter())
        .map(|(&bound, &rate)| TaxBracket::new(Some(bound), rate))
        .collect();
    brackets.push(TaxBracket::new(None, RATES[6]));

    TaxSchedule {
        standard_deduction,
        brackets,
    }
}

impl Default for TaxTable {
    fn default() -> Self {
        Self {
            single: schedule_from_bounds(
                14_600.0,
                [11_600.0, 47_150.0, 100_525.0, 191_950.0, 243_725.0, 609_350.0],
            ),
            married_joint: schedule_from_bounds(
                29_200.0,
                [23_200.0, 94_300.0, 201_050.0, 383_900.0, 487_450.0, 731_200.0],
            ),
            head_of_household: schedule_from_bounds(
                21_900.0,
                [16_550.0, 63_100.0, 100_500.0, 191_950.0, 243_700.0, 609_350.0],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DebtSimulationLimits {
    #[schemars(description = "Hard cap on simulated months (600 = 50 years)")]
    pub max_months: u32,
    #[schemars(description = "Balances at or below this are treated as paid off")]
    pub paid_off_tolerance: f64,
}

impl Default for DebtSimulationLimits {
    fn default() -> Self {
        Self {
            max_months: 600,
            paid_off_tolerance: 0.01,
        }
    }
}

/// Upper bounds on caller-chosen horizons. Series and simulations allocate and
/// loop per month, so horizons beyond these are rejected as invalid input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProjectionLimits {
    #[schemars(description = "Longest savings projection or simulation in months (1200 = 100 years)")]
    pub max_months: u32,
}

impl Default for ProjectionLimits {
    fn default() -> Self {
        Self { max_months: 1200 }
    }
}

impl ProjectionLimits {
    pub fn check_months(&self, months: u32) -> Result<()> {
        if months > self.max_months {
            return Err(EngineError::invalid_input(
                "months",
                format!("{} exceeds the {}-month projection limit", months, self.max_months),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MonteCarloSettings {
    pub runs: u32,
    #[schemars(description = "Largest number of runs a single simulation may request")]
    pub max_runs: u32,
    #[schemars(description = "Annualised standard deviation of returns")]
    pub annual_volatility: f64,
    #[schemars(description = "Fixed seed for reproducible runs; random when omitted")]
    pub seed: Option<u64>,
}

impl Default for MonteCarloSettings {
    fn default() -> Self {
        Self {
            runs: 1000,
            max_runs: 100_000,
            annual_volatility: 0.15,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    pub rates: RateAssumptions,
    pub affordability: AffordabilityRules,
    pub health_weights: HealthScoreWeights,
    pub tax: TaxTable,
    pub debt_limits: DebtSimulationLimits,
    pub projection_limits: ProjectionLimits,
    pub monte_carlo: MonteCarloSettings,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("rates.savings_rate", self.rates.savings_rate),
            ("rates.investment_return", self.rates.investment_return),
            ("rates.retirement_return", self.rates.retirement_return),
            ("rates.inflation", self.rates.inflation),
        ];
        for (name, rate) in rates {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be a decimal fraction above -1.0, got {}",
                    name, rate
                )));
            }
        }

        let ratios = [
            self.affordability.housing_ratio,
            self.affordability.total_debt_ratio,
        ];
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(EngineError::InvalidConfig(
                "Affordability ratios must lie within 0.0..=1.0".to_string(),
            ));
        }

        self.health_weights.validate()?;

        self.tax.single.validate("tax.single")?;
        self.tax.married_joint.validate("tax.married_joint")?;
        self.tax.head_of_household.validate("tax.head_of_household")?;

        if self.debt_limits.max_months == 0 {
            return Err(EngineError::InvalidConfig(
                "debt_limits.max_months must be positive".to_string(),
            ));
        }
        if !self.debt_limits.paid_off_tolerance.is_finite()
            || self.debt_limits.paid_off_tolerance < 0.0
        {
            return Err(EngineError::InvalidConfig(
                "debt_limits.paid_off_tolerance must be non-negative".to_string(),
            ));
        }

        if self.projection_limits.max_months == 0 {
            return Err(EngineError::InvalidConfig(
                "projection_limits.max_months must be positive".to_string(),
            ));
        }

        if self.monte_carlo.runs == 0 || self.monte_carlo.runs > self.monte_carlo.max_runs {
            return Err(EngineError::InvalidConfig(format!(
                "monte_carlo.runs must lie within 1..={}, got {}",
                self.monte_carlo.max_runs, self.monte_carlo.runs
            )));
        }
        if !self.monte_carlo.annual_volatility.is_finite() || self.monte_carlo.annual_volatility < 0.0
        {
            return Err(EngineError::InvalidConfig(
                "monte_carlo.annual_volatility must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}
