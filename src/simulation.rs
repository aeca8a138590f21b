use crate::config::{MonteCarloSettings, ProjectionLimits};
use crate::error::{EngineError, Result};
use crate::tvm;
use crate::utils::{validate_amount, validate_annual_rate};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSimulation {
    pub runs: u32,
    /// Share of runs whose balance met the target at some month within the horizon.
    pub success_probability: f64,
    pub p10_final_balance: f64,
    pub median_final_balance: f64,
    pub p90_final_balance: f64,
}

/// Monte Carlo variant of the savings projection with normally distributed
/// monthly returns around `annual_rate / 12`.
pub struct GoalSimulator {
    settings: MonteCarloSettings,
    limits: ProjectionLimits,
}

impl GoalSimulator {
    pub fn new(settings: MonteCarloSettings) -> Self {
        Self {
            settings,
            limits: ProjectionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ProjectionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn simulate(
        &self,
        present_value: f64,
        monthly_contribution: f64,
        annual_rate: f64,
        target: f64,
        months: u32,
    ) -> Result<GoalSimulation> {
        validate_amount("present_value", present_value)?;
        validate_amount("monthly_contribution", monthly_contribution)?;
        validate_amount("target", target)?;
        validate_annual_rate("annual_rate", annual_rate)?;
        self.limits.check_months(months)?;
        if self.settings.runs == 0 {
            return Err(EngineError::InvalidConfig(
                "monte_carlo.runs must be positive".to_string(),
            ));
        }
        if self.settings.runs > self.settings.max_runs {
            return Err(EngineError::invalid_input(
                "runs",
                format!(
                    "{} exceeds the limit of {} runs",
                    self.settings.runs, self.settings.max_runs
                ),
            ));
        }

        let monthly_volatility = self.settings.annual_volatility / 12f64.sqrt();
        let returns = Normal::new(tvm::monthly_rate(annual_rate), monthly_volatility).map_err(
            |e| EngineError::InvalidConfig(format!("monte_carlo.annual_volatility: {}", e)),
        )?;

        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut finals = Vec::with_capacity(self.settings.runs as usize);
        let mut successes = 0u32;

        for _ in 0..self.settings.runs {
            let mut balance = present_value;
            let mut reached = balance >= target;
            for _ in 0..months {
                let monthly_return: f64 = returns.sample(&mut rng);
                balance = (balance * (1.0 + monthly_return) + monthly_contribution).max(0.0);
                reached |= balance >= target;
            }
            if reached {
                successes += 1;
            }
            finals.push(balance);
        }

        finals.sort_by(|a, b| a.total_cmp(b));
        let success_probability = successes as f64 / self.settings.runs as f64;
        debug!(
            "Goal simulation: {} runs over {} months, success probability {:.3}",
            self.settings.runs, months, success_probability
        );

        Ok(GoalSimulation {
            runs: self.settings.runs,
            success_probability,
            p10_final_balance: percentile(&finals, 0.10),
            median_final_balance: percentile(&finals, 0.50),
            p90_final_balance: percentile(&finals, 0.90),
        })
    }
}

// Nearest-rank percentile over an ascending, non-empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
