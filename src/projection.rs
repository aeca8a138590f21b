use crate::config::ProjectionLimits;
use crate::error::{EngineError, Result};
use crate::schema::AnnuitySpec;
use crate::tvm;
use crate::utils::{
    add_months_to_month_end, validate_amount, validate_annual_rate, validate_finite,
    validate_years,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPOUNDING_FREQUENCY: u32 = 12;

// Absorbs float residue so an exact whole-month solve is not pushed to the next month.
const MONTH_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsProjectionPoint {
    pub month: u32,
    /// Month-end date, present when the projection was anchored to a start date.
    pub date: Option<NaiveDate>,
    pub balance: f64,
    /// Opening balance plus every contribution made so far.
    pub total_contributed: f64,
    pub total_interest: f64,
}

/// Projected savings balance after `years`, never negative.
pub fn calculate_future_value(
    present_value: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    years: f64,
) -> Result<f64> {
    validate_years("years", years)?;
    AnnuitySpec::from_years(present_value, monthly_contribution, annual_rate, years).future_value()
}

/// Level monthly contribution needed to grow `current_amount` into `target_amount`
/// within `years`. Zero when the current amount already suffices.
///
/// A zero timeframe with a gap still open is rejected as
/// [`EngineError::InvalidInput`]: the caller must give the goal at least one month.
pub fn calculate_monthly_payment(
    target_amount: f64,
    current_amount: f64,
    annual_rate: f64,
    years: f64,
) -> Result<f64> {
    validate_amount("target_amount", target_amount)?;
    validate_amount("current_amount", current_amount)?;
    validate_years("years", years)?;

    if current_amount >= target_amount {
        return Ok(0.0);
    }

    tvm::payment(current_amount, target_amount, annual_rate, years * 12.0)
}

/// Whole months until the balance first meets `target_amount`.
///
/// `Ok(None)` means the goal cannot be reached with these inputs: no positive
/// contribution and a gap still open, or an undefined solve.
pub fn calculate_time_to_goal(
    target_amount: f64,
    current_amount: f64,
    monthly_contribution: f64,
    annual_rate: f64,
) -> Result<Option<u32>> {
    validate_amount("target_amount", target_amount)?;
    validate_amount("current_amount", current_amount)?;
    validate_finite("monthly_contribution", monthly_contribution)?;
    validate_annual_rate("annual_rate", annual_rate)?;

    if monthly_contribution <= 0.0 {
        return Ok(if current_amount >= target_amount {
            Some(0)
        } else {
            None
        });
    }

    let annuity = AnnuitySpec::new(current_amount, monthly_contribution, annual_rate, 0.0);
    let months = annuity
        .periods_to_target(target_amount)?
        .map(|periods| (periods - MONTH_EPSILON).ceil().max(0.0))
        .filter(|months| *months <= u32::MAX as f64)
        .map(|months| months as u32);

    Ok(months)
}

/// `principal * (1 + rate/n)^(n * years)` for `n` compounding periods per year.
pub fn calculate_compound_interest(
    principal: f64,
    annual_rate: f64,
    years: f64,
    compounding_frequency: u32,
) -> Result<f64> {
    validate_amount("principal", principal)?;
    validate_annual_rate("annual_rate", annual_rate)?;
    validate_years("years", years)?;
    if compounding_frequency == 0 {
        return Err(EngineError::invalid_input(
            "compounding_frequency",
            "must be at least 1 period per year",
        ));
    }

    let n = compounding_frequency as f64;
    Ok(principal * (1.0 + annual_rate / n).powf(n * years))
}

/// Month-by-month balance series. Point 0 is the opening balance; the last point
/// matches `calculate_future_value` over the same horizon. Horizons beyond the
/// default [`ProjectionLimits`] are rejected.
pub fn project_savings(
    present_value: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    months: u32,
) -> Result<Vec<SavingsProjectionPoint>> {
    project_savings_with_limits(
        present_value,
        monthly_contribution,
        annual_rate,
        months,
        None,
        &ProjectionLimits::default(),
    )
}

/// Same series as [`project_savings`], each point stamped with its month-end date.
/// Month 0 is the end of the month containing `start`.
pub fn project_savings_dated(
    present_value: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    months: u32,
    start: NaiveDate,
) -> Result<Vec<SavingsProjectionPoint>> {
    project_savings_with_limits(
        present_value,
        monthly_contribution,
        annual_rate,
        months,
        Some(start),
        &ProjectionLimits::default(),
    )
}

pub fn project_savings_with_limits(
    present_value: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    months: u32,
    start: Option<NaiveDate>,
    limits: &ProjectionLimits,
) -> Result<Vec<SavingsProjectionPoint>> {
    validate_amount("present_value", present_value)?;
    validate_amount("monthly_contribution", monthly_contribution)?;
    validate_annual_rate("annual_rate", annual_rate)?;
    limits.check_months(months)?;

    let rate = tvm::monthly_rate(annual_rate);
    let mut points = Vec::with_capacity(months as usize + 1);
    let mut balance = present_value;
    let mut total_contributed = present_value;

    for month in 0..=months {
        if month > 0 {
            balance = (balance * (1.0 + rate) + monthly_contribution).max(0.0);
            total_contributed += monthly_contribution;
        }
        points.push(SavingsProjectionPoint {
            month,
            date: start.map(|start| goal_date(start, month)).transpose()?,
            balance,
            total_contributed,
            total_interest: balance - total_contributed,
        });
    }

    Ok(points)
}

/// Month-end date on which a goal reached after `months` months is met.
pub fn goal_date(start: NaiveDate, months: u32) -> Result<NaiveDate> {
    add_months_to_month_end(start, months).ok_or_else(|| {
        EngineError::invalid_input(
            "start_date",
            format!("{} plus {} months is outside the supported calendar", start, months),
        )
    })
}
