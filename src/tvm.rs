//! Time-value-of-money relations for a level-payment, fixed-rate ordinary annuity
//! (payments at the end of each month, monthly compounding from an annual rate).
//!
//! Internally the solvers use the cash-flow sign convention (money paid out is
//! negative). The public functions take and return non-negative, intuitively
//! signed amounts and hide the convention from callers.

use crate::error::{EngineError, Result};
use crate::schema::AnnuitySpec;
use crate::utils::{validate_amount, validate_annual_rate, validate_years};

pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0
}

/// `(1 + r)^n`
pub fn growth_factor(monthly_rate: f64, periods: f64) -> f64 {
    (1.0 + monthly_rate).powf(periods)
}

/// `((1 + r)^n - 1) / r`, or `n` when the rate is zero.
pub fn annuity_factor(monthly_rate: f64, periods: f64) -> f64 {
    if monthly_rate == 0.0 {
        periods
    } else {
        (periods * monthly_rate.ln_1p()).exp_m1() / monthly_rate
    }
}

fn signed_future_value(rate: f64, periods: f64, payment: f64, present_value: f64) -> f64 {
    -(present_value * growth_factor(rate, periods) + payment * annuity_factor(rate, periods))
}

fn signed_present_value(rate: f64, periods: f64, payment: f64, future_value: f64) -> f64 {
    -(future_value + payment * annuity_factor(rate, periods)) / growth_factor(rate, periods)
}

// Caller guarantees periods > 0.
fn signed_payment(rate: f64, periods: f64, present_value: f64, future_value: f64) -> f64 {
    -(present_value * growth_factor(rate, periods) + future_value) / annuity_factor(rate, periods)
}

fn signed_periods(rate: f64, payment: f64, present_value: f64, future_value: f64) -> Option<f64> {
    let periods = if rate == 0.0 {
        if payment == 0.0 {
            return None;
        }
        -(present_value + future_value) / payment
    } else {
        let ratio = (payment - future_value * rate) / (payment + present_value * rate);
        if !ratio.is_finite() || ratio <= 0.0 {
            return None;
        }
        ratio.ln() / rate.ln_1p()
    };

    if periods.is_finite() && periods >= 0.0 {
        Some(periods)
    } else {
        None
    }
}

fn validate_periods(periods: f64) -> Result<()> {
    validate_years("periods", periods)
}

fn require_positive_periods(periods: f64) -> Result<()> {
    validate_periods(periods)?;
    if periods == 0.0 {
        return Err(EngineError::invalid_input(
            "periods",
            "at least one period is required to solve for a payment",
        ));
    }
    Ok(())
}

/// Balance after `periods` months of growth on `present_value` plus a level
/// end-of-month contribution. Never negative.
pub fn future_value(
    present_value: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    periods: f64,
) -> Result<f64> {
    validate_amount("present_value", present_value)?;
    validate_amount("monthly_contribution", monthly_contribution)?;
    validate_annual_rate("annual_rate", annual_rate)?;
    validate_periods(periods)?;

    let rate = monthly_rate(annual_rate);
    let value = signed_future_value(rate, periods, -monthly_contribution, -present_value);
    Ok(value.max(0.0))
}

/// Lump sum today equivalent to receiving `monthly_payment` at the end of each
/// month for `periods` months plus `future_value` at the end.
pub fn present_value(
    monthly_payment: f64,
    future_value: f64,
    annual_rate: f64,
    periods: f64,
) -> Result<f64> {
    validate_amount("monthly_payment", monthly_payment)?;
    validate_amount("future_value", future_value)?;
    validate_annual_rate("annual_rate", annual_rate)?;
    validate_periods(periods)?;

    let rate = monthly_rate(annual_rate);
    let value = -signed_present_value(rate, periods, monthly_payment, future_value);
    Ok(value.max(0.0))
}

/// Level monthly contribution that grows `present_value` into `future_value`.
/// Zero when the starting amount already gets there on its own.
pub fn payment(
    present_value: f64,
    future_value: f64,
    annual_rate: f64,
    periods: f64,
) -> Result<f64> {
    validate_amount("present_value", present_value)?;
    validate_amount("future_value", future_value)?;
    validate_annual_rate("annual_rate", annual_rate)?;
    require_positive_periods(periods)?;

    let rate = monthly_rate(annual_rate);
    let required = -signed_payment(rate, periods, -present_value, future_value);
    Ok(required.max(0.0))
}

/// Level monthly payment that amortizes `principal` to zero over `periods` months.
pub fn amortizing_payment(principal: f64, annual_rate: f64, periods: f64) -> Result<f64> {
    validate_amount("principal", principal)?;
    validate_annual_rate("annual_rate", annual_rate)?;
    require_positive_periods(periods)?;

    let rate = monthly_rate(annual_rate);
    Ok((-signed_payment(rate, periods, principal, 0.0)).max(0.0))
}

/// Fractional number of months until a savings balance reaches `target`.
/// `None` when the target is unreachable under these inputs.
pub fn periods_to_target(
    present_value: f64,
    monthly_contribution: f64,
    target: f64,
    annual_rate: f64,
) -> Result<Option<f64>> {
    validate_amount("present_value", present_value)?;
    validate_amount("monthly_contribution", monthly_contribution)?;
    validate_amount("target", target)?;
    validate_annual_rate("annual_rate", annual_rate)?;

    if present_value >= target {
        return Ok(Some(0.0));
    }

    let rate = monthly_rate(annual_rate);
    Ok(signed_periods(
        rate,
        -monthly_contribution,
        -present_value,
        target,
    ))
}

/// Fractional number of months until a loan balance reaches zero.
/// `None` when the payment does not exceed one month of interest.
pub fn periods_to_payoff(principal: f64, monthly_payment: f64, annual_rate: f64) -> Result<Option<f64>> {
    validate_amount("principal", principal)?;
    validate_amount("monthly_payment", monthly_payment)?;
    validate_annual_rate("annual_rate", annual_rate)?;

    if principal == 0.0 {
        return Ok(Some(0.0));
    }

    let rate = monthly_rate(annual_rate);
    if monthly_payment <= 0.0 || monthly_payment <= principal * rate {
        return Ok(None);
    }

    Ok(signed_periods(rate, -monthly_payment, principal, 0.0))
}

impl AnnuitySpec {
    pub fn future_value(&self) -> Result<f64> {
        future_value(self.present_value, self.payment, self.annual_rate, self.periods)
    }

    pub fn periods_to_target(&self, target: f64) -> Result<Option<f64>> {
        periods_to_target(self.present_value, self.payment, target, self.annual_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_future_value_ordinary_annuity() {
        let fv = future_value(0.0, 100.0, 0.07, 120.0).unwrap();
        assert_close(fv, 17_308.48, 0.01);
    }

    #[test]
    fn test_zero_rate_is_linear() {
        assert_eq!(future_value(1000.0, 50.0, 0.0, 24.0).unwrap(), 2200.0);
        assert_eq!(present_value(100.0, 0.0, 0.0, 12.0).unwrap(), 1200.0);
        assert_eq!(payment(0.0, 1200.0, 0.0, 12.0).unwrap(), 100.0);
        assert_eq!(amortizing_payment(1200.0, 0.0, 12.0).unwrap(), 100.0);
        assert_eq!(periods_to_target(0.0, 100.0, 1000.0, 0.0).unwrap(), Some(10.0));
        assert_eq!(periods_to_payoff(1000.0, 250.0, 0.0).unwrap(), Some(4.0));
    }

    #[test]
    fn test_present_value_of_payment_stream() {
        let pv = present_value(1000.0, 0.0, 0.06, 12.0).unwrap();
        assert_close(pv, 11_618.93, 0.01);
    }

    #[test]
    fn test_amortizing_payment_mortgage() {
        let pmt = amortizing_payment(200_000.0, 0.06, 360.0).unwrap();
        assert_close(pmt, 1199.10, 0.01);
    }

    #[test]
    fn test_payment_inverts_future_value() {
        let required = payment(2_000.0, 50_000.0, 0.05, 60.0).unwrap();
        let reached = future_value(2_000.0, required, 0.05, 60.0).unwrap();
        assert_close(reached, 50_000.0, 1e-6);
    }

    #[test]
    fn test_payment_clamped_when_already_funded() {
        assert_eq!(payment(10_000.0, 5_000.0, 0.05, 12.0).unwrap(), 0.0);
    }

    #[test]
    fn test_payment_requires_periods() {
        assert!(payment(0.0, 1000.0, 0.05, 0.0).is_err());
        assert!(amortizing_payment(1000.0, 0.05, 0.0).is_err());
    }

    #[test]
    fn test_periods_to_target_matches_future_value() {
        let periods = periods_to_target(500.0, 200.0, 10_000.0, 0.05)
            .unwrap()
            .unwrap();
        let reached = future_value(500.0, 200.0, 0.05, periods).unwrap();
        assert_close(reached, 10_000.0, 1e-6);
    }

    #[test]
    fn test_periods_to_target_unreachable() {
        assert_eq!(periods_to_target(0.0, 0.0, 1000.0, 0.05).unwrap(), None);
        assert_eq!(periods_to_target(100.0, 0.0, 1000.0, 0.0).unwrap(), None);
        assert_eq!(periods_to_target(2000.0, 0.0, 1000.0, 0.0).unwrap(), Some(0.0));
    }

    #[test]
    fn test_periods_to_payoff_guard() {
        // $20 of monthly interest against a $15 payment.
        assert_eq!(periods_to_payoff(1000.0, 15.0, 0.24).unwrap(), None);
        // Exactly the interest never reduces the balance either.
        assert_eq!(periods_to_payoff(1000.0, 20.0, 0.24).unwrap(), None);
        assert!(periods_to_payoff(1000.0, 25.0, 0.24).unwrap().is_some());
        assert_eq!(periods_to_payoff(0.0, 0.0, 0.24).unwrap(), Some(0.0));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(future_value(-1.0, 0.0, 0.05, 12.0).is_err());
        assert!(future_value(0.0, 0.0, 0.05, -12.0).is_err());
        assert!(future_value(0.0, 0.0, -1.5, 12.0).is_err());
        assert!(present_value(f64::INFINITY, 0.0, 0.05, 12.0).is_err());
    }

    #[test]
    fn test_annuity_spec_delegates() {
        let annuity = AnnuitySpec::from_years(0.0, 100.0, 0.07, 10.0);
        assert_close(annuity.future_value().unwrap(), 17_308.48, 0.01);
        let periods = annuity.periods_to_target(1_200.0).unwrap().unwrap();
        assert!(periods > 11.0 && periods < 12.0);
    }
}
