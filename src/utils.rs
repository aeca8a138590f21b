use crate::error::{EngineError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Rounds a currency-like figure to whole cents.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn validate_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(EngineError::invalid_input(
            field,
            format!("must be a finite number, got {}", value),
        ));
    }
    Ok(())
}

/// Amounts (balances, contributions, incomes) must be finite and non-negative.
pub fn validate_amount(field: &str, value: f64) -> Result<()> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

pub fn validate_years(field: &str, years: f64) -> Result<()> {
    validate_finite(field, years)?;
    if years < 0.0 {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", years),
        ));
    }
    Ok(())
}

/// Annual rates are decimal fractions (0.07 for 7%). Anything at or below -100%
/// has no meaningful compounding.
pub fn validate_annual_rate(field: &str, annual_rate: f64) -> Result<()> {
    validate_finite(field, annual_rate)?;
    if annual_rate <= -1.0 {
        return Err(EngineError::invalid_input(
            field,
            format!("must be greater than -1.0 (decimal fraction), got {}", annual_rate),
        ));
    }
    Ok(())
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

pub fn month_end_of(date: NaiveDate) -> Option<NaiveDate> {
    last_day_of_month(date.year(), date.month())
}

/// Month-end date `months` months after the month containing `start`.
pub fn add_months_to_month_end(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(start.year(), start.month(), 1)?;
    let shifted = first.checked_add_months(Months::new(months))?;
    month_end_of(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(17308.4791), 17308.48);
        assert_eq!(round_currency(0.004), 0.0);
        assert_eq!(round_currency(-2.346), -2.35);
    }

    #[test]
    fn test_validation_rejects_bad_inputs() {
        assert!(validate_amount("balance", -1.0).is_err());
        assert!(validate_amount("balance", f64::NAN).is_err());
        assert!(validate_years("years", -0.5).is_err());
        assert!(validate_annual_rate("annual_rate", -1.0).is_err());
        assert!(validate_annual_rate("annual_rate", 0.0).is_ok());
        assert!(validate_annual_rate("annual_rate", -0.02).is_ok());
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_add_months_to_month_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            add_months_to_month_end(start, 0),
            NaiveDate::from_ymd_opt(2024, 1, 31)
        );
        assert_eq!(
            add_months_to_month_end(start, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            add_months_to_month_end(start, 12),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
    }
}
