use crate::config::DebtSimulationLimits;
use crate::error::Result;
use crate::schema::{Debt, PayoffStrategy};
use crate::tvm;
use crate::utils::{validate_amount, validate_annual_rate, validate_finite};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const MONTH_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffResult {
    pub months_to_payoff: u32,
    pub total_interest: f64,
    /// Nominal `monthly_payment * months_to_payoff`; the final payment is counted in full.
    pub total_paid: f64,
}

/// Closed-form payoff of one amortizing debt at a fixed monthly payment.
///
/// `Ok(None)` when the payment does not exceed one month of interest, so the
/// balance can never reach zero.
pub fn calculate_debt_payoff(
    principal: f64,
    annual_rate: f64,
    monthly_payment: f64,
) -> Result<Option<PayoffResult>> {
    let periods = match tvm::periods_to_payoff(principal, monthly_payment, annual_rate)? {
        Some(periods) => periods,
        None => return Ok(None),
    };

    let months = (periods - MONTH_EPSILON).ceil().max(0.0);
    if months > u32::MAX as f64 {
        return Ok(None);
    }

    let total_paid = monthly_payment * months;
    Ok(Some(PayoffResult {
        months_to_payoff: months as u32,
        total_interest: (total_paid - principal).max(0.0),
        total_paid,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

/// Month-by-month schedule for one debt. The last payment only covers what is left.
pub fn amortization_schedule(
    principal: f64,
    annual_rate: f64,
    monthly_payment: f64,
) -> Result<Option<Vec<AmortizationRow>>> {
    let payoff = match calculate_debt_payoff(principal, annual_rate, monthly_payment)? {
        Some(payoff) => payoff,
        None => return Ok(None),
    };

    let rate = tvm::monthly_rate(annual_rate);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(payoff.months_to_payoff as usize);

    for month in 1..=payoff.months_to_payoff {
        let interest = balance * rate;
        let owed = balance + interest;
        let payment = if month == payoff.months_to_payoff {
            owed
        } else {
            monthly_payment.min(owed)
        };
        balance = (owed - payment).max(0.0);

        rows.push(AmortizationRow {
            month,
            payment,
            interest,
            principal: payment - interest,
            balance,
        });
    }

    Ok(Some(rows))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoffEvent {
    /// Position of the debt in the caller's input.
    pub index: usize,
    pub name: Option<String>,
    /// Month in which the balance reached zero (0 for debts that started paid off).
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDebtPayoff {
    pub months: u32,
    /// Interest accrued on every debt across every simulated month.
    pub total_interest: f64,
    /// Nominal `total_monthly_payment * months`.
    pub total_paid: f64,
    /// True when the month cap stopped the run with debts still outstanding.
    pub truncated: bool,
    /// Balance left across all debts when the run stopped.
    pub remaining_balance: f64,
    pub payoff_events: Vec<DebtPayoffEvent>,
}

impl MultiDebtPayoff {
    fn empty(remaining_balance: f64) -> Self {
        Self {
            months: 0,
            total_interest: 0.0,
            total_paid: 0.0,
            truncated: false,
            remaining_balance,
            payoff_events: Vec::new(),
        }
    }
}

struct WorkingDebt {
    index: usize,
    balance: f64,
    monthly_rate: f64,
    minimum_payment: f64,
}

impl WorkingDebt {
    /// Accrues a month of interest and pays at most `available`. Returns (interest, paid).
    fn settle_month(&mut self, available: f64) -> (f64, f64) {
        let interest = self.balance * self.monthly_rate;
        self.balance += interest;
        let paid = available.min(self.balance).max(0.0);
        self.balance -= paid;
        (interest, paid)
    }
}

/// Month-by-month simulation across several debts.
///
/// Every debt but the current target receives its minimum payment; whatever is
/// left of the monthly budget goes to the target. The target is the first
/// unpaid debt in a priority order fixed once before the first month.
pub struct DebtPayoffSimulator {
    limits: DebtSimulationLimits,
    strategy: PayoffStrategy,
}

impl DebtPayoffSimulator {
    pub fn new(limits: DebtSimulationLimits) -> Self {
        Self {
            limits,
            strategy: PayoffStrategy::AsGiven,
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: PayoffStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn priority_order(&self, debts: &[Debt]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..debts.len()).collect();
        match self.strategy {
            PayoffStrategy::AsGiven => {}
            PayoffStrategy::Snowball => {
                order.sort_by(|&a, &b| debts[a].balance.total_cmp(&debts[b].balance))
            }
            PayoffStrategy::Avalanche => order.sort_by(|&a, &b| {
                debts[b]
                    .interest_rate
                    .total_cmp(&debts[a].interest_rate)
            }),
        }
        order
    }

    pub fn run(&self, debts: &[Debt], total_monthly_payment: f64) -> Result<MultiDebtPayoff> {
        validate_finite("total_monthly_payment", total_monthly_payment)?;
        for debt in debts {
            validate_amount("balance", debt.balance)?;
            validate_annual_rate("interest_rate", debt.interest_rate)?;
            validate_amount("minimum_payment", debt.minimum_payment)?;
        }

        let starting_balance: f64 = debts.iter().map(|d| d.balance).sum();
        if debts.is_empty() || total_monthly_payment <= 0.0 {
            return Ok(MultiDebtPayoff::empty(starting_balance));
        }

        let order = self.priority_order(debts);
        debug!(
            "Simulating payoff of {} debts with {:?} priority {:?}",
            debts.len(),
            self.strategy,
            order
        );

        let tolerance = self.limits.paid_off_tolerance;
        let mut payoff_events = Vec::new();
        let mut active: Vec<WorkingDebt> = Vec::with_capacity(debts.len());
        for &index in &order {
            let debt = &debts[index];
            if debt.balance <= tolerance {
                payoff_events.push(DebtPayoffEvent {
                    index,
                    name: debt.name.clone(),
                    month: 0,
                });
            } else {
                active.push(WorkingDebt {
                    index,
                    balance: debt.balance,
                    monthly_rate: tvm::monthly_rate(debt.interest_rate),
                    minimum_payment: debt.minimum_payment,
                });
            }
        }

        let mut months = 0u32;
        let mut total_interest = 0.0;
        let mut shortfall_reported = false;

        while !active.is_empty() && months < self.limits.max_months {
            let mut remaining = total_monthly_payment;

            for debt in active.iter_mut().skip(1) {
                let minimum = debt.minimum_payment;
                let (interest, paid) = debt.settle_month(minimum);
                total_interest += interest;
                remaining -= paid;
            }

            if remaining < 0.0 {
                if !shortfall_reported {
                    warn!(
                        "Minimum payments exceed the monthly budget of {:.2}; target debt receives nothing",
                        total_monthly_payment
                    );
                    shortfall_reported = true;
                }
                remaining = 0.0;
            }

            let (interest, _) = active[0].settle_month(remaining);
            total_interest += interest;
            months += 1;

            for debt in active.iter().filter(|d| d.balance <= tolerance) {
                payoff_events.push(DebtPayoffEvent {
                    index: debt.index,
                    name: debts[debt.index].name.clone(),
                    month: months,
                });
            }
            active.retain(|d| d.balance > tolerance);
        }

        let truncated = !active.is_empty();
        let remaining_balance: f64 = active.iter().map(|d| d.balance).sum();
        if truncated {
            warn!(
                "Debt payoff simulation stopped at the {}-month cap with {:.2} still owed",
                self.limits.max_months, remaining_balance
            );
        } else {
            debug!("All debts paid off after {} months", months);
        }

        Ok(MultiDebtPayoff {
            months,
            total_interest,
            total_paid: total_monthly_payment * months as f64,
            truncated,
            remaining_balance,
            payoff_events,
        })
    }
}

/// Multi-debt payoff in the caller's order with the default 600-month cap.
pub fn calculate_debt_payoff_multiple(
    debts: &[Debt],
    total_monthly_payment: f64,
) -> Result<MultiDebtPayoff> {
    DebtPayoffSimulator::new(DebtSimulationLimits::default()).run(debts, total_monthly_payment)
}
