//! # Financial Projection Engine
//!
//! Deterministic time-value-of-money math for personal finance tools: savings growth,
//! goal solvers, debt payoff simulation and a handful of composite planning metrics.
//!
//! ## Core Concepts
//!
//! - **Monthly compounding**: every annual rate is a decimal fraction compounded monthly
//!   (`0.07` means 7%), with contributions and payments made at the end of each month
//! - **Impossible vs. invalid**: a goal that can never be reached returns `Ok(None)`;
//!   malformed input (negative amounts, non-finite numbers) returns [`EngineError::InvalidInput`]
//! - **Injected assumptions**: default rates, affordability ratios, score weights and tax
//!   brackets live in [`EngineConfig`] instead of globals
//! - **Tool calling**: every solver is also exposed as a JSON-schema described tool for AI agents
//!
//! ## Example
//!
//! ```rust
//! use financial_projection_engine::*;
//!
//! let future = calculate_future_value(0.0, 100.0, 0.07, 10.0).unwrap();
//! assert!((future - 17_308.48).abs() < 0.01);
//!
//! let months = calculate_time_to_goal(10_000.0, 0.0, 200.0, 0.05).unwrap();
//! assert_eq!(months, Some(46));
//!
//! let payoff = calculate_debt_payoff(1_000.0, 0.24, 15.0).unwrap();
//! assert!(payoff.is_none());
//!
//! let debts = vec![Debt::new(5_000.0, 0.2, 100.0).named("Visa")];
//! let plan = DebtPayoffSimulator::new(DebtSimulationLimits::default())
//!     .with_strategy(PayoffStrategy::Avalanche)
//!     .run(&debts, 300.0)
//!     .unwrap();
//! assert_eq!(plan.months, 20);
//! ```

pub mod config;
pub mod debt;
pub mod error;
pub mod metrics;
pub mod projection;
pub mod schema;
pub mod simulation;
pub mod tools;
pub mod tvm;
pub mod utils;

pub use config::{
    AffordabilityRules, DebtSimulationLimits, EngineConfig, HealthScoreWeights,
    MonteCarloSettings, ProjectionLimits, RateAssumptions, TaxBracket, TaxSchedule, TaxTable,
};
pub use debt::{
    amortization_schedule, calculate_debt_payoff, calculate_debt_payoff_multiple,
    AmortizationRow, DebtPayoffEvent, DebtPayoffSimulator, MultiDebtPayoff, PayoffResult,
};
pub use error::{EngineError, Result};
pub use metrics::*;
pub use projection::{
    calculate_compound_interest, calculate_future_value, calculate_monthly_payment,
    calculate_time_to_goal, goal_date, project_savings, project_savings_dated,
    project_savings_with_limits,
    SavingsProjectionPoint, DEFAULT_COMPOUNDING_FREQUENCY,
};
pub use schema::*;
pub use simulation::{GoalSimulation, GoalSimulator};
pub use tools::{execute_tool, tool_definitions, FinancialTool, ToolDefinition};
pub use utils::round_currency;
