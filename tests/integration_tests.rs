use chrono::NaiveDate;
use financial_projection_engine::*;
use rstest::rstest;
use serde_json::json;

fn assert_close(actual: f64, expected: f64, tolerance: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {} +/- {}, got {}",
        label,
        expected,
        tolerance,
        actual
    );
}

fn export_schedule_to_csv(rows: &[AmortizationRow]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[rstest]
#[case::scenario_a(0.0, 100.0, 0.07, 10.0, 17_308.48)]
#[case::lump_sum_and_contributions(5_000.0, 250.0, 0.06, 5.0, 24_186.76)]
#[case::zero_rate(1_000.0, 100.0, 0.0, 1.0, 2_200.0)]
#[case::zero_years(1_000.0, 100.0, 0.05, 0.0, 1_000.0)]
fn test_future_value_goldens(
    #[case] present_value: f64,
    #[case] contribution: f64,
    #[case] annual_rate: f64,
    #[case] years: f64,
    #[case] expected: f64,
) {
    let value = calculate_future_value(present_value, contribution, annual_rate, years).unwrap();
    assert_close(value, expected, 0.01, "future value");
}

#[rstest]
#[case::scenario_b(10_000.0, 0.0, 200.0, 0.05, Some(46))]
#[case::with_starting_balance(50_000.0, 5_000.0, 500.0, 0.06, Some(72))]
#[case::zero_rate_exact(2_000.0, 0.0, 100.0, 0.0, Some(20))]
#[case::already_reached(1_000.0, 1_500.0, 100.0, 0.05, Some(0))]
#[case::no_contribution(1_000.0, 100.0, 0.0, 0.05, None)]
fn test_time_to_goal_goldens(
    #[case] target: f64,
    #[case] current: f64,
    #[case] contribution: f64,
    #[case] annual_rate: f64,
    #[case] expected: Option<u32>,
) {
    let months = calculate_time_to_goal(target, current, contribution, annual_rate).unwrap();
    assert_eq!(months, expected);
}

#[rstest]
#[case::scenario_c(5_000.0, 0.2, 300.0, 20, 6_000.0)]
#[case::car_loan(10_000.0, 0.06, 200.0, 58, 11_600.0)]
#[case::interest_free(2_000.0, 0.0, 100.0, 20, 2_000.0)]
#[case::credit_card(20_000.0, 0.18, 500.0, 62, 31_000.0)]
fn test_debt_payoff_goldens(
    #[case] principal: f64,
    #[case] annual_rate: f64,
    #[case] payment: f64,
    #[case] months: u32,
    #[case] total_paid: f64,
) {
    let result = calculate_debt_payoff(principal, annual_rate, payment)
        .unwrap()
        .unwrap();
    assert_eq!(result.months_to_payoff, months);
    assert_close(result.total_paid, total_paid, 1e-6, "total paid");
    assert_close(
        result.total_interest,
        total_paid - principal,
        1e-6,
        "total interest",
    );
}

#[test]
fn test_zero_rate_is_linear_everywhere() {
    assert_close(
        calculate_future_value(500.0, 50.0, 0.0, 2.0).unwrap(),
        1_700.0,
        1e-9,
        "future value",
    );
    assert_close(
        calculate_monthly_payment(1_700.0, 500.0, 0.0, 2.0).unwrap(),
        50.0,
        1e-9,
        "monthly payment",
    );
    assert_eq!(
        calculate_time_to_goal(1_700.0, 500.0, 50.0, 0.0).unwrap(),
        Some(24)
    );
    assert_close(
        calculate_compound_interest(500.0, 0.0, 7.0, 12).unwrap(),
        500.0,
        1e-9,
        "compound interest",
    );
}

#[test]
fn test_payment_round_trips_through_future_value() {
    for &(target, current, rate, years) in &[
        (25_000.0, 2_000.0, 0.04, 3.0),
        (1_000_000.0, 50_000.0, 0.07, 30.0),
        (8_000.0, 0.0, 0.0, 1.5),
    ] {
        let payment = calculate_monthly_payment(target, current, rate, years).unwrap();
        let reached = calculate_future_value(current, payment, rate, years).unwrap();
        assert_close(reached, target, 0.01, "round trip");
    }
}

#[test]
fn test_future_value_is_monotonic() {
    let mut previous = 0.0;
    for years in 0..=30 {
        let value = calculate_future_value(1_000.0, 100.0, 0.05, years as f64).unwrap();
        assert!(value >= previous, "year {} decreased", years);
        previous = value;
    }

    let mut previous = 0.0;
    for step in 0..=20 {
        let rate = step as f64 * 0.01;
        let value = calculate_future_value(1_000.0, 100.0, rate, 10.0).unwrap();
        assert!(value >= previous, "rate {} decreased", rate);
        previous = value;
    }
}

#[rstest]
#[case::positive_rate(0.06)]
#[case::zero_rate(0.0)]
#[case::negative_rate(-0.02)]
fn test_larger_contribution_never_delays_goal(#[case] annual_rate: f64) {
    let mut previous: Option<u32> = None;
    let mut contribution = 5.0;
    while contribution <= 3_000.0 {
        let months = calculate_time_to_goal(50_000.0, 1_000.0, contribution, annual_rate).unwrap();
        if let Some(previous) = previous {
            // Once reachable, a goal stays reachable as contributions grow.
            let months = months.unwrap_or_else(|| {
                panic!("contribution {} made the goal unreachable", contribution)
            });
            assert!(
                months <= previous,
                "rate {}: contribution {} needs {} months, a smaller one needed {}",
                annual_rate,
                contribution,
                months,
                previous
            );
        }
        if months.is_some() {
            previous = months;
        }
        contribution += 7.25;
    }
    assert!(previous.is_some(), "goal never became reachable at rate {}", annual_rate);
}

#[test]
fn test_results_are_never_negative() {
    assert_eq!(
        calculate_monthly_payment(5_000.0, 10_000.0, 0.05, 3.0).unwrap(),
        0.0
    );
    assert!(calculate_future_value(100.0, 0.0, -0.5, 5.0).unwrap() >= 0.0);
    assert!(calculate_compound_interest(100.0, -0.2, 10.0, 12).unwrap() >= 0.0);
    for point in project_savings(100.0, 0.0, -0.9, 24).unwrap() {
        assert!(point.balance >= 0.0);
    }
}

#[test]
fn test_insufficient_debt_payment_is_impossible() {
    // 1000 at 24% accrues 20 a month.
    assert!(calculate_debt_payoff(1_000.0, 0.24, 15.0).unwrap().is_none());
    assert!(calculate_debt_payoff(1_000.0, 0.24, 20.0).unwrap().is_none());
    assert!(amortization_schedule(1_000.0, 0.24, 20.0).unwrap().is_none());
    assert!(calculate_debt_payoff(1_000.0, 0.24, 20.5).unwrap().is_some());
}

#[test]
fn test_invalid_inputs_are_rejected() {
    assert!(matches!(
        calculate_future_value(-1.0, 0.0, 0.05, 1.0),
        Err(EngineError::InvalidInput { .. })
    ));
    assert!(matches!(
        calculate_time_to_goal(f64::NAN, 0.0, 10.0, 0.05),
        Err(EngineError::InvalidInput { .. })
    ));
    assert!(matches!(
        calculate_compound_interest(100.0, 0.05, 1.0, 0),
        Err(EngineError::InvalidInput { .. })
    ));
    assert!(matches!(
        calculate_debt_payoff_multiple(&[Debt::new(-5.0, 0.1, 10.0)], 100.0),
        Err(EngineError::InvalidInput { .. })
    ));
}

#[test]
fn test_multi_debt_matches_single_debt_closed_form() {
    let single = calculate_debt_payoff(5_000.0, 0.2, 300.0).unwrap().unwrap();
    let multi = calculate_debt_payoff_multiple(&[Debt::new(5_000.0, 0.2, 50.0)], 300.0).unwrap();

    assert_eq!(multi.months, single.months_to_payoff);
    assert_close(multi.total_paid, single.total_paid, 1e-6, "total paid");
    assert_close(multi.total_interest, 906.81, 0.01, "accrued interest");
    assert!(!multi.truncated);
    assert_eq!(multi.remaining_balance, 0.0);
}

#[test]
fn test_multi_debt_caps_at_fifty_years() {
    let debts = vec![Debt::new(100_000.0, 0.12, 900.0).named("Underwater")];
    let result = calculate_debt_payoff_multiple(&debts, 950.0).unwrap();

    assert_eq!(result.months, 600);
    assert!(result.truncated);
    assert!(result.remaining_balance > 100_000.0);
    assert!(result.payoff_events.is_empty());
}

#[test]
fn test_strategies_order_payoff_events() {
    let debts = vec![
        Debt::new(9_000.0, 0.07, 200.0).named("Student loan"),
        Debt::new(1_200.0, 0.12, 40.0).named("Store card"),
        Debt::new(4_000.0, 0.26, 90.0).named("Credit card"),
    ];
    let limits = DebtSimulationLimits::default();

    let snowball = DebtPayoffSimulator::new(limits.clone())
        .with_strategy(PayoffStrategy::Snowball)
        .run(&debts, 800.0)
        .unwrap();
    let avalanche = DebtPayoffSimulator::new(limits)
        .with_strategy(PayoffStrategy::Avalanche)
        .run(&debts, 800.0)
        .unwrap();

    assert_eq!(snowball.payoff_events[0].name.as_deref(), Some("Store card"));
    assert_eq!(avalanche.payoff_events[0].name.as_deref(), Some("Credit card"));
    assert_eq!(snowball.payoff_events.len(), 3);
    assert_eq!(avalanche.payoff_events.len(), 3);
    assert!(
        avalanche.total_interest <= snowball.total_interest,
        "avalanche {} vs snowball {}",
        avalanche.total_interest,
        snowball.total_interest
    );
}

#[test]
fn test_projection_series_ends_at_future_value() {
    let start = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    let series = project_savings_dated(2_500.0, 150.0, 0.045, 36, start).unwrap();
    let closed_form = calculate_future_value(2_500.0, 150.0, 0.045, 3.0).unwrap();

    assert_eq!(series.len(), 37);
    assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2025, 1, 31));
    assert_eq!(series[36].date, NaiveDate::from_ymd_opt(2028, 1, 31));
    assert_close(series[36].balance, closed_form, 1e-6, "series end");
    assert_close(
        series[36].total_contributed,
        2_500.0 + 150.0 * 36.0,
        1e-9,
        "contributions",
    );
}

#[test]
fn test_amortization_schedule_csv_export() -> anyhow::Result<()> {
    let rows = amortization_schedule(5_000.0, 0.2, 300.0)?
        .ok_or_else(|| anyhow::anyhow!("payment should cover interest"))?;
    assert_eq!(rows.len(), 20);
    assert_eq!(rows.last().map(|row| row.balance), Some(0.0));

    let total: f64 = rows.iter().map(|row| row.payment).sum();
    assert_close(total, 5_906.81, 0.01, "scheduled payments");

    let csv = export_schedule_to_csv(&rows)?;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("month,payment,interest,principal,balance")
    );
    assert_eq!(lines.count(), 20);
    Ok(())
}

#[test]
fn test_config_from_json_drives_metrics() -> anyhow::Result<()> {
    let config = EngineConfig::from_json_str(
        r#"{
            "affordability": { "housing_ratio": 0.25, "total_debt_ratio": 0.33 },
            "rates": { "savings_rate": 0.0 }
        }"#,
    )?;
    assert_eq!(config.rates.investment_return, 0.07);

    let affordability = calculate_house_affordability(
        &AffordabilityInputs {
            annual_income: 120_000.0,
            monthly_debts: 0.0,
            down_payment: 0.0,
            annual_rate: 0.065,
            years: 30.0,
        },
        &config,
    )?;
    assert_eq!(affordability.housing_limit, 2_500.0);

    let output = execute_tool(
        "calculate_future_value",
        &json!({ "monthly_contribution": 100.0, "years": 2.0 }),
        &config,
    )?;
    assert_eq!(output["future_value"], 2_400.0);
    Ok(())
}

#[test]
fn test_config_from_path() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join("financial_projection_engine_config_test.json");
    std::fs::write(&path, r#"{ "debt_limits": { "max_months": 12 } }"#)?;
    let config = EngineConfig::from_path(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(config.debt_limits.max_months, 12);
    let result = DebtPayoffSimulator::new(config.debt_limits.clone())
        .run(&[Debt::new(10_000.0, 0.1, 100.0)], 200.0)?;
    assert_eq!(result.months, 12);
    assert!(result.truncated);
    Ok(())
}

#[test]
fn test_tool_definitions_cover_every_solver() {
    let definitions = tool_definitions().unwrap();
    let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    for expected in [
        "calculate_future_value",
        "calculate_monthly_payment",
        "calculate_time_to_goal",
        "calculate_compound_interest",
        "calculate_debt_payoff",
        "calculate_debt_payoff_multiple",
        "calculate_loan_payment",
        "calculate_house_affordability",
        "calculate_retirement_needs",
        "calculate_financial_health_score",
        "calculate_tax_estimate",
        "calculate_portfolio_allocation",
    ] {
        assert!(names.contains(&expected), "missing tool {}", expected);
    }
    for definition in &definitions {
        assert!(!definition.description.is_empty());
        assert!(definition.parameters["properties"].is_object());
    }
}

#[test]
fn test_composite_tools_return_structured_json() {
    let config = EngineConfig::default();

    let allocation = execute_tool(
        "calculate_portfolio_allocation",
        &json!({ "age": 30, "risk_tolerance": "aggressive" }),
        &config,
    )
    .unwrap();
    let sum = allocation["stocks"].as_f64().unwrap()
        + allocation["bonds"].as_f64().unwrap()
        + allocation["cash"].as_f64().unwrap();
    assert_close(sum, 100.0, 1e-9, "allocation total");

    let tax = execute_tool(
        "calculate_tax_estimate",
        &json!({ "gross_income": 75_000.0 }),
        &config,
    )
    .unwrap();
    assert_eq!(tax["total_tax"], 8_341.0);

    let score = execute_tool(
        "calculate_financial_health_score",
        &json!({
            "savings_rate": 0.2,
            "debt_to_income": 0.1,
            "expense_ratio": 0.6,
            "investment_rate": 0.15
        }),
        &config,
    )
    .unwrap();
    assert_eq!(score["credit_score"], 50.0);
}
