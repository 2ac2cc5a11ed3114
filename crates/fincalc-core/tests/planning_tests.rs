use fincalc_core::planning::inflation_forecast::{
    fit_linear, forecast_inflation, InflationForecastInput, INFLATION_HISTORY,
};
use fincalc_core::planning::retirement::{plan_retirement, RetirementInput};
use fincalc_core::FinCalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Retirement
// ===========================================================================

fn sample_saver() -> RetirementInput {
    RetirementInput {
        current_age: 25,
        retirement_age: 60,
        income_until_age: 85,
        monthly_expense: dec!(30_000),
        inflation_pct: dec!(6),
        annual_return_pct: dec!(10),
    }
}

#[test]
fn test_retirement_reference_plan() {
    let out = plan_retirement(&sample_saver()).unwrap();
    let r = &out.result;

    // 30,000 * 12 * 30
    assert_eq!(r.fire_corpus_today, dec!(10_800_000));
    assert!((r.corpus_required - dec!(272_125_452.45)).abs() < dec!(0.01));
    assert!((r.fire_corpus_at_retirement - dec!(83_009_737.36)).abs() < dec!(0.01));
    assert_eq!(
        r.annual_expense_at_retirement,
        r.monthly_expense_at_retirement * dec!(12)
    );
}

#[test]
fn test_higher_inflation_needs_bigger_corpus() {
    let base = plan_retirement(&sample_saver()).unwrap();
    let mut input = sample_saver();
    input.inflation_pct = dec!(8);
    let hot = plan_retirement(&input).unwrap();

    assert!(hot.result.corpus_required > base.result.corpus_required);
    assert_eq!(hot.result.fire_corpus_today, base.result.fire_corpus_today);
}

#[test]
fn test_retirement_rejects_zero_expense() {
    let mut input = sample_saver();
    input.monthly_expense = Decimal::ZERO;
    assert!(matches!(
        plan_retirement(&input),
        Err(FinCalcError::InvalidInput { .. })
    ));
}

#[test]
fn test_retirement_summary_labels() {
    let out = plan_retirement(&sample_saver()).unwrap();
    let labels: Vec<&str> = out
        .result
        .summary
        .iter()
        .map(|f| f.label.as_str())
        .collect();

    assert_eq!(
        labels,
        vec![
            "Current Age",
            "Retirement Age",
            "Monthly Expense Today",
            "Inflation Rate",
            "Expected Returns",
            "Years to Retire",
            "Corpus at Retirement",
            "FIRE Corpus Today",
        ]
    );
}

#[test]
fn test_retirement_horizon_is_bounded() {
    let mut input = sample_saver();
    input.retirement_age = 2_000_000_000;
    input.income_until_age = 4_000_000_000;
    input.inflation_pct = Decimal::ZERO;
    assert!(matches!(
        plan_retirement(&input),
        Err(FinCalcError::InvalidInput { .. })
    ));

    let mut input = sample_saver();
    input.income_until_age = 101;
    assert!(matches!(
        plan_retirement(&input),
        Err(FinCalcError::InvalidInput { .. })
    ));
}

#[test]
fn test_retirement_overflow_is_an_error() {
    let mut input = sample_saver();
    input.current_age = 18;
    input.retirement_age = 99;
    input.income_until_age = 100;
    input.inflation_pct = dec!(100);
    // 2^81 times the expense leaves the decimal range
    input.monthly_expense = dec!(1_000_000);
    assert!(matches!(
        plan_retirement(&input),
        Err(FinCalcError::InvalidInput { .. })
    ));
}

// ===========================================================================
// Inflation forecast
// ===========================================================================

#[test]
fn test_forecast_trend_is_downward() {
    let out = forecast_inflation(&InflationForecastInput { until_year: 2030 }).unwrap();
    let r = &out.result;

    assert!(r.fit.slope < Decimal::ZERO);
    assert!(r.fit.r_squared > Decimal::ZERO && r.fit.r_squared < Decimal::ONE);
    assert!(r
        .forecast
        .windows(2)
        .all(|w| w[1].inflation_pct <= w[0].inflation_pct));
    assert_eq!(r.forecast.last().map(|p| p.year), Some(2030));
}

#[test]
fn test_forecast_fit_passes_through_the_mean() {
    let xs: Vec<Decimal> = (2010..2024).map(Decimal::from).collect();
    let fit = fit_linear(&xs, &INFLATION_HISTORY).unwrap();
    let mean_y = INFLATION_HISTORY.iter().copied().sum::<Decimal>() / dec!(14);

    assert!((fit.predict(dec!(2016.5)) - mean_y).abs() < dec!(0.0000001));
    assert!((mean_y - dec!(6.837857)).abs() < dec!(0.000001));
}

#[test]
fn test_single_year_forecast() {
    let out = forecast_inflation(&InflationForecastInput { until_year: 2024 }).unwrap();
    assert_eq!(out.result.forecast.len(), 1);
    assert_eq!(out.result.final_year_prediction, dec!(3.86));
}

#[test]
fn test_mismatched_series_rejected() {
    let xs = vec![dec!(1), dec!(2), dec!(3)];
    let ys = vec![dec!(1), dec!(2)];
    assert!(matches!(
        fit_linear(&xs, &ys),
        Err(FinCalcError::InvalidInput { .. })
    ));
}
