//! Linear-trend forecast of annual inflation.
//!
//! An ordinary least squares line is fitted to a fixed series of observed
//! annual inflation (2010–2023) and extrapolated year by year.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::format_pct;
use crate::types::{with_metadata, ComputationOutput, Percent, SummaryField};
use crate::FinCalcResult;

pub const FIRST_FORECAST_YEAR: i32 = 2024;
pub const LAST_FORECAST_YEAR: i32 = 2100;

/// Observed annual inflation in percent, one value per year from 2010.
pub const HISTORY_START_YEAR: i32 = 2010;
pub const INFLATION_HISTORY: [Decimal; 14] = [
    dec!(11.99),
    dec!(8.86),
    dec!(9.3),
    dec!(10.9),
    dec!(6.37),
    dec!(4.9),
    dec!(5.02),
    dec!(3.3),
    dec!(4.86),
    dec!(6.62),
    dec!(6.16),
    dec!(6.7),
    dec!(5.1),
    dec!(5.65),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationForecastInput {
    /// Last year to forecast, inclusive.
    pub until_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationPoint {
    pub year: i32,
    pub inflation_pct: Percent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: Decimal,
    pub intercept: Decimal,
    pub r_squared: Decimal,
}

impl LinearFit {
    pub fn predict(&self, x: Decimal) -> Decimal {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationForecastOutput {
    pub fit: LinearFit,
    pub history: Vec<InflationPoint>,
    /// Predictions rounded to 2 dp.
    pub forecast: Vec<InflationPoint>,
    pub final_year_prediction: Percent,
    pub summary: Vec<SummaryField>,
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

/// Ordinary least squares fit of `ys` against `xs`.
pub fn fit_linear(xs: &[Decimal], ys: &[Decimal]) -> FinCalcResult<LinearFit> {
    if xs.len() != ys.len() {
        return Err(FinCalcError::invalid(
            "ys",
            format!("expected {} observations, got {}", xs.len(), ys.len()),
        ));
    }
    if xs.len() < 2 {
        return Err(FinCalcError::invalid("xs", "at least two observations required"));
    }

    let n = Decimal::from(xs.len());
    let mean_x = xs.iter().copied().sum::<Decimal>() / n;
    let mean_y = ys.iter().copied().sum::<Decimal>() / n;

    let mut sxx = Decimal::ZERO;
    let mut sxy = Decimal::ZERO;
    let mut syy = Decimal::ZERO;
    for (x, y) in xs.iter().zip(ys) {
        let dx = *x - mean_x;
        let dy = *y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "regression: all x values are identical".into(),
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    // A constant series is fitted exactly.
    let r_squared = if syy.is_zero() {
        Decimal::ONE
    } else {
        let residual: Decimal = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| {
                let e = *y - (intercept + slope * *x);
                e * e
            })
            .sum();
        Decimal::ONE - residual / syy
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn forecast_inflation(
    input: &InflationForecastInput,
) -> FinCalcResult<ComputationOutput<InflationForecastOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if !(FIRST_FORECAST_YEAR..=LAST_FORECAST_YEAR).contains(&input.until_year) {
        return Err(FinCalcError::invalid(
            "until_year",
            format!("must be between {FIRST_FORECAST_YEAR} and {LAST_FORECAST_YEAR}"),
        ));
    }

    let history: Vec<InflationPoint> = INFLATION_HISTORY
        .iter()
        .enumerate()
        .map(|(idx, value)| InflationPoint {
            year: HISTORY_START_YEAR + idx as i32,
            inflation_pct: *value,
        })
        .collect();

    let xs: Vec<Decimal> = history.iter().map(|p| Decimal::from(p.year)).collect();
    let fit = fit_linear(&xs, &INFLATION_HISTORY)?;

    let forecast: Vec<InflationPoint> = (FIRST_FORECAST_YEAR..=input.until_year)
        .map(|year| InflationPoint {
            year,
            inflation_pct: fit.predict(Decimal::from(year)).round_dp(2),
        })
        .collect();

    let final_year_prediction = forecast
        .last()
        .map(|p| p.inflation_pct)
        .unwrap_or(Decimal::ZERO);

    if let Some(first_negative) = forecast.iter().find(|p| p.inflation_pct < Decimal::ZERO) {
        warnings.push(format!(
            "Linear trend predicts negative inflation from {}; long-range extrapolation is unreliable",
            first_negative.year
        ));
    }

    tracing::debug!(
        slope = %fit.slope,
        r_squared = %fit.r_squared,
        until_year = input.until_year,
        "inflation trend fitted"
    );

    let summary = vec![
        SummaryField::new(
            "Forecast Range",
            format!("{FIRST_FORECAST_YEAR} to {}", input.until_year),
        ),
        SummaryField::new("Final Year Prediction", format_pct(final_year_prediction)),
        SummaryField::new("Trend per Year", format_pct(fit.slope)),
        SummaryField::new("R²", fit.r_squared.round_dp(4).to_string()),
    ];

    let output = InflationForecastOutput {
        fit,
        history,
        forecast,
        final_year_prediction,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Inflation forecast (OLS linear trend on annual CPI inflation, 2010-2023)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_on_history() {
        let xs: Vec<Decimal> = (2010..2024).map(Decimal::from).collect();
        let fit = fit_linear(&xs, &INFLATION_HISTORY).unwrap();

        assert!((fit.slope - dec!(-0.397692)).abs() < dec!(0.000001));
        assert!((fit.intercept - dec!(808.784396)).abs() < dec!(0.00001));
        assert!((fit.r_squared - dec!(0.439540)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_perfect_line() {
        let xs = vec![dec!(1), dec!(2), dec!(3)];
        let ys = vec![dec!(5), dec!(7), dec!(9)];
        let fit = fit_linear(&xs, &ys).unwrap();

        assert_eq!(fit.slope, dec!(2));
        assert_eq!(fit.intercept, dec!(3));
        assert_eq!(fit.r_squared, Decimal::ONE);
    }

    #[test]
    fn test_identical_x_is_division_by_zero() {
        let xs = vec![dec!(1), dec!(1)];
        let ys = vec![dec!(2), dec!(3)];
        assert!(matches!(
            fit_linear(&xs, &ys),
            Err(FinCalcError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_forecast_to_2030() {
        let out = forecast_inflation(&InflationForecastInput { until_year: 2030 }).unwrap();
        let r = &out.result;

        assert_eq!(r.history.len(), 14);
        assert_eq!(r.forecast.len(), 7);
        assert_eq!(r.forecast[0].year, 2024);
        assert_eq!(r.forecast[0].inflation_pct, dec!(3.86));
        assert_eq!(r.final_year_prediction, dec!(1.47));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_negative_prediction_warns() {
        let out = forecast_inflation(&InflationForecastInput { until_year: 2035 }).unwrap();
        assert_eq!(out.result.final_year_prediction, dec!(-0.52));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("2034"));
    }

    #[test]
    fn test_until_year_range() {
        assert!(forecast_inflation(&InflationForecastInput { until_year: 2023 }).is_err());
        assert!(forecast_inflation(&InflationForecastInput { until_year: 2101 }).is_err());
    }
}
