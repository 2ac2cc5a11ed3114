//! Nominal versus real (inflation-adjusted) value of a monthly SIP.
//!
//! The real return is the Fisher rate `(1 + nominal) / (1 + inflation) - 1`;
//! the real future value applies the same annuity-due formula at that rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::investments::sip::validate_plan;
use crate::time_value::{annual_rate, format_inr, format_pct, fv_annuity_due, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationAdjustedSipInput {
    pub monthly_investment: Money,
    pub annual_return_pct: Percent,
    pub inflation_pct: Percent,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationAdjustedSipRow {
    pub year: u32,
    pub nominal_value: Money,
    pub real_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationAdjustedSipOutput {
    pub nominal_future_value: Money,
    pub real_future_value: Money,
    /// Fisher real return, in percent.
    pub real_return_pct: Percent,
    /// Nominal minus real future value.
    pub purchasing_power_erosion: Money,
    pub yearly: Vec<InflationAdjustedSipRow>,
    pub summary: Vec<SummaryField>,
}

/// Highest expected annual inflation accepted, in percent.
pub const MAX_INFLATION_PCT: Decimal = dec!(100);

pub fn real_return_pct(nominal_pct: Percent, inflation_pct: Percent) -> Percent {
    ((Decimal::ONE + annual_rate(nominal_pct)) / (Decimal::ONE + annual_rate(inflation_pct))
        - Decimal::ONE)
        * dec!(100)
}

pub fn calculate_inflation_adjusted_sip(
    input: &InflationAdjustedSipInput,
) -> FinCalcResult<ComputationOutput<InflationAdjustedSipOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_plan("monthly_investment", input.monthly_investment, input.years, input.annual_return_pct)?;
    if input.inflation_pct < Decimal::ZERO || input.inflation_pct > MAX_INFLATION_PCT {
        return Err(FinCalcError::invalid(
            "inflation_pct",
            format!("inflation must be between 0% and {MAX_INFLATION_PCT}%"),
        ));
    }

    let real_pct = real_return_pct(input.annual_return_pct, input.inflation_pct);
    if real_pct < Decimal::ZERO {
        warnings.push("Inflation exceeds the expected return; the real return is negative".into());
    }

    let nominal_i = monthly_rate(input.annual_return_pct);
    let real_i = monthly_rate(real_pct);

    let mut yearly: Vec<InflationAdjustedSipRow> = Vec::with_capacity(input.years as usize);
    for year in 1..=input.years {
        yearly.push(InflationAdjustedSipRow {
            year,
            nominal_value: fv_annuity_due(input.monthly_investment, nominal_i, year * 12, "monthly_investment")?,
            real_value: fv_annuity_due(input.monthly_investment, real_i, year * 12, "monthly_investment")?,
        });
    }

    let (nominal_future_value, real_future_value) = yearly
        .last()
        .map(|row| (row.nominal_value, row.real_value))
        .unwrap_or_default();
    let purchasing_power_erosion = nominal_future_value - real_future_value;

    let summary = vec![
        SummaryField::new("Monthly Investment", format_inr(input.monthly_investment)),
        SummaryField::new("Expected Return", format_pct(input.annual_return_pct)),
        SummaryField::new("Inflation Rate", format_pct(input.inflation_pct)),
        SummaryField::new("Duration", format!("{} years", input.years)),
        SummaryField::new("Nominal Future Value", format_inr(nominal_future_value)),
        SummaryField::new("Real Future Value", format_inr(real_future_value)),
    ];

    let output = InflationAdjustedSipOutput {
        nominal_future_value,
        real_future_value,
        real_return_pct: real_pct,
        purchasing_power_erosion,
        yearly,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Inflation-adjusted SIP (Fisher real return, monthly annuity-due)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_input() -> InflationAdjustedSipInput {
        InflationAdjustedSipInput {
            monthly_investment: dec!(5_000),
            annual_return_pct: dec!(12),
            inflation_pct: dec!(6),
            years: 20,
        }
    }

    #[test]
    fn test_real_return() {
        let real = real_return_pct(dec!(12), dec!(6));
        assert!((real - dec!(5.660377)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_nominal_and_real_reference_values() {
        let out = calculate_inflation_adjusted_sip(&default_input()).unwrap();
        let r = &out.result;

        assert!((r.nominal_future_value - dec!(4_995_739.60)).abs() < dec!(0.01));
        assert!((r.real_future_value - dec!(2_229_942.27)).abs() < dec!(0.01));
        assert!(r.purchasing_power_erosion > Decimal::ZERO);
        assert_eq!(r.yearly.len(), 20);
        assert_eq!(r.yearly[19].nominal_value, r.nominal_future_value);
    }

    #[test]
    fn test_inflation_above_return_warns() {
        let mut input = default_input();
        input.inflation_pct = dec!(15);
        let out = calculate_inflation_adjusted_sip(&input).unwrap();

        assert!(out.result.real_return_pct < Decimal::ZERO);
        assert!(out.result.real_future_value < out.result.nominal_future_value);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_inflation_and_overflow_bounds() {
        let mut input = default_input();
        input.inflation_pct = dec!(250);
        assert!(matches!(
            calculate_inflation_adjusted_sip(&input),
            Err(FinCalcError::InvalidInput { .. })
        ));

        let mut input = default_input();
        input.monthly_investment = dec!(100_000_000_000_000_000_000);
        input.annual_return_pct = dec!(100);
        input.years = 50;
        assert!(matches!(
            calculate_inflation_adjusted_sip(&input),
            Err(FinCalcError::InvalidInput { .. })
        ));
    }
}
