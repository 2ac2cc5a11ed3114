use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::investments::sip::validate_plan;
use crate::time_value::{
    add_months, annual_rate, format_inr, format_pct, in_range, monthly_rate, schedule_anchor,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepUpSipInput {
    pub initial_monthly_investment: Money,
    /// Yearly increase in the instalment, in percent (0–100).
    pub annual_step_up_pct: Percent,
    pub years: u32,
    pub annual_return_pct: Percent,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepUpSipRow {
    /// 0-based instalment index.
    pub month: u32,
    pub date: NaiveDate,
    pub instalment: Money,
    pub invested: Money,
    pub value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepUpSipOutput {
    pub future_value: Money,
    pub total_invested: Money,
    pub total_returns: Money,
    pub final_monthly_investment: Money,
    pub schedule: Vec<StepUpSipRow>,
    pub summary: Vec<SummaryField>,
}

/// SIP whose instalment rises by a fixed percentage every twelve months.
/// Each month the running value grows by one month's return, then the
/// instalment is added.
pub fn calculate_step_up_sip(
    input: &StepUpSipInput,
) -> FinCalcResult<ComputationOutput<StepUpSipOutput>> {
    let start = Instant::now();
    validate_plan(
        "initial_monthly_investment",
        input.initial_monthly_investment,
        input.years,
        input.annual_return_pct,
    )?;
    if input.annual_step_up_pct < Decimal::ZERO || input.annual_step_up_pct > dec!(100) {
        return Err(FinCalcError::invalid(
            "annual_step_up_pct",
            "step-up must be between 0% and 100%",
        ));
    }

    let months = input.years * 12;
    let i = monthly_rate(input.annual_return_pct);
    let step_up = Decimal::ONE + annual_rate(input.annual_step_up_pct);
    let anchor = schedule_anchor(input.start_date)?;

    let mut instalment = input.initial_monthly_investment;
    let mut invested = Decimal::ZERO;
    let mut value = Decimal::ZERO;
    let mut schedule: Vec<StepUpSipRow> = Vec::with_capacity(months as usize);

    for month in 0..months {
        if month > 0 && month % 12 == 0 {
            instalment = in_range(instalment.checked_mul(step_up), "annual_step_up_pct")?;
        }
        invested = in_range(invested.checked_add(instalment), "initial_monthly_investment")?;
        value = in_range(
            value
                .checked_mul(Decimal::ONE + i)
                .and_then(|grown| grown.checked_add(instalment)),
            "annual_return_pct",
        )?;

        schedule.push(StepUpSipRow {
            month,
            date: add_months(anchor, month)?,
            instalment,
            invested,
            value,
        });
    }

    let total_returns = value - invested;

    let summary = vec![
        SummaryField::new("Initial SIP", format_inr(input.initial_monthly_investment)),
        SummaryField::new(
            "Step-up",
            format!("{} annually", format_pct(input.annual_step_up_pct)),
        ),
        SummaryField::new("Duration", format!("{} years", input.years)),
        SummaryField::new("Expected Return", format_pct(input.annual_return_pct)),
        SummaryField::new("Total Invested", format_inr(invested)),
        SummaryField::new("Future Value", format_inr(value)),
    ];

    let output = StepUpSipOutput {
        future_value: value,
        total_invested: invested,
        total_returns,
        final_monthly_investment: instalment,
        schedule,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Step-up SIP (annual instalment increase, monthly compounding)",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_input() -> StepUpSipInput {
        StepUpSipInput {
            initial_monthly_investment: dec!(10_000),
            annual_step_up_pct: dec!(10),
            years: 20,
            annual_return_pct: dec!(12),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        }
    }

    #[test]
    fn test_step_up_reference_value() {
        let out = calculate_step_up_sip(&default_input()).unwrap();
        let r = &out.result;

        assert!(
            (r.future_value - dec!(19_691_797.51)).abs() < dec!(0.01),
            "got {}",
            r.future_value
        );
        assert!((r.total_invested - dec!(6_872_999.94)).abs() < dec!(0.01));
    }

    #[test]
    fn test_instalment_steps_every_twelve_months() {
        let out = calculate_step_up_sip(&default_input()).unwrap();
        let schedule = &out.result.schedule;

        assert_eq!(schedule.len(), 240);
        assert_eq!(schedule[11].instalment, dec!(10_000));
        assert_eq!(schedule[12].instalment, dec!(11_000));
        assert_eq!(schedule[23].instalment, dec!(11_000));
        assert_eq!(schedule[24].instalment, dec!(12_100));
    }

    #[test]
    fn test_zero_step_up_matches_plain_end_of_month_sip() {
        let mut input = default_input();
        input.annual_step_up_pct = Decimal::ZERO;
        input.years = 1;
        input.annual_return_pct = Decimal::ZERO;
        let out = calculate_step_up_sip(&input).unwrap();

        assert_eq!(out.result.total_invested, dec!(120_000));
        assert_eq!(out.result.future_value, dec!(120_000));
        assert_eq!(out.result.final_monthly_investment, dec!(10_000));
    }

    #[test]
    fn test_step_up_out_of_range() {
        let mut input = default_input();
        input.annual_step_up_pct = dec!(150);
        assert!(calculate_step_up_sip(&input).is_err());
    }

    #[test]
    fn test_doubling_instalment_overflow_is_an_error() {
        let input = StepUpSipInput {
            initial_monthly_investment: dec!(100_000_000_000_000_000_000),
            annual_step_up_pct: dec!(100),
            years: 50,
            annual_return_pct: dec!(12),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        };
        assert!(matches!(
            calculate_step_up_sip(&input),
            Err(FinCalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_century_long_plan_rejected() {
        let mut input = default_input();
        input.years = 100;
        input.annual_step_up_pct = dec!(100);
        assert!(matches!(
            calculate_step_up_sip(&input),
            Err(FinCalcError::InvalidInput { .. })
        ));
    }
}
