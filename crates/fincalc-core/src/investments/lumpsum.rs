use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::investments::sip::validate_plan;
use crate::time_value::{add_years, annual_rate, format_inr, format_pct, fv_lump_sum, schedule_anchor};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpsumInput {
    pub amount: Money,
    pub annual_return_pct: Percent,
    pub years: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpsumRow {
    pub year: u32,
    pub date: NaiveDate,
    pub invested: Money,
    pub value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpsumOutput {
    pub future_value: Money,
    pub total_gain: Money,
    pub schedule: Vec<LumpsumRow>,
    pub summary: Vec<SummaryField>,
}

/// One-off investment compounded annually: FV = A * (1+R)^years.
pub fn calculate_lumpsum(input: &LumpsumInput) -> FinCalcResult<ComputationOutput<LumpsumOutput>> {
    let start = Instant::now();
    validate_plan("amount", input.amount, input.years, input.annual_return_pct)?;

    let rate = annual_rate(input.annual_return_pct);
    let anchor = schedule_anchor(input.start_date)?;

    let mut schedule: Vec<LumpsumRow> = Vec::with_capacity(input.years as usize + 1);
    for year in 0..=input.years {
        schedule.push(LumpsumRow {
            year,
            date: add_years(anchor, year)?,
            invested: input.amount,
            value: fv_lump_sum(input.amount, rate, year, "amount")?,
        });
    }

    let future_value = schedule
        .last()
        .map(|row| row.value)
        .unwrap_or(input.amount);
    let total_gain = future_value - input.amount;

    let summary = vec![
        SummaryField::new("Investment Amount", format_inr(input.amount)),
        SummaryField::new("Return Rate", format_pct(input.annual_return_pct)),
        SummaryField::new("Duration", format!("{} years", input.years)),
        SummaryField::new("Total Gain", format_inr(total_gain)),
        SummaryField::new("Future Value", format_inr(future_value)),
    ];

    let output = LumpsumOutput {
        future_value,
        total_gain,
        schedule,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lumpsum growth (annual compounding)",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}
