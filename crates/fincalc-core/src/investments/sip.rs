//! Systematic Investment Plan: a fixed amount invested at the start of every
//! month, compounding monthly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{
    add_months, format_inr, format_pct, fv_annuity_due, in_range, monthly_rate, schedule_anchor,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipInput {
    pub monthly_investment: Money,
    pub years: u32,
    /// Expected annual return in percent.
    pub annual_return_pct: Percent,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Position after `month` instalments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipRow {
    pub month: u32,
    pub date: NaiveDate,
    pub invested: Money,
    pub value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipOutput {
    pub future_value: Money,
    pub total_invested: Money,
    pub total_returns: Money,
    pub schedule: Vec<SipRow>,
    pub summary: Vec<SummaryField>,
}

/// Longest investment horizon accepted by the investment calculators.
pub const MAX_PLAN_YEARS: u32 = 50;

/// Highest expected annual return accepted, in percent.
pub const MAX_RETURN_PCT: Decimal = dec!(100);

pub(crate) fn validate_plan(amount_field: &str, amount: Money, years: u32, return_pct: Percent) -> FinCalcResult<()> {
    if amount <= Decimal::ZERO {
        return Err(FinCalcError::invalid(amount_field, format!("{amount_field} must be > 0")));
    }
    if years == 0 || years > MAX_PLAN_YEARS {
        return Err(FinCalcError::invalid(
            "years",
            format!("duration must be between 1 and {MAX_PLAN_YEARS} years"),
        ));
    }
    if return_pct < Decimal::ZERO || return_pct > MAX_RETURN_PCT {
        return Err(FinCalcError::invalid(
            "annual_return_pct",
            format!("return must be between 0% and {MAX_RETURN_PCT}%"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// FV = P * [((1+i)^n - 1) / i] * (1+i), with i the monthly rate and n = years * 12.
pub fn calculate_sip(input: &SipInput) -> FinCalcResult<ComputationOutput<SipOutput>> {
    let start = Instant::now();
    validate_plan("monthly_investment", input.monthly_investment, input.years, input.annual_return_pct)?;

    let months = input.years * 12;
    let i = monthly_rate(input.annual_return_pct);
    let anchor = schedule_anchor(input.start_date)?;

    let mut schedule: Vec<SipRow> = Vec::with_capacity(months as usize + 1);
    for month in 0..=months {
        schedule.push(SipRow {
            month,
            date: add_months(anchor, month)?,
            invested: in_range(
                input.monthly_investment.checked_mul(Decimal::from(month)),
                "monthly_investment",
            )?,
            value: fv_annuity_due(input.monthly_investment, i, month, "monthly_investment")?,
        });
    }

    let (future_value, total_invested) = schedule
        .last()
        .map(|row| (row.value, row.invested))
        .unwrap_or_default();
    let total_returns = future_value - total_invested;

    let summary = vec![
        SummaryField::new("Monthly SIP", format_inr(input.monthly_investment)),
        SummaryField::new("Return Rate", format_pct(input.annual_return_pct)),
        SummaryField::new("Duration", format!("{} years", input.years)),
        SummaryField::new("Total Invested", format_inr(total_invested)),
        SummaryField::new("Total Returns", format_inr(total_returns)),
        SummaryField::new("Future Value", format_inr(future_value)),
    ];

    let output = SipOutput {
        future_value,
        total_invested,
        total_returns,
        schedule,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SIP future value (monthly annuity-due compounding)",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}
