use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{annual_rate, format_inr, format_pct, fv_lump_sum, fv_ordinary_annuity, in_range};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

/// Multiple of annual expenses treated as a self-sustaining corpus.
pub const FIRE_MULTIPLE: Decimal = dec!(30);

/// Oldest age a plan may run to.
pub const MAX_AGE: u32 = 100;

/// Upper bound on the inflation and return assumptions, in percent.
pub const MAX_RATE_PCT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    /// Age until which retirement income must last.
    pub income_until_age: u32,
    pub monthly_expense: Money,
    pub inflation_pct: Percent,
    pub annual_return_pct: Percent,
}

/// Corpus that would be required if retiring at `age`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementProjectionRow {
    pub age: u32,
    pub monthly_expense: Money,
    pub corpus_required: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementOutput {
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    /// Thirty times today's annual expenses.
    pub fire_corpus_today: Money,
    pub monthly_expense_at_retirement: Money,
    pub annual_expense_at_retirement: Money,
    /// Future value of the inflated annual expense over the retirement years.
    pub corpus_required: Money,
    /// Thirty times the inflated annual expense.
    pub fire_corpus_at_retirement: Money,
    pub projection: Vec<RetirementProjectionRow>,
    pub summary: Vec<SummaryField>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn plan_retirement(input: &RetirementInput) -> FinCalcResult<ComputationOutput<RetirementOutput>> {
    let start = Instant::now();
    validate(input)?;

    let years_to_retirement = input.retirement_age - input.current_age;
    let years_in_retirement = input.income_until_age - input.retirement_age;
    let inflation = annual_rate(input.inflation_pct);
    let ret = annual_rate(input.annual_return_pct);

    let fire_corpus_today = fire_corpus(input.monthly_expense)?;

    let mut projection: Vec<RetirementProjectionRow> = Vec::with_capacity(years_to_retirement as usize);
    for year in 1..=years_to_retirement {
        let monthly = fv_lump_sum(input.monthly_expense, inflation, year, "monthly_expense")?;
        let annual = in_range(monthly.checked_mul(dec!(12)), "monthly_expense")?;
        projection.push(RetirementProjectionRow {
            age: input.current_age + year,
            monthly_expense: monthly,
            corpus_required: fv_ordinary_annuity(annual, ret, years_in_retirement, "monthly_expense")?,
        });
    }

    // The projection always ends at the retirement age.
    let (monthly_expense_at_retirement, corpus_required) = projection
        .last()
        .map(|row| (row.monthly_expense, row.corpus_required))
        .ok_or_else(|| FinCalcError::invalid("retirement_age", "must be after current_age"))?;
    let annual_expense_at_retirement = monthly_expense_at_retirement * dec!(12);
    let fire_corpus_at_retirement = fire_corpus(monthly_expense_at_retirement)?;

    tracing::debug!(
        years_to_retirement,
        years_in_retirement,
        %corpus_required,
        "retirement plan computed"
    );

    let summary = vec![
        SummaryField::new("Current Age", input.current_age.to_string()),
        SummaryField::new("Retirement Age", input.retirement_age.to_string()),
        SummaryField::new("Monthly Expense Today", format_inr(input.monthly_expense)),
        SummaryField::new("Inflation Rate", format_pct(input.inflation_pct)),
        SummaryField::new("Expected Returns", format_pct(input.annual_return_pct)),
        SummaryField::new("Years to Retire", years_to_retirement.to_string()),
        SummaryField::new("Corpus at Retirement", format_inr(corpus_required)),
        SummaryField::new("FIRE Corpus Today", format_inr(fire_corpus_today)),
    ];

    let output = RetirementOutput {
        years_to_retirement,
        years_in_retirement,
        fire_corpus_today,
        monthly_expense_at_retirement,
        annual_expense_at_retirement,
        corpus_required,
        fire_corpus_at_retirement,
        projection,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Retirement corpus (inflated expenses, ordinary annuity FV over retirement years)",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

fn fire_corpus(monthly_expense: Money) -> FinCalcResult<Money> {
    in_range(
        monthly_expense
            .checked_mul(dec!(12))
            .and_then(|annual| annual.checked_mul(FIRE_MULTIPLE)),
        "monthly_expense",
    )
}

fn validate(input: &RetirementInput) -> FinCalcResult<()> {
    if input.retirement_age <= input.current_age {
        return Err(FinCalcError::invalid(
            "retirement_age",
            "must be greater than current_age",
        ));
    }
    if input.income_until_age <= input.retirement_age {
        return Err(FinCalcError::invalid(
            "income_until_age",
            "must be greater than retirement_age",
        ));
    }
    if input.income_until_age > MAX_AGE {
        return Err(FinCalcError::invalid(
            "income_until_age",
            format!("must be at most {MAX_AGE}"),
        ));
    }
    if input.monthly_expense <= Decimal::ZERO {
        return Err(FinCalcError::invalid("monthly_expense", "must be > 0"));
    }
    if input.inflation_pct < Decimal::ZERO || input.inflation_pct > MAX_RATE_PCT {
        return Err(FinCalcError::invalid(
            "inflation_pct",
            format!("must be between 0% and {MAX_RATE_PCT}%"),
        ));
    }
    if input.annual_return_pct < Decimal::ZERO || input.annual_return_pct > MAX_RATE_PCT {
        return Err(FinCalcError::invalid(
            "annual_return_pct",
            format!("must be between 0% and {MAX_RATE_PCT}%"),
        ));
    }
    Ok(())
}
