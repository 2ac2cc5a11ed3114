use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::loans::formulas::{self, require_positive};
use crate::time_value::format_inr;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

pub const MIN_LOANS: usize = 2;
pub const MAX_LOANS: usize = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanQuote {
    /// Defaults to "Loan <n>" (1-based position).
    #[serde(default)]
    pub label: Option<String>,
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonInput {
    pub loans: Vec<LoanQuote>,
}

/// One loan's cost, with figures rounded to 2 dp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonRow {
    pub loan: String,
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub tenure_years: u32,
    pub emi: Money,
    pub total_payment: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonOutput {
    pub loans: Vec<LoanComparisonRow>,
    pub lowest_total_interest: String,
    pub lowest_emi: String,
    pub summary: Vec<SummaryField>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compare EMI, total payment and total interest across two to five loans.
pub fn compare_loans(
    input: &LoanComparisonInput,
) -> FinCalcResult<ComputationOutput<LoanComparisonOutput>> {
    let start = Instant::now();

    if input.loans.len() < MIN_LOANS || input.loans.len() > MAX_LOANS {
        return Err(FinCalcError::invalid(
            "loans",
            format!(
                "between {MIN_LOANS} and {MAX_LOANS} loans are required, got {}",
                input.loans.len()
            ),
        ));
    }

    let mut rows: Vec<LoanComparisonRow> = Vec::with_capacity(input.loans.len());
    for (idx, quote) in input.loans.iter().enumerate() {
        require_positive("principal", quote.principal)?;
        if quote.annual_rate_pct < dec!(1) || quote.annual_rate_pct > dec!(50) {
            return Err(FinCalcError::invalid(
                "annual_rate_pct",
                format!("loan {} rate must be between 1% and 50%", idx + 1),
            ));
        }
        if quote.tenure_years == 0 || quote.tenure_years > 40 {
            return Err(FinCalcError::invalid(
                "tenure_years",
                format!("loan {} tenure must be between 1 and 40 years", idx + 1),
            ));
        }

        let months = quote.tenure_years * 12;
        let emi = formulas::emi(quote.principal, quote.annual_rate_pct, months)?;
        let total_payment = emi * Decimal::from(months);
        let total_interest = total_payment - quote.principal;

        rows.push(LoanComparisonRow {
            loan: quote
                .label
                .clone()
                .unwrap_or_else(|| format!("Loan {}", idx + 1)),
            principal: quote.principal,
            annual_rate_pct: quote.annual_rate_pct,
            tenure_years: quote.tenure_years,
            emi: emi.round_dp(2),
            total_payment: total_payment.round_dp(2),
            total_interest: total_interest.round_dp(2),
        });
    }

    // First loan wins ties
    let cheapest = rows
        .iter()
        .reduce(|best, row| if row.total_interest < best.total_interest { row } else { best })
        .map(|r| r.loan.clone())
        .unwrap_or_default();
    let lowest_emi = rows
        .iter()
        .reduce(|best, row| if row.emi < best.emi { row } else { best })
        .map(|r| r.loan.clone())
        .unwrap_or_default();

    let mut summary: Vec<SummaryField> = rows
        .iter()
        .map(|r| {
            SummaryField::new(
                &r.loan,
                format!(
                    "EMI {}, interest {}",
                    format_inr(r.emi),
                    format_inr(r.total_interest)
                ),
            )
        })
        .collect();
    summary.push(SummaryField::new("Lowest Total Interest", cheapest.clone()));
    summary.push(SummaryField::new("Lowest EMI", lowest_emi.clone()));

    let output = LoanComparisonOutput {
        loans: rows,
        lowest_total_interest: cheapest,
        lowest_emi,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Side-by-side loan comparison (EMI, total payment, total interest)",
        &serde_json::json!({ "loan_count": input.loans.len() }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
