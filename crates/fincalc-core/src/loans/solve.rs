//! Four-way loan solver: given any three of principal, rate, tenure and EMI,
//! solve for the fourth and report the full set.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::loans::formulas::{self, TenureBreakdown};
use crate::time_value::{format_inr, format_pct};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which quantity to solve for, with the three known inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "solve_for", rename_all = "snake_case")]
pub enum LoanSolveRequest {
    Emi {
        principal: Money,
        annual_rate_pct: Percent,
        tenure_months: u32,
    },
    Principal {
        emi: Money,
        annual_rate_pct: Percent,
        tenure_months: u32,
    },
    InterestRate {
        principal: Money,
        emi: Money,
        tenure_months: u32,
    },
    Tenure {
        principal: Money,
        emi: Money,
        annual_rate_pct: Percent,
    },
}

impl LoanSolveRequest {
    /// The `solve_for` tag of this request.
    pub fn target(&self) -> &'static str {
        match self {
            LoanSolveRequest::Emi { .. } => "emi",
            LoanSolveRequest::Principal { .. } => "principal",
            LoanSolveRequest::InterestRate { .. } => "interest_rate",
            LoanSolveRequest::Tenure { .. } => "tenure",
        }
    }
}

/// The complete loan once the unknown has been solved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSolution {
    pub solved_for: String,
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub emi: Money,
    /// Whole months needed (the last installment may be partial).
    pub tenure_months: u32,
    pub tenure_months_exact: Decimal,
    pub tenure: TenureBreakdown,
    pub total_payment: Money,
    pub total_interest: Money,
    /// Only meaningful when solving for the rate; true otherwise.
    pub rate_converged: bool,
    pub summary: Vec<SummaryField>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn solve_loan(request: &LoanSolveRequest) -> FinCalcResult<ComputationOutput<LoanSolution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (principal, annual_rate_pct, emi, months_exact, rate_converged) = match *request {
        LoanSolveRequest::Emi {
            principal,
            annual_rate_pct,
            tenure_months,
        } => {
            let emi = formulas::emi(principal, annual_rate_pct, tenure_months)?;
            (principal, annual_rate_pct, emi, Decimal::from(tenure_months), true)
        }
        LoanSolveRequest::Principal {
            emi,
            annual_rate_pct,
            tenure_months,
        } => {
            let principal = formulas::principal(emi, annual_rate_pct, tenure_months)?;
            (principal, annual_rate_pct, emi, Decimal::from(tenure_months), true)
        }
        LoanSolveRequest::InterestRate {
            principal,
            emi,
            tenure_months,
        } => {
            let solved = formulas::interest_rate(principal, emi, tenure_months)?;
            if !solved.converged {
                warnings.push(format!(
                    "Rate search did not converge within {} iterations; {:.4}% is a low-confidence estimate",
                    solved.iterations, solved.annual_rate_pct
                ));
            }
            (
                principal,
                solved.annual_rate_pct,
                emi,
                Decimal::from(tenure_months),
                solved.converged,
            )
        }
        LoanSolveRequest::Tenure {
            principal,
            emi,
            annual_rate_pct,
        } => {
            let months = formulas::tenure(principal, emi, annual_rate_pct)?;
            if months.fract() != Decimal::ZERO {
                warnings.push("Tenure is fractional; the final installment is smaller than the EMI".into());
            }
            (principal, annual_rate_pct, emi, months, true)
        }
    };

    let tenure_months = months_exact.ceil().to_u32().ok_or_else(|| {
        FinCalcError::invalid("tenure_months", format!("{months_exact} months is out of range"))
    })?;
    let tenure = TenureBreakdown::from_months(tenure_months);
    let total_payment = emi * months_exact;
    let total_interest = total_payment - principal;

    let summary = vec![
        SummaryField::new("Loan Amount", format_inr(principal)),
        SummaryField::new("Interest Rate", format_pct(annual_rate_pct)),
        SummaryField::new("Monthly EMI", format_inr(emi)),
        SummaryField::new("Tenure", tenure.label()),
        SummaryField::new("Total Payment", format_inr(total_payment)),
        SummaryField::new("Total Interest", format_inr(total_interest)),
    ];

    let output = LoanSolution {
        solved_for: request.target().to_string(),
        principal,
        annual_rate_pct,
        emi,
        tenure_months,
        tenure_months_exact: months_exact,
        tenure,
        total_payment,
        total_interest,
        rate_converged,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Four-way loan solver (closed-form EMI/principal/tenure, bisection for rate)",
        request,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_solve_emi_fills_totals() {
        let request = LoanSolveRequest::Emi {
            principal: dec!(2_500_000),
            annual_rate_pct: dec!(8.5),
            tenure_months: 240,
        };
        let out = solve_loan(&request).unwrap();
        let s = &out.result;

        assert_eq!(s.solved_for, "emi");
        assert_eq!(s.tenure, TenureBreakdown { years: 20, months: 0 });
        assert!((s.total_interest - dec!(2_706_939.40)).abs() < dec!(0.5));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_solve_tenure_rounds_up() {
        let request = LoanSolveRequest::Tenure {
            principal: dec!(2_500_000),
            emi: dec!(25_000),
            annual_rate_pct: dec!(8.5),
        };
        let out = solve_loan(&request).unwrap();
        let s = &out.result;

        assert!(s.tenure_months_exact < dec!(240));
        assert_eq!(Decimal::from(s.tenure_months), s.tenure_months_exact.ceil());
        assert_eq!(s.tenure.years * 12 + s.tenure.months, s.tenure_months);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_solve_tenure_insufficient_payment() {
        let request = LoanSolveRequest::Tenure {
            principal: dec!(2_500_000),
            emi: dec!(10_000),
            annual_rate_pct: dec!(8.5),
        };
        assert!(matches!(
            solve_loan(&request),
            Err(FinCalcError::PaymentInsufficient { .. })
        ));
    }

    #[test]
    fn test_solve_rate_from_json_request() {
        let request: LoanSolveRequest = serde_json::from_str(
            r#"{"solve_for":"interest_rate","principal":"1000000","emi":"13215.07","tenure_months":120}"#,
        )
        .unwrap();
        let out = solve_loan(&request).unwrap();
        assert!(out.result.rate_converged);
        assert!((out.result.annual_rate_pct - dec!(10)).abs() < dec!(0.001));
    }

    #[test]
    fn test_solve_rate_below_bracket_warns() {
        // 900 x 120 never repays 120,000, so no positive rate fits
        let request = LoanSolveRequest::InterestRate {
            principal: dec!(120_000),
            emi: dec!(900),
            tenure_months: 120,
        };
        let out = solve_loan(&request).unwrap();

        assert!(!out.result.rate_converged);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("did not converge"));
    }
}
