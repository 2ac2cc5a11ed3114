//! Month-by-month amortization with optional prepayments.
//!
//! Each month the installment is split into interest on the outstanding
//! balance and a principal component; a prepayment due that month is then
//! applied against the balance. Under [`ReductionMode::ReduceEmi`] every
//! prepayment re-amortizes the remaining balance over the months left in the
//! original term, permanently changing the installment. Under
//! [`ReductionMode::ReduceTenure`] the installment is unchanged and the loan
//! simply finishes early.
//!
//! The loop is capped at [`MAX_SCHEDULE_MONTHS`] regardless of the term.
//! Hitting the cap with principal outstanding is reported as
//! [`AmortizationStatus::SafetyCapReached`], never as a normal schedule.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::loans::formulas::{self, require_positive, require_rate, TenureBreakdown};
use crate::time_value::{add_months, format_inr, format_pct, monthly_rate, schedule_anchor};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, SummaryField};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard bound on schedule length, independent of the loan term.
pub const MAX_SCHEDULE_MONTHS: u32 = 1000;

/// Balances below one paisa are treated as settled.
const BALANCE_EPSILON: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual rate in percent (8.5 = 8.5% p.a.).
    pub annual_rate_pct: Percent,
    pub term_months: u32,
}

/// When extra payments are made against principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrepaymentPolicy {
    #[default]
    None,
    /// A single payment in `start_month`.
    OneTime { amount: Money, start_month: u32 },
    /// Every twelfth month from `start_month` onwards.
    Yearly { amount: Money, start_month: u32 },
    /// Every month from `start_month` onwards.
    Monthly { amount: Money, start_month: u32 },
}

impl PrepaymentPolicy {
    /// Prepayment scheduled for the given 1-based month, if any.
    pub fn due_in(&self, month: u32) -> Option<Money> {
        match *self {
            PrepaymentPolicy::None => None,
            PrepaymentPolicy::OneTime {
                amount,
                start_month,
            } => (month == start_month).then_some(amount),
            PrepaymentPolicy::Yearly {
                amount,
                start_month,
            } => (month >= start_month && (month - start_month) % 12 == 0).then_some(amount),
            PrepaymentPolicy::Monthly {
                amount,
                start_month,
            } => (month >= start_month).then_some(amount),
        }
    }

    pub fn start_month(&self) -> Option<u32> {
        match *self {
            PrepaymentPolicy::None => None,
            PrepaymentPolicy::OneTime { start_month, .. }
            | PrepaymentPolicy::Yearly { start_month, .. }
            | PrepaymentPolicy::Monthly { start_month, .. } => Some(start_month),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrepaymentPolicy::None => "None",
            PrepaymentPolicy::OneTime { .. } => "One-time",
            PrepaymentPolicy::Yearly { .. } => "Yearly",
            PrepaymentPolicy::Monthly { .. } => "Monthly",
        }
    }

    fn validate(&self) -> FinCalcResult<()> {
        match *self {
            PrepaymentPolicy::None => Ok(()),
            PrepaymentPolicy::OneTime {
                amount,
                start_month,
            }
            | PrepaymentPolicy::Yearly {
                amount,
                start_month,
            }
            | PrepaymentPolicy::Monthly {
                amount,
                start_month,
            } => {
                require_positive("prepayment.amount", amount)?;
                if start_month == 0 {
                    return Err(FinCalcError::invalid(
                        "prepayment.start_month",
                        "start month is 1-based and must be >= 1",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// What a prepayment shortens: the remaining tenure or the installment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionMode {
    #[default]
    ReduceTenure,
    ReduceEmi,
}

impl ReductionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ReductionMode::ReduceTenure => "Reduce Tenure",
            ReductionMode::ReduceEmi => "Reduce EMI",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(default)]
    pub prepayment: PrepaymentPolicy,
    #[serde(default)]
    pub reduction_mode: ReductionMode,
    /// Reference date for row dates; row `m` falls on the first of the
    /// month `m` months later. Defaults to today.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub date: NaiveDate,
    /// Installment in force this month.
    pub emi: Money,
    pub interest: Money,
    /// Principal repaid by the installment, excluding any prepayment.
    pub principal_component: Money,
    pub prepayment: Money,
    pub principal_remaining: Money,
    /// Running total of installments actually paid (prepayments excluded).
    pub cumulative_paid: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AmortizationStatus {
    Amortized,
    /// The month cap was reached with principal still outstanding.
    SafetyCapReached { remaining_principal: Money },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub initial_emi: Money,
    /// Installment at the end of the schedule; differs from `initial_emi`
    /// only under `ReduceEmi`.
    pub final_emi: Money,
    pub total_months: u32,
    pub actual_tenure: TenureBreakdown,
    pub total_interest_paid: Money,
    pub total_prepaid: Money,
    /// Installments plus prepayments.
    pub total_paid: Money,
    /// `initial_emi * term_months`, the no-prepayment baseline.
    pub original_total_payment: Money,
    pub original_total_interest: Money,
    pub interest_saved: Money,
    pub months_saved: u32,
    pub status: AmortizationStatus,
    pub schedule: Vec<ScheduleRow>,
    pub summary: Vec<SummaryField>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn amortize(input: &AmortizationInput) -> FinCalcResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let terms = &input.terms;

    // --- Validation ---
    require_positive("principal", terms.principal)?;
    require_rate("annual_rate_pct", terms.annual_rate_pct)?;
    if terms.term_months == 0 {
        return Err(FinCalcError::invalid("term_months", "term must be at least one month"));
    }
    input.prepayment.validate()?;
    if let Some(start_month) = input.prepayment.start_month() {
        if start_month > terms.term_months {
            warnings.push(format!(
                "Prepayment starts in month {} but the term is only {} months",
                start_month, terms.term_months
            ));
        }
    }

    let reference = schedule_anchor(input.start_date)?;

    tracing::debug!(
        principal = %terms.principal,
        annual_rate_pct = %terms.annual_rate_pct,
        term_months = terms.term_months,
        prepayment = input.prepayment.label(),
        reduction_mode = input.reduction_mode.label(),
        "building amortization schedule"
    );

    let i = monthly_rate(terms.annual_rate_pct);
    let initial_emi = formulas::emi(terms.principal, terms.annual_rate_pct, terms.term_months)?;
    let original_total_payment = initial_emi * Decimal::from(terms.term_months);

    let mut current_emi = initial_emi;
    let mut remaining = terms.principal;
    let mut month: u32 = 0;
    let mut total_interest = Decimal::ZERO;
    let mut total_prepaid = Decimal::ZERO;
    let mut cumulative_paid = Decimal::ZERO;
    let mut schedule: Vec<ScheduleRow> =
        Vec::with_capacity(terms.term_months.min(MAX_SCHEDULE_MONTHS) as usize);

    while remaining > Decimal::ZERO && month < MAX_SCHEDULE_MONTHS {
        month += 1;
        let emi_this_month = current_emi;

        let interest = remaining * i;
        let mut principal_component = current_emi - interest;
        remaining -= principal_component;
        total_interest += interest;

        // Prepayment never takes the balance below zero
        let mut prepayment = Decimal::ZERO;
        if let Some(amount) = input.prepayment.due_in(month) {
            if remaining > Decimal::ZERO {
                prepayment = amount.min(remaining);
                remaining -= prepayment;
                total_prepaid += prepayment;

                if input.reduction_mode == ReductionMode::ReduceEmi && remaining > BALANCE_EPSILON {
                    let months_left = terms.term_months.saturating_sub(month).max(1);
                    current_emi = formulas::emi(remaining, terms.annual_rate_pct, months_left)?;
                }
            }
        }

        // Overshoot (or a sub-paisa residual) belongs to this installment
        if remaining < BALANCE_EPSILON {
            principal_component += remaining;
            remaining = Decimal::ZERO;
        }

        cumulative_paid += interest + principal_component;

        let date = add_months(reference, month)?;

        schedule.push(ScheduleRow {
            month,
            date,
            emi: emi_this_month,
            interest,
            principal_component,
            prepayment,
            principal_remaining: remaining,
            cumulative_paid,
        });
    }

    let status = if remaining > Decimal::ZERO {
        tracing::warn!(
            months = month,
            remaining = %remaining,
            "amortization hit the safety cap with principal outstanding"
        );
        warnings.push(format!(
            "Loan did not amortize within {} months; {} principal remains",
            MAX_SCHEDULE_MONTHS,
            remaining.round_dp(2)
        ));
        AmortizationStatus::SafetyCapReached {
            remaining_principal: remaining,
        }
    } else {
        AmortizationStatus::Amortized
    };

    let total_months = month;
    let actual_tenure = TenureBreakdown::from_months(total_months);
    let original_total_interest = original_total_payment - terms.principal;
    let interest_saved = original_total_interest - total_interest;
    let total_paid = cumulative_paid + total_prepaid;

    tracing::debug!(
        total_months,
        total_interest = %total_interest,
        final_emi = %current_emi,
        "amortization schedule complete"
    );

    let summary = vec![
        SummaryField::new("Loan Amount", format_inr(terms.principal)),
        SummaryField::new("Interest Rate", format_pct(terms.annual_rate_pct)),
        SummaryField::new(
            "Original Tenure",
            TenureBreakdown::from_months(terms.term_months).label(),
        ),
        SummaryField::new("Final Tenure", format!("{total_months} months")),
        SummaryField::new("Actual Tenure", actual_tenure.label()),
        SummaryField::new("Monthly EMI", format_inr(current_emi)),
        SummaryField::new("Prepayment Type", input.prepayment.label()),
        SummaryField::new("Prepayment Impact", input.reduction_mode.label()),
        SummaryField::new("Total Payment", format_inr(total_paid)),
        SummaryField::new("Total Interest Paid", format_inr(total_interest)),
        SummaryField::new("Interest Saved", format_inr(interest_saved)),
    ];

    let output = AmortizationOutput {
        initial_emi,
        final_emi: current_emi,
        total_months,
        actual_tenure,
        total_interest_paid: total_interest,
        total_prepaid,
        total_paid,
        original_total_payment,
        original_total_interest,
        interest_saved,
        months_saved: terms.term_months.saturating_sub(total_months),
        status,
        schedule,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization with prepayment (monthly reducing balance)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_pct": terms.annual_rate_pct.to_string(),
            "term_months": terms.term_months,
            "prepayment": input.prepayment.label(),
            "reduction_mode": input.reduction_mode.label(),
            "start_date": reference.to_string(),
            "max_schedule_months": MAX_SCHEDULE_MONTHS,
        }),
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

    fn home_loan(prepayment: PrepaymentPolicy, reduction_mode: ReductionMode) -> AmortizationInput {
        AmortizationInput {
            terms: LoanTerms {
                principal: dec!(2_500_000),
                annual_rate_pct: dec!(8.5),
                term_months: 240,
            },
            prepayment,
            reduction_mode,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 15),
        }
    }

    #[test]
    fn test_trigger_rules() {
        let one_time = PrepaymentPolicy::OneTime {
            amount: dec!(100),
            start_month: 12,
        };
        assert_eq!(one_time.due_in(11), None);
        assert_eq!(one_time.due_in(12), Some(dec!(100)));
        assert_eq!(one_time.due_in(24), None);

        let yearly = PrepaymentPolicy::Yearly {
            amount: dec!(100),
            start_month: 6,
        };
        assert_eq!(yearly.due_in(5), None);
        assert_eq!(yearly.due_in(6), Some(dec!(100)));
        assert_eq!(yearly.due_in(7), None);
        assert_eq!(yearly.due_in(18), Some(dec!(100)));

        let monthly = PrepaymentPolicy::Monthly {
            amount: dec!(100),
            start_month: 3,
        };
        assert_eq!(monthly.due_in(2), None);
        assert_eq!(monthly.due_in(3), Some(dec!(100)));
        assert_eq!(monthly.due_in(4), Some(dec!(100)));

        assert_eq!(PrepaymentPolicy::None.due_in(1), None);
    }

    #[test]
    fn test_rows_dated_first_of_following_months() {
        let out = amortize(&home_loan(PrepaymentPolicy::None, ReductionMode::ReduceTenure)).unwrap();
        let schedule = &out.result.schedule;

        assert_eq!(schedule[0].date, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(schedule[11].date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_first_month_split() {
        let out = amortize(&home_loan(PrepaymentPolicy::None, ReductionMode::ReduceTenure)).unwrap();
        let first = &out.result.schedule[0];

        // 25,00,000 * 8.5 / 1200
        assert!((first.interest - dec!(17708.333333)).abs() < dec!(0.001));
        assert!((first.principal_component + first.interest - first.emi).abs() < dec!(0.0000001));
        assert!((first.cumulative_paid - first.emi).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_prepayment_larger_than_balance_settles_loan() {
        let input = AmortizationInput {
            terms: LoanTerms {
                principal: dec!(100_000),
                annual_rate_pct: dec!(10),
                term_months: 24,
            },
            prepayment: PrepaymentPolicy::OneTime {
                amount: dec!(1_000_000),
                start_month: 3,
            },
            reduction_mode: ReductionMode::ReduceEmi,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        };
        let out = amortize(&input).unwrap();
        let r = &out.result;
        let last = r.schedule.last().unwrap();

        assert_eq!(r.total_months, 3);
        assert_eq!(last.principal_remaining, Decimal::ZERO);
        // Only the outstanding balance is taken, and the installment is unchanged
        assert!(last.prepayment < dec!(100_000));
        assert!((last.principal_component + last.interest - last.emi).abs() < dec!(0.0000001));
        assert_eq!(r.final_emi, r.initial_emi);
    }

    #[test]
    fn test_zero_rate_loan_repays_in_equal_slices() {
        let input = AmortizationInput {
            terms: LoanTerms {
                principal: dec!(100_000),
                annual_rate_pct: Decimal::ZERO,
                term_months: 3,
            },
            prepayment: PrepaymentPolicy::None,
            reduction_mode: ReductionMode::ReduceTenure,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        };
        let out = amortize(&input).unwrap();

        assert_eq!(out.result.total_months, 3);
        assert_eq!(out.result.total_interest_paid, Decimal::ZERO);
        assert_eq!(out.result.status, AmortizationStatus::Amortized);
    }

    #[test]
    fn test_rejects_zero_start_month() {
        let input = home_loan(
            PrepaymentPolicy::Monthly {
                amount: dec!(5_000),
                start_month: 0,
            },
            ReductionMode::ReduceTenure,
        );
        assert!(matches!(amortize(&input), Err(FinCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_non_positive_prepayment() {
        let input = home_loan(
            PrepaymentPolicy::Yearly {
                amount: Decimal::ZERO,
                start_month: 12,
            },
            ReductionMode::ReduceTenure,
        );
        assert!(matches!(amortize(&input), Err(FinCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_late_start_month_warns() {
        let input = home_loan(
            PrepaymentPolicy::OneTime {
                amount: dec!(100_000),
                start_month: 300,
            },
            ReductionMode::ReduceTenure,
        );
        let out = amortize(&input).unwrap();
        assert_eq!(out.result.total_months, 240);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_input_from_json() {
        let input: AmortizationInput = serde_json::from_str(
            r#"{
                "principal": "2500000",
                "annual_rate_pct": "8.5",
                "term_months": 240,
                "prepayment": {"kind": "one_time", "amount": "100000", "start_month": 12},
                "reduction_mode": "reduce_emi",
                "start_date": "2025-01-01"
            }"#,
        )
        .unwrap();

        assert_eq!(input.terms.term_months, 240);
        assert_eq!(input.reduction_mode, ReductionMode::ReduceEmi);
        assert_eq!(
            input.prepayment,
            PrepaymentPolicy::OneTime {
                amount: dec!(100000),
                start_month: 12
            }
        );
    }

    #[test]
    fn test_input_from_json_defaults() {
        let input: AmortizationInput = serde_json::from_str(
            r#"{"principal": "500000", "annual_rate_pct": "9", "term_months": 60}"#,
        )
        .unwrap();

        assert_eq!(input.prepayment, PrepaymentPolicy::None);
        assert_eq!(input.reduction_mode, ReductionMode::ReduceTenure);
        assert!(input.start_date.is_none());
    }
}
