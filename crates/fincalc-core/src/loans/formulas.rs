//! Closed-form loan formulas over `{principal, annual rate, months, EMI}`.
//!
//! Every formula special-cases a zero rate (straight-line repayment) instead
//! of dividing by a zero monthly rate, and the tenure formula rejects
//! payments that never amortize rather than producing a NaN-equivalent.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::loans::bisection::{bisect_increasing, BisectionConfig};
use crate::time_value::{compound, monthly_rate};
use crate::types::{Money, Percent};
use crate::FinCalcResult;

/// Lower edge of the annual-rate search bracket, in percent.
pub const RATE_SEARCH_LOW_PCT: Decimal = dec!(0.01);

/// Upper edge of the annual-rate search bracket, in percent.
pub const RATE_SEARCH_HIGH_PCT: Decimal = dec!(100.0);

/// Interest rate implied by a payment, as found by bisection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSolution {
    pub annual_rate_pct: Percent,
    pub iterations: u32,
    /// False when the iteration budget ran out; the rate is then a
    /// best-effort estimate.
    pub converged: bool,
    /// EMI at the solved rate minus the target EMI.
    pub residual: Money,
}

/// A month count split into whole years and leftover months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureBreakdown {
    pub years: u32,
    pub months: u32,
}

impl TenureBreakdown {
    pub fn from_months(total_months: u32) -> Self {
        TenureBreakdown {
            years: total_months / 12,
            months: total_months % 12,
        }
    }

    pub fn label(&self) -> String {
        format!("{} years {} months", self.years, self.months)
    }
}

pub(crate) fn require_positive(field: &str, value: Decimal) -> FinCalcResult<()> {
    if value <= Decimal::ZERO {
        return Err(FinCalcError::invalid(field, format!("{field} must be > 0")));
    }
    Ok(())
}

pub(crate) fn require_rate(field: &str, annual_rate_pct: Percent) -> FinCalcResult<()> {
    if annual_rate_pct < Decimal::ZERO {
        return Err(FinCalcError::invalid(field, "rate must be >= 0"));
    }
    Ok(())
}

fn require_months(months: u32) -> FinCalcResult<()> {
    if months == 0 {
        return Err(FinCalcError::invalid("months", "number of months must be > 0"));
    }
    Ok(())
}

/// Equated monthly installment: P*i / (1 - (1+i)^-n), with i = r/12/100.
///
/// A zero rate repays the principal in equal slices (P / n). If (1+i)^n
/// leaves the decimal range the payment is the interest-only limit P*i.
pub fn emi(principal: Money, annual_rate_pct: Percent, months: u32) -> FinCalcResult<Money> {
    require_positive("principal", principal)?;
    require_rate("annual_rate_pct", annual_rate_pct)?;
    require_months(months)?;

    let i = monthly_rate(annual_rate_pct);
    let straight_line = principal / Decimal::from(months);
    if i.is_zero() {
        return Ok(straight_line);
    }

    match compound(i, months) {
        Some(factor) => {
            let denominator = Decimal::ONE - Decimal::ONE / factor;
            if denominator.is_zero() {
                return Ok(straight_line);
            }
            Ok(principal * i / denominator)
        }
        None => Ok(principal * i),
    }
}

/// Loan amount a given EMI services: EMI * (1 - (1+i)^-n) / i.
pub fn principal(emi: Money, annual_rate_pct: Percent, months: u32) -> FinCalcResult<Money> {
    require_positive("emi", emi)?;
    require_rate("annual_rate_pct", annual_rate_pct)?;
    require_months(months)?;

    let i = monthly_rate(annual_rate_pct);
    if i.is_zero() {
        return Ok(emi * Decimal::from(months));
    }

    match compound(i, months) {
        Some(factor) => Ok(emi * (Decimal::ONE - Decimal::ONE / factor) / i),
        None => Ok(emi / i),
    }
}

/// Fractional number of months to repay `principal` at `emi`:
/// n = ln(EMI / (EMI - P*i)) / ln(1 + i).
///
/// Fails with [`FinCalcError::PaymentInsufficient`] when the EMI does not
/// exceed the first month's interest, since the balance would never fall.
pub fn tenure(principal: Money, emi: Money, annual_rate_pct: Percent) -> FinCalcResult<Decimal> {
    require_positive("principal", principal)?;
    require_positive("emi", emi)?;
    require_rate("annual_rate_pct", annual_rate_pct)?;

    let i = monthly_rate(annual_rate_pct);
    if i.is_zero() {
        return Ok(principal / emi);
    }

    let interest_only = principal * i;
    if emi <= interest_only {
        return Err(FinCalcError::PaymentInsufficient {
            emi,
            interest_only,
        });
    }

    let ratio = emi / (emi - interest_only);
    let numerator = ratio.checked_ln().ok_or_else(|| FinCalcError::DivisionByZero {
        context: "tenure log ratio".into(),
    })?;
    let denominator = (Decimal::ONE + i).checked_ln().unwrap_or(Decimal::ZERO);
    if denominator.is_zero() {
        return Ok(principal / emi);
    }

    Ok(numerator / denominator)
}

/// Annual rate (percent) at which `principal` over `months` costs `emi`,
/// searched on [0.01%, 100%] with the default tolerance of 1e-6.
pub fn interest_rate(principal: Money, emi: Money, months: u32) -> FinCalcResult<RateSolution> {
    interest_rate_with_config(principal, emi, months, &BisectionConfig::default())
}

pub fn interest_rate_with_config(
    principal: Money,
    target_emi: Money,
    months: u32,
    config: &BisectionConfig,
) -> FinCalcResult<RateSolution> {
    require_positive("principal", principal)?;
    require_positive("emi", target_emi)?;
    require_months(months)?;

    let solved = bisect_increasing(
        |rate| emi(principal, rate, months),
        target_emi,
        RATE_SEARCH_LOW_PCT,
        RATE_SEARCH_HIGH_PCT,
        config,
    )?;

    Ok(RateSolution {
        annual_rate_pct: solved.root,
        iterations: solved.iterations,
        converged: solved.converged,
        residual: solved.residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_emi_home_loan_reference() {
        // 25 lakh at 8.5% over 20 years
        let result = emi(dec!(2_500_000), dec!(8.5), 240).unwrap();
        assert!(
            (result - dec!(21695.58)).abs() < dec!(0.01),
            "Expected EMI ~21,695.58, got {}",
            result
        );
    }

    #[test]
    fn test_emi_zero_rate_is_straight_line() {
        let result = emi(dec!(120_000), Decimal::ZERO, 12).unwrap();
        assert_eq!(result, dec!(10_000));
    }

    #[test]
    fn test_emi_single_month_repays_principal_plus_interest() {
        let result = emi(dec!(1200), dec!(12), 1).unwrap();
        assert!((result - dec!(1212)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_emi_overflow_falls_back_to_interest_only() {
        // (1 + 1/12)^5000 is far outside the decimal range
        let result = emi(dec!(1_000_000), dec!(100), 5000).unwrap();
        assert_eq!(result, dec!(1_000_000) * monthly_rate(dec!(100)));
    }

    #[test]
    fn test_emi_rejects_zero_months() {
        let result = emi(dec!(100_000), dec!(8), 0);
        assert!(matches!(result, Err(FinCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_emi_rejects_negative_rate() {
        let result = emi(dec!(100_000), dec!(-1), 12);
        assert!(matches!(result, Err(FinCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_principal_zero_rate() {
        let result = principal(dec!(10_000), Decimal::ZERO, 12).unwrap();
        assert_eq!(result, dec!(120_000));
    }

    #[test]
    fn test_principal_inverts_emi() {
        let payment = emi(dec!(2_500_000), dec!(8.5), 240).unwrap();
        let result = principal(payment, dec!(8.5), 240).unwrap();
        assert!((result - dec!(2_500_000)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_tenure_recovers_term() {
        let payment = emi(dec!(2_500_000), dec!(8.5), 240).unwrap();
        let months = tenure(dec!(2_500_000), payment, dec!(8.5)).unwrap();
        assert!(
            (months - dec!(240)).abs() < dec!(0.01),
            "Expected ~240 months, got {}",
            months
        );
    }

    #[test]
    fn test_tenure_zero_rate() {
        let months = tenure(dec!(100_000), dec!(2_500), Decimal::ZERO).unwrap();
        assert_eq!(months, dec!(40));
    }

    #[test]
    fn test_tenure_rejects_interest_only_payment() {
        // 1% a month on 1,00,000 is exactly 1,000 of interest
        let result = tenure(dec!(100_000), dec!(1_000), dec!(12));
        match result {
            Err(FinCalcError::PaymentInsufficient { interest_only, .. }) => {
                assert_eq!(interest_only, dec!(1_000));
            }
            other => panic!("Expected PaymentInsufficient, got {:?}", other),
        }
    }

    #[test]
    fn test_interest_rate_recovers_ten_percent() {
        let payment = emi(dec!(1_000_000), dec!(10), 120).unwrap();
        let solved = interest_rate(dec!(1_000_000), payment, 120).unwrap();
        assert!(solved.converged);
        assert!(
            (solved.annual_rate_pct - dec!(10)).abs() < dec!(0.0001),
            "Expected ~10%, got {}",
            solved.annual_rate_pct
        );
    }

    #[test]
    fn test_interest_rate_below_bracket_is_flagged() {
        // An EMI below P/n implies a negative rate, which the bracket excludes
        let solved = interest_rate(dec!(120_000), dec!(900), 120).unwrap();
        assert!(!solved.converged);
        assert!(solved.annual_rate_pct < dec!(0.02));
    }
}
