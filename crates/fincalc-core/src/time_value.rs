use chrono::{Datelike, Local, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::FinCalcError;
use crate::types::{Money, Percent, Rate};
use crate::FinCalcResult;

/// Convert an annual percentage (8.5) into a monthly decimal rate.
pub fn monthly_rate(annual_pct: Percent) -> Rate {
    annual_pct / dec!(1200)
}

/// Convert a percentage (8.5) into a decimal rate (0.085).
pub fn annual_rate(annual_pct: Percent) -> Rate {
    annual_pct / dec!(100)
}

/// (1 + r)^n, or `None` when the factor leaves the decimal range.
pub fn compound(rate: Rate, periods: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powu(u64::from(periods))
}

pub(crate) fn compound_or_err(rate: Rate, periods: u32, field: &str) -> FinCalcResult<Decimal> {
    compound(rate, periods).ok_or_else(|| {
        FinCalcError::invalid(field, format!("compounding over {periods} periods overflows"))
    })
}

/// Unwrap a checked Decimal operation, blaming `field` on overflow.
pub(crate) fn in_range(value: Option<Decimal>, field: &str) -> FinCalcResult<Decimal> {
    value.ok_or_else(|| FinCalcError::invalid(field, "result overflows the decimal range"))
}

/// Future value of a level payment made at the start of each period:
/// FV = pmt * [((1+r)^n - 1) / r] * (1+r)
///
/// `field` names the input reported when the result overflows.
pub fn fv_annuity_due(pmt: Money, rate: Rate, periods: u32, field: &str) -> FinCalcResult<Money> {
    let ordinary = fv_ordinary_annuity(pmt, rate, periods, field)?;
    in_range(ordinary.checked_mul(Decimal::ONE + rate), field)
}

/// Future value of a level payment made at the end of each period:
/// FV = pmt * [((1+r)^n - 1) / r]
pub fn fv_ordinary_annuity(pmt: Money, rate: Rate, periods: u32, field: &str) -> FinCalcResult<Money> {
    if rate.is_zero() {
        return in_range(pmt.checked_mul(Decimal::from(periods)), field);
    }
    let factor = compound_or_err(rate, periods, field)?;
    let growth = in_range((factor - Decimal::ONE).checked_div(rate), field)?;
    in_range(pmt.checked_mul(growth), field)
}

/// Future value of a single amount: FV = amount * (1+r)^n
pub fn fv_lump_sum(amount: Money, rate: Rate, periods: u32, field: &str) -> FinCalcResult<Money> {
    let factor = compound_or_err(rate, periods, field)?;
    in_range(amount.checked_mul(factor), field)
}

/// First day of the start month (today's month when none is given).
/// Schedule row `k` is dated `k` months after this anchor.
pub fn schedule_anchor(start_date: Option<NaiveDate>) -> FinCalcResult<NaiveDate> {
    start_date
        .unwrap_or_else(|| Local::now().date_naive())
        .with_day(1)
        .ok_or_else(|| FinCalcError::DateError("cannot move start date to the 1st".into()))
}

pub fn add_months(anchor: NaiveDate, months: u32) -> FinCalcResult<NaiveDate> {
    anchor
        .checked_add_months(Months::new(months))
        .ok_or_else(|| FinCalcError::DateError(format!("{anchor} + {months} months is out of range")))
}

pub fn add_years(anchor: NaiveDate, years: u32) -> FinCalcResult<NaiveDate> {
    let months = years
        .checked_mul(12)
        .ok_or_else(|| FinCalcError::DateError(format!("{years} years is out of range")))?;
    add_months(anchor, months)
}

/// Whole rupees with Indian digit grouping: 2500000 -> "₹25,00,000".
/// Fractions are truncated, not rounded.
pub fn format_inr(amount: Money) -> String {
    let whole = amount.trunc();
    let sign = if whole.is_sign_negative() && !whole.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = whole.abs().to_string();
    let digits = digits.split('.').next().unwrap_or("0");

    let grouped = if digits.len() <= 3 {
        digits.to_string()
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    format!("{sign}₹{grouped}")
}

/// Two-decimal percentage label: 8.5 -> "8.50%".
pub fn format_pct(pct: Percent) -> String {
    format!("{:.2}%", pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
    }

    #[test]
    fn test_compound_overflow_is_none() {
        assert!(compound(dec!(1.0), 200).is_none());
        assert_eq!(compound(dec!(0.1), 2), Some(dec!(1.21)));
    }

    #[test]
    fn test_fv_annuity_due_zero_rate() {
        let result = fv_annuity_due(dec!(1000), Decimal::ZERO, 12, "rate").unwrap();
        assert_eq!(result, dec!(12000));
    }

    #[test]
    fn test_fv_ordinary_annuity() {
        // 100 at the end of each of 3 years at 10%: 100 + 110 + 121
        let result = fv_ordinary_annuity(dec!(100), dec!(0.10), 3, "rate").unwrap();
        assert!((result - dec!(331)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_fv_annuity_due_one_period_ahead_of_ordinary() {
        let due = fv_annuity_due(dec!(100), dec!(0.10), 3, "rate").unwrap();
        let ordinary = fv_ordinary_annuity(dec!(100), dec!(0.10), 3, "rate").unwrap();
        assert!((due - ordinary * dec!(1.1)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_fv_overflow_names_field() {
        // (1.1)^600 is in range but the payment pushes the product past it
        let err = fv_annuity_due(dec!(100_000_000_000_000_000_000), dec!(0.1), 600, "monthly_investment").unwrap_err();
        match err {
            FinCalcError::InvalidInput { field, .. } => assert_eq!(field, "monthly_investment"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert!(fv_lump_sum(Decimal::MAX, dec!(0.5), 2, "amount").is_err());
        assert!(fv_ordinary_annuity(Decimal::MAX, Decimal::ZERO, 2, "amount").is_err());
    }

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(dec!(999)), "₹999");
        assert_eq!(format_inr(dec!(1000)), "₹1,000");
        assert_eq!(format_inr(dec!(100000)), "₹1,00,000");
        assert_eq!(format_inr(dec!(2500000)), "₹25,00,000");
        assert_eq!(format_inr(dec!(123456789.99)), "₹12,34,56,789");
        assert_eq!(format_inr(dec!(-21695.58)), "-₹21,695");
        assert_eq!(format_inr(dec!(0.4)), "₹0");
    }

    #[test]
    fn test_schedule_anchor_moves_to_first() {
        let anchor = schedule_anchor(NaiveDate::from_ymd_opt(2024, 1, 31)).unwrap();
        assert_eq!(anchor, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(
            add_months(anchor, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        assert_eq!(
            add_years(anchor, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(dec!(8.5)), "8.50%");
    }
}
