//! Bracketing solver for monotone functions.
//!
//! Used to back out the interest rate implied by a payment, where no closed
//! form exists. Running out of iterations is a soft failure: the last
//! midpoint is returned with `converged = false` so callers can flag the
//! figure as a low-confidence estimate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::FinCalcResult;

/// Absolute tolerance on `f(x) - target`.
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.000001);

pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BisectionConfig {
    pub tolerance: Decimal,
    pub max_iterations: u32,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        BisectionConfig {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BisectionResult {
    /// Last midpoint evaluated.
    pub root: Decimal,
    pub iterations: u32,
    /// `f(root) - target`.
    pub residual: Decimal,
    pub converged: bool,
}

/// Find `x` in `[low, high]` with `|f(x) - target| < tolerance`, assuming `f`
/// is non-decreasing on the bracket.
///
/// When `f(mid)` overshoots the target the root lies below `mid`, otherwise
/// above it. Errors raised by `f` propagate unchanged.
pub fn bisect_increasing<F>(
    f: F,
    target: Decimal,
    low: Decimal,
    high: Decimal,
    config: &BisectionConfig,
) -> FinCalcResult<BisectionResult>
where
    F: Fn(Decimal) -> FinCalcResult<Decimal>,
{
    if low >= high {
        return Err(FinCalcError::invalid(
            "bracket",
            format!("low bound {low} must be below high bound {high}"),
        ));
    }
    if config.max_iterations == 0 {
        return Err(FinCalcError::invalid(
            "max_iterations",
            "at least one iteration is required",
        ));
    }
    if config.tolerance <= Decimal::ZERO {
        return Err(FinCalcError::invalid("tolerance", "tolerance must be > 0"));
    }

    let mut lo = low;
    let mut hi = high;
    let mut mid = lo;
    let mut residual = Decimal::ZERO;

    for iteration in 0..config.max_iterations {
        mid = (lo + hi) / dec!(2);
        let value = f(mid)?;
        residual = value - target;

        if residual.abs() < config.tolerance {
            return Ok(BisectionResult {
                root: mid,
                iterations: iteration + 1,
                residual,
                converged: true,
            });
        }

        if value > target {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    tracing::warn!(
        root = %mid,
        residual = %residual,
        iterations = config.max_iterations,
        "bisection exhausted its iteration budget without converging"
    );

    Ok(BisectionResult {
        root: mid,
        iterations: config.max_iterations,
        residual,
        converged: false,
    })
}
