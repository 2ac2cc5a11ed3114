//! Loan calculators: closed-form EMI formulas, the bisection rate solver,
//! the four-way solver, amortization with prepayment and loan comparison.

pub mod amortization;
pub mod bisection;
pub mod comparison;
pub mod formulas;
pub mod solve;
