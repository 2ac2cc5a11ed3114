use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fincalc_core::investments::{inflation_adjusted_sip, lumpsum, sip, step_up_sip};
use fincalc_core::loans::{amortization, comparison, solve};
use fincalc_core::planning::{inflation_forecast, retirement};
use fincalc_core::FinCalcResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run the calculator and serialise its envelope.
fn run_json<I, O>(input_json: &str, calc: impl FnOnce(&I) -> FinCalcResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = calc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

/// Solve for EMI, principal, rate or tenure; the `solve_for` tag picks which.
#[napi]
pub fn solve_loan(input_json: String) -> NapiResult<String> {
    run_json(&input_json, solve::solve_loan)
}

#[napi]
pub fn amortize_loan(input_json: String) -> NapiResult<String> {
    run_json(&input_json, amortization::amortize)
}

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    run_json(&input_json, comparison::compare_loans)
}

// ---------------------------------------------------------------------------
// Investments
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_sip(input_json: String) -> NapiResult<String> {
    run_json(&input_json, sip::calculate_sip)
}

#[napi]
pub fn calculate_step_up_sip(input_json: String) -> NapiResult<String> {
    run_json(&input_json, step_up_sip::calculate_step_up_sip)
}

#[napi]
pub fn calculate_lumpsum(input_json: String) -> NapiResult<String> {
    run_json(&input_json, lumpsum::calculate_lumpsum)
}

#[napi]
pub fn calculate_inflation_adjusted_sip(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        inflation_adjusted_sip::calculate_inflation_adjusted_sip,
    )
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[napi]
pub fn plan_retirement(input_json: String) -> NapiResult<String> {
    run_json(&input_json, retirement::plan_retirement)
}

#[napi]
pub fn forecast_inflation(input_json: String) -> NapiResult<String> {
    run_json(&input_json, inflation_forecast::forecast_inflation)
}
