use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::planning::inflation_forecast::{self, InflationForecastInput};
use fincalc_core::planning::retirement::{self, RetirementInput};

use crate::input;

/// Arguments for the retirement planner
#[derive(Args)]
pub struct RetirementArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current age
    #[arg(long, default_value_t = 25)]
    pub current_age: u32,

    /// Planned retirement age
    #[arg(long, default_value_t = 60)]
    pub retirement_age: u32,

    /// Age until which retirement income is needed
    #[arg(long, default_value_t = 85)]
    pub until_age: u32,

    /// Current monthly expenses
    #[arg(long, default_value = "30000")]
    pub monthly_expense: Decimal,

    /// Expected annual inflation in percent
    #[arg(long, default_value = "6")]
    pub inflation: Decimal,

    /// Expected annual return in percent
    #[arg(long, default_value = "10")]
    pub return_pct: Decimal,
}

pub fn run_retirement(args: RetirementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ret_input = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => RetirementInput {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            income_until_age: args.until_age,
            monthly_expense: args.monthly_expense,
            inflation_pct: args.inflation,
            annual_return_pct: args.return_pct,
        },
    };
    let result = retirement::plan_retirement(&ret_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the inflation forecast
#[derive(Args)]
pub struct InflationForecastArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Last year to forecast
    #[arg(long, default_value_t = 2030)]
    pub until_year: i32,
}

pub fn run_inflation_forecast(
    args: InflationForecastArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let forecast_input = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => InflationForecastInput {
            until_year: args.until_year,
        },
    };
    let result = inflation_forecast::forecast_inflation(&forecast_input)?;
    Ok(serde_json::to_value(result)?)
}
