use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::investments::inflation_adjusted_sip::{self, InflationAdjustedSipInput};
use fincalc_core::investments::lumpsum::{self, LumpsumInput};
use fincalc_core::investments::sip::{self, SipInput};
use fincalc_core::investments::step_up_sip::{self, StepUpSipInput};

use crate::input;

/// Arguments for the SIP calculation
#[derive(Args)]
pub struct SipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly investment
    #[arg(long, default_value = "10000")]
    pub monthly: Decimal,

    /// Duration in years
    #[arg(long, default_value_t = 20)]
    pub years: u32,

    /// Expected annual return in percent
    #[arg(long, default_value = "12")]
    pub return_pct: Decimal,

    /// First instalment date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sip_input = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => SipInput {
            monthly_investment: args.monthly,
            years: args.years,
            annual_return_pct: args.return_pct,
            start_date: args.start_date,
        },
    };
    let result = sip::calculate_sip(&sip_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the step-up SIP calculation
#[derive(Args)]
pub struct StepUpSipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial monthly investment
    #[arg(long, default_value = "10000")]
    pub monthly: Decimal,

    /// Yearly increase in the instalment, in percent
    #[arg(long, default_value = "10")]
    pub step_up: Decimal,

    /// Duration in years
    #[arg(long, default_value_t = 20)]
    pub years: u32,

    /// Expected annual return in percent
    #[arg(long, default_value = "12")]
    pub return_pct: Decimal,

    /// First instalment date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_step_up_sip(args: StepUpSipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let step_input = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => StepUpSipInput {
            initial_monthly_investment: args.monthly,
            annual_step_up_pct: args.step_up,
            years: args.years,
            annual_return_pct: args.return_pct,
            start_date: args.start_date,
        },
    };
    let result = step_up_sip::calculate_step_up_sip(&step_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for lumpsum growth
#[derive(Args)]
pub struct LumpsumArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount invested
    #[arg(long, default_value = "100000")]
    pub amount: Decimal,

    /// Annual return in percent
    #[arg(long, default_value = "10")]
    pub return_pct: Decimal,

    /// Duration in years
    #[arg(long, default_value_t = 10)]
    pub years: u32,

    /// Investment date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_lumpsum(args: LumpsumArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lump_input = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LumpsumInput {
            amount: args.amount,
            annual_return_pct: args.return_pct,
            years: args.years,
            start_date: args.start_date,
        },
    };
    let result = lumpsum::calculate_lumpsum(&lump_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the inflation-adjusted SIP
#[derive(Args)]
pub struct InflationSipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly investment
    #[arg(long, default_value = "5000")]
    pub monthly: Decimal,

    /// Expected annual return in percent
    #[arg(long, default_value = "12")]
    pub return_pct: Decimal,

    /// Expected annual inflation in percent
    #[arg(long, default_value = "6")]
    pub inflation: Decimal,

    /// Duration in years
    #[arg(long, default_value_t = 20)]
    pub years: u32,
}

pub fn run_inflation_sip(args: InflationSipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let infl_input = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => InflationAdjustedSipInput {
            monthly_investment: args.monthly,
            annual_return_pct: args.return_pct,
            inflation_pct: args.inflation,
            years: args.years,
        },
    };
    let result = inflation_adjusted_sip::calculate_inflation_adjusted_sip(&infl_input)?;
    Ok(serde_json::to_value(result)?)
}
