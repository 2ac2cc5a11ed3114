use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::loans::amortization::{
    self, AmortizationInput, LoanTerms, PrepaymentPolicy, ReductionMode,
};
use fincalc_core::loans::comparison::{self, LoanComparisonInput, LoanQuote};
use fincalc_core::loans::solve::{self, LoanSolveRequest};

use crate::input;

fn years_to_months(years: u32) -> Result<u32, Box<dyn std::error::Error>> {
    years
        .checked_mul(12)
        .ok_or_else(|| format!("{years} years is too long a tenure").into())
}

/// Read a solver request from `--input`/stdin, refusing one whose
/// `solve_for` belongs to a different subcommand.
fn read_request(
    path: Option<&str>,
    expected: &str,
) -> Result<Option<LoanSolveRequest>, Box<dyn std::error::Error>> {
    input::read_input(path)?
        .map(|request| check_target(request, expected))
        .transpose()
}

fn check_target(
    request: LoanSolveRequest,
    expected: &str,
) -> Result<LoanSolveRequest, Box<dyn std::error::Error>> {
    if request.target() != expected {
        return Err(format!(
            "input asks to solve for '{}' but this command solves for '{}'",
            request.target(),
            expected
        )
        .into());
    }
    Ok(request)
}

fn solve(request: LoanSolveRequest) -> Result<Value, Box<dyn std::error::Error>> {
    let result = solve::solve_loan(&request)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Four-way solver
// ---------------------------------------------------------------------------

/// Arguments for the EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, default_value = "2500000")]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long, default_value = "8.5")]
    pub rate: Decimal,

    /// Tenure in years
    #[arg(long, default_value_t = 20)]
    pub years: u32,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match read_request(args.input.as_deref(), "emi")? {
        Some(request) => request,
        None => LoanSolveRequest::Emi {
            principal: args.principal,
            annual_rate_pct: args.rate,
            tenure_months: years_to_months(args.years)?,
        },
    };
    solve(request)
}

/// Arguments for solving the affordable loan amount
#[derive(Args)]
pub struct PrincipalArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly EMI
    #[arg(long, default_value = "25000")]
    pub emi: Decimal,

    /// Annual interest rate in percent
    #[arg(long, default_value = "8.5")]
    pub rate: Decimal,

    /// Tenure in years
    #[arg(long, default_value_t = 20)]
    pub years: u32,
}

pub fn run_principal(args: PrincipalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match read_request(args.input.as_deref(), "principal")? {
        Some(request) => request,
        None => LoanSolveRequest::Principal {
            emi: args.emi,
            annual_rate_pct: args.rate,
            tenure_months: years_to_months(args.years)?,
        },
    };
    solve(request)
}

/// Arguments for solving the implied interest rate
#[derive(Args)]
pub struct RateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, default_value = "2500000")]
    pub principal: Decimal,

    /// Monthly EMI
    #[arg(long, default_value = "25000")]
    pub emi: Decimal,

    /// Tenure in years
    #[arg(long, default_value_t = 20)]
    pub years: u32,
}

pub fn run_rate(args: RateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match read_request(args.input.as_deref(), "interest_rate")? {
        Some(request) => request,
        None => LoanSolveRequest::InterestRate {
            principal: args.principal,
            emi: args.emi,
            tenure_months: years_to_months(args.years)?,
        },
    };
    solve(request)
}

/// Arguments for solving the repayment tenure
#[derive(Args)]
pub struct TenureArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, default_value = "2500000")]
    pub principal: Decimal,

    /// Monthly EMI
    #[arg(long, default_value = "25000")]
    pub emi: Decimal,

    /// Annual interest rate in percent
    #[arg(long, default_value = "8.5")]
    pub rate: Decimal,
}

pub fn run_tenure(args: TenureArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match read_request(args.input.as_deref(), "tenure")? {
        Some(request) => request,
        None => LoanSolveRequest::Tenure {
            principal: args.principal,
            emi: args.emi,
            annual_rate_pct: args.rate,
        },
    };
    solve(request)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PrepaymentKind {
    None,
    OneTime,
    Yearly,
    Monthly,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReduceArg {
    Tenure,
    Emi,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long, default_value = "2500000")]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long, default_value = "8.5")]
    pub rate: Decimal,

    /// Tenure in years
    #[arg(long, default_value_t = 20)]
    pub years: u32,

    /// Prepayment frequency
    #[arg(long, value_enum, default_value = "none")]
    pub prepayment: PrepaymentKind,

    /// Amount of each prepayment
    #[arg(long, default_value = "100000")]
    pub prepay_amount: Decimal,

    /// Month (1-based) of the first prepayment
    #[arg(long, default_value_t = 12)]
    pub prepay_start: u32,

    /// What a prepayment reduces
    #[arg(long, value_enum, default_value = "tenure")]
    pub reduce: ReduceArg,

    /// Schedule reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let amort_input: AmortizationInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let (amount, start_month) = (args.prepay_amount, args.prepay_start);
            let prepayment = match args.prepayment {
                PrepaymentKind::None => PrepaymentPolicy::None,
                PrepaymentKind::OneTime => PrepaymentPolicy::OneTime { amount, start_month },
                PrepaymentKind::Yearly => PrepaymentPolicy::Yearly { amount, start_month },
                PrepaymentKind::Monthly => PrepaymentPolicy::Monthly { amount, start_month },
            };
            AmortizationInput {
                terms: LoanTerms {
                    principal: args.principal,
                    annual_rate_pct: args.rate,
                    term_months: years_to_months(args.years)?,
                },
                prepayment,
                reduction_mode: match args.reduce {
                    ReduceArg::Tenure => ReductionMode::ReduceTenure,
                    ReduceArg::Emi => ReductionMode::ReduceEmi,
                },
                start_date: args.start_date,
            }
        }
    };

    let result = amortization::amortize(&amort_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Arguments for loan comparison
#[derive(Args)]
pub struct CompareLoansArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amounts (comma-separated, one per loan)
    #[arg(long, value_delimiter = ',', default_value = "500000,500000")]
    pub principals: Vec<Decimal>,

    /// Annual rates in percent (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "8,8")]
    pub rates: Vec<Decimal>,

    /// Tenures in years (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "20,20")]
    pub years: Vec<u32>,

    /// Optional loan labels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,
}

pub fn run_compare_loans(args: CompareLoansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cmp_input: LoanComparisonInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let count = args.principals.len();
            if args.rates.len() != count || args.years.len() != count {
                return Err(format!(
                    "--principals, --rates and --years must list the same number of loans \
                     (got {}, {}, {})",
                    count,
                    args.rates.len(),
                    args.years.len()
                )
                .into());
            }
            let labels = args.labels.unwrap_or_default();
            let loans = args
                .principals
                .iter()
                .zip(&args.rates)
                .zip(&args.years)
                .enumerate()
                .map(|(idx, ((principal, rate), years))| LoanQuote {
                    label: labels.get(idx).cloned(),
                    principal: *principal,
                    annual_rate_pct: *rate,
                    tenure_years: *years,
                })
                .collect();
            LoanComparisonInput { loans }
        }
    };

    let result = comparison::compare_loans(&cmp_input)?;
    Ok(serde_json::to_value(result)?)
}
