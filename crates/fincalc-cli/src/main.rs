mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::investments::{InflationSipArgs, LumpsumArgs, SipArgs, StepUpSipArgs};
use commands::loans::{AmortizeArgs, CompareLoansArgs, EmiArgs, PrincipalArgs, RateArgs, TenureArgs};
use commands::planning::{InflationForecastArgs, RetirementArgs};

/// Personal finance calculators with decimal precision
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Personal finance calculators with decimal precision",
    long_about = "A CLI for loan, investment and retirement calculations. Solves for EMI, \
                  principal, rate or tenure, builds amortization schedules with prepayments, \
                  and projects SIP, lumpsum, retirement and inflation figures."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly EMI for a loan amount, rate and tenure
    Emi(EmiArgs),
    /// Loan amount affordable for a given EMI
    Principal(PrincipalArgs),
    /// Interest rate implied by a loan amount, EMI and tenure
    Rate(RateArgs),
    /// Months needed to repay a loan at a given EMI
    Tenure(TenureArgs),
    /// Amortization schedule with optional prepayments
    Amortize(AmortizeArgs),
    /// Compare two to five loans side by side
    CompareLoans(CompareLoansArgs),
    /// Future value of a monthly SIP
    Sip(SipArgs),
    /// SIP with a yearly increase in the instalment
    StepUpSip(StepUpSipArgs),
    /// Growth of a one-off investment
    Lumpsum(LumpsumArgs),
    /// Nominal versus inflation-adjusted SIP value
    InflationSip(InflationSipArgs),
    /// Retirement corpus and FIRE estimate
    Retirement(RetirementArgs),
    /// Linear-trend inflation forecast
    InflationForecast(InflationForecastArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "fincalc=debug,fincalc_core=debug"
    } else {
        "fincalc=warn,fincalc_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries the result; logs stay on stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loans::run_emi(args),
        Commands::Principal(args) => commands::loans::run_principal(args),
        Commands::Rate(args) => commands::loans::run_rate(args),
        Commands::Tenure(args) => commands::loans::run_tenure(args),
        Commands::Amortize(args) => commands::loans::run_amortize(args),
        Commands::CompareLoans(args) => commands::loans::run_compare_loans(args),
        Commands::Sip(args) => commands::investments::run_sip(args),
        Commands::StepUpSip(args) => commands::investments::run_step_up_sip(args),
        Commands::Lumpsum(args) => commands::investments::run_lumpsum(args),
        Commands::InflationSip(args) => commands::investments::run_inflation_sip(args),
        Commands::Retirement(args) => commands::planning::run_retirement(args),
        Commands::InflationForecast(args) => commands::planning::run_inflation_forecast(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
