//! # paynvp CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use paynvp_cli::check::{run_check_config, CheckConfigArgs};
use paynvp_cli::ipn::{run_verify_ipn, VerifyIpnArgs};
use paynvp_cli::transaction::{run_details, run_refund, run_search, DetailsArgs, RefundArgs, SearchArgs};
use paynvp_cli::GatewayOpts;

/// paynvp: classic NVP payment gateway client
///
/// Loads a YAML credential bundle, performs one gateway call per invocation
/// and prints the parsed reply as JSON.
#[derive(Parser, Debug)]
#[command(name = "paynvp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format on stderr.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(flatten)]
    gateway: GatewayOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Refund a transaction, fully or partially.
    Refund(RefundArgs),

    /// Look up a single transaction.
    Details(DetailsArgs),

    /// Search transactions by date range and filters.
    Search(SearchArgs),

    /// Echo an IPN message back to the gateway for verification.
    VerifyIpn(VerifyIpnArgs),

    /// Resolve the credential bundle without sending any request.
    CheckConfig(CheckConfigArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    tracing::debug!(kind = ?cli.gateway.kind, "paynvp CLI starting");

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Refund(args) => run_refund(args, &cli.gateway, &mut stdout).await,
        Commands::Details(args) => run_details(args, &cli.gateway, &mut stdout).await,
        Commands::Search(args) => run_search(args, &cli.gateway, &mut stdout).await,
        Commands::VerifyIpn(args) => run_verify_ipn(args, &cli.gateway, &mut stdout).await,
        Commands::CheckConfig(args) => run_check_config(args, &cli.gateway, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
