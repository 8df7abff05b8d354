//! daybalance CLI: balances at the head or across a calendar-day range.

use clap::{Parser, Subcommand};
use daybalance::{parse_day, App, Config};
use daybalance_report::{
    failure, heights_content, period_content, render_period_table, render_table, success,
    AddressBalances,
};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Balances(args) => run_balances(args),
        Command::Heights(args) => run_heights(args),
        Command::Chains(args) => run_chains(args),
    }
}

#[derive(Parser)]
#[command(name = "daybalance")]
#[command(about = "Per-day historical balances for Cosmos-style chains")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Query every balance source for an address, at the head or per day.
    Balances(BalancesArgs),
    /// Resolve a date range to one block height per day.
    Heights(HeightsArgs),
    /// List configured chains.
    Chains(ChainsArgs),
}

#[derive(Parser)]
struct BalancesArgs {
    #[arg(long)]
    chain: String,
    #[arg(long)]
    address: String,
    /// First day of the range (YYYY-MM-DD); with --ended-at, queries one
    /// height per day instead of the current head.
    #[arg(long)]
    started_at: Option<String>,
    /// Last day of the range (YYYY-MM-DD), inclusive.
    #[arg(long)]
    ended_at: Option<String>,
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// Render a plain-text table instead of the JSON envelope.
    #[arg(long)]
    table: bool,
}

#[derive(Parser)]
struct HeightsArgs {
    #[arg(long)]
    chain: String,
    #[arg(long)]
    started_at: String,
    #[arg(long)]
    ended_at: String,
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(Parser)]
struct ChainsArgs {
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

fn fail(err: impl std::fmt::Display) -> ! {
    let envelope = failure(err);
    println!(
        "{}",
        serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string())
    );
    std::process::exit(1);
}

fn run_balances(args: BalancesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args.config)?;
    let app = App::new(&config)?;
    let rt = tokio::runtime::Runtime::new()?;

    match (args.started_at.as_deref(), args.ended_at.as_deref()) {
        (Some(started_raw), Some(ended_raw)) => {
            let started_at = match parse_day(started_raw) {
                Ok(day) => day,
                Err(err) => fail(err),
            };
            let ended_at = match parse_day(ended_raw) {
                Ok(day) => day,
                Err(err) => fail(err),
            };
            let days = rt.block_on(app.balances_for_range(
                &args.chain,
                &args.address,
                started_at,
                ended_at,
            ));
            match days {
                Ok(days) => {
                    info!(days = days.len(), chain = %args.chain, "range resolved");
                    if args.table {
                        print!("{}", render_period_table(&args.address, &days));
                    } else {
                        let envelope = success(period_content(days));
                        println!("{}", serde_json::to_string_pretty(&envelope)?);
                    }
                }
                Err(err) => fail(err),
            }
        }
        _ => {
            // Without a full range the head is the only sensible answer.
            let balances = rt.block_on(app.balances_at_head(&args.chain, &args.address));
            match balances {
                Ok(balances) => {
                    if args.table {
                        print!("{}", render_table(&args.address, &balances));
                    } else {
                        let envelope = success(AddressBalances {
                            address: args.address,
                            balances,
                        });
                        println!("{}", serde_json::to_string_pretty(&envelope)?);
                    }
                }
                Err(err) => fail(err),
            }
        }
    }
    Ok(())
}

fn run_heights(args: HeightsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args.config)?;
    let app = App::new(&config)?;
    let rt = tokio::runtime::Runtime::new()?;

    let started_at = match parse_day(&args.started_at) {
        Ok(day) => day,
        Err(err) => fail(err),
    };
    let ended_at = match parse_day(&args.ended_at) {
        Ok(day) => day,
        Err(err) => fail(err),
    };
    match rt.block_on(app.daily_heights(&args.chain, started_at, ended_at)) {
        Ok(days) => {
            let envelope = success(heights_content(days));
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Err(err) => fail(err),
    }
    Ok(())
}

fn run_chains(args: ChainsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args.config)?;
    for name in config.chain_names() {
        println!("{name}");
    }
    Ok(())
}
