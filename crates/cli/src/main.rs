use std::{error::Error, fs::File, io::Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{DateRange, Engine, Interval, TransactionQuery, TransactionStore, export};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use server::views::{dashboard_view, gateway_view, kpi_view, point_view, transaction_view};

#[derive(Parser, Debug)]
#[command(name = "finlytics_cli")]
#[command(about = "Offline revenue reports over a transaction dataset")]
struct Cli {
    /// JSON array of transactions (also read from `FINLYTICS_DATA`).
    ///
    /// When absent a dataset is generated.
    #[arg(long, env = "FINLYTICS_DATA")]
    data: Option<String>,

    /// Number of generated transactions when no data file is given.
    #[arg(long, default_value_t = 100)]
    seed_count: usize,

    /// Seed for the generated dataset.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List transactions.
    Transactions(TransactionsArgs),
    /// Revenue per day, week or month.
    Timeseries(TimeSeriesArgs),
    /// Totals per gateway.
    Gateways(RangeArgs),
    /// Headline figures.
    Kpis(RangeArgs),
    /// Time series, gateways and KPIs of one window.
    Dashboard(DashboardArgs),
    /// Print the dataset as JSON.
    Dump,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Inclusive start (ISO-8601 date or timestamp).
    #[arg(long)]
    start: Option<String>,
    /// Inclusive end (ISO-8601 date or timestamp).
    #[arg(long)]
    end: Option<String>,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl RangeArgs {
    fn range(&self) -> DateRange {
        DateRange {
            start_date: self.start.clone(),
            end_date: self.end.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct TransactionsArgs {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(long)]
    gateway: Option<String>,
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct TimeSeriesArgs {
    #[command(flatten)]
    range: RangeArgs,
    #[arg(long, default_value = "day")]
    interval: Interval,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    #[arg(long, default_value = "day")]
    interval: Interval,
}

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

fn load_store(cli: &Cli) -> CliResult<TransactionStore> {
    if let Some(path) = &cli.data {
        tracing::debug!("reading transactions from {path}");
        return Ok(TransactionStore::from_json_reader(File::open(path)?)?);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    tracing::debug!("generating {} transactions", cli.seed_count);
    Ok(engine::seed::seeded_store(
        cli.seed_count,
        chrono::Utc::now(),
        &mut rng,
    )?)
}

fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Runs `command` against `engine`, writing the result to `out` in the same
/// shapes the HTTP API returns.
fn report<W: Write>(engine: &Engine, command: Command, out: W) -> CliResult<()> {
    match command {
        Command::Transactions(args) => {
            let query = TransactionQuery {
                start_date: args.range.start.clone(),
                end_date: args.range.end.clone(),
                gateway: args.gateway,
                limit: args.limit,
            };
            let transactions = engine.transactions(&query)?;
            match args.range.format {
                OutputFormat::Json => {
                    let rows: Vec<_> = transactions.into_iter().map(transaction_view).collect();
                    write_json(out, &rows)
                }
                OutputFormat::Csv => Ok(export::write_csv(
                    out,
                    transactions.iter().map(export::TransactionRow::from),
                )?),
            }
        }
        Command::Timeseries(args) => {
            let series = engine.revenue_time_series(&args.range.range(), args.interval)?;
            match args.range.format {
                OutputFormat::Json => {
                    let points: Vec<_> = series.into_iter().map(point_view).collect();
                    write_json(out, &points)
                }
                OutputFormat::Csv => Ok(export::write_csv(
                    out,
                    series.iter().map(export::TimeSeriesRow::from),
                )?),
            }
        }
        Command::Gateways(args) => {
            let totals = engine.gateway_comparison(&args.range())?;
            match args.format {
                OutputFormat::Json => {
                    let rows: Vec<_> = totals.into_iter().map(gateway_view).collect();
                    write_json(out, &rows)
                }
                OutputFormat::Csv => Ok(export::write_csv(
                    out,
                    totals.iter().map(export::GatewayRow::from),
                )?),
            }
        }
        Command::Kpis(args) => write_json(out, &kpi_view(engine.dashboard_kpis(&args.range())?)),
        Command::Dashboard(args) => {
            let range = DateRange {
                start_date: args.start,
                end_date: args.end,
            };
            write_json(out, &dashboard_view(engine.dashboard(&range, args.interval)?))
        }
        Command::Dump => write_json(out, &engine.snapshot().as_slice()),
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = load_store(&cli)?;
    tracing::debug!("dataset holds {} transactions", store.len());
    let engine = Engine::builder().store(store).build();

    report(&engine, cli.command, std::io::stdout().lock())
}
