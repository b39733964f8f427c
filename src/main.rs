//! Market Resolver CLI
//!
//! Resolves prediction-market questions and prints a recommendation code.
//! The last stdout line per market is always `recommendation: p{1|2|3|4}`.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use market_resolver::market::{OutcomeCodes, ResolverSpec, ThresholdMode};
use market_resolver::{resolve_market, Comparison, Config, MarketSpec, Resolution};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "market-resolver")]
#[command(about = "Resolve prediction-market questions from third-party data APIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more market definition files
    Resolve {
        /// JSON market definition files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Resolve a crypto price-threshold question against Binance
    Crypto {
        /// Binance symbol, e.g. BTCUSDT
        #[arg(short, long)]
        symbol: String,

        /// Price threshold
        #[arg(short, long)]
        threshold: Decimal,

        /// Comparison direction
        #[arg(short, long, value_enum, default_value = "above")]
        comparison: ComparisonArg,

        /// Window reading mode
        #[arg(short, long, value_enum, default_value = "final-close")]
        mode: ModeArg,

        /// Window start (RFC 3339)
        #[arg(long)]
        window_start: DateTime<Utc>,

        /// Window end (RFC 3339)
        #[arg(long)]
        window_end: DateTime<Utc>,

        /// Kline interval
        #[arg(short, long, default_value = "1h")]
        interval: String,
    },

    /// Resolve a game-winner question against SportsDataIO
    Sports {
        /// League slug, e.g. nfl, nba, mlb
        #[arg(short, long)]
        league: String,

        /// Game date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Team mapped to p1
        #[arg(long)]
        first_team: String,

        /// Team mapped to p2
        #[arg(long)]
        second_team: String,
    },

    /// Resolve a DEX price question against DexScreener
    Dex {
        /// Chain identifier, e.g. solana
        #[arg(short, long)]
        chain: String,

        /// Pair address
        #[arg(short, long)]
        pair: String,

        /// USD price threshold
        #[arg(short, long)]
        threshold: Decimal,

        /// Comparison direction
        #[arg(long, value_enum, default_value = "at-or-above")]
        comparison: ComparisonArg,

        /// Minimum pool liquidity in USD
        #[arg(long, default_value = "1000")]
        min_liquidity: Decimal,
    },

    /// Resolve an esports match-winner question against HLTV
    Esports {
        /// Event results page URL
        #[arg(short, long)]
        event_url: String,

        /// Team mapped to p1
        #[arg(long)]
        first_team: String,

        /// Team mapped to p2
        #[arg(long)]
        second_team: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ComparisonArg {
    Above,
    AtOrAbove,
    Below,
    AtOrBelow,
}

impl From<ComparisonArg> for Comparison {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::Above => Comparison::Above,
            ComparisonArg::AtOrAbove => Comparison::AtOrAbove,
            ComparisonArg::Below => Comparison::Below,
            ComparisonArg::AtOrBelow => Comparison::AtOrBelow,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    FinalClose,
    Touch,
}

impl From<ModeArg> for ThresholdMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::FinalClose => ThresholdMode::FinalClose,
            ModeArg::Touch => ThresholdMode::Touch,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the recommendation output
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = Config::from_env();

    match cli.command {
        Commands::Resolve { files } => resolve_files(&config, &files).await?,

        Commands::Crypto { symbol, threshold, comparison, mode, window_start, window_end, interval } => {
            let spec = MarketSpec {
                question: format!("Will {} be {} {}?", symbol, Comparison::from(comparison), threshold),
                close_time: None,
                timezone: None,
                resolver: ResolverSpec::PriceThreshold {
                    symbol,
                    interval,
                    threshold,
                    comparison: comparison.into(),
                    mode: mode.into(),
                    window_start,
                    window_end,
                },
                codes: OutcomeCodes::default(),
            };
            resolve_one(&config, &spec).await;
        }

        Commands::Sports { league, date, first_team, second_team } => {
            let spec = MarketSpec {
                question: format!("{} vs {}: who wins?", first_team, second_team),
                close_time: None,
                timezone: None,
                resolver: ResolverSpec::GameWinner { league, date, first_team, second_team },
                codes: OutcomeCodes::default(),
            };
            resolve_one(&config, &spec).await;
        }

        Commands::Dex { chain, pair, threshold, comparison, min_liquidity } => {
            let spec = MarketSpec {
                question: format!("Is pair {} {} {} USD?", pair, Comparison::from(comparison), threshold),
                close_time: None,
                timezone: None,
                resolver: ResolverSpec::DexPrice {
                    chain,
                    pair_address: pair,
                    threshold,
                    comparison: comparison.into(),
                    min_liquidity_usd: min_liquidity,
                },
                codes: OutcomeCodes::default(),
            };
            resolve_one(&config, &spec).await;
        }

        Commands::Esports { event_url, first_team, second_team } => {
            let spec = MarketSpec {
                question: format!("{} vs {}: who wins?", first_team, second_team),
                close_time: None,
                timezone: None,
                resolver: ResolverSpec::MatchWinner { event_url, first_team, second_team },
                codes: OutcomeCodes::default(),
            };
            resolve_one(&config, &spec).await;
        }
    }

    Ok(())
}

/// Resolve market files concurrently, print results in input order
async fn resolve_files(config: &Config, files: &[PathBuf]) -> Result<()> {
    let mut specs = Vec::with_capacity(files.len());
    for path in files {
        let spec = MarketSpec::from_file(path)
            .with_context(|| format!("Bad market definition {}", path.display()))?;
        specs.push(spec);
    }

    let resolutions =
        futures::future::join_all(specs.iter().map(|spec| resolve_market(spec, config))).await;

    for (i, (spec, resolution)) in specs.iter().zip(resolutions).enumerate() {
        if files.len() > 1 {
            println!("{}", format!("--- {}", files[i].display()).dimmed());
        }
        print_resolution(spec, &resolution);
    }

    Ok(())
}

async fn resolve_one(config: &Config, spec: &MarketSpec) {
    let resolution = resolve_market(spec, config).await;
    print_resolution(spec, &resolution);
}

fn print_resolution(spec: &MarketSpec, resolution: &Resolution) {
    println!("{}", format!("\"{}\"", spec.question).dimmed());
    println!("{} {} [{}]", "=>".bold(), resolution.reason, resolution.source);
    // Fixed-format line consumed downstream; keep it uncolored and last
    println!("recommendation: {}", resolution.recommendation);
}
