//! F-Score CLI binary.
//!
//! Provides the command-line interface for fetching index constituent
//! statements and computing Piotroski F-Scores over them.

mod integration;

use clap::{Parser, Subcommand};
use fscore::universe::{IndexUniverse, MarketIndex, Universe};
use fscore_data::edgar::{EdgarClient, EdgarStatementProvider};
use fscore_data::statements::PeriodType;
use fscore_data::store::CsvStore;
use fscore_output::{ExportFormat, Exporter, ReportBuilder, ScoreSummary};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::pipeline::{self, FetchConfig};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "fscore")]
#[command(about = "Piotroski F-Score screening for index constituents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch financial statements for an index's constituents
    Fetch {
        /// Market index (sp500, dow_jones)
        index: String,

        /// Fiscal periods to fetch per ticker (minimum 2)
        #[arg(long, default_value = "2")]
        periods: usize,

        /// Fetch quarterly (10-Q) instead of annual (10-K) periods
        #[arg(long)]
        quarterly: bool,

        /// Data directory for the statement files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,

        /// Concurrent fetches
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },

    /// Compute F-Scores from stored statements
    Score {
        /// Market index (sp500, dow_jones)
        index: String,

        /// Data directory holding the statement files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output file for the scores table (defaults to <data-dir>/<index>_scores.<ext>)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format (csv, json, pretty-json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Print a JSON run report instead of the text summary
        #[arg(long)]
        report: bool,
    },

    /// Show the criterion breakdown for one ticker
    Analyze {
        /// Stock symbol
        symbol: String,

        /// Market index whose stored data to use
        #[arg(long, default_value = "sp500")]
        index: String,

        /// Data directory holding the statement files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// List indexes and their constituents
    Universe {
        /// Show one index's constituents
        #[arg(long)]
        index: Option<String>,

        /// List all supported indexes
        #[arg(long)]
        list_indexes: bool,
    },

    /// Inspect or clear the statement cache
    Cache {
        /// Show cache statistics
        #[arg(long)]
        stats: bool,

        /// Clear all cached data
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            index,
            periods,
            quarterly,
            data_dir,
            no_cache,
            refresh,
            concurrency,
        } => {
            let config = FetchConfig {
                periods,
                period_type: if quarterly {
                    PeriodType::Quarterly
                } else {
                    PeriodType::Annual
                },
                use_cache: !no_cache,
                force_refresh: refresh,
                concurrency,
                ..FetchConfig::default()
            };
            fetch(&index, &data_dir, config).await?;
        }
        Commands::Score {
            index,
            data_dir,
            output,
            format,
            report,
        } => {
            score(&index, &data_dir, output, &format, report)?;
        }
        Commands::Analyze {
            symbol,
            index,
            data_dir,
        } => {
            analyze(&symbol, &index, &data_dir)?;
        }
        Commands::Universe {
            index,
            list_indexes,
        } => {
            if list_indexes {
                list_all_indexes();
            } else {
                show_universe(index.as_deref())?;
            }
        }
        Commands::Cache { stats, clear } => {
            cache_command(stats, clear)?;
        }
    }

    Ok(())
}

fn parse_index(arg: &str) -> Result<MarketIndex, Box<dyn std::error::Error>> {
    MarketIndex::from_arg(arg).ok_or_else(|| format!("Unknown index: {}", arg).into())
}

async fn fetch(
    index: &str,
    data_dir: &Path,
    config: FetchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = parse_index(index)?;
    let universe = IndexUniverse::new(index);
    let store = CsvStore::new(data_dir);
    let provider = EdgarStatementProvider::new(EdgarClient::new()?);

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("STATEMENT FETCH: {}", index.name()));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Constituents: {}", universe.size());
    println!(
        "Periods: {} x {:?}",
        config.periods.max(2),
        config.period_type
    );
    if config.use_cache {
        println!("Cache: {}", cache_manager::get_cache_path().display());
        if config.force_refresh {
            println!("  Mode: Force refresh (re-fetching all data)");
        }
    } else {
        println!("Cache: Disabled");
    }
    println!("Store: {}\n", store.index_dir(index.key()).display());

    let pb = ProgressBar::new(universe.size() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));

    let report =
        match pipeline::fetch_index(&provider, &store, &universe, index.key(), &config, Some(&pb))
            .await
        {
            Ok(report) => {
                pb.finish_with_message(format!(
                    "Fetched {} tickers ({} skipped)",
                    report.fetched.len(),
                    report.skipped.len()
                ));
                report
            }
            Err(e) => {
                pb.finish_with_message("Failed!");
                return Err(format!("Failed to fetch {}: {}", index.name(), e).into());
            }
        };

    if !report.skipped.is_empty() {
        println!("\nSkipped tickers:");
        for (symbol, reason) in &report.skipped {
            println!("  {:8} {}", symbol, reason);
        }
    }

    println!(
        "\nStatements stored under {}",
        store.index_dir(index.key()).display()
    );

    Ok(())
}

fn score(
    index: &str,
    data_dir: &Path,
    output: Option<PathBuf>,
    format: &str,
    as_report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = parse_index(index)?;
    let store = CsvStore::new(data_dir);
    let format = ExportFormat::from_arg(format)?;

    let (results, skipped) = pipeline::score_index(&store, index.key())?;

    let rows: Vec<_> = results.iter().map(pipeline::export_row).collect();

    let output = output.unwrap_or_else(|| {
        data_dir.join(format!("{}_scores.{}", index.key(), format.extension()))
    });
    rows.export_to_file(&output, format)?;

    let summary = ScoreSummary::from_rows(&rows);

    if as_report {
        let report = ReportBuilder::new()
            .index(index.key().to_string())
            .periods(2)
            .contents(serde_json::json!({
                "summary": summary,
                "skipped": skipped
                    .iter()
                    .map(|(symbol, reason)| serde_json::json!({
                        "symbol": symbol,
                        "reason": reason,
                    }))
                    .collect::<Vec<_>>(),
            }))
            .build()?;
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("F-SCORES: {}", index.name()));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    print!("{}", summary);

    if !skipped.is_empty() {
        println!("\nNot scored:");
        for (symbol, reason) in &skipped {
            println!("  {:8} {}", symbol, reason);
        }
    }

    let warnings: Vec<_> = results
        .iter()
        .flat_map(|r| r.warnings.iter().map(move |w| (r.symbol.as_str(), w)))
        .collect();
    if !warnings.is_empty() {
        println!("\nData-quality warnings:");
        for (symbol, warning) in warnings {
            println!("  {:8} {}", symbol, warning);
        }
    }

    println!("\nScores table written to {}", output.display());

    Ok(())
}

fn analyze(
    symbol: &str,
    index: &str,
    data_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let symbol = symbol.to_uppercase();
    let index = parse_index(index)?;
    let store = CsvStore::new(data_dir);

    let sets = store.load_statement_sets(index.key(), &symbol)?;
    let result = pipeline::score_ticker(&sets)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("F-SCORE BREAKDOWN: {}", symbol));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Current period: {}", result.as_of);
    println!("Prior period:   {}\n", result.prior_period);

    let mut last_category = None;
    for (criterion, signal) in result.signals() {
        let category = criterion.category();
        if last_category != Some(category) {
            println!("{}:", category);
            last_category = Some(category);
        }
        println!("  [{}] {}", signal, criterion.description());
    }

    println!(
        "\nScore: {}/9 ({} criteria available)",
        result.total(),
        result.available()
    );
    if !result.is_complete() {
        println!("Note: score is partial; unavailable criteria are shown as [-]");
    }

    if !result.warnings.is_empty() {
        println!("\nData-quality warnings:");
        for warning in &result.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}

fn list_all_indexes() {
    println!("Supported indexes:");
    println!("==================\n");

    for index in MarketIndex::all() {
        println!("{:12} {}", index.key(), index.name());
    }
}

fn show_universe(index: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match index {
        Some(arg) => {
            let index = parse_index(arg)?;
            let universe = IndexUniverse::new(index);

            println!("{}", index.name());
            println!("Constituents: {}\n", universe.size());

            for symbol in universe.symbols() {
                println!("  {}", symbol);
            }
        }
        None => {
            let combined = IndexUniverse::combined(&MarketIndex::all());
            let counts = combined.index_counts();

            println!("Supported indexes:\n");
            for index in MarketIndex::all() {
                let count = counts.get(&index).unwrap_or(&0);
                println!("  {:12} {:40} {:3} constituents", index.key(), index.name(), count);
            }
            println!(
                "\nCombined universe: {} unique symbols",
                combined.size()
            );
        }
    }

    Ok(())
}

fn cache_command(stats: bool, clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let show_stats = stats || !clear;

    let cache = cache_manager::open_cache()?;
    println!("Cache location: {}", cache_manager::get_cache_path().display());

    if clear {
        cache.clear_all()?;
        println!("Cache cleared.");
    }

    if show_stats {
        let stats = cache.get_stats()?;
        println!("  Statement rows: {}", stats.statement_rows);
        println!("  Unique symbols: {}", stats.unique_symbols);
        println!("  CIK mappings:   {}", stats.cik_mappings);
    }

    Ok(())
}
