mod assemble;
mod dashboard;
mod db;
mod defaults;
mod live;
mod parser;
mod record;
mod source;

use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use parser::RawDocument;
use source::MetricsSource;

#[derive(Parser)]
#[command(name = "evo_metrics", about = "EvoTransformer experiment metrics extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metrics from a project directory and print them as JSON
    Metrics {
        /// Directory containing RESULTS_COMPETITIVE.md and model_competitive.py
        #[arg(short, long, env = "EVO_METRICS_ROOT", default_value = ".")]
        root: PathBuf,
        /// Print only one part of the record
        #[arg(long, value_enum)]
        only: Option<Part>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Parse a single results report or model source (stdin when no file)
    Parse {
        #[arg(value_enum)]
        part: Part,
        file: Option<PathBuf>,
    },
    /// Extract metrics from several project directories in parallel
    Batch {
        #[arg(required = true)]
        roots: Vec<PathBuf>,
        #[arg(long)]
        compact: bool,
    },
    /// Print one dashboard section (overview, training-progress,
    /// competitive-comparison, feature-impact, resources, architecture,
    /// roadmap, all-metrics)
    Dashboard {
        #[arg(default_value = "all-metrics")]
        section: String,
        /// Dashboard JSON file (default: built-in data)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Service health check
    Health,
    /// Stream live training updates
    Watch {
        /// Seconds between updates
        #[arg(short, long, default_value_t = live::UPDATE_INTERVAL.as_secs())]
        interval: u64,
        /// Stop after this many updates (default: run until interrupted)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },
    /// Extract metrics and store a snapshot
    Record {
        #[arg(short, long, env = "EVO_METRICS_ROOT", default_value = ".")]
        root: PathBuf,
        #[arg(long, default_value = db::DB_PATH)]
        db: String,
        /// Store even when nothing changed since the latest snapshot
        #[arg(long)]
        force: bool,
    },
    /// List stored snapshots
    History {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        #[arg(long, default_value = db::DB_PATH)]
        db: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Metrics { root, only, compact } => {
            let src = MetricsSource::new(root);
            match only {
                Some(Part::Results) => print_json(&src.parse_results_file(), compact),
                Some(Part::Architecture) => print_json(&src.parse_model_file(), compact),
                None => print_json(&src.get_all_metrics(), compact),
            }
        }
        Commands::Parse { part, file } => {
            let doc = match file {
                Some(path) => RawDocument::read(&path),
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    Some(RawDocument::inline(buf))
                }
            };
            let record = match part {
                Part::Results => source::get_all_metrics_from(doc.as_ref(), None),
                Part::Architecture => source::get_all_metrics_from(None, doc.as_ref()),
            };
            match part {
                Part::Results => print_json(&record.results, false),
                Part::Architecture => print_json(&record.architecture, false),
            }
        }
        Commands::Batch { roots, compact } => {
            let records = extract_roots(&roots)?;
            print_json(&records, compact)
        }
        Commands::Dashboard { section, data } => {
            let board = match data {
                Some(path) => dashboard::DashboardData::load(&path)?,
                None => dashboard::DashboardData::builtin(),
            };
            print_json(&board.section(&section)?, false)
        }
        Commands::Health => print_json(&dashboard::health(), false),
        Commands::Watch { interval, count } => {
            let (handle, mut rx) = live::spawn_updates(Duration::from_secs(interval.max(1)));
            info!("Streaming training updates every {}s", interval.max(1));
            let mut seen = 0u64;
            while let Some(update) = rx.recv().await {
                println!("{}", serde_json::to_string(&update)?);
                seen += 1;
                if count.is_some_and(|n| seen >= n) {
                    break;
                }
            }
            handle.abort();
            Ok(())
        }
        Commands::Record { root, db: db_path, force } => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let src = MetricsSource::new(root);
            let root_label = src.root().display().to_string();
            let record = src.get_all_metrics();

            if !force {
                if let Some(latest) = db::fetch_latest(&conn, &root_label)? {
                    if db::load_record(&latest)?.same_content(&record) {
                        println!("Unchanged since snapshot #{}, not recorded.", latest.id);
                        return Ok(());
                    }
                }
            }

            let id = db::save_snapshot(&conn, &root_label, &record)?;
            println!(
                "Recorded snapshot #{} for {} (validation {:.2}%, {} epochs, {} models)",
                id,
                root_label,
                record.results.accuracies.validation,
                record.results.training_epochs.len(),
                record.results.model_comparisons.len(),
            );
            Ok(())
        }
        Commands::History { limit, db: db_path } => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_snapshots(&conn, limit)?;
            if rows.is_empty() {
                println!("No snapshots. Run 'record' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<25} | {:<24} | {:>7} | {:>7} | {:>6} | {:>6}",
                "#", "Parsed at", "Root", "Valid%", "Gain%", "Epochs", "Models"
            );
            println!("{}", "-".repeat(98));

            for row in &rows {
                let record = db::load_record(row)?;
                println!(
                    "{:>4} | {:<25} | {:<24} | {:>7.2} | {:>7.2} | {:>6} | {:>6}",
                    row.id,
                    record.parsed_at.format("%Y-%m-%d %H:%M:%S"),
                    shorten_root(&row.root, 24),
                    record.results.accuracies.validation,
                    record.results.improvements.total,
                    record.results.training_epochs.len(),
                    record.results.model_comparisons.len(),
                );
            }

            let s = db::get_stats(&conn)?;
            println!(
                "\n{} snapshots across {} roots | latest recorded (UTC): {}",
                s.snapshots,
                s.roots,
                s.latest.as_deref().unwrap_or("-")
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

#[derive(Clone, Copy, ValueEnum)]
enum Part {
    Results,
    Architecture,
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let out = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Each root is extracted independently on the rayon pool.
fn extract_roots(roots: &[PathBuf]) -> anyhow::Result<Vec<record::MetricsRecord>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(roots.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let records: Vec<_> = roots
        .par_iter()
        .map(|root| {
            let record = MetricsSource::new(root).get_all_metrics();
            pb.inc(1);
            record
        })
        .collect();

    pb.finish_and_clear();
    info!("Extracted metrics from {} roots", records.len());
    Ok(records)
}

/// Keep the tail of a long root path; the last components tell runs apart.
fn shorten_root(root: &str, width: usize) -> String {
    let len = root.chars().count();
    if len <= width {
        return root.to_string();
    }
    let tail: String = root.chars().skip(len - width.saturating_sub(3)).collect();
    format!("...{}", tail)
}
