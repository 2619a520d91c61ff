use std::fs;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use hotel_compass::gazetteer::MapView;
use hotel_compass::{fetch_reviews, figures, parse_reviews, MapboxConfig, ReviewSet};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hotel review dashboard data CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the review dataset and write the per-hotel count/rating table
    Summary(SummaryArgs),
    /// Emit the Plotly figure JSON the dashboard renders
    Figures(FiguresArgs),
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// Local CSV file to read instead of fetching the remote dataset
    #[arg(long, value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Remote dataset URL
    #[arg(long, default_value = hotel_compass::DATA_URL)]
    url: String,

    /// Output CSV path for the count/rating table (`-` for stdout)
    #[arg(short, long, default_value = "histogram.csv", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct FiguresArgs {
    /// Local CSV file to read instead of fetching the remote dataset
    #[arg(long, value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Remote dataset URL
    #[arg(long, default_value = hotel_compass::DATA_URL)]
    url: String,

    /// Directory receiving map_figure.json and bar_figure.json
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = match &cli.command {
        Command::Summary(args) => {
            if args.verbose {
                "debug"
            } else {
                "info"
            }
        }
        Command::Figures(args) => {
            if args.verbose {
                "debug"
            } else {
                "info"
            }
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Figures(args) => handle_figures(args),
    }
}

fn handle_summary(args: SummaryArgs) -> Result<()> {
    let set = load_reviews(args.input.as_deref(), &args.url)?;

    if let Some(top) = set.counts().first() {
        info!("Most reviewed: {} ({} reviews)", top.hotel, top.count);
    }

    if args.output.as_os_str() == "-" {
        write_histogram(&set, io::stdout().lock())?;
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("failed to create {}", args.output.display()))?;
        write_histogram(&set, file)?;
        info!("Histogram table written to {}", args.output.display());
    }
    Ok(())
}

fn handle_figures(args: FiguresArgs) -> Result<()> {
    let config =
        MapboxConfig::from_env().context("Mapbox configuration is required for figure output")?;
    let set = load_reviews(args.input.as_deref(), &args.url)?;

    let markers = figures::map_markers(&set);
    let map_figure = json!({
        "data": [figures::map_trace(&markers)],
        "layout": figures::map_layout(&config, &MapView::anywhere()),
    });
    let chart = figures::bar_chart(&set);
    let bar_figure = json!({
        "data": [figures::bar_trace(&chart)],
        "layout": figures::bar_layout(),
    });

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    write_figure(&args.out_dir.join("map_figure.json"), &map_figure)?;
    write_figure(&args.out_dir.join("bar_figure.json"), &bar_figure)?;
    info!(
        "Figures written to {} ({} markers, {} bars)",
        args.out_dir.display(),
        markers.lat.len(),
        chart.hotels.len()
    );
    Ok(())
}

fn load_reviews(input: Option<&Path>, url: &str) -> Result<ReviewSet> {
    let records = match input {
        Some(path) => {
            let data =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            parse_reviews(data.as_slice())
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => {
            info!("Fetching reviews from {url}");
            fetch_reviews(url)?
        }
    };
    let set = ReviewSet::from_records(records)?;
    info!(
        "Loaded {} reviews covering {} hotels",
        set.records().len(),
        set.summaries().len()
    );
    Ok(set)
}

fn write_histogram(set: &ReviewSet, writer: impl Write) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["hotel", "review_count", "average_rating"])?;
    for row in set.histogram() {
        let count = row.count.to_string();
        let rating = row.rating.map(|value| value.to_string()).unwrap_or_default();
        csv_writer.write_record([row.hotel.as_str(), count.as_str(), rating.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_figure(path: &Path, figure: &serde_json::Value) -> Result<()> {
    let body = serde_json::to_string_pretty(figure)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
