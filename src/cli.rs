use crate::builder::{build, build_all};
use crate::config::load_config;
use crate::dimensions::DimensionTracker;
use crate::filter::{FilterSet, available_combinations};
use crate::layout::{layout_initial_with_config, reflow_all};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::records::load_groups;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ocl", version, about = "Hierarchical org chart layout")]
pub struct Args {
    /// Group records (JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Filter combination such as "CT MAG"; repeat for several
    #[arg(short = 'f', long = "filter")]
    pub filters: Vec<String>,

    /// Lay out every group, ignoring filters
    #[arg(long = "all", conflicts_with = "filters")]
    pub all: bool,

    /// Measured node sizes: [{"nodeId", "width", "height"}]
    #[arg(short = 'm', long = "measurements")]
    pub measurements: Option<PathBuf>,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Print the filter combinations the input offers and exit
    #[arg(long = "combinations")]
    pub combinations: bool,

    /// Skip the dimension reflow pass
    #[arg(long = "no-reflow")]
    pub no_reflow: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Measurement {
    node_id: String,
    width: f32,
    height: f32,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let records = load_groups(args.input.as_deref()).context("failed to load groups")?;

    if args.combinations {
        for combination in available_combinations(&records) {
            println!("{combination}");
        }
        return Ok(());
    }

    let graph = if args.all {
        build_all(&records)
    } else {
        build(&records, &FilterSet::new(&args.filters))
    };
    if graph.is_empty() {
        tracing::warn!("no groups selected; pass --filter or --all");
    }

    let tracker = match args.measurements.as_deref() {
        Some(path) => load_measurements(path)?,
        None => DimensionTracker::create(),
    };
    let layout = layout_initial_with_config(&graph.with_measurements(&tracker), &config.layout);
    let layout = if args.no_reflow {
        layout
    } else {
        reflow_all(&graph, &layout, &tracker, &config.layout)
    };

    let dump = LayoutDump::from_layout(&layout, &graph, Some(&tracker), &config.layout);
    write_layout_dump(args.output.as_deref(), &dump)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

fn load_measurements(path: &Path) -> Result<DimensionTracker> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut tracker = DimensionTracker::create();
    for measurement in parse_measurements(&contents)? {
        tracker.update(&measurement.node_id, measurement.width, measurement.height);
    }
    Ok(tracker)
}

fn parse_measurements(contents: &str) -> Result<Vec<Measurement>> {
    serde_json::from_str(contents).context("invalid measurements file")
}
