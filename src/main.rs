mod app;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use media_graph::VisualizationConfig;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Force-directed explorer for media consumption graphs
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document to load; the built-in sample is shown when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON file with visualization settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of nodes drawn at once
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Skip the category overview nodes
    #[arg(long)]
    no_overview: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<VisualizationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            VisualizationConfig::from_json(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => VisualizationConfig::default(),
    };

    if let Some(max_nodes) = args.max_nodes {
        config.cull.max_nodes = max_nodes;
    }
    if args.no_overview {
        config.build.category_overview = false;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(args.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&args)?;
    info!(data = ?args.data, max_nodes = config.cull.max_nodes, "starting media-graph");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "media-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::MediaGraphApp::new(cc, args.data.clone(), config)))),
    )
    .map_err(|error| anyhow::anyhow!("window failed: {error}"))
}
