use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use log::{error, info, LevelFilter};
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

mod analysis;
mod chart;
mod menu;
mod report;
mod settings;
mod stats;

use crate::analysis::ChartKind;
use crate::chart::OutputFormat;
use crate::report::Rendered;
use crate::settings::Settings;

/// Render charts from the UK housing price, broadband speed and FTSE datasets.
#[derive(Clone, Debug, Default, Parser, Serialize, Deserialize)]
#[command(version)]
#[serde(default)]
struct Config {
    /// Chart(s) to render (default: all)
    #[arg(short, long, value_enum, value_delimiter = ',', value_name = "CHART1,CHART2,...")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    charts: Vec<ChartKind>,

    /// Directory containing the dataset folders
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    data_dir: Option<PathBuf>,

    /// Housing price CSV, relative to the data directory
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    housing_csv: Option<PathBuf>,

    /// Broadband speed CSV, relative to the data directory
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    broadband_csv: Option<PathBuf>,

    /// FTSE history CSV, relative to the data directory
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    ftse_csv: Option<PathBuf>,

    /// Regions compared in the housing chart
    #[arg(short, long, value_delimiter = ',', value_name = "REGION1,REGION2,...")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    regions: Vec<String>,

    /// Where charts are written
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,

    /// Image format
    #[arg(short, long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,

    /// Chart width in pixels
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,

    /// Chart height in pixels
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,

    /// Also write the computed statistics to this JSON file
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PathBuf>,

    /// Pick charts from an interactive menu
    #[arg(short, long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    menu: bool,

    /// off, error, warn, info, debug or trace
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,

    /// Also log to this file
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    log_file: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    #[serde(skip_serializing_if = "is_zero")]
    verbose: u8,
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

fn main() {
    let config = match load_config(Config::parse()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let settings = match Settings::from_config(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = init_logging(settings.log_level, settings.log_file.as_deref()) {
        eprintln!("failed to start logging: {:#}", e);
        std::process::exit(1);
    }

    let result = if settings.menu {
        menu::run(std::io::stdin().lock(), std::io::stdout(), |kinds| {
            generate(kinds, &settings)
        })
    } else {
        generate(&settings.charts, &settings)
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load_config(flags: Config) -> Result<Config, figment::Error> {
    // Start with toml configuration file.
    Figment::from(Toml::file("ukcharts.toml"))
        // Override with anything set in environment variables.
        .merge(Env::prefixed("UKCHARTS_"))
        // Override with anything set via flags; unset flags are skipped.
        .merge(Serialized::defaults(flags))
        .extract()
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        loggers.push(WriteLogger::new(level, config, file));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

// Analyse and render each chart, then report what was written.
fn generate(kinds: &[ChartKind], settings: &Settings) -> anyhow::Result<()> {
    let mut rendered = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let analysis = analysis::run(*kind, settings)?;
        let path = settings.output_path(*kind);
        chart::render(&analysis.chart, &path, settings.format, settings.size)
            .with_context(|| format!("failed to render {} chart", kind))?;
        info!("wrote {}", path.display());
        rendered.push(Rendered { analysis, path });
    }

    report::display(&rendered);
    if let Some(summary) = &settings.summary {
        report::write_summary(summary, &rendered)?;
    }
    Ok(())
}
