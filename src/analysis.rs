// Load a dataset, compute its statistics and build the chart for it.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use ukcharts_dataset::{BroadbandSpeed, IndexDay, PropertyPrice};

use crate::chart::Chart;
use crate::settings::Settings;

pub mod broadband;
pub mod ftse;
pub mod housing;

pub use broadband::BroadbandSummary;
pub use ftse::FtseSummary;
pub use housing::HousingSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Housing,
    Broadband,
    Ftse,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Housing, ChartKind::Broadband, ChartKind::Ftse];

    /// Output file name without extension.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::Housing => "housing",
            ChartKind::Broadband => "broadband",
            ChartKind::Ftse => "ftse",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "chart", rename_all = "lowercase")]
pub enum Summary {
    Housing(HousingSummary),
    Broadband(BroadbandSummary),
    Ftse(FtseSummary),
}

impl Summary {
    /// One line of key figures for the console report.
    pub fn headline(&self) -> String {
        match self {
            Summary::Housing(s) => s.headline(),
            Summary::Broadband(s) => s.headline(),
            Summary::Ftse(s) => s.headline(),
        }
    }
}

pub struct Analysis {
    pub kind: ChartKind,
    pub summary: Summary,
    pub chart: Chart,
}

fn load<T: serde::de::DeserializeOwned>(kind: ChartKind, path: &Path) -> anyhow::Result<Vec<T>> {
    info!("loading {} data from {}", kind, path.display());
    ukcharts_dataset::from_path(path)
        .with_context(|| format!("failed to load {} dataset", kind))
}

pub fn run(kind: ChartKind, settings: &Settings) -> anyhow::Result<Analysis> {
    let path = settings.dataset_path(kind);
    let (summary, chart) = match kind {
        ChartKind::Housing => {
            let rows: Vec<PropertyPrice> = load(kind, &path)?;
            let (summary, chart) = housing::analyse(&rows, &settings.regions);
            (Summary::Housing(summary), chart)
        }
        ChartKind::Broadband => {
            let rows: Vec<BroadbandSpeed> = load(kind, &path)?;
            let (summary, chart) = broadband::analyse(&rows);
            (Summary::Broadband(summary), chart)
        }
        ChartKind::Ftse => {
            let rows: Vec<IndexDay> = load(kind, &path)?;
            let (summary, chart) = ftse::analyse(&rows);
            (Summary::Ftse(summary), chart)
        }
    };
    info!("{}: {}", kind, summary.headline());
    Ok(Analysis {
        kind,
        summary,
        chart,
    })
}
