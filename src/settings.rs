// Resolve the layered configuration into concrete settings.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use thiserror::Error;

use crate::analysis::ChartKind;
use crate::chart::{ChartSize, OutputFormat};
use crate::Config;

pub const HOUSING_CSV: &str = "A_housePriceData_2021/Average-prices-Property-Type-2021-05_wrangled.csv";
pub const BROADBAND_CSV: &str = "B_broadbandData_2021/202006_fixed_laua_performance_wrangled.csv";
pub const FTSE_CSV: &str = "C_financialData_2021/ftse_data_wrangled.csv";
pub const DEFAULT_REGIONS: [&str; 2] = ["London", "Newcastle upon Tyne"];
pub const DEFAULT_OUTPUT_DIR: &str = "charts";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("chart {0} must be at least 1 pixel")]
    ZeroSize(&'static str),

    #[error("region names cannot be blank")]
    BlankRegion,

    #[error("unknown log level: {0}")]
    LogLevel(String),
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub charts: Vec<ChartKind>,
    pub data_dir: PathBuf,
    pub housing_csv: PathBuf,
    pub broadband_csv: PathBuf,
    pub ftse_csv: PathBuf,
    pub regions: Vec<String>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub size: ChartSize,
    pub summary: Option<PathBuf>,
    pub menu: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_config(config: Config) -> Result<Settings, ConfigError> {
        let mut charts = if config.charts.is_empty() {
            ChartKind::ALL.to_vec()
        } else {
            config.charts
        };
        charts.sort();
        charts.dedup();

        let regions = if config.regions.is_empty() {
            DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect()
        } else {
            config.regions.into_iter().map(|r| r.trim().to_string()).collect::<Vec<_>>()
        };
        if regions.iter().any(|r| r.is_empty()) {
            return Err(ConfigError::BlankRegion);
        }

        let defaults = ChartSize::default();
        let size = ChartSize {
            width: config.width.unwrap_or(defaults.width),
            height: config.height.unwrap_or(defaults.height),
        };
        if size.width == 0 {
            return Err(ConfigError::ZeroSize("width"));
        }
        if size.height == 0 {
            return Err(ConfigError::ZeroSize("height"));
        }

        let mut log_level = match config.log_level {
            Some(level) => LevelFilter::from_str(&level).map_err(|_| ConfigError::LogLevel(level))?,
            None => LevelFilter::Info,
        };
        match config.verbose {
            0 => (),
            1 => log_level = log_level.max(LevelFilter::Debug),
            _ => log_level = LevelFilter::Trace,
        }

        Ok(Settings {
            charts,
            data_dir: config.data_dir.unwrap_or_else(|| PathBuf::from(".")),
            housing_csv: config.housing_csv.unwrap_or_else(|| PathBuf::from(HOUSING_CSV)),
            broadband_csv: config.broadband_csv.unwrap_or_else(|| PathBuf::from(BROADBAND_CSV)),
            ftse_csv: config.ftse_csv.unwrap_or_else(|| PathBuf::from(FTSE_CSV)),
            regions,
            output_dir: config.output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            format: config.format.unwrap_or_default(),
            size,
            summary: config.summary,
            menu: config.menu,
            log_level,
            log_file: config.log_file,
        })
    }

    /// Dataset file for `kind`; relative paths are taken from the data directory.
    pub fn dataset_path(&self, kind: ChartKind) -> PathBuf {
        let file: &Path = match kind {
            ChartKind::Housing => &self.housing_csv,
            ChartKind::Broadband => &self.broadband_csv,
            ChartKind::Ftse => &self.ftse_csv,
        };
        self.data_dir.join(file)
    }

    pub fn output_path(&self, kind: ChartKind) -> PathBuf {
        self.output_dir
            .join(kind.file_stem())
            .with_extension(self.format.extension())
    }
}
