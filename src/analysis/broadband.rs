// Upload against download speed, with outliers and a fitted line.

use log::{debug, warn};
use serde::Serialize;
use ukcharts_dataset::BroadbandSpeed;

use crate::chart::{Chart, ScatterChart};
use crate::stats::{self, Fences, LinearFit};

const TITLE: &str =
    "Comparison of the relationship between broadband upload and download speeds in all regions of the UK";
const X_LABEL: &str = "Average upload speed (Mb/s)";
const Y_LABEL: &str = "Average download speed (Mb/s)";
const X_MAX: f64 = 100.0;
const Y_MAX: f64 = 180.0;
/// Tukey's fence multiplier.
const FENCE_K: f64 = 1.5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BroadbandSummary {
    pub rows: usize,
    pub down_fences: Option<Fences>,
    pub upload_fences: Option<Fences>,
    /// Rows outside the fences on both download and upload.
    pub outliers: Vec<BroadbandSpeed>,
    pub correlation: Option<f64>,
    /// Download as a function of upload.
    pub regression: Option<LinearFit>,
}

impl BroadbandSummary {
    pub fn headline(&self) -> String {
        format!(
            "{}, {} outliers of {}",
            correlation_label(self.correlation),
            self.outliers.len(),
            self.rows
        )
    }
}

pub fn correlation_label(correlation: Option<f64>) -> String {
    match correlation {
        Some(r) => format!("Correlation: {:.2}", r),
        None => "Correlation: n/a".to_string(),
    }
}

pub fn analyse(rows: &[BroadbandSpeed]) -> (BroadbandSummary, Chart) {
    let down: Vec<f64> = rows.iter().map(|r| r.average_down).collect();
    let upload: Vec<f64> = rows.iter().map(|r| r.average_upload).collect();

    let down_fences = Fences::tukey(&down, FENCE_K);
    let upload_fences = Fences::tukey(&upload, FENCE_K);
    debug!("download fences {:?}, upload fences {:?}", down_fences, upload_fences);

    let outliers: Vec<BroadbandSpeed> = stats::outlier_mask(&down, FENCE_K)
        .into_iter()
        .zip(stats::outlier_mask(&upload, FENCE_K))
        .zip(rows)
        .filter(|((down_out, upload_out), _)| *down_out && *upload_out)
        .map(|(_, row)| *row)
        .collect();

    let correlation = stats::pearson(&down, &upload);
    if correlation.is_none() {
        warn!("correlation is undefined for {} rows", rows.len());
    }
    let regression = LinearFit::least_squares(&upload, &down);
    if regression.is_none() {
        warn!("no regression line: upload speeds do not vary");
    }

    let chart = ScatterChart {
        title: TITLE.to_string(),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        points: rows.iter().map(|r| (r.average_upload, r.average_down)).collect(),
        points_label: correlation_label(correlation),
        highlighted: outliers.iter().map(|r| (r.average_upload, r.average_down)).collect(),
        highlighted_label: "Outliers".to_string(),
        fit: regression,
        x_range: 0.0..X_MAX,
        y_range: 0.0..Y_MAX,
    };

    let summary = BroadbandSummary {
        rows: rows.len(),
        down_fences,
        upload_fences,
        outliers,
        correlation,
        regression,
    };
    (summary, Chart::Scatter(chart))
}
