// Daily FTSE high over time with a linear trend.

use chrono::NaiveDate;
use log::warn;
use serde::Serialize;
use ukcharts_dataset::IndexDay;

use crate::chart::{Chart, TimeSeriesChart};
use crate::stats::LinearFit;

const TITLE: &str = "Comparison of the highest daily FTSE share index values over time";
const X_LABEL: &str = "Year";
const Y_LABEL: &str = "FTSE Share Index";
const Y_MAX: f64 = 8000.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FtseSummary {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub highest: Option<IndexDay>,
    /// Daily high against row number, starting at zero.
    pub regression: Option<LinearFit>,
}

impl FtseSummary {
    pub fn headline(&self) -> String {
        let trend = match &self.regression {
            Some(fit) => format!("trend {:+.2}/day", fit.slope),
            None => "no trend".to_string(),
        };
        match &self.highest {
            Some(day) => format!("{} rows, peak {:.1} on {}, {}", self.rows, day.high, day.date, trend),
            None => format!("{} rows, {}", self.rows, trend),
        }
    }
}

/// Rows are kept in file order; the trend is fitted against the row index,
/// not the calendar, so gaps (weekends, holidays) do not bend it.
pub fn analyse(rows: &[IndexDay]) -> (FtseSummary, Chart) {
    let index: Vec<f64> = (0..rows.len()).map(|i| i as f64).collect();
    let highs: Vec<f64> = rows.iter().map(|r| r.high).collect();

    let regression = LinearFit::least_squares(&index, &highs);
    if regression.is_none() {
        warn!("not enough FTSE rows for a trend line");
    }

    let trend = match &regression {
        Some(fit) => rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.date, fit.predict(i as f64)))
            .collect(),
        None => Vec::new(),
    };

    let chart = TimeSeriesChart {
        title: TITLE.to_string(),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        points: rows.iter().map(|r| (r.date, r.high)).collect(),
        trend,
        y_range: 0.0..Y_MAX,
    };

    let summary = FtseSummary {
        rows: rows.len(),
        first_date: rows.first().map(|r| r.date),
        last_date: rows.last().map(|r| r.date),
        highest: rows.iter().copied().max_by(|a, b| a.high.total_cmp(&b.high)),
        regression,
    };
    (summary, Chart::TimeSeries(chart))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, high: f64) -> IndexDay {
        IndexDay {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            high,
        }
    }

    #[test]
    fn trend_uses_row_index() {
        // Friday to Monday gap: the index still steps by one.
        let rows = vec![
            day(2021, 1, 7, 6800.0),
            day(2021, 1, 8, 6900.0),
            day(2021, 1, 11, 7000.0),
        ];
        let (summary, chart) = analyse(&rows);
        let fit = summary.regression.unwrap();
        assert!((fit.slope - 100.0).abs() < 1e-9);
        assert!((fit.intercept - 6800.0).abs() < 1e-9);

        let Chart::TimeSeries(series) = chart else {
            panic!("expected a time series chart");
        };
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.trend[2].0, NaiveDate::from_ymd_opt(2021, 1, 11).unwrap());
        assert!((series.trend[2].1 - 7000.0).abs() < 1e-9);
        assert_eq!(series.y_range, 0.0..8000.0);
    }

    #[test]
    fn summary_tracks_range_and_peak() {
        let rows = vec![
            day(2019, 12, 31, 7600.0),
            day(2020, 1, 17, 7727.5),
            day(2020, 3, 16, 5000.0),
        ];
        let (summary, _) = analyse(&rows);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.first_date, Some(rows[0].date));
        assert_eq!(summary.last_date, Some(rows[2].date));
        assert_eq!(summary.highest, Some(rows[1]));
        assert!(summary.headline().contains("peak 7727.5 on 2020-01-17"));
    }

    #[test]
    fn single_row_has_no_trend() {
        let (summary, chart) = analyse(&[day(2021, 5, 4, 7100.0)]);
        assert_eq!(summary.regression, None);
        let Chart::TimeSeries(series) = chart else {
            panic!("expected a time series chart");
        };
        assert!(series.trend.is_empty());
    }
}
