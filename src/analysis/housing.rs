// Average price per property type, compared across regions.

use log::{debug, warn};
use serde::Serialize;
use ukcharts_dataset::{PropertyPrice, PropertyType};

use crate::chart::{BarChart, BarSeries, Chart, PALETTE};
use crate::stats;

const Y_LABEL: &str = "Average price in thousands (£)";
const BAR_WIDTH: f64 = 0.4;
const Y_MAX: f64 = 700.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeAverage {
    pub property_type: PropertyType,
    /// Mean price in thousands of pounds, absent when the region has no rows
    /// of this type.
    pub thousands: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionAverages {
    pub region: String,
    pub rows: usize,
    pub averages: Vec<TypeAverage>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HousingSummary {
    pub regions: Vec<RegionAverages>,
}

impl HousingSummary {
    pub fn headline(&self) -> String {
        self.regions
            .iter()
            .map(|r| {
                let known: Vec<f64> = r.averages.iter().filter_map(|a| a.thousands).collect();
                match stats::mean(&known) {
                    Some(m) => format!("{} £{:.0}k", r.region, m),
                    None => format!("{} n/a", r.region),
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn title(region_count: usize) -> String {
    let count = match region_count {
        1 => "one region".to_string(),
        2 => "two regions".to_string(),
        n => format!("{} regions", n),
    };
    format!("Comparison of four categories of housing and their prices in {} of the UK", count)
}

fn region_averages(rows: &[PropertyPrice], region: &str) -> RegionAverages {
    let in_region: Vec<&PropertyPrice> = rows.iter().filter(|r| r.region_name == region).collect();
    let means = stats::group_means(&in_region, |r| r.property_type.clone(), |r| r.average_price);
    debug!("{}: {} rows, {} property types", region, in_region.len(), means.len());

    let averages = PropertyType::ALL
        .iter()
        .map(|kind| {
            let thousands = means.get(kind).map(|m| m / 1000.0);
            if thousands.is_none() {
                warn!("no {} prices for {}, leaving the bar out", kind, region);
            }
            TypeAverage {
                property_type: kind.clone(),
                thousands,
            }
        })
        .collect();

    RegionAverages {
        region: region.to_string(),
        rows: in_region.len(),
        averages,
    }
}

/// Mean price of each known property type in each region, as a grouped bar
/// chart with one series per region.
pub fn analyse(rows: &[PropertyPrice], regions: &[String]) -> (HousingSummary, Chart) {
    let summary = HousingSummary {
        regions: regions.iter().map(|r| region_averages(rows, r)).collect(),
    };

    let series = summary
        .regions
        .iter()
        .zip(PALETTE.iter().cycle())
        .map(|(region, color)| BarSeries {
            label: region.region.clone(),
            color: *color,
            values: region.averages.iter().map(|a| a.thousands).collect(),
        })
        .collect();

    let chart = BarChart {
        title: title(regions.len()),
        y_label: Y_LABEL.to_string(),
        categories: PropertyType::ALL.iter().map(|k| k.label().to_string()).collect(),
        series,
        bar_width: BAR_WIDTH,
        y_range: 0.0..Y_MAX,
    };
    (summary, Chart::Bar(chart))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ORANGE;
    use plotters::prelude::BLUE;

    fn price(region: &str, kind: PropertyType, average_price: f64) -> PropertyPrice {
        PropertyPrice {
            region_name: region.to_string(),
            property_type: kind,
            average_price,
        }
    }

    fn sample() -> Vec<PropertyPrice> {
        vec![
            price("London", PropertyType::Detached, 1_000_000.0),
            price("London", PropertyType::Detached, 1_200_000.0),
            price("London", PropertyType::SemiDetached, 650_000.0),
            price("London", PropertyType::Terraced, 550_000.0),
            price("London", PropertyType::Flat, 420_000.0),
            price("Newcastle upon Tyne", PropertyType::Detached, 280_000.0),
            price("Newcastle upon Tyne", PropertyType::Flat, 110_000.0),
            price("Newcastle upon Tyne", PropertyType::Other("Bungalow".into()), 200_000.0),
            price("Leeds", PropertyType::Flat, 150_000.0),
        ]
    }

    fn regions() -> Vec<String> {
        vec!["London".to_string(), "Newcastle upon Tyne".to_string()]
    }

    #[test]
    fn averages_are_in_thousands_and_in_chart_order() {
        let (summary, _) = analyse(&sample(), &regions());
        let london = &summary.regions[0];
        assert_eq!(london.rows, 5);
        let values: Vec<Option<f64>> = london.averages.iter().map(|a| a.thousands).collect();
        assert_eq!(values, vec![Some(1100.0), Some(650.0), Some(550.0), Some(420.0)]);
    }

    #[test]
    fn missing_types_leave_gaps() {
        let (summary, chart) = analyse(&sample(), &regions());
        let newcastle = &summary.regions[1];
        assert_eq!(newcastle.rows, 3);
        let values: Vec<Option<f64>> = newcastle.averages.iter().map(|a| a.thousands).collect();
        assert_eq!(values, vec![Some(280.0), None, None, Some(110.0)]);

        let Chart::Bar(bar) = chart else {
            panic!("expected a bar chart");
        };
        assert_eq!(bar.series[1].values, values);
    }

    #[test]
    fn one_coloured_series_per_region() {
        let (_, chart) = analyse(&sample(), &regions());
        let Chart::Bar(bar) = chart else {
            panic!("expected a bar chart");
        };
        assert_eq!(bar.categories, vec!["Detached", "Semi-Detached", "Terraced", "Flat"]);
        assert_eq!(bar.series.len(), 2);
        assert_eq!(bar.series[0].label, "London");
        assert_eq!(bar.series[0].color, BLUE);
        assert_eq!(bar.series[1].color, ORANGE);
        assert_eq!(bar.y_range, 0.0..700.0);
        assert!(bar.title.ends_with("in two regions of the UK"));
    }

    #[test]
    fn unknown_region_has_no_bars() {
        let (summary, _) = analyse(&sample(), &["Atlantis".to_string()]);
        assert_eq!(summary.regions[0].rows, 0);
        assert!(summary.regions[0].averages.iter().all(|a| a.thousands.is_none()));
        assert_eq!(summary.headline(), "Atlantis n/a");
    }
}
