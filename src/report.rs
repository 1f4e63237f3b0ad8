// Console table and JSON export of what was rendered.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;
use serde::Serialize;

use crate::analysis::{Analysis, ChartKind, Summary};

pub struct Rendered {
    pub analysis: Analysis,
    pub path: PathBuf,
}

#[derive(Serialize)]
struct SummaryEntry<'a> {
    output: &'a Path,
    #[serde(flatten)]
    summary: &'a Summary,
}

pub(crate) fn truncate_string(mut string_to_truncate: String, max_length: usize) -> String {
    if string_to_truncate.chars().count() > max_length {
        let keep = max_length.saturating_sub(3);
        string_to_truncate = string_to_truncate.chars().take(keep).collect::<String>() + "...";
    }
    string_to_truncate
}

fn table_row(kind: ChartKind, headline: String, path: &Path) -> String {
    // {:<##} gives the column a fixed width of ## characters, aligned left
    format!(
        "{:<10} {:<60} {}",
        kind.to_string(),
        truncate_string(headline, 60),
        path.display()
    )
}

/// Print one line per rendered chart.
pub fn display(rendered: &[Rendered]) {
    if rendered.is_empty() {
        return;
    }
    println!("{:<10} {:<60} {}", "Chart", "Statistics", "Output");
    for r in rendered {
        println!(
            "{}",
            table_row(r.analysis.kind, r.analysis.summary.headline(), &r.path)
        );
    }
}

/// Write every summary, tagged with its chart name and output file, as
/// pretty JSON.
pub fn write_summary(path: &Path, rendered: &[Rendered]) -> anyhow::Result<()> {
    let entries: Vec<SummaryEntry> = rendered
        .iter()
        .map(|r| SummaryEntry {
            output: &r.path,
            summary: &r.analysis.summary,
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("failed to create summary file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &entries)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    info!("wrote summary of {} charts to {}", entries.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ftse;
    use chrono::NaiveDate;
    use ukcharts_dataset::IndexDay;

    #[test]
    fn truncates_long_strings() {
        assert_eq!(truncate_string("short".to_string(), 10), "short");
        assert_eq!(truncate_string("abcdefghijkl".to_string(), 8), "abcde...");
        // Multi-byte characters count as one.
        assert_eq!(truncate_string("£££££".to_string(), 4), "£...");
    }

    #[test]
    fn rows_have_fixed_width_columns() {
        let row = table_row(ChartKind::Ftse, "x".repeat(80), Path::new("charts/ftse.png"));
        assert!(row.starts_with("ftse       "));
        assert!(row.ends_with("... charts/ftse.png"));
        assert_eq!(row.chars().count(), 11 + 61 + "charts/ftse.png".len());
    }

    #[test]
    fn summary_json_is_tagged() {
        let day = IndexDay {
            date: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
            high: 6735.3,
        };
        let (summary, chart) = ftse::analyse(&[day]);
        let rendered = Rendered {
            analysis: Analysis {
                kind: ChartKind::Ftse,
                summary: Summary::Ftse(summary),
                chart,
            },
            path: PathBuf::from("charts/ftse.png"),
        };
        let entry = SummaryEntry {
            output: &rendered.path,
            summary: &rendered.analysis.summary,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["chart"], "ftse");
        assert_eq!(json["output"], "charts/ftse.png");
        assert_eq!(json["rows"], 1);
        assert_eq!(json["highest"]["High"], 6735.3);
        assert!(json["regression"].is_null());
    }
}
