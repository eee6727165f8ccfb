//! Summary and workbook exports.
//!
//! The workbook is a directory bundle: one CSV per sheet, the chart SVGs,
//! and a `workbook.json` manifest describing sheet order, the frozen header
//! row, highlighted progression rows, and the embedded charts.

use crate::{
    chart::ChartSet,
    config::MetrixConfig,
    error::MetrixResult,
    pipeline::PipelineOutput,
    retention::RetentionTable,
    summary::SummaryRecord,
    types::format_float,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

pub const METRICS_SHEET: &str = "Metrics";
pub const PROGRESSION_SHEET: &str = "Level Progression";
pub const MANIFEST_FILE: &str = "workbook.json";

const FROZEN_HEADER_ROWS: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetManifest {
    pub name:        String,
    pub file:        String,
    pub frozen_rows: usize,
    /// Spreadsheet row numbers (header is row 1) to highlight.
    #[serde(default)]
    pub highlighted_rows: Vec<usize>,
    #[serde(default)]
    pub charts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookManifest {
    pub generated_at:       DateTime<Utc>,
    pub drop_highlight_pct: f64,
    pub sheets:             Vec<SheetManifest>,
}

/// Two columns, `Metric,Value`, in summary order.
pub fn write_summary_csv<W: io::Write>(summary: &SummaryRecord, writer: W) -> MetrixResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["Metric", "Value"])?;
    for entry in &summary.entries {
        out.write_record([entry.metric.as_str(), entry.value.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Level, Users, Retention %, Drop % per cleaned level.
pub fn write_progression_csv<W: io::Write>(retention: &RetentionTable, writer: W) -> MetrixResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["Level", "Users", "Retention %", "Drop %"])?;
    for row in &retention.rows {
        out.write_record([
            row.level.to_string(),
            row.users.to_string(),
            format_float(row.retention_pct),
            format_float(row.drop_pct),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Tab-separated lines for pasting into a spreadsheet or chat.
pub fn clipboard_text(summary: &SummaryRecord) -> String {
    summary
        .entries
        .iter()
        .map(|e| format!("{}\t{}", e.metric, e.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the workbook bundle into `dir`, creating it if needed.
pub fn write_workbook(
    dir: &Path,
    output: &PipelineOutput,
    charts: &ChartSet,
    config: &MetrixConfig,
) -> MetrixResult<WorkbookManifest> {
    std::fs::create_dir_all(dir)?;

    let metrics_file = "metrics.csv";
    write_summary_csv(&output.summary, std::fs::File::create(dir.join(metrics_file))?)?;

    let progression_file = "progression.csv";
    write_progression_csv(&output.retention, std::fs::File::create(dir.join(progression_file))?)?;

    let mut chart_files = Vec::new();
    for chart in charts.iter() {
        let file = format!("{}.svg", chart.name);
        std::fs::write(dir.join(&file), &chart.svg)?;
        chart_files.push(file);
    }

    let highlighted_rows = output
        .retention
        .rows_with_drop_at_least(config.drop_highlight_pct)
        .map(|(i, _)| i + 1 + FROZEN_HEADER_ROWS)
        .collect::<Vec<_>>();

    let manifest = WorkbookManifest {
        generated_at:       Utc::now(),
        drop_highlight_pct: config.drop_highlight_pct,
        sheets: vec![
            SheetManifest {
                name:             METRICS_SHEET.into(),
                file:             metrics_file.into(),
                frozen_rows:      FROZEN_HEADER_ROWS,
                highlighted_rows: Vec::new(),
                charts:           Vec::new(),
            },
            SheetManifest {
                name:        PROGRESSION_SHEET.into(),
                file:        progression_file.into(),
                frozen_rows: FROZEN_HEADER_ROWS,
                highlighted_rows,
                charts:      chart_files,
            },
        ],
    };
    std::fs::write(dir.join(MANIFEST_FILE), serde_json::to_string_pretty(&manifest)?)?;

    log::info!(
        "Workbook written to {} ({} highlighted drop rows)",
        dir.display(),
        manifest.sheets[1].highlighted_rows.len()
    );
    Ok(manifest)
}
