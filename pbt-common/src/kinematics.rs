//! Kinematic CSV loading and chart construction
//!
//! Kinovea exports a header row followed by one row per frame. When the
//! time column is present, only whitelisted metric columns are plotted
//! against it; otherwise every numeric column is plotted against the row
//! index.

use crate::metrics::{MetricPalette, FALLBACK_COLOR};
use crate::{Error, Result};
use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Default time column in Kinovea exports
pub const TIME_COLUMN: &str = "Time (ms)";
/// Default y-axis label for time-series charts
pub const Y_AXIS_LABEL: &str = "Speed (px/s)";
/// X-axis label used when plotting against row index
pub const ROW_INDEX_LABEL: &str = "Row";
/// Rows returned in a table preview
pub const PREVIEW_ROWS: usize = 5;

/// Raw CSV contents: header plus string cells
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl KinematicTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(Error::InvalidInput("No columns to parse from file".to_string()));
        }

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > columns.len() {
                let line = record.position().map_or(idx as u64 + 2, |p| p.line());
                return Err(Error::InvalidInput(format!(
                    "Error tokenizing data. Expected {} fields in line {}, saw {}",
                    columns.len(),
                    line,
                    record.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(bytes)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Header plus the first `n` rows, for display
    pub fn preview(&self, n: usize) -> TablePreview {
        TablePreview {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Cells of column `idx` parsed leniently: unparseable or empty cells become gaps
    fn lenient_column(&self, idx: usize) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| parse_cell(&row[idx])).collect()
    }

    /// Column `idx` if every non-empty cell is numeric
    fn numeric_column(&self, idx: usize) -> Option<Vec<Option<f64>>> {
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let cell = row[idx].as_str();
            if cell.is_empty() {
                values.push(None);
                continue;
            }
            values.push(Some(cell.parse::<f64>().ok()?));
        }
        Some(values)
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        None
    } else {
        cell.parse::<f64>().ok()
    }
}

/// First rows of a CSV, shown above the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// What the x axis of a chart represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    Time,
    RowIndex,
}

/// One chart point; `y` is `None` where the cell was empty or not numeric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: Option<f64>,
}

/// One plotted line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub x_axis: XAxis,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

/// Labels and whitelist used when building charts
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle<'a> {
    pub palette: &'a MetricPalette,
    pub time_column: &'a str,
    pub y_label: &'a str,
}

/// Whitelisted metric columns present in `table`, in CSV column order
pub fn available_metrics(table: &KinematicTable, style: ChartStyle<'_>) -> Vec<String> {
    let mut seen = Vec::new();
    for column in table.columns() {
        if column != style.time_column
            && style.palette.contains(column)
            && !seen.contains(column)
        {
            seen.push(column.clone());
        }
    }
    seen
}

/// Narrow `available` to the requested metrics. No request, or an empty one,
/// selects everything available.
pub fn select_metrics(available: &[String], requested: Option<&[String]>) -> Vec<String> {
    match requested {
        Some(req) if !req.is_empty() => available
            .iter()
            .filter(|m| req.contains(m))
            .cloned()
            .collect(),
        _ => available.to_vec(),
    }
}

/// One line per selected whitelisted metric against the time column
pub fn time_series_chart(
    table: &KinematicTable,
    style: ChartStyle<'_>,
    selected: &[String],
) -> Result<Chart> {
    let time_idx = table.column_index(style.time_column).ok_or_else(|| {
        Error::InvalidInput(format!("Column '{}' not found", style.time_column))
    })?;

    let mut times = Vec::with_capacity(table.row_count());
    for (row_no, row) in table.rows.iter().enumerate() {
        let cell = row[time_idx].as_str();
        if cell.is_empty() {
            times.push(None);
            continue;
        }
        let t = cell.parse::<f64>().map_err(|_| {
            Error::InvalidInput(format!(
                "Non-numeric value '{}' in column '{}' at row {}",
                cell,
                style.time_column,
                row_no + 1
            ))
        })?;
        times.push(Some(t));
    }

    let mut series = Vec::new();
    for metric in selected {
        let Some(color) = style.palette.color_for(metric) else {
            continue;
        };
        let Some(idx) = table.column_index(metric) else {
            continue;
        };
        if idx == time_idx {
            continue;
        }
        let points = times
            .iter()
            .zip(table.lenient_column(idx))
            .filter_map(|(t, y)| t.map(|x| Point { x, y }))
            .collect();
        series.push(Series {
            name: metric.clone(),
            color: color.to_string(),
            points,
        });
    }

    Ok(Chart {
        x_axis: XAxis::Time,
        x_label: style.time_column.to_string(),
        y_label: style.y_label.to_string(),
        series,
    })
}

/// Every numeric column against its row index
pub fn row_index_chart(table: &KinematicTable, style: ChartStyle<'_>) -> Chart {
    let series = table
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let values = table.numeric_column(idx)?;
            let color = style.palette.color_for(name).unwrap_or(FALLBACK_COLOR);
            Some(Series {
                name: name.clone(),
                color: color.to_string(),
                points: values
                    .into_iter()
                    .enumerate()
                    .map(|(i, y)| Point { x: i as f64, y })
                    .collect(),
            })
        })
        .collect();

    Chart {
        x_axis: XAxis::RowIndex,
        x_label: ROW_INDEX_LABEL.to_string(),
        y_label: style.y_label.to_string(),
        series,
    }
}
