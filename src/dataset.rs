//! Labeled query datasets and prediction export.
//!
//! Datasets are either a JSON array of `{"query", "assessment_url"}` objects
//! or a spreadsheet (`.xlsx`, `.xls`, `.ods`) whose header row names a
//! `Query` column and, for labeled data, an `Assessment_url` column.

use std::path::Path;

use assessrec_core::eval::{LabeledQuery, LabeledRow, group_by_query};
use calamine::{Data, Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

pub const QUERY_COLUMN: &str = "Query";
pub const URL_COLUMN: &str = "Assessment_url";

/// One dataset row. `assessment_url` is empty for unlabeled test sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(alias = "Query")]
    pub query: String,
    #[serde(default, alias = "Assessment_url")]
    pub assessment_url: String,
}

/// One predicted `(query, url)` pair for CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRow {
    pub query: String,
    pub assessment_url: String,
}

/// Load every row of a dataset. `sheet` selects a worksheet and is ignored
/// for JSON; spreadsheets default to their first sheet.
pub fn load_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<DatasetRow>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let rows = match extension.as_str() {
        "json" => load_json_rows(path)?,
        "xlsx" | "xlsm" | "xls" | "ods" => load_sheet_rows(path, sheet)?,
        other => {
            return Err(ServiceError::Dataset(format!(
                "unsupported dataset format `{other}`: {}",
                path.display()
            )));
        }
    };
    tracing::info!(path = %path.display(), rows = rows.len(), "dataset loaded");
    Ok(rows)
}

/// Load labeled rows and group them by query.
pub fn load_labeled(path: &Path, sheet: Option<&str>) -> Result<Vec<LabeledQuery>> {
    let rows = load_rows(path, sheet)?;
    let labeled = group_by_query(rows.into_iter().map(|row| LabeledRow {
        query: row.query,
        assessment_url: row.assessment_url,
    }));
    if labeled.is_empty() {
        return Err(ServiceError::Dataset(format!(
            "no labeled queries in {}",
            path.display()
        )));
    }
    Ok(labeled)
}

/// Load the distinct non-blank queries in first-seen order.
pub fn load_queries(path: &Path, sheet: Option<&str>) -> Result<Vec<String>> {
    let mut queries: Vec<String> = Vec::new();
    for row in load_rows(path, sheet)? {
        let query = row.query.trim();
        if !query.is_empty() && !queries.iter().any(|q| q == query) {
            queries.push(query.to_string());
        }
    }
    Ok(queries)
}

fn load_json_rows(path: &Path) -> Result<Vec<DatasetRow>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| ServiceError::Dataset(format!("invalid dataset JSON: {e}")))
}

fn load_sheet_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<DatasetRow>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ServiceError::Dataset(format!("cannot open {}: {e}", path.display())))?;

    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ServiceError::Dataset("workbook has no sheets".into()))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ServiceError::Dataset(format!("cannot read sheet `{name}`: {e}")))?;

    rows_from_table(
        range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect()),
    )
}

/// Interpret a table whose first non-empty row is the header.
fn rows_from_table(table: impl IntoIterator<Item = Vec<String>>) -> Result<Vec<DatasetRow>> {
    let mut rows = table
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));
    let header = rows
        .next()
        .ok_or_else(|| ServiceError::Dataset("sheet is empty".into()))?;

    let column = |name: &str| {
        header
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case(name))
    };
    let query_col = column(QUERY_COLUMN)
        .ok_or_else(|| ServiceError::Dataset(format!("missing `{QUERY_COLUMN}` column")))?;
    let url_col = column(URL_COLUMN);

    Ok(rows
        .map(|row| DatasetRow {
            query: row.get(query_col).cloned().unwrap_or_default(),
            assessment_url: url_col
                .and_then(|i| row.get(i).cloned())
                .unwrap_or_default(),
        })
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Render predictions as CSV with a `Query,Assessment_url` header.
pub fn predictions_to_csv(rows: &[PredictionRow]) -> String {
    let mut out = format!("{QUERY_COLUMN},{URL_COLUMN}\n");
    for row in rows {
        out.push_str(&csv_field(&row.query));
        out.push(',');
        out.push_str(&csv_field(&row.assessment_url));
        out.push('\n');
    }
    out
}

/// Write predictions to `path`, creating parent directories.
pub fn write_predictions(path: &Path, rows: &[PredictionRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, predictions_to_csv(rows))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "predictions written");
    Ok(())
}

/// Quote a field when it holds a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
