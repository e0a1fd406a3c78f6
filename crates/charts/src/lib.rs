//! Chart rendering for tabular results.
//!
//! Charts are rendered as JSON descriptors (kind, axes, series data) written
//! into a served directory; the frontend plots them from the returned
//! reference. Descriptor filenames are content-derived, so identical results
//! re-reference the same artifact instead of accumulating copies.

use std::path::PathBuf;

use datalens_core::Table;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from chart rendering.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("column '{0}' not present in result")]
    MissingColumn(String),
    #[error("result has too few columns or rows to chart")]
    NotChartable,
}

/// Supported chart shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    Area,
}

#[derive(Serialize)]
struct ChartSpec<'a> {
    kind: ChartKind,
    x: &'a str,
    y: &'a str,
    labels: Vec<&'a serde_json::Value>,
    values: Vec<&'a serde_json::Value>,
}

/// Writes chart descriptors into an output directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    out_dir: PathBuf,
}

impl ChartRenderer {
    #[must_use]
    pub const fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    /// Render `table` as a chart of `y` over `x` and return the descriptor's
    /// filename.
    ///
    /// # Errors
    /// Returns an error when the table cannot be charted, a named column is
    /// missing, or the descriptor cannot be written.
    pub fn render(
        &self,
        table: &Table,
        x: &str,
        y: &str,
        kind: ChartKind,
    ) -> Result<String, ChartError> {
        if table.column_count() < 2 || table.row_count() == 0 {
            return Err(ChartError::NotChartable);
        }
        let xi = table.column_index(x).ok_or_else(|| ChartError::MissingColumn(x.to_owned()))?;
        let yi = table.column_index(y).ok_or_else(|| ChartError::MissingColumn(y.to_owned()))?;

        let spec = ChartSpec {
            kind,
            x,
            y,
            labels: table.rows.iter().filter_map(|r| r.get(xi)).collect(),
            values: table.rows.iter().filter_map(|r| r.get(yi)).collect(),
        };
        let body = serde_json::to_vec_pretty(&spec)?;

        let mut hasher = Sha256::new();
        hasher.update(&body);
        let digest = hex::encode(hasher.finalize());
        let name = format!("chart_{}.json", &digest[..12]);

        std::fs::create_dir_all(&self.out_dir)?;
        std::fs::write(self.out_dir.join(&name), body)?;
        tracing::debug!(chart = %name, "wrote chart descriptor");
        Ok(name)
    }
}

/// Pick chart axes for a result: the first text-like column as x and the
/// first numeric column as y, defaulting to the first two columns.
#[must_use]
pub fn pick_axes(table: &Table) -> Option<(String, String)> {
    if table.column_count() < 2 {
        return None;
    }

    let mut x = table.columns[0].clone();
    let mut y = table.columns[1].clone();

    if let Some(first_row) = table.rows.first() {
        for (i, cell) in first_row.iter().enumerate() {
            if cell.is_string() {
                x = table.columns[i].clone();
                break;
            }
        }
        for (i, cell) in first_row.iter().enumerate() {
            if cell.is_number() {
                y = table.columns[i].clone();
                break;
            }
        }
    }

    Some((x, y))
}
