//! Formatting of warehouse results into replies.

use datalens_charts::{pick_axes, ChartKind, ChartRenderer};
use datalens_core::{AskResponse, Mode, Reply, Table};

const CHART_WORDS: &[&str] = &["chart", "graph", "plot", "visualize", "visualization"];

fn wants_chart(mode: Mode, message: &str) -> bool {
    if mode == Mode::Chart {
        return true;
    }
    let m = message.to_lowercase();
    CHART_WORDS.iter().any(|w| m.contains(w))
}

/// Turn an executed result into the response shape the caller asked for.
///
/// Chart when requested and the result is chartable (≥2 columns, ≥1 row);
/// table for table mode or multi-row results; formatted text otherwise.
/// A failed chart render falls through to the table/text forms.
pub(crate) fn format_sql_response(
    table: Table,
    mode: Mode,
    message: &str,
    sql: String,
    charts: &ChartRenderer,
) -> AskResponse {
    if wants_chart(mode, message) && table.column_count() >= 2 && table.row_count() >= 1 {
        if let Some((x, y)) = pick_axes(&table) {
            match charts.render(&table, &x, &y, ChartKind::Bar) {
                Ok(chart_ref) => {
                    return AskResponse::new(Reply::Chart { chart_ref }, Some(sql));
                },
                Err(e) => tracing::warn!("chart rendering failed, falling back: {e}"),
            }
        }
    }

    if mode == Mode::Table || table.row_count() > 1 {
        return AskResponse::new(Reply::Table { table }, Some(sql));
    }

    AskResponse::new(Reply::text(format_sql_result(&table)), Some(sql))
}

/// Render a result as readable text: single values directly, small result
/// sets as a bullet list, large ones truncated to the top five.
pub(crate) fn format_sql_result(table: &Table) -> String {
    if table.is_empty() {
        return "No data found for your query.".to_owned();
    }

    if table.row_count() == 1 && table.column_count() == 1 {
        let value = &table.rows[0][0];
        if value.is_null() {
            return "No data available.".to_owned();
        }
        return format!("Result: {}", display_cell(value));
    }

    let shown = table.rows.len().min(if table.rows.len() <= 10 { 10 } else { 5 });
    let mut lines = Vec::with_capacity(shown);
    for row in table.rows.iter().take(shown) {
        if table.column_count() == 1 {
            lines.push(format!("\u{2022} {}", display_cell(&row[0])));
        } else {
            let parts: Vec<String> = table
                .columns
                .iter()
                .zip(row)
                .filter(|(_, v)| !v.is_null())
                .map(|(c, v)| format!("{c}: {}", display_cell(v)))
                .collect();
            lines.push(format!("\u{2022} {}", parts.join(", ")));
        }
    }

    let header = if table.rows.len() > 10 {
        format!("Found {} results (showing top 5):", table.rows.len())
    } else {
        format!("Found {} results:", table.rows.len())
    };
    format!("{header}\n{}", lines.join("\n"))
}

fn display_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() != 0.0 => format!("{f:.2}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped() -> Table {
        Table {
            columns: vec!["customer".to_owned(), "total_revenue".to_owned()],
            rows: vec![
                vec!["Acme LLC".into(), 1250.456.into()],
                vec!["Globex".into(), 800.into()],
            ],
        }
    }

    fn scalar(v: serde_json::Value) -> Table {
        Table { columns: vec!["order_count".to_owned()], rows: vec![vec![v]] }
    }

    fn renderer() -> ChartRenderer {
        ChartRenderer::new(std::env::temp_dir().join("datalens-format-tests"))
    }

    #[test]
    fn single_value_formats_as_result_line() {
        assert_eq!(format_sql_result(&scalar(42.into())), "Result: 42");
        assert_eq!(format_sql_result(&scalar(serde_json::Value::Null)), "No data available.");
    }

    #[test]
    fn small_sets_list_every_row() {
        let text = format_sql_result(&grouped());
        assert!(text.starts_with("Found 2 results:"));
        assert!(text.contains("customer: Acme LLC, total_revenue: 1250.46"));
        assert!(text.contains("total_revenue: 800"));
    }

    #[test]
    fn large_sets_truncate_to_top_five() {
        let table = Table {
            columns: vec!["customer".to_owned()],
            rows: (0..12).map(|i| vec![format!("c{i}").into()]).collect(),
        };
        let text = format_sql_result(&table);
        assert!(text.starts_with("Found 12 results (showing top 5):"));
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn multi_row_results_become_tables() {
        let resp =
            format_sql_response(grouped(), Mode::Auto, "revenue by customer", "SQL".to_owned(), &renderer());
        assert!(matches!(resp.reply, Reply::Table { .. }));
        assert_eq!(resp.sql.as_deref(), Some("SQL"));
    }

    #[test]
    fn single_values_become_text_in_auto_mode() {
        let resp = format_sql_response(
            scalar(7.into()),
            Mode::Auto,
            "how many orders",
            "SQL".to_owned(),
            &renderer(),
        );
        assert_eq!(resp.reply, Reply::text("Result: 7"));
    }

    #[test]
    fn chart_mode_renders_a_descriptor() {
        let resp = format_sql_response(
            grouped(),
            Mode::Chart,
            "revenue by customer",
            "SQL".to_owned(),
            &renderer(),
        );
        assert!(matches!(resp.reply, Reply::Chart { .. }));
    }

    #[test]
    fn chart_request_with_scalar_result_degrades_to_text() {
        let resp = format_sql_response(
            scalar(7.into()),
            Mode::Chart,
            "plot the order count",
            "SQL".to_owned(),
            &renderer(),
        );
        assert_eq!(resp.reply, Reply::text("Result: 7"));
    }
}
