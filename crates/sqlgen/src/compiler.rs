use chrono::{DateTime, Utc};
use datalens_classify::{extract_limit, resolve_time_window};
use datalens_core::Source;

/// Compile a recognized question shape into aggregate SQL for `source`.
///
/// A source-specific ordered decision list: the first trigger that matches
/// wins, and the triggers are mutually exclusive by construction (count vs.
/// revenue vs. average vs. status breakdown). Returns `None` when no rule
/// matches; the caller falls back to external generation. This compiler
/// never fabricates SQL for unrecognized shapes.
#[must_use]
pub fn compile(message: &str, source: Source, now: DateTime<Utc>) -> Option<String> {
    let m = message.to_lowercase();
    let time = resolve_time_window(message, now);
    let tf = &time.predicate;
    let limit = match extract_limit(message) {
        Some(n) => format!(" LIMIT {n}"),
        None => String::new(),
    };
    let tbl = source.table();

    let sql = match source {
        Source::Financial => {
            let group_by_customer = m.contains("by customer")
                || m.contains("per customer")
                || (m.contains("top") && m.contains("customer"))
                || (m.contains("customer")
                    && (m.contains("breakdown") || m.contains("list") || m.contains("show")))
                || m.contains("customers by")
                || m.contains("revenue by customer")
                || m.contains("revenues by customer")
                || m.contains("customers with");
            let status_breakdown = m.contains("status")
                || m.contains("paid")
                || m.contains("refunded")
                || m.contains("cancelled");

            if m.contains("how many") && m.contains("order") {
                Some(format!("SELECT COUNT(*) AS order_count FROM {tbl} WHERE {tf};"))
            } else if m.contains("revenue") || m.contains("sales") || m.contains("income") {
                if group_by_customer {
                    Some(format!(
                        "SELECT customer, COALESCE(SUM(amount), 0) AS total_revenue FROM {tbl} \
                         WHERE {tf} AND amount IS NOT NULL GROUP BY customer \
                         ORDER BY total_revenue DESC{limit};"
                    ))
                } else {
                    Some(format!(
                        "SELECT COALESCE(SUM(amount), 0) AS total_revenue FROM {tbl} \
                         WHERE {tf} AND amount IS NOT NULL;"
                    ))
                }
            } else if (m.contains("average") || m.contains("avg") || m.contains("mean"))
                && (m.contains("order") || m.contains("amount"))
            {
                Some(format!("SELECT AVG(amount) AS average_order_value FROM {tbl} WHERE {tf};"))
            } else if status_breakdown {
                Some(format!(
                    "SELECT status, COUNT(*) AS order_count FROM {tbl} WHERE {tf} \
                     GROUP BY status ORDER BY order_count DESC{limit};"
                ))
            } else {
                None
            }
        },
        Source::Devices => {
            if m.contains("average") && m.contains("uptime") {
                if m.contains("by location") || m.contains("per location") {
                    Some(format!(
                        "SELECT location, AVG(uptime_minutes) AS average_uptime_minutes FROM {tbl} \
                         WHERE {tf} GROUP BY location ORDER BY average_uptime_minutes DESC;"
                    ))
                } else {
                    Some(format!(
                        "SELECT AVG(uptime_minutes) AS average_uptime_minutes FROM {tbl} WHERE {tf};"
                    ))
                }
            } else if m.contains("uptime")
                && (m.contains("by location") || m.contains("per location"))
            {
                Some(format!(
                    "SELECT location, AVG(uptime_minutes) AS average_uptime_minutes FROM {tbl} \
                     WHERE {tf} GROUP BY location ORDER BY average_uptime_minutes DESC;"
                ))
            } else if m.contains("how many") && m.contains("device") {
                Some(format!(
                    "SELECT COUNT(DISTINCT device_id) AS device_count FROM {tbl} WHERE {tf};"
                ))
            } else if m.contains("status") || m.contains("online") || m.contains("offline") {
                Some(format!(
                    "SELECT status, COUNT(*) AS device_count FROM {tbl} WHERE {tf} \
                     GROUP BY status ORDER BY device_count DESC;"
                ))
            } else {
                None
            }
        },
    };

    if let Some(ref sql) = sql {
        tracing::debug!(source = %source, window = %time.label, "rule compiler matched: {sql}");
    }
    sql
}
