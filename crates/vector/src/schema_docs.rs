//! Static documentation of the warehouse tables and the query patterns
//! ingested into the vector store at startup, and the fallback context used
//! when retrieval is unavailable.

use datalens_core::Source;

/// Documentation for one warehouse table.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDoc {
    pub source: Source,
    pub table: &'static str,
    pub description: &'static str,
    pub schema: &'static str,
    pub sample_data: &'static str,
}

pub const SCHEMA_DOCS: &[SchemaDoc] = &[
    SchemaDoc {
        source: Source::Financial,
        table: "financial_orders",
        description: "Financial transaction records from sales orders",
        schema: "financial_orders(order_id BIGINT, customer TEXT, amount DOUBLE, currency TEXT, \
                 ts TIMESTAMP, status TEXT)",
        sample_data: "order_id=1001, customer='Acme LLC', amount=1250.50, currency='USD', \
                      ts='2024-08-16 14:30:00', status='PAID'",
    },
    SchemaDoc {
        source: Source::Devices,
        table: "device_metrics",
        description: "IoT device telemetry and status monitoring data",
        schema: "device_metrics(device_id TEXT, status TEXT, uptime_minutes DOUBLE, \
                 location TEXT, ts TIMESTAMP)",
        sample_data: "device_id='dev-1001', status='ONLINE', uptime_minutes=1320.5, \
                      location='DXB-01', ts='2024-08-16 14:30:00'",
    },
];

/// Recognized phrasing→SQL examples, ingested alongside the schema docs so
/// that retrieval can surface them as generation hints.
pub(crate) const QUERY_PATTERN_DOCS: &[(&str, &str)] = &[
    (
        "how many orders",
        "SELECT COUNT(*) AS order_count FROM financial_orders",
    ),
    (
        "revenue today",
        "SELECT COALESCE(SUM(amount), 0) AS total_revenue FROM financial_orders",
    ),
    (
        "revenue by customer",
        "SELECT customer, COALESCE(SUM(amount), 0) AS total_revenue FROM financial_orders \
         GROUP BY customer",
    ),
    (
        "how many devices online",
        "SELECT COUNT(*) AS device_count FROM device_metrics WHERE status = 'ONLINE'",
    ),
    (
        "average uptime",
        "SELECT AVG(uptime_minutes) AS average_uptime_minutes FROM device_metrics",
    ),
];

impl SchemaDoc {
    /// Text embedded for this doc.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        format!(
            "Table: {}\nDescription: {}\nSchema: {}\nSample Data: {}",
            self.table, self.description, self.schema, self.sample_data
        )
    }
}

/// Schema context assembled without the vector store, used at startup and
/// whenever retrieval fails.
#[must_use]
pub fn static_schema_context(source: Source) -> String {
    SCHEMA_DOCS
        .iter()
        .filter(|d| d.source == source)
        .flat_map(|d| {
            [format!("TABLE SCHEMA: {}", d.schema), format!("DESCRIPTION: {}", d.description)]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_context_covers_each_source() {
        let fin = static_schema_context(Source::Financial);
        assert!(fin.contains("financial_orders"));
        assert!(!fin.contains("device_metrics"));

        let dev = static_schema_context(Source::Devices);
        assert!(dev.contains("device_metrics"));
        assert!(dev.contains("uptime_minutes"));
    }
}
