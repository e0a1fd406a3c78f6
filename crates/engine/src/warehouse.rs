use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use datalens_core::Table;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::error::EngineError;

/// Handle to the embedded warehouse. Cheap to clone; all clones share one
/// connection behind a mutex.
#[derive(Clone)]
pub struct Warehouse {
    conn: Arc<Mutex<Connection>>,
}

fn lock_conn(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, EngineError> {
    conn.lock().map_err(|_| EngineError::LockPoisoned)
}

impl std::fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warehouse").finish_non_exhaustive()
    }
}

impl Warehouse {
    /// Open (or create) the warehouse at `path` and ensure its tables exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// An in-memory warehouse, used by tests and the demo seeder.
    ///
    /// # Errors
    /// Returns an error if the database cannot be created.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, EngineError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS financial_orders (
                order_id INTEGER,
                customer TEXT,
                amount REAL,
                currency TEXT,
                ts TEXT,
                status TEXT
            );
            CREATE TABLE IF NOT EXISTS device_metrics (
                device_id TEXT,
                status TEXT,
                uptime_minutes REAL,
                location TEXT,
                ts TEXT
            );",
        )?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Execute a read query synchronously and collect the full result.
    ///
    /// # Errors
    /// Returns an error on malformed SQL or a lock failure.
    pub fn execute(&self, sql: &str) -> Result<Table, EngineError> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut raw = stmt.query([])?;
        while let Some(row) = raw.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(cell_to_json(row.get_ref(i)?));
            }
            rows.push(cells);
        }

        Ok(Table { columns, rows })
    }

    /// Async wrapper around [`Self::execute`]; the blocking query runs on
    /// the blocking thread pool.
    ///
    /// # Errors
    /// Returns an error on malformed SQL, a lock failure, or task failure.
    pub async fn query(&self, sql: &str) -> Result<Table, EngineError> {
        let warehouse = self.clone();
        let sql = sql.to_owned();
        tokio::task::spawn_blocking(move || warehouse.execute(&sql)).await?
    }

    /// Insert one financial order row. Used by the seeder and tests.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_order(
        &self,
        order_id: i64,
        customer: &str,
        amount: Option<f64>,
        currency: &str,
        ts: &str,
        status: &str,
    ) -> Result<(), EngineError> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO financial_orders (order_id, customer, amount, currency, ts, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![order_id, customer, amount, currency, ts, status],
        )?;
        Ok(())
    }

    /// Insert one device metric row. Used by the seeder and tests.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_metric(
        &self,
        device_id: &str,
        status: &str,
        uptime_minutes: f64,
        location: &str,
        ts: &str,
    ) -> Result<(), EngineError> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO device_metrics (device_id, status, uptime_minutes, location, ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![device_id, status, uptime_minutes, location, ts],
        )?;
        Ok(())
    }
}

fn cell_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => {
            serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
        },
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => {
            tracing::warn!("blob column in query result, returning null");
            serde_json::Value::Null
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Warehouse {
        let w = Warehouse::open_in_memory().unwrap();
        w.insert_order(1, "Acme LLC", Some(100.0), "USD", "2024-08-16 10:00:00", "PAID").unwrap();
        w.insert_order(2, "Globex", Some(250.5), "USD", "2024-08-16 11:00:00", "PAID").unwrap();
        w.insert_order(3, "Acme LLC", None, "USD", "2024-08-15 09:00:00", "PENDING").unwrap();
        w
    }

    #[test]
    fn count_query_returns_single_cell() {
        let w = seeded();
        let t = w
            .execute("SELECT COUNT(*) AS order_count FROM financial_orders WHERE 1=1;")
            .unwrap();
        assert_eq!(t.columns, vec!["order_count"]);
        assert_eq!(t.rows, vec![vec![serde_json::Value::from(3)]]);
    }

    #[test]
    fn coalesced_sum_skips_null_amounts() {
        let w = seeded();
        let t = w
            .execute(
                "SELECT COALESCE(SUM(amount), 0) AS total_revenue FROM financial_orders \
                 WHERE 1=1 AND amount IS NOT NULL;",
            )
            .unwrap();
        assert_eq!(t.rows[0][0], serde_json::Value::from(350.5));
    }

    #[test]
    fn time_predicate_compares_as_string() {
        let w = seeded();
        let t = w
            .execute(
                "SELECT COUNT(*) AS c FROM financial_orders WHERE ts >= '2024-08-16 00:00:00';",
            )
            .unwrap();
        assert_eq!(t.rows[0][0], serde_json::Value::from(2));
    }

    #[test]
    fn group_by_orders_rows() {
        let w = seeded();
        let t = w
            .execute(
                "SELECT customer, COUNT(*) AS n FROM financial_orders \
                 GROUP BY customer ORDER BY n DESC;",
            )
            .unwrap();
        assert_eq!(t.columns, vec!["customer", "n"]);
        assert_eq!(t.rows[0][0], serde_json::Value::from("Acme LLC"));
    }

    #[test]
    fn null_cells_become_json_null() {
        let w = seeded();
        let t = w
            .execute("SELECT amount FROM financial_orders WHERE order_id = 3;")
            .unwrap();
        assert_eq!(t.rows[0][0], serde_json::Value::Null);
    }

    #[test]
    fn malformed_sql_is_an_error() {
        let w = seeded();
        assert!(w.execute("SELEC nonsense").is_err());
    }

    #[tokio::test]
    async fn async_query_round_trips() {
        let w = seeded();
        let t = w.query("SELECT COUNT(*) AS c FROM financial_orders;").await.unwrap();
        assert_eq!(t.rows[0][0], serde_json::Value::from(3));
    }
}
