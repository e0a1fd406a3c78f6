use std::sync::LazyLock;

use chrono::{DateTime, NaiveTime, Utc};
use datalens_classify::extract_limit;
use datalens_core::constants::TS_FORMAT;
use datalens_core::Source;
use regex::Regex;

use crate::SqlGenError;

static MUTATING_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(update|delete|insert|drop|alter)\b").expect("mutating keyword regex is valid")
});

/// Table-name synonyms rewritten to the canonical table of the source.
/// Longest alternatives first so canonical names match as whole words.
static TABLE_SYNONYM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(financial_orders?|device_metrics?|orders?|devices|metrics)\b")
        .expect("table synonym regex is valid")
});

static DAY_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcurrent_date\b|\bdate_trunc\b|ts\s*>=").expect("day bound regex is valid")
});

static CLAUSE_AFTER_WHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(group\s+by|order\s+by|limit)\b").expect("clause regex is valid")
});

static WHERE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwhere\b").expect("where regex is valid"));

/// Extract a SQL statement from raw model output.
///
/// Prefers fenced code blocks; otherwise falls back to collecting lines that
/// look like SQL clauses. Returns `None` when nothing resembling a SELECT is
/// present.
#[must_use]
pub fn extract_sql(text: &str) -> Option<String> {
    let cleaned = text.replace("```sql", "```").replace("```SQL", "```");
    if cleaned.contains("```") {
        for part in cleaned.split("```") {
            let part = part.trim();
            let upper = part.to_uppercase();
            if !part.is_empty() && (upper.contains("SELECT") || upper.contains("WITH")) {
                return Some(part.to_owned());
            }
        }
    }

    let upper = text.to_uppercase();
    if upper.contains("SELECT") || upper.contains("WITH") {
        let sql_lines: Vec<&str> = text
            .lines()
            .filter(|line| {
                let u = line.to_uppercase();
                ["SELECT", "FROM", "WHERE", "GROUP BY", "ORDER BY", "LIMIT"]
                    .iter()
                    .any(|kw| u.contains(kw))
            })
            .map(str::trim)
            .collect();
        if !sql_lines.is_empty() {
            return Some(sql_lines.join("\n"));
        }
    }

    None
}

/// Normalize externally generated SQL before execution.
///
/// Never applied to rule-compiled SQL, which is trusted by construction.
/// Steps, in order:
/// 1. reject any statement with a mutating keyword as a whole word,
/// 2. reject multiple statements,
/// 3. rewrite table-name synonyms to the canonical table for `source`
///    (leaving `ORDER BY` untouched),
/// 4. guarantee a single trailing terminator,
/// 5. if the message says "today" but the SQL has no day bound, inject a
///    day-truncation conjunct.
pub fn normalize(
    sql: &str,
    source: Source,
    message: &str,
    now: DateTime<Utc>,
) -> Result<String, SqlGenError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(SqlGenError::Empty);
    }

    if let Some(m) = MUTATING_KEYWORD.find(trimmed) {
        return Err(SqlGenError::UnsafeStatement(m.as_str().to_lowercase()));
    }

    let body = trimmed.trim_end_matches(';').trim_end();
    if body.is_empty() {
        return Err(SqlGenError::Empty);
    }
    if body.contains(';') {
        return Err(SqlGenError::MultipleStatements);
    }

    let mut text = rewrite_table_names(body, source.table());

    if message.to_lowercase().contains("today") && !DAY_BOUND.is_match(&text) {
        text = inject_day_bound(&text, now);
    }

    text.push(';');
    Ok(text)
}

/// Rewrite table-name synonyms, skipping the ORDER of `ORDER BY`.
fn rewrite_table_names(sql: &str, table: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for m in TABLE_SYNONYM.find_iter(sql) {
        let word = m.as_str();
        let tail = &sql[m.end()..];
        let is_order_by = word.eq_ignore_ascii_case("order")
            && tail.trim_start().to_lowercase().starts_with("by");
        out.push_str(&sql[last..m.start()]);
        if is_order_by {
            out.push_str(word);
        } else {
            out.push_str(table);
        }
        last = m.end();
    }
    out.push_str(&sql[last..]);
    out
}

/// Add `ts >= '<today 00:00>'` as a conjunct, creating a WHERE clause if the
/// statement has none.
fn inject_day_bound(sql: &str, now: DateTime<Utc>) -> String {
    let day_start = now.naive_utc().date().and_time(NaiveTime::MIN);
    let bound = format!("ts >= '{}'", day_start.format(TS_FORMAT));

    if let Some(m) = WHERE_KEYWORD.find(sql) {
        let (head, tail) = sql.split_at(m.end());
        return format!("{head} {bound} AND{tail}");
    }

    if let Some(m) = CLAUSE_AFTER_WHERE.find(sql) {
        let (head, tail) = sql.split_at(m.start());
        return format!("{} WHERE {bound} {}", head.trim_end(), tail);
    }

    format!("{sql} WHERE {bound}")
}

/// Append a LIMIT clause when the message asks for a row count and the
/// generated SQL forgot one.
#[must_use]
pub fn enforce_limit(sql: &str, message: &str) -> String {
    let Some(n) = extract_limit(message) else {
        return sql.to_owned();
    };
    if sql.to_uppercase().contains("LIMIT") {
        return sql.to_owned();
    }
    let body = sql.trim_end().trim_end_matches(';').trim_end();
    tracing::debug!("adding LIMIT {n} to generated SQL");
    format!("{body} LIMIT {n};")
}
