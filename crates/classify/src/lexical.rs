use datalens_core::{Mode, Source};

/// Keywords scored toward the financial source.
const FINANCIAL_KEYWORDS: &[&str] = &[
    "order",
    "orders",
    "revenue",
    "sales",
    "customer",
    "customers",
    "payment",
    "paid",
    "amount",
    "money",
    "price",
    "invoice",
    "billing",
    "financial",
    "transaction",
];

/// Keywords scored toward the devices source.
const DEVICE_KEYWORDS: &[&str] = &[
    "device",
    "devices",
    "sensor",
    "sensors",
    "uptime",
    "online",
    "offline",
    "status",
    "location",
    "iot",
    "telemetry",
    "metrics",
    "monitoring",
];

const CHART_KEYWORDS: &[&str] =
    &["chart", "graph", "plot", "visualize", "visualization", "show me a chart", "create a graph"];

const TABLE_KEYWORDS: &[&str] = &[
    "table",
    "list",
    "show all",
    "breakdown",
    "by location",
    "by customer",
    "by status",
    "group by",
];

const TEXT_KEYWORDS: &[&str] =
    &["how many", "count", "total", "sum", "average", "avg", "what is", "tell me"];

/// Social phrases matched as substrings.
const GREETING_PHRASES: &[&str] =
    &["thank you", "good morning", "good afternoon", "good evening", "how are you"];

/// Social words matched on word boundaries; a bare substring check would
/// misfire on ordinary analytics phrasing ("hi" inside "this week").
const GREETING_WORDS: &[&str] =
    &["thanks", "thank", "bye", "goodbye", "hello", "hi", "hey"];

/// Aggregation vocabulary used when the external intent classifier is
/// unavailable.
const AGGREGATION_KEYWORDS: &[&str] = &[
    "how many",
    "how much",
    "count",
    "total",
    "sum",
    "average",
    "avg",
    "mean",
    "min",
    "max",
    "revenue",
    "sales order",
    "sales orders",
    "orders did we get",
    "orders did we receive",
    "number of orders",
];

fn score(message: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| message.contains(*k)).count()
}

/// Pick the dataset a message most likely targets.
///
/// Ties (including zero matches on both sides) resolve to the financial
/// source; that bias is the documented default, not an accident.
#[must_use]
pub fn detect_source(message: &str) -> Source {
    let m = message.to_lowercase();
    let financial = score(&m, FINANCIAL_KEYWORDS);
    let devices = score(&m, DEVICE_KEYWORDS);
    if devices > financial {
        Source::Devices
    } else {
        Source::Financial
    }
}

/// Pick a presentation mode from the message, first match wins:
/// chart > table > text, falling through to auto.
#[must_use]
pub fn detect_mode(message: &str) -> Mode {
    let m = message.to_lowercase();
    if CHART_KEYWORDS.iter().any(|k| m.contains(k)) {
        Mode::Chart
    } else if TABLE_KEYWORDS.iter().any(|k| m.contains(k)) {
        Mode::Table
    } else if TEXT_KEYWORDS.iter().any(|k| m.contains(k)) {
        Mode::Text
    } else {
        Mode::Auto
    }
}

fn words(message: &str) -> impl Iterator<Item = &str> {
    message.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// Whether the message is a greeting, thanks, or other social interaction.
///
/// Greetings take precedence over all other classification: the router
/// answers them directly and never reaches cache, SQL, or retrieval.
#[must_use]
pub fn is_greeting(message: &str) -> bool {
    let m = message.to_lowercase();
    let m = m.trim();
    GREETING_PHRASES.iter().any(|p| m.contains(p))
        || words(m).any(|w| GREETING_WORDS.contains(&w))
}

/// Canned response for a social message.
#[must_use]
pub fn greeting_reply(message: &str) -> &'static str {
    let m = message.to_lowercase();
    let m = m.trim();
    if words(m).any(|w| w.starts_with("thank")) {
        "You're welcome! Feel free to ask any questions about your data."
    } else if words(m).any(|w| w == "bye" || w == "goodbye") {
        "Goodbye! Have a great day!"
    } else {
        "Hello! I'm here to help you analyze your data. What would you like to know?"
    }
}

/// Heuristic SQL-vs-retrieval decision, used only when the external intent
/// classifier call fails or is unavailable.
#[must_use]
pub fn needs_sql(message: &str) -> bool {
    let m = message.to_lowercase();
    AGGREGATION_KEYWORDS.iter().any(|k| m.contains(k))
}
