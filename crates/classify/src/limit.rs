use std::sync::LazyLock;

use regex::Regex;

static LIMIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\btop\s+(\d+)\b",
        r"\bfirst\s+(\d+)\b",
        r"\blimit\s+(\d+)\b",
        r"\bshow\s+(\d+)\b",
        r"\b(\d+)\s+(?:customers?|orders?|devices?|results?)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("limit regex is valid"))
    .collect()
});

/// Extract a requested row count from phrasings like "top 5", "first 10",
/// "limit 20", "show 3" or "5 customers". Patterns are tried in that order;
/// the first one that matches wins.
#[must_use]
pub fn extract_limit(message: &str) -> Option<u32> {
    let m = message.to_lowercase();
    for pattern in LIMIT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&m) {
            if let Some(n) = caps.get(1).and_then(|g| g.as_str().parse().ok()) {
                return Some(n);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_each_phrasing() {
        assert_eq!(extract_limit("top 5 customers by revenue"), Some(5));
        assert_eq!(extract_limit("first 10 orders"), Some(10));
        assert_eq!(extract_limit("limit 20 please"), Some(20));
        assert_eq!(extract_limit("show 3 results"), Some(3));
        assert_eq!(extract_limit("give me 7 devices"), Some(7));
    }

    #[test]
    fn pattern_order_decides_on_overlap() {
        // "top 5" wins over "10 orders" because the top-N pattern is tried first
        assert_eq!(extract_limit("top 5 of our 10 orders"), Some(5));
    }

    #[test]
    fn no_count_yields_none() {
        assert_eq!(extract_limit("revenue by customer"), None);
        assert_eq!(extract_limit("orders from 2024"), None);
    }
}
