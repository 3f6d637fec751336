use std::cmp::Ordering;

use anyhow::{Context, Result};
use snmp2::Oid;

pub fn parse_oid(s: &str) -> Result<Oid<'static>> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.context(format!("invalid OID: {}", s))?;
    Oid::from(&parts).map_err(|e| anyhow::anyhow!("cannot build OID {}: {:?}", s, e))
}

/// Dotted form without leading or trailing dots, as agents echo it back.
pub fn normalize_oid(s: &str) -> String {
    s.trim().trim_matches('.').to_string()
}

/// Orders two dotted OIDs arc by arc, the way an agent orders GETNEXT results.
pub fn compare_oids(a: &str, b: &str) -> Ordering {
    let arcs = |s: &str| -> Option<Vec<u64>> {
        s.split('.')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u64>().ok())
            .collect()
    };

    match (arcs(a), arcs(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Row index of `oid` inside the column rooted at `column_root`, if `oid` is strictly under it.
pub fn row_index<'a>(column_root: &str, oid: &'a str) -> Option<&'a str> {
    oid.strip_prefix(column_root)?
        .strip_prefix('.')
        .filter(|index| !index.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_arcs_numerically() {
        assert_eq!(compare_oids("1.3.6.1.2", "1.3.6.1.10"), Ordering::Less);
        assert_eq!(compare_oids("1.3.6.1", "1.3.6.1.1"), Ordering::Less);
        assert_eq!(compare_oids("1.3.6", "1.3.6"), Ordering::Equal);
    }

    #[test]
    fn row_index_requires_separator() {
        assert_eq!(row_index("1.3.6.1.4.1", "1.3.6.1.4.1.7"), Some("7"));
        assert_eq!(row_index("1.3.6.1.4.1", "1.3.6.1.4.1.2.15"), Some("2.15"));
        assert_eq!(row_index("1.3.6.1.4.1", "1.3.6.1.4.10"), None);
        assert_eq!(row_index("1.3.6.1.4.1", "1.3.6.1.4.11.1"), None);
        assert_eq!(row_index("1.3.6.1.4.1", "1.3.6.1.4.1"), None);
    }

    #[test]
    fn normalizes_leading_dot() {
        assert_eq!(normalize_oid(" .1.3.6.1. "), "1.3.6.1");
    }

    #[test]
    fn parses_dotted_oid() {
        assert!(parse_oid("1.3.6.1.2.1.1.3.0").is_ok());
        assert!(parse_oid("1.3.six.1").is_err());
    }
}
