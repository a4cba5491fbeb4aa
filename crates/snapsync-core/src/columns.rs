//! Select-clause column parsing
//!
//! Extracts bare column identifiers from a comma-separated select expression
//! so the requested columns can be cross-checked against live schema metadata
//! before any SQL is built. Computed expressions are not supported; the job
//! list is assumed to name plain columns (optionally quoted or aliased).

/// The literal wildcard selector, which bypasses validation entirely.
pub const WILDCARD: &str = "*";

/// Check whether a select expression is the bare wildcard.
pub fn is_wildcard(select: &str) -> bool {
    select.trim() == WILDCARD
}

/// Parse the bare column identifiers out of a select expression.
///
/// Handles the forms the static job list actually uses:
/// - backtick quoting is stripped: `` `user_id` `` -> `user_id`
/// - `AS`-aliases are discarded (case-insensitive): `amount AS amt` -> `amount`
/// - a bare trailing alias is discarded: `amount amt` -> `amount`
///
/// Empty fragments (e.g. from a trailing comma) are skipped.
pub fn parse_select_columns(select: &str) -> Vec<String> {
    let mut cols = Vec::new();
    for raw in select.split(',') {
        let token = raw.trim().replace('`', "");
        let token = split_alias(&token);
        let token = token.split_whitespace().next().unwrap_or("");
        if !token.is_empty() {
            cols.push(token.to_string());
        }
    }
    cols
}

/// Drop everything from an ` as ` separator onward, case-insensitively.
fn split_alias(token: &str) -> &str {
    let lower = token.to_ascii_lowercase();
    match lower.find(" as ") {
        Some(idx) => &token[..idx],
        None => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_columns() {
        let cols = parse_select_columns("id, name, created_at");
        assert_eq!(cols, vec!["id", "name", "created_at"]);
    }

    #[test]
    fn test_backticks_stripped() {
        let cols = parse_select_columns("id, `user_id`, amount");
        assert_eq!(cols, vec!["id", "user_id", "amount"]);
    }

    #[test]
    fn test_aliases_discarded() {
        let cols = parse_select_columns("amount as amt, total AS t, rate r");
        assert_eq!(cols, vec!["amount", "total", "rate"]);
    }

    #[test]
    fn test_empty_fragments_skipped() {
        let cols = parse_select_columns("id,, name,");
        assert_eq!(cols, vec!["id", "name"]);
    }

    #[test]
    fn test_wildcard_detection() {
        assert!(is_wildcard("*"));
        assert!(is_wildcard(" * "));
        assert!(!is_wildcard("a, *"));
    }
}
