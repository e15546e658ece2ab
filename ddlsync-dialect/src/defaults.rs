//! Normalization of default and check expressions.
//!
//! Expressions are kept as text. Two spellings of the same expression must
//! compare equal after normalization, so whitespace is collapsed, everything
//! outside string literals is lower-cased and redundant outer parentheses are
//! removed.

/// Normalize a default expression. `NULL` and empty input mean "no default".
pub fn normalize(expr: &str) -> Option<String> {
    let squeezed = strip_outer_parens(&squeeze(expr));
    if squeezed.is_empty() || squeezed == "null" {
        return None;
    }
    Some(squeezed)
}

/// Remove PostgreSQL casts on literals (`'active'::text`, `0::bigint`).
pub fn strip_literal_cast(expr: &str) -> String {
    let Some((literal, ty)) = split_cast(expr) else {
        return expr.to_string();
    };
    let is_type = ty
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ',' | '[' | ']'));
    if is_type && (is_number(literal) || is_string(literal)) {
        literal.to_string()
    } else {
        expr.to_string()
    }
}

/// Split `literal::type` at the first `::` outside a string literal.
fn split_cast(expr: &str) -> Option<(&str, &str)> {
    let mut in_string = false;
    let bytes = expr.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => in_string = !in_string,
            b':' if !in_string && bytes.get(i + 1) == Some(&b':') => {
                return Some((&expr[..i], &expr[i + 2..]));
            }
            _ => {}
        }
    }
    None
}

fn is_number(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut parts = digits.splitn(2, '.');
    let int = parts.next().unwrap_or_default();
    let frac = parts.next();
    !int.is_empty()
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.is_none_or(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()))
}

fn is_string(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'')
}

/// Is `expr` a literal that needs no parentheses in a MySQL or Spanner default?
pub fn is_literal(expr: &str) -> bool {
    if is_number(expr) || is_string(expr) {
        return true;
    }
    matches!(
        expr,
        "true" | "false" | "null" | "current_timestamp" | "current_date" | "current_time"
    )
}

/// Collapse whitespace and lower-case everything outside string literals.
pub fn squeeze(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut in_string = false;
    let mut pending_space = false;

    for c in expr.trim().chars() {
        if in_string {
            out.push(c);
            if c == '\'' {
                in_string = false;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev = out.chars().last();
            if !matches!(prev, Some('(') | None) && c != ')' && c != ',' {
                out.push(' ');
            }
            pending_space = false;
        }
        if c == '\'' {
            in_string = true;
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Drop parentheses that wrap the whole expression.
pub fn strip_outer_parens(expr: &str) -> String {
    let mut current = expr.trim();
    while current.len() >= 2
        && current.starts_with('(')
        && current.ends_with(')')
        && wraps_whole(current)
    {
        current = current[1..current.len() - 1].trim();
    }
    current.to_string()
}

/// Does the opening parenthesis at index 0 close at the last character?
fn wraps_whole(expr: &str) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let last = expr.len() - 1;
    for (i, c) in expr.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_and_case() {
        assert_eq!(normalize("  NOW( )  ").as_deref(), Some("now()"));
        assert_eq!(
            normalize("CURRENT_TIMESTAMP").as_deref(),
            Some("current_timestamp")
        );
        assert_eq!(normalize("'Hello  World'").as_deref(), Some("'Hello  World'"));
        assert_eq!(normalize("1 +\n  2").as_deref(), Some("1 + 2"));
    }

    #[test]
    fn test_normalize_null() {
        assert_eq!(normalize("NULL"), None);
        assert_eq!(normalize("(null)"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_strip_outer_parens() {
        assert_eq!(strip_outer_parens("(1)"), "1");
        assert_eq!(strip_outer_parens("((now()))"), "now()");
        assert_eq!(strip_outer_parens("(a) + (b)"), "(a) + (b)");
        assert_eq!(strip_outer_parens("(')')"), "')'");
    }

    #[test]
    fn test_strip_literal_cast() {
        assert_eq!(strip_literal_cast("'active'::text"), "'active'");
        assert_eq!(
            strip_literal_cast("'a'::character varying"),
            "'a'"
        );
        assert_eq!(strip_literal_cast("0::bigint"), "0");
        assert_eq!(strip_literal_cast("'{}'::text[]"), "'{}'");
        assert_eq!(
            strip_literal_cast("nextval('seq'::regclass)"),
            "nextval('seq'::regclass)"
        );
    }

    #[test]
    fn test_is_literal() {
        assert!(is_literal("0"));
        assert!(is_literal("-1.5"));
        assert!(is_literal("'x'"));
        assert!(is_literal("true"));
        assert!(is_literal("current_timestamp"));
        assert!(!is_literal("uuid()"));
        assert!(!is_literal("now()"));
    }
}
