use sqlformat::{format, FormatOptions, Indent, QueryParams};
use tracing::warn;

/// Reindent `query` and upper-case its keywords.
///
/// Falls back to the input untouched if the formatter produces nothing.
pub fn format_query(query: &str) -> String {
    let options = FormatOptions {
        indent: Indent::Spaces(2),
        uppercase: Some(true),
        ..FormatOptions::default()
    };

    let formatted = format(query, &QueryParams::None, &options);
    if formatted.trim().is_empty() && !query.trim().is_empty() {
        warn!("SQL formatter returned no output, keeping the original query");
        return query.to_string();
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_keywords_and_breaks_clauses() {
        let formatted = format_query("select id, name from users where id = 1");

        assert!(formatted.starts_with("SELECT"));
        assert!(formatted.contains("\nFROM\n"));
        assert!(formatted.contains("\nWHERE\n"));
        assert!(formatted.contains("users"));
        assert!(formatted.lines().count() > 1);
    }

    #[test]
    fn indents_with_two_spaces() {
        let formatted = format_query("select * from users");
        assert!(formatted.lines().any(|line| line == "  users"));
    }

    #[test]
    fn is_deterministic() {
        let query = "select a, count(*) from t group by a order by 2 desc";
        assert_eq!(format_query(query), format_query(query));
    }

    #[test]
    fn leaves_literals_alone() {
        let formatted = format_query("select 'select from' as s");
        assert!(formatted.contains("'select from'"));
    }
}
