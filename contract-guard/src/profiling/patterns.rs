//! Include/exclude selection of the columns a profiling run covers.
//!
//! Selection expressions are `table.column` patterns where either segment may
//! use the SQL LIKE `%` wildcard. Matching is case-insensitive. Filtering
//! happens here, over the data source's column metadata; patterns are never
//! pushed down into generated SQL, which is why quote characters are
//! rejected outright.

use crate::diagnostics::Logs;
use regex::Regex;

/// One `table.column` segment: a literal name or a LIKE pattern.
#[derive(Debug, Clone)]
enum PatternSegment {
    Exact(String),
    Like(Regex),
}

impl PatternSegment {
    fn parse(raw: &str) -> Self {
        if raw.contains('%') {
            let pattern = raw
                .split('%')
                .map(regex::escape)
                .collect::<Vec<String>>()
                .join(".*");
            // the alphabet is pre-validated, so the built regex is well formed
            match Regex::new(&format!("(?i)^{pattern}$")) {
                Ok(regex) => PatternSegment::Like(regex),
                Err(_) => PatternSegment::Exact(raw.to_string()),
            }
        } else {
            PatternSegment::Exact(raw.to_string())
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            PatternSegment::Exact(exact) => exact.eq_ignore_ascii_case(name),
            PatternSegment::Like(regex) => regex.is_match(name),
        }
    }
}

#[derive(Debug, Clone)]
struct ColumnPattern {
    table: PatternSegment,
    column: PatternSegment,
}

impl ColumnPattern {
    fn matches(&self, table_name: &str, column_name: &str) -> bool {
        self.table.matches(table_name) && self.column.matches(column_name)
    }
}

/// The parsed include/exclude column selection of a profiling run.
#[derive(Debug, Clone, Default)]
pub struct ProfileSelection {
    includes: Vec<ColumnPattern>,
    excludes: Vec<ColumnPattern>,
}

impl ProfileSelection {
    /// Parses a list of selection expressions, e.g. `["include orders.%",
    /// "exclude orders.internal_id"]`. The `include` word is optional.
    /// Malformed expressions are reported and skipped.
    pub fn parse(expressions: &[String], logs: &mut Logs) -> Self {
        let mut selection = ProfileSelection::default();
        for expression in expressions {
            let trimmed = expression.trim();
            let (is_exclude, pattern) = match trimmed.strip_prefix("exclude ") {
                Some(rest) => (true, rest.trim()),
                None => (false, trimmed.strip_prefix("include ").unwrap_or(trimmed).trim()),
            };

            if pattern.contains('\'') || pattern.contains('"') {
                logs.error(format!(
                    "Invalid column expression: {expression} - quotes are not allowed"
                ));
                continue;
            }
            let Some((table, column)) = pattern.split_once('.') else {
                logs.error(format!(
                    "Invalid column expression: {expression} - must be of the form table.column"
                ));
                continue;
            };

            let column_pattern = ColumnPattern {
                table: PatternSegment::parse(table),
                column: PatternSegment::parse(column),
            };
            if is_exclude {
                selection.excludes.push(column_pattern);
            } else {
                selection.includes.push(column_pattern);
            }
        }
        if selection.includes.is_empty() && !selection.excludes.is_empty() {
            logs.warning("Column selection has no include patterns; nothing will be profiled");
        }
        selection
    }

    /// A column is selected when at least one include pattern matches and no
    /// exclude pattern does.
    pub fn is_selected(&self, table_name: &str, column_name: &str) -> bool {
        self.includes
            .iter()
            .any(|pattern| pattern.matches(table_name, column_name))
            && !self
                .excludes
                .iter()
                .any(|pattern| pattern.matches(table_name, column_name))
    }
}
