//! Record filters for the typed cursor entry points

use crate::storage::adapter::SqlParam;

/// Filter for content items (type and status predicates, AND-combined)
///
/// Empty predicate lists match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilter {
    types: Vec<String>,
    statuses: Vec<String>,
}

impl ContentFilter {
    /// Filter matching all content items
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a content type; repeatable, values are OR-combined
    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.types.push(kind.into());
        self
    }

    /// Restrict to a status; repeatable, values are OR-combined
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.statuses.push(status.into());
        self
    }

    /// Render as a WHERE clause plus bound parameters, or `None` when empty
    pub(crate) fn to_where(&self) -> (Option<String>, Vec<SqlParam>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if !self.types.is_empty() {
            clauses.push(in_clause("post_type", self.types.len()));
            params.extend(self.types.iter().map(|t| SqlParam::Text(t.clone())));
        }
        if !self.statuses.is_empty() {
            clauses.push(in_clause("post_status", self.statuses.len()));
            params.extend(self.statuses.iter().map(|s| SqlParam::Text(s.clone())));
        }
        if clauses.is_empty() {
            (None, params)
        } else {
            (Some(clauses.join(" AND ")), params)
        }
    }
}

/// Filter for discussion items (status predicate)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFilter {
    statuses: Vec<String>,
}

impl CommentFilter {
    /// Filter matching all discussion items
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a status; repeatable, values are OR-combined
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.statuses.push(status.into());
        self
    }

    pub(crate) fn to_where(&self) -> (Option<String>, Vec<SqlParam>) {
        if self.statuses.is_empty() {
            return (None, Vec::new());
        }
        let clause = in_clause("status", self.statuses.len());
        let params = self
            .statuses
            .iter()
            .map(|s| SqlParam::Text(s.clone()))
            .collect();
        (Some(clause), params)
    }
}

fn in_clause(column: &str, count: usize) -> String {
    let placeholders = vec!["?"; count].join(", ");
    format!("{column} IN ({placeholders})")
}
