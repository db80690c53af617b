//! Connection adapter trait and query building primitives
//!
//! The adapter exposes parameterized query execution (id-column, scalar, row
//! and rows-affected fetches) plus table-name resolution. It is injected
//! explicitly wherever the engine needs store access; there is no ambient or
//! global fallback connection.

use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;

/// Primary-key type for all supported target kinds
pub type RecordId = i64;

/// A generic row from the all-columns cursor variant
pub type TableRow = serde_json::Map<String, serde_json::Value>;

/// A bound query parameter
///
/// Queries are written with positional `?` placeholders; backends that use a
/// different placeholder syntax rewrite them before execution.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// 64-bit integer parameter
    Int(i64),
    /// Text parameter
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Resolves the concrete names of the tables the engine operates on
///
/// Deployments commonly prefix table names with a site-specific string, so
/// the resolver is prefix-based rather than a fixed pair of constants.
#[derive(Debug, Clone, PartialEq)]
pub struct TableNames {
    prefix: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            prefix: String::new(),
        }
    }
}

impl TableNames {
    /// Create a resolver with the given table prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            validate_identifier(&prefix)?;
        }
        Ok(Self { prefix })
    }

    /// Content-item table name
    pub fn posts(&self) -> String {
        format!("{}posts", self.prefix)
    }

    /// Discussion-item table name
    pub fn comments(&self) -> String {
        format!("{}comments", self.prefix)
    }
}

/// Validate a SQL identifier (table or column name)
///
/// Identifiers are interpolated into query text, so they must match a strict
/// grammar: leading letter or underscore, then letters, digits or underscores.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SweepError::Validation(format!(
            "invalid SQL identifier: {:?}",
            name
        )))
    }
}

/// Validate a caller-supplied raw WHERE fragment
///
/// The fragment is trusted SQL from the caller of the generic table cursor;
/// this only rejects obviously malformed input (empty text, statement
/// separators, comment markers). Values inside the fragment should still be
/// bound through [`SqlParam`]s.
pub fn validate_where_fragment(fragment: &str) -> Result<()> {
    let trimmed = fragment.trim();
    if trimmed.is_empty() {
        return Err(SweepError::Validation(
            "WHERE fragment is empty".to_string(),
        ));
    }
    if trimmed.contains(';') || trimmed.contains("--") || trimmed.contains("/*") {
        return Err(SweepError::Validation(
            "WHERE fragment contains a statement separator or comment".to_string(),
        ));
    }
    Ok(())
}

/// Parameterized access to the relational record store
///
/// All queries use positional `?` placeholders paired with a `params` slice.
/// Implementations hold no open cursor or transaction across calls; every
/// call is a self-contained round trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionAdapter: Send + Sync {
    /// Fetch the first column of every result row as record identifiers
    async fn fetch_id_column(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<RecordId>>;

    /// Fetch a single scalar value (first column of the first row)
    async fn fetch_scalar(&self, sql: &str, params: &[SqlParam]) -> Result<Option<i64>>;

    /// Fetch full result rows as generic column maps
    async fn fetch_rows(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<TableRow>>;

    /// Execute a statement, returning the number of affected rows
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64>;

    /// Table-name resolver for this connection
    fn tables(&self) -> &TableNames;
}
