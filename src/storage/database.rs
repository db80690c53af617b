//! sqlx-backed database implementation
//!
//! This module provides SQLite and PostgreSQL connectivity behind cargo
//! features and implements [`ConnectionAdapter`] on top of connection pools.

use crate::config::DatabaseConfig;
use crate::storage::adapter::{ConnectionAdapter, RecordId, SqlParam, TableNames, TableRow};
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("rowsweep requires at least one backend feature: `sqlite` or `postgres`");

#[cfg(feature = "postgres")]
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

/// Backend-specific connection pool
#[derive(Debug, Clone)]
enum Backend {
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
}

/// Database connection pool with table-name resolution
#[derive(Debug, Clone)]
pub struct Database {
    backend: Backend,
    tables: TableNames,
}

impl Database {
    /// Create a new database pool from configuration
    ///
    /// The backend is selected from the URL scheme; a scheme whose backend
    /// feature is not compiled in is a configuration error.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        Self::with_tables(config, TableNames::default()).await
    }

    /// Create a new database pool with a custom table-name resolver
    pub async fn with_tables(config: &DatabaseConfig, tables: TableNames) -> Result<Self> {
        config.validate()?;
        info!("Creating database connection pool");
        debug!("Database URL: {}", Self::sanitize_url(&config.url));

        let backend = if config.url.starts_with("sqlite:") {
            Self::connect_sqlite(config).await?
        } else if config.url.starts_with("postgres:") || config.url.starts_with("postgresql:") {
            Self::connect_postgres(config).await?
        } else {
            return Err(SweepError::Config(format!(
                "unsupported database URL scheme: {}",
                Self::sanitize_url(&config.url)
            )));
        };

        Ok(Self { backend, tables })
    }

    #[cfg(feature = "sqlite")]
    async fn connect_sqlite(config: &DatabaseConfig) -> Result<Backend> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .idle_timeout(Some(Duration::from_secs(600)))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to SQLite database: {}", e);
                SweepError::Database(e)
            })?;
        info!("SQLite connection pool created");
        Ok(Backend::Sqlite(pool))
    }

    #[cfg(not(feature = "sqlite"))]
    async fn connect_sqlite(_config: &DatabaseConfig) -> Result<Backend> {
        Err(SweepError::Config(
            "sqlite backend not compiled in (enable the `sqlite` feature)".to_string(),
        ))
    }

    #[cfg(feature = "postgres")]
    async fn connect_postgres(config: &DatabaseConfig) -> Result<Backend> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .idle_timeout(Some(Duration::from_secs(600)))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to PostgreSQL database: {}", e);
                SweepError::Database(e)
            })?;
        info!("PostgreSQL connection pool created");
        Ok(Backend::Postgres(pool))
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_postgres(_config: &DatabaseConfig) -> Result<Backend> {
        Err(SweepError::Config(
            "postgres backend not compiled in (enable the `postgres` feature)".to_string(),
        ))
    }

    /// Sanitize URL for logging (strip credentials)
    fn sanitize_url(url: &str) -> String {
        if url.starts_with("sqlite:") {
            url.to_string()
        } else {
            "***sanitized***".to_string()
        }
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");
        self.execute_inner("SELECT 1", &[]).await?;
        debug!("Database health check passed");
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) {
        info!("Closing database connection pool");
        match &self.backend {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(pool) => pool.close().await,
            #[cfg(feature = "postgres")]
            Backend::Postgres(pool) => pool.close().await,
        }
    }

    /// Create the content and discussion tables if they do not exist
    ///
    /// Primary keys are 64-bit integers on both backends; the cursor and
    /// executor assume BIGINT-compatible identifier columns throughout.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running schema bootstrap");
        let posts = self.tables.posts();
        let comments = self.tables.comments();

        let (posts_ddl, comments_ddl) = match &self.backend {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(_) => (
                format!(
                    r#"
                    CREATE TABLE IF NOT EXISTS {posts} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        post_type TEXT NOT NULL DEFAULT 'post',
                        post_status TEXT NOT NULL DEFAULT 'publish',
                        title TEXT
                    )
                    "#
                ),
                format!(
                    r#"
                    CREATE TABLE IF NOT EXISTS {comments} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        post_id INTEGER NOT NULL DEFAULT 0,
                        status TEXT NOT NULL DEFAULT 'approved',
                        author TEXT
                    )
                    "#
                ),
            ),
            #[cfg(feature = "postgres")]
            Backend::Postgres(_) => (
                format!(
                    r#"
                    CREATE TABLE IF NOT EXISTS {posts} (
                        id BIGSERIAL PRIMARY KEY,
                        post_type TEXT NOT NULL DEFAULT 'post',
                        post_status TEXT NOT NULL DEFAULT 'publish',
                        title TEXT
                    )
                    "#
                ),
                format!(
                    r#"
                    CREATE TABLE IF NOT EXISTS {comments} (
                        id BIGSERIAL PRIMARY KEY,
                        post_id BIGINT NOT NULL DEFAULT 0,
                        status TEXT NOT NULL DEFAULT 'approved',
                        author TEXT
                    )
                    "#
                ),
            ),
        };

        self.execute_inner(&posts_ddl, &[]).await?;
        self.execute_inner(&comments_ddl, &[]).await?;
        info!("Schema bootstrap completed");
        Ok(())
    }

    async fn execute_inner(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        match &self.backend {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(pool) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let result = query.execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[cfg(feature = "postgres")]
            Backend::Postgres(pool) => {
                let sql = rewrite_placeholders(sql);
                let mut query = sqlx::query(&sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let result = query.execute(pool).await?;
                Ok(result.rows_affected())
            }
        }
    }
}

/// Rewrite positional `?` placeholders to PostgreSQL `$n` syntax
///
/// Engine-generated SQL never contains a literal `?` outside placeholder
/// position, so a straight left-to-right substitution is sufficient.
#[cfg(feature = "postgres")]
fn rewrite_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    for c in sql.chars() {
        if c == '?' {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(feature = "sqlite")]
fn sqlite_row_to_json(row: &SqliteRow) -> TableRow {
    use sqlx::{Column, Row, TypeInfo};

    let mut map = TableRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INTEGER" | "INT" | "BOOLEAN" => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "REAL" => row
                .try_get::<Option<f64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            _ => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
        };
        map.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }
    map
}

#[cfg(feature = "postgres")]
fn pg_row_to_json(row: &PgRow) -> TableRow {
    use sqlx::{Column, Row, TypeInfo};

    let mut map = TableRow::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "INT2" => row
                .try_get::<Option<i16>, _>(idx)
                .ok()
                .flatten()
                .map(|v| Value::from(v as i64)),
            "INT4" => row
                .try_get::<Option<i32>, _>(idx)
                .ok()
                .flatten()
                .map(|v| Value::from(v as i64)),
            "INT8" => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)
                .ok()
                .flatten()
                .map(|v| Value::from(v as f64)),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "BOOL" => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            _ => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
        };
        map.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }
    map
}

#[async_trait]
impl ConnectionAdapter for Database {
    async fn fetch_id_column(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<RecordId>> {
        match &self.backend {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(pool) => {
                use sqlx::Row;
                let mut query = sqlx::query(sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let rows = query.fetch_all(pool).await?;
                let mut ids = Vec::with_capacity(rows.len());
                for row in &rows {
                    ids.push(row.try_get::<i64, _>(0)?);
                }
                Ok(ids)
            }
            #[cfg(feature = "postgres")]
            Backend::Postgres(pool) => {
                use sqlx::Row;
                let sql = rewrite_placeholders(sql);
                let mut query = sqlx::query(&sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let rows = query.fetch_all(pool).await?;
                let mut ids = Vec::with_capacity(rows.len());
                for row in &rows {
                    ids.push(row.try_get::<i64, _>(0)?);
                }
                Ok(ids)
            }
        }
    }

    async fn fetch_scalar(&self, sql: &str, params: &[SqlParam]) -> Result<Option<i64>> {
        match &self.backend {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(pool) => {
                use sqlx::Row;
                let mut query = sqlx::query(sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let row = query.fetch_optional(pool).await?;
                match row {
                    Some(row) => Ok(Some(row.try_get::<i64, _>(0)?)),
                    None => Ok(None),
                }
            }
            #[cfg(feature = "postgres")]
            Backend::Postgres(pool) => {
                use sqlx::Row;
                let sql = rewrite_placeholders(sql);
                let mut query = sqlx::query(&sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let row = query.fetch_optional(pool).await?;
                match row {
                    Some(row) => Ok(Some(row.try_get::<i64, _>(0)?)),
                    None => Ok(None),
                }
            }
        }
    }

    async fn fetch_rows(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<TableRow>> {
        match &self.backend {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite(pool) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let rows = query.fetch_all(pool).await?;
                Ok(rows.iter().map(sqlite_row_to_json).collect())
            }
            #[cfg(feature = "postgres")]
            Backend::Postgres(pool) => {
                let sql = rewrite_placeholders(sql);
                let mut query = sqlx::query(&sql);
                for param in params {
                    query = match param {
                        SqlParam::Int(v) => query.bind(*v),
                        SqlParam::Text(v) => query.bind(v.as_str()),
                    };
                }
                let rows = query.fetch_all(pool).await?;
                Ok(rows.iter().map(pg_row_to_json).collect())
            }
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        self.execute_inner(sql, params).await
    }

    fn tables(&self) -> &TableNames {
        &self.tables
    }
}
