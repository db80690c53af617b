//! Shared test infrastructure

use rowsweep::{
    ConnectionAdapter, CursorGenerator, Database, DatabaseConfig, ExecutionBudgetGuard,
    MemoryCache, NoopBudgetHost, SqlParam,
};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Install a per-process tracing subscriber writing to the test harness
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Create a migrated in-memory SQLite database
///
/// A single pool connection keeps every query on the same in-memory
/// database.
pub async fn memory_database() -> Arc<Database> {
    init_tracing();
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connection_timeout: 5,
    };
    let db = Database::new(&config).await.expect("Failed to create database");
    db.migrate().await.expect("Migration failed");
    Arc::new(db)
}

/// Guard over a no-op host and a fresh in-memory cache
pub fn noop_guard() -> Arc<ExecutionBudgetGuard> {
    Arc::new(ExecutionBudgetGuard::new(
        Arc::new(NoopBudgetHost),
        Arc::new(MemoryCache::new(64).expect("cache capacity")),
    ))
}

/// Cursor generator wired to the given database with a no-op guard
pub fn cursor_over(db: &Arc<Database>) -> CursorGenerator {
    CursorGenerator::new(db.clone(), noop_guard())
}

/// Insert `count` content rows of the given type and status; ids are
/// assigned sequentially by the database
pub async fn seed_posts(db: &Arc<Database>, count: usize, post_type: &str, post_status: &str) {
    for i in 0..count {
        db.execute(
            "INSERT INTO posts (post_type, post_status, title) VALUES (?, ?, ?)",
            &[
                SqlParam::from(post_type),
                SqlParam::from(post_status),
                SqlParam::from(format!("title {i}")),
            ],
        )
        .await
        .expect("seed post");
    }
}

/// Insert `count` comment rows with the given status
pub async fn seed_comments(db: &Arc<Database>, count: usize, status: &str) {
    for i in 0..count {
        db.execute(
            "INSERT INTO comments (post_id, status, author) VALUES (?, ?, ?)",
            &[
                SqlParam::Int(1),
                SqlParam::from(status),
                SqlParam::from(format!("author {i}")),
            ],
        )
        .await
        .expect("seed comment");
    }
}

/// Count rows in a table
pub async fn count_rows(db: &Arc<Database>, table: &str) -> i64 {
    db.fetch_scalar(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .await
        .expect("count rows")
        .unwrap_or(0)
}
