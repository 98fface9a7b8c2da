//! Outcome store backing - SQLite connection and schema

use std::str::FromStr;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

/// Create the SQLite connection pool.
///
/// WAL journal with full synchronous so a committed save is durable before
/// the write call returns.
pub async fn create_pool(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_path)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Apply the store schema
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_SQL.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Outcome store schema applied");
    Ok(())
}

/// Store schema SQL
///
/// `features` is an engine-private column (normalized feature vector as JSON,
/// tagged with layout version + hash); readers that do not know it ignore it.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    deployment_id TEXT NOT NULL,
    heuristic_score REAL NOT NULL,
    ml_score REAL NOT NULL,
    final_score REAL NOT NULL,
    actual_error_rate_percent REAL NOT NULL,
    actual_latency_change_percent REAL NOT NULL,
    rollback_triggered INTEGER NOT NULL DEFAULT 0,
    timestamp TEXT NOT NULL,
    features TEXT
);

CREATE INDEX IF NOT EXISTS idx_outcomes_deployment ON outcomes(deployment_id);

CREATE INDEX IF NOT EXISTS idx_outcomes_timestamp ON outcomes(timestamp)
"#;
