// ==========================================
// Foundry QC Tracker - SQLite connection and schema
// ==========================================
// Every connection gets the same PRAGMAs:
// - foreign_keys must be enabled per connection
// - busy_timeout must be set per connection
// ==========================================

pub mod seed;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

const SCHEMA_SQL: &str = include_str!("../migrations/schema.sql");

/// Apply the shared PRAGMAs to a connection
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the shared PRAGMAs applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create all tables (idempotent) and record the schema version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    ensure_pipe_order_column(conn)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Version 1 databases have no pipes.production_order_id
fn ensure_pipe_order_column(conn: &Connection) -> rusqlite::Result<()> {
    let has_col: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('pipes') WHERE name = 'production_order_id'",
        [],
        |row| row.get(0),
    )?;
    if has_col == 0 {
        conn.execute_batch(
            "ALTER TABLE pipes ADD COLUMN production_order_id INTEGER REFERENCES production_orders(id);",
        )?;
        tracing::info!("pipes.production_order_id added");
    }
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_pipes_production_order ON pipes(production_order_id);",
    )?;
    Ok(())
}

/// Read schema_version; None when the table does not exist
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Open, configure, create schema and seed reference data
pub fn open_and_prepare(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;

    match read_schema_version(&conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            tracing::warn!(
                db_version = v,
                expected = CURRENT_SCHEMA_VERSION,
                "database schema is newer than this build"
            );
        }
        _ => {}
    }

    let report = seed::seed_reference_data(&conn)?;
    if report.total() > 0 {
        tracing::info!(?report, "reference data seeded");
    }
    Ok(conn)
}
