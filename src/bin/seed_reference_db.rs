// ==========================================
// Create (or reset) a database and seed the lookup tables
// ==========================================
// Usage: seed_reference_db [db_path] [--reset]
// --reset moves an existing file to <db_path>.bak.<timestamp> first.
// ==========================================

use anyhow::Context;
use chrono::Local;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

use foundry_qc::config::get_default_db_path;
use foundry_qc::db::open_and_prepare;

const TABLES: [&str; 14] = [
    "furnaces",
    "machines",
    "defect_types",
    "decision_types",
    "element_specifications",
    "mechanical_rules",
    "shifts",
    "engineers",
    "chemical_analyses",
    "production_orders",
    "pipes",
    "pipe_stages",
    "pipe_stage_history",
    "mechanical_tests",
];

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let reset = args.iter().any(|a| a == "--reset");
    let db_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(get_default_db_path);

    if reset {
        backup_and_reset_db(&db_path)?;
    }

    let conn = open_and_prepare(&db_path)
        .with_context(|| format!("cannot prepare database {}", db_path))?;
    eprintln!("Database ready: {}", db_path);
    print_row_counts(&conn)?;
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> anyhow::Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::rename(path, &backup_path)
        .with_context(|| format!("cannot move {} aside", db_path))?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn print_row_counts(conn: &Connection) -> anyhow::Result<()> {
    eprintln!("Row counts:");
    for t in TABLES {
        let sql = format!("SELECT COUNT(*) FROM {}", t);
        let c: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<24} {}", t, c);
    }
    Ok(())
}
