// ==========================================
// Foundry QC Tracker - runtime configuration
// ==========================================
// Storage: config_kv (key / value)
// Typed getters fall back to defaults when a key is missing or malformed
// ==========================================

use crate::engine::ladle_codec::MAX_NUMBER_WIDTH;
use crate::engine::LadleCodec;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub mod config_keys {
    /// Fixed ladle-number width in ladle_id; unset or 0 keeps the unpadded format
    pub const LADLE_NUMBER_WIDTH: &str = "ladle.number_width";
    /// Rows per list page
    pub const LIST_PAGE_SIZE: &str = "list.page_size";
    /// Dashboard window ("this week") in days
    pub const DASHBOARD_WINDOW_DAYS: &str = "dashboard.window_days";
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = crate::domain::types::MAX_PER_PAGE;
pub const DEFAULT_DASHBOARD_WINDOW_DAYS: u32 = 7;

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Build over an existing shared connection
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Raw value of a key
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Upsert a key
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "config value updated");
        Ok(())
    }

    /// All keys, sorted
    pub fn snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (k, v) = row?;
            map.insert(k, v);
        }
        Ok(map)
    }

    fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> RepositoryResult<Option<T>> {
        let raw = self.get_value(key)?;
        Ok(raw.and_then(|v| match v.trim().parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(key, value = %v, "ignoring malformed config value");
                None
            }
        }))
    }

    // ===== typed getters =====

    /// None for unset, 0 or out-of-range values
    pub fn get_ladle_number_width(&self) -> RepositoryResult<Option<usize>> {
        let width = self.get_parsed::<usize>(config_keys::LADLE_NUMBER_WIDTH)?;
        if let Some(w) = width.filter(|w| *w > MAX_NUMBER_WIDTH) {
            tracing::warn!(width = w, "ignoring out-of-range ladle number width");
        }
        Ok(width.filter(|w| (1..=MAX_NUMBER_WIDTH).contains(w)))
    }

    /// Codec configured from `ladle.number_width`
    pub fn ladle_codec(&self) -> RepositoryResult<LadleCodec> {
        Ok(LadleCodec::new(self.get_ladle_number_width()?))
    }

    pub fn get_page_size(&self) -> RepositoryResult<u32> {
        Ok(self
            .get_parsed::<u32>(config_keys::LIST_PAGE_SIZE)?
            .filter(|n| *n > 0)
            .map(|n| n.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn get_dashboard_window_days(&self) -> RepositoryResult<u32> {
        Ok(self
            .get_parsed::<u32>(config_keys::DASHBOARD_WINDOW_DAYS)?
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_DASHBOARD_WINDOW_DAYS))
    }
}
