// ==========================================
// Foundry QC Tracker - startup configuration
// ==========================================
// Read once from the environment:
// - FOUNDRY_QC_DB_PATH   database file (default: user data dir)
// - FOUNDRY_QC_BIND      listen address (default: 127.0.0.1:8080)
// - FOUNDRY_QC_LOCALE    default UI locale (default: en)
// ==========================================

use crate::i18n::{resolve_locale, DEFAULT_LOCALE};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "FOUNDRY_QC_DB_PATH";
pub const ENV_BIND: &str = "FOUNDRY_QC_BIND";
pub const ENV_LOCALE: &str = "FOUNDRY_QC_LOCALE";

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DB_FILE_NAME: &str = "foundry_qc.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub default_locale: String,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = non_empty(ENV_DB_PATH).unwrap_or_else(get_default_db_path);

        let bind_raw = non_empty(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}={}: {}", ENV_BIND, bind_raw, e))?;

        let default_locale = non_empty(ENV_LOCALE)
            .map(|l| resolve_locale(&l).to_string())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        Ok(Self {
            db_path,
            bind_addr,
            default_locale,
        })
    }
}

/// Default database path under the user data directory
///
/// Debug builds use a separate directory so development data never mixes
/// with production data.
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("foundry-qc-dev");
        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("foundry-qc");

        // best effort: fall back to the working directory
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
