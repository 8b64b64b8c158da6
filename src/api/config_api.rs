// ==========================================
// Foundry QC Tracker - runtime settings API
// ==========================================
// Read: any role. Write: Administer, known keys only.
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::access::require;
use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigManager};
use crate::domain::types::{Actor, Capability};
use crate::engine::ladle_codec::MAX_NUMBER_WIDTH;

/// Keys accepted by `set`, all non-negative integers
const KNOWN_KEYS: [&str; 3] = [
    config_keys::LADLE_NUMBER_WIDTH,
    config_keys::LIST_PAGE_SIZE,
    config_keys::DASHBOARD_WINDOW_DAYS,
];

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    pub fn list(&self) -> ApiResult<BTreeMap<String, String>> {
        Ok(self.config_manager.snapshot()?)
    }

    /// Update one setting
    ///
    /// # Returns
    /// - InvalidInput: unknown key, a value that is not a non-negative integer,
    ///   or a ladle number width above MAX_NUMBER_WIDTH
    pub fn set(&self, key: &str, value: &str, actor: &Actor) -> ApiResult<()> {
        require(actor, Capability::Administer)?;

        if !KNOWN_KEYS.contains(&key) {
            return Err(ApiError::InvalidInput(format!("unknown setting '{}'", key)));
        }
        let value = value.trim();
        let number = value.parse::<u32>().map_err(|_| {
            ApiError::InvalidInput(format!(
                "{} expects a non-negative integer, got '{}'",
                key, value
            ))
        })?;
        if key == config_keys::LADLE_NUMBER_WIDTH && number as usize > MAX_NUMBER_WIDTH {
            return Err(ApiError::InvalidInput(format!(
                "{} must be between 0 and {}, got {}",
                key, MAX_NUMBER_WIDTH, number
            )));
        }

        self.config_manager.set_value(key, value)?;
        tracing::info!(key, value, actor = %actor.name, "setting changed");
        Ok(())
    }
}
