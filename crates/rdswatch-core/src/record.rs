use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel written into the non-status fields of a degraded record.
pub const ERROR_SENTINEL: &str = "Error";

/// Flat snapshot of one RDS instance, produced by the fetcher and
/// consumed once by the dispatcher. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStatusRecord {
    pub engine: String,
    pub version: String,
    pub status: String,
    pub endpoint: String,
    pub maintenance_window: String,
    /// Queued configuration changes, flattened to display strings.
    /// Empty when the provider reports none pending.
    pub pending_mods: BTreeMap<String, String>,
}

impl DbStatusRecord {
    /// Fallback record used when the control-plane fetch fails. The
    /// error text rides in `status` so the delivered report shows the
    /// failure instead of the run silently skipping a week.
    pub fn degraded(error_text: impl Into<String>) -> Self {
        Self {
            engine: ERROR_SENTINEL.to_string(),
            version: ERROR_SENTINEL.to_string(),
            status: error_text.into(),
            endpoint: ERROR_SENTINEL.to_string(),
            maintenance_window: ERROR_SENTINEL.to_string(),
            pending_mods: BTreeMap::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.engine == ERROR_SENTINEL && self.version == ERROR_SENTINEL
    }
}
