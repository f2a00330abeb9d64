use std::time::Duration;

use perch_imagery::{CacheOptions, COMPOSITE_MAX_ALPHA, REFRESH_INTERVAL};
use perch_sections::{POSITION_THROTTLE, SAVE_DEBOUNCE, StoreOptions};
use serde::Serialize;
use serde_json::Value;

const DEFAULT_LOG_LEVEL: &str = "warn";
const LOG_LEVELS: [&str; 6] =
    ["off", "error", "warn", "info", "debug", "trace"];

/// Typed contents of `settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub(crate) struct SettingsData {
    sections: SectionSettingsData,
    cache: CacheSettingsData,
    log: LogSettingsData,
}

/// Coalescing intervals for the section store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SectionSettingsData {
    position_throttle_ms: u64,
    save_debounce_ms: u64,
}

impl Default for SectionSettingsData {
    fn default() -> Self {
        Self {
            position_throttle_ms: POSITION_THROTTLE.as_millis() as u64,
            save_debounce_ms: SAVE_DEBOUNCE.as_millis() as u64,
        }
    }
}

/// Image cache refresh behaviour.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CacheSettingsData {
    refresh_interval_ms: u64,
    composite_max_alpha: f64,
}

impl Default for CacheSettingsData {
    fn default() -> Self {
        Self {
            refresh_interval_ms: REFRESH_INTERVAL.as_millis() as u64,
            composite_max_alpha: COMPOSITE_MAX_ALPHA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct LogSettingsData {
    level: String,
}

impl Default for LogSettingsData {
    fn default() -> Self {
        Self {
            level: String::from(DEFAULT_LOG_LEVEL),
        }
    }
}

impl SettingsData {
    /// Build settings from loosely shaped JSON.
    ///
    /// Missing, mistyped or out-of-range fields keep their defaults.
    pub(crate) fn from_json(value: &Value) -> Self {
        let mut settings = SettingsData::default();

        if let Some(sections) = value.get("sections") {
            if let Some(ms) =
                read_positive_millis(sections, "positionThrottleMs")
            {
                settings.sections.position_throttle_ms = ms;
            }
            if let Some(ms) = read_positive_millis(sections, "saveDebounceMs") {
                settings.sections.save_debounce_ms = ms;
            }
        }

        if let Some(cache) = value.get("cache") {
            if let Some(ms) = read_positive_millis(cache, "refreshIntervalMs") {
                settings.cache.refresh_interval_ms = ms;
            }
            if let Some(alpha) = cache
                .get("compositeMaxAlpha")
                .and_then(Value::as_f64)
                .filter(|alpha| (0.0..=1.0).contains(alpha))
            {
                settings.cache.composite_max_alpha = alpha;
            }
        }

        if let Some(level) = value
            .get("log")
            .and_then(|log| log.get("level"))
            .and_then(Value::as_str)
            .map(|level| level.trim().to_ascii_lowercase())
            .filter(|level| LOG_LEVELS.contains(&level.as_str()))
        {
            settings.log.level = level;
        }

        settings
    }

    /// Filter passed to the logger when `RUST_LOG` is unset.
    pub(crate) fn log_level(&self) -> &str {
        &self.log.level
    }

    pub(crate) fn store_options(&self) -> StoreOptions {
        StoreOptions {
            position_throttle: Duration::from_millis(
                self.sections.position_throttle_ms,
            ),
            save_debounce: Duration::from_millis(
                self.sections.save_debounce_ms,
            ),
        }
    }

    pub(crate) fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            refresh_interval: Duration::from_millis(
                self.cache.refresh_interval_ms,
            ),
            composite_max_alpha: self.cache.composite_max_alpha,
        }
    }
}

fn read_positive_millis(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(Value::as_u64).filter(|ms| *ms > 0)
}
