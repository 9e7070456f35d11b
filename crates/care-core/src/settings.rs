//! Key/value settings and the loaded care configuration.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use sheet_core::{DocumentId, SheetStore};
use tracing::{info, warn};

use crate::animal_type::TypeCatalog;
use crate::error::{CareError, Result};

/// Setting naming the remote configuration sheet.
pub const CONFIGURATION_SHEET_KEY: &str = "CONFIGURATION_SHEET_ID";
/// Setting naming the caregiver roster sheet.
pub const CAREGIVERS_SHEET_KEY: &str = "CAREGIVERS_SHEET_ID";
/// Setting naming the shared protocol sheet.
pub const PROTOCOLS_SHEET_KEY: &str = "PROTOCOLS_SHEET_ID";

/// Immutable string settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_pairs(env::vars())
    }

    /// Build from key/value pairs; later pairs win.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-blank value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// A copy with `overrides` applied on top.
    pub fn overlay(&self, overrides: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut values = self.values.clone();
        values.extend(overrides);
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Tuning for the scans and windows of the schedule queries.
#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    /// Pause before each folder scan of the daily board.
    pub scan_delay: Duration,
    /// Only documents modified within this many days appear on the board.
    pub lookback_days: i64,
    /// Half-width of the profile window, in days.
    pub profile_window_days: i64,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            scan_delay: Duration::from_millis(1000),
            lookback_days: 14,
            profile_window_days: 7,
        }
    }
}

/// Settings resolved for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct CareConfig {
    pub settings: Settings,
    pub catalog: TypeCatalog,
}

impl CareConfig {
    /// Derive the catalogue from settings.
    pub fn new(settings: Settings) -> Self {
        let catalog = TypeCatalog::from_lookup(|key| settings.get(key));
        Self { settings, catalog }
    }

    /// Caregiver roster sheet.
    pub fn caregivers_sheet(&self) -> Result<DocumentId> {
        self.settings
            .get(CAREGIVERS_SHEET_KEY)
            .map(DocumentId::from)
            .ok_or_else(|| {
                CareError::Configuration(format!(
                    "could not find caregiver sheet; set {}",
                    CAREGIVERS_SHEET_KEY
                ))
            })
    }

    /// Shared protocol sheet, when configured.
    pub fn protocols_sheet(&self) -> Option<DocumentId> {
        self.settings.get(PROTOCOLS_SHEET_KEY).map(DocumentId::from)
    }
}

/// Load the configuration table named by `CONFIGURATION_SHEET_ID` on top of `bootstrap`.
///
/// Each data row contributes its first two cells as key and value when both
/// are non-blank. Without a configuration sheet the bootstrap settings are
/// used alone.
pub async fn load_config(store: &dyn SheetStore, bootstrap: &Settings) -> Result<CareConfig> {
    let Some(sheet_id) = bootstrap.get(CONFIGURATION_SHEET_KEY) else {
        warn!(
            "{} is not set; using environment settings only",
            CONFIGURATION_SHEET_KEY
        );
        return Ok(CareConfig::new(bootstrap.clone()));
    };

    let sheet = store.read_sheet(&DocumentId::from(sheet_id)).await?;
    let overrides: Vec<(String, String)> = sheet
        .rows
        .iter()
        .filter_map(|row| {
            let key = row.cell(0).to_text().trim().to_string();
            let value = row.cell(1).to_text().trim().to_string();
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect();

    info!(
        document = sheet_id,
        entries = overrides.len(),
        "Configuration sheet loaded"
    );
    Ok(CareConfig::new(bootstrap.overlay(overrides)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_sheets::MemoryWorkspace;

    #[tokio::test]
    async fn test_without_configuration_sheet() {
        let store = MemoryWorkspace::new();
        let bootstrap = Settings::from_pairs([("DONKEYS_SHEET_ID", "r1")]);
        let config = load_config(&store, &bootstrap).await.unwrap();
        assert_eq!(config.settings.get("DONKEYS_SHEET_ID"), Some("r1"));
        assert!(config.protocols_sheet().is_none());
        assert!(matches!(
            config.caregivers_sheet(),
            Err(CareError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_sheet_overrides_environment() {
        let store = MemoryWorkspace::new();
        let doc = store.add_document("cfg", "Configuration", None, &["Key", "Value"]);
        store.push_row(&doc, vec!["DONKEYS_SHEET_ID".into(), "from-sheet".into()]);
        store.push_row(&doc, vec!["CAREGIVERS_SHEET_ID".into(), "cg".into()]);
        store.push_row(&doc, vec!["EMPTY_VALUE".into(), "".into()]);

        let bootstrap = Settings::from_pairs([
            ("CONFIGURATION_SHEET_ID", "cfg"),
            ("DONKEYS_SHEET_ID", "from-env"),
        ]);
        let config = load_config(&store, &bootstrap).await.unwrap();
        assert_eq!(config.settings.get("DONKEYS_SHEET_ID"), Some("from-sheet"));
        assert_eq!(config.caregivers_sheet().unwrap().as_str(), "cg");
        assert_eq!(config.settings.get("EMPTY_VALUE"), None);
        assert_eq!(bootstrap.get("DONKEYS_SHEET_ID"), Some("from-env"));
    }

    #[tokio::test]
    async fn test_missing_configuration_document() {
        let store = MemoryWorkspace::new();
        let bootstrap = Settings::from_pairs([("CONFIGURATION_SHEET_ID", "nope")]);
        let result = load_config(&store, &bootstrap).await;
        assert!(matches!(result, Err(CareError::Store(_))));
    }
}
