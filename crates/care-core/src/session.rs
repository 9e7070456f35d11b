//! Process-scoped session: store handles plus the once-loaded configuration.

use std::sync::Arc;

use sheet_core::{DocumentLocator, SheetStore};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::error::Result;
use crate::settings::{load_config, CareConfig, ScheduleOptions, Settings};

/// Shared state for every request.
///
/// The configuration table is read on the first [`Session::ready`] call. All
/// concurrent callers wait on that same load. A failed load leaves the cell
/// empty, so the next call tries again.
pub struct Session {
    store: Arc<dyn SheetStore>,
    locator: Arc<dyn DocumentLocator>,
    bootstrap: Settings,
    options: ScheduleOptions,
    config: OnceCell<Arc<CareConfig>>,
}

impl Session {
    /// Create a session over separate store and locator handles.
    pub fn new(
        store: Arc<dyn SheetStore>,
        locator: Arc<dyn DocumentLocator>,
        bootstrap: Settings,
        options: ScheduleOptions,
    ) -> Self {
        Self {
            store,
            locator,
            bootstrap,
            options,
            config: OnceCell::new(),
        }
    }

    /// Create a session over one backend that is both store and locator.
    pub fn with_workspace<W>(workspace: W, bootstrap: Settings, options: ScheduleOptions) -> Self
    where
        W: SheetStore + DocumentLocator + 'static,
    {
        let shared = Arc::new(workspace);
        Self::new(shared.clone(), shared, bootstrap, options)
    }

    /// Wait for the configuration, loading it if nobody has yet.
    pub async fn ready(&self) -> Result<Arc<CareConfig>> {
        self.config
            .get_or_try_init(|| async {
                match load_config(self.store.as_ref(), &self.bootstrap).await {
                    Ok(config) => {
                        info!(
                            types = config.catalog.with_folders().len(),
                            "Care configuration ready"
                        );
                        Ok(Arc::new(config))
                    }
                    Err(e) => {
                        error!("Failed to load care configuration: {}", e);
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }

    /// True once a configuration load has succeeded.
    pub fn is_ready(&self) -> bool {
        self.config.initialized()
    }

    pub fn store(&self) -> &dyn SheetStore {
        self.store.as_ref()
    }

    pub fn locator(&self) -> &dyn DocumentLocator {
        self.locator.as_ref()
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }
}
