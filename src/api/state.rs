//! Application state for the Benefit Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{ConfigLoader, EngineSettings};
use crate::store::InMemoryStore;

/// Shared application state.
///
/// Holds the loaded configuration and the record store. The store sits
/// behind a mutex so that requests touching benefits run one at a time.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    /// The benefit records.
    store: Arc<Mutex<InMemoryStore>>,
}

impl AppState {
    /// Creates a state with a store seeded from the configuration.
    ///
    /// The store knows the configured benefit types and employees. Leaves
    /// are not configured; use [`AppState::with_store`] to start from a
    /// store that already holds them.
    pub fn new(config: ConfigLoader) -> Self {
        let store = config.seeded_store();
        Self::with_store(config, store)
    }

    /// Creates a state around an existing store.
    pub fn with_store(config: ConfigLoader, store: InMemoryStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Returns the shared record store.
    pub fn store(&self) -> &Mutex<InMemoryStore> {
        &self.store
    }
}
