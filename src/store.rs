//! Shared, replaceable grid definition.
//!
//! Readers take a snapshot, an `Arc` of the definition current at that moment,
//! and keep using it for as long as they like. Writers build a complete new
//! definition and publish it in one step, so a snapshot is never observed
//! half-updated. A rejected configuration leaves the current definition in
//! place.
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::error::ConfigError;
use crate::grid::{GridConfig, GridDefinition};

#[derive(Debug)]
pub struct GridStore {
    current: RwLock<Arc<GridDefinition>>,
}

impl GridStore {
    /// Build the initial definition.
    ///
    /// # Errors
    /// * If `config` is rejected by [`GridDefinition::build`]
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        let grid = GridDefinition::build(config)?;
        info!(nrecords = grid.nrecords(), "published grid definition");
        Ok(Self::from(grid))
    }

    /// The definition current at the time of the call.
    pub fn snapshot(&self) -> Arc<GridDefinition> {
        // A panicking writer never leaves a partially published grid behind
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Edit the current configuration and publish the rebuilt definition.
    ///
    /// Concurrent updates are applied one after the other, each seeing the
    /// result of the previous one.
    ///
    /// # Errors
    /// * If the edited configuration is rejected; the current definition is kept
    pub fn update(
        &self,
        edit: impl FnOnce(&mut GridConfig),
    ) -> Result<Arc<GridDefinition>, ConfigError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let grid = Arc::new(current.update(edit)?);
        *current = Arc::clone(&grid);
        info!(nrecords = grid.nrecords(), "published grid definition");
        Ok(grid)
    }

    /// Replace the configuration outright.
    ///
    /// # Errors
    /// * If `config` is rejected; the current definition is kept
    pub fn replace(&self, config: GridConfig) -> Result<Arc<GridDefinition>, ConfigError> {
        self.update(|c| *c = config)
    }
}

impl From<GridDefinition> for GridStore {
    fn from(grid: GridDefinition) -> Self {
        Self {
            current: RwLock::new(Arc::new(grid)),
        }
    }
}
